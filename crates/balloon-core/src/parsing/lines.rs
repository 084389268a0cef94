use crate::config::AssemblyConfig;
use crate::extraction::TextLine;
use crate::model::BBox;
use crate::patterns;

/// Logical annotation assembled from one or more stacked text lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub bbox: BBox,
}

/// Lines looked at past the current one when building a token.
const LOOKAHEAD: usize = 2;

/// Merge stacked text lines into annotation tokens.
///
/// Layout engines split callouts like "12.1" over "+0.1" over "0" into separate
/// lines. A following line joins the current token when its top edge lies within
/// `merge_gap` of the token's bottom edge and it reads as a continuation (a signed
/// tolerance, a lone "0", or a modifier like "4X"). Consumed lines are skipped.
pub fn assemble_tokens(lines: &[TextLine], config: &AssemblyConfig) -> Vec<Token> {
    let lines: Vec<Token> = lines
        .iter()
        .filter_map(|line| {
            let text = line.text.trim();
            if text.is_empty() {
                None
            } else {
                Some(Token {
                    text: text.to_string(),
                    bbox: line.bbox.normalized(),
                })
            }
        })
        .collect();

    let mut tokens = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let mut token = lines[i].clone();
        for _ in 0..LOOKAHEAD {
            match lines.get(i + 1) {
                Some(next) if should_merge(&token, next, config.merge_gap) => {
                    log::trace!("merging '{}' into '{}'", next.text, token.text);
                    token.text.push(' ');
                    token.text.push_str(&next.text);
                    token.bbox = token.bbox.union(&next.bbox);
                    i += 1;
                }
                _ => break,
            }
        }
        tokens.push(token);
        i += 1;
    }

    tokens
}

fn should_merge(current: &Token, next: &Token, merge_gap: f32) -> bool {
    let gap = next.bbox.y0 - current.bbox.y1;
    gap < merge_gap && is_continuation(&next.text)
}

fn is_continuation(text: &str) -> bool {
    text.starts_with(['+', '-', '±']) || text == "0" || patterns::is_modifier(text)
}
