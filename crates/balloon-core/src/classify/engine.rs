use crate::model::{Feature, FeatureType, ToleranceBand};
use crate::parsing::{parse_tolerance, Token};
use crate::patterns;

/// Dimension spans this long are layout noise, not callouts.
const MAX_DIMENSION_CHARS: usize = 30;

/// Page-local feature numbering. Numbers are dense and start at 1.
#[derive(Debug, Clone)]
pub struct FeatureCounter {
    next: u32,
}

impl FeatureCounter {
    pub fn new() -> Self {
        FeatureCounter { next: 1 }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

impl Default for FeatureCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// What a rule recognised in a token, before a number is assigned.
#[derive(Debug, Clone)]
pub struct Classification {
    pub feature_type: FeatureType,
    pub sub_type: Option<String>,
    pub value: String,
    pub description: Option<String>,
    pub tolerance: Option<ToleranceBand>,
    /// Inspectable features get a balloon number; metadata and headers do not.
    pub numbered: bool,
}

impl Classification {
    fn numbered(feature_type: FeatureType, sub_type: &str, value: &str, description: &str) -> Self {
        Classification {
            feature_type,
            sub_type: Some(sub_type.to_string()),
            value: value.to_string(),
            description: Some(description.to_string()),
            tolerance: None,
            numbered: true,
        }
    }
}

/// One entry of the decision list.
pub struct ClassifierRule {
    pub name: &'static str,
    apply: fn(&str) -> Option<Classification>,
}

impl ClassifierRule {
    pub fn apply(&self, text: &str) -> Option<Classification> {
        (self.apply)(text)
    }
}

/// Rules in priority order. The first rule that recognises a token wins and no
/// later rule sees it, so reordering changes the output.
pub const RULES: &[ClassifierRule] = &[
    ClassifierRule {
        name: "metadata",
        apply: metadata,
    },
    ClassifierRule {
        name: "table-header",
        apply: table_header,
    },
    ClassifierRule {
        name: "gdt",
        apply: gdt,
    },
    ClassifierRule {
        name: "thread",
        apply: thread,
    },
    ClassifierRule {
        name: "chamfer",
        apply: chamfer,
    },
    ClassifierRule {
        name: "surface-finish",
        apply: surface_finish,
    },
    ClassifierRule {
        name: "hardness",
        apply: hardness,
    },
    ClassifierRule {
        name: "welding",
        apply: welding,
    },
    ClassifierRule {
        name: "dimension",
        apply: dimension,
    },
];

/// Classify every token of a page, numbering features in discovery order.
pub fn classify_tokens(
    tokens: &[Token],
    page_num: usize,
    counter: &mut FeatureCounter,
) -> Vec<Feature> {
    tokens
        .iter()
        .filter_map(|token| classify_token(token, page_num, counter))
        .collect()
}

/// Classify a single token. Returns None when no rule applies.
pub fn classify_token(
    token: &Token,
    page_num: usize,
    counter: &mut FeatureCounter,
) -> Option<Feature> {
    let (rule, found) = RULES
        .iter()
        .find_map(|rule| rule.apply(&token.text).map(|c| (rule.name, c)))?;

    let id = if found.numbered {
        if token.bbox.is_degenerate() {
            log::debug!(
                "page {}: dropping '{}' ({}) with degenerate box {:?}",
                page_num,
                token.text,
                rule,
                token.bbox
            );
            return None;
        }
        Some(counter.next_id())
    } else {
        None
    };
    log::trace!("page {}: '{}' -> {} (id {:?})", page_num, token.text, rule, id);

    Some(Feature {
        id,
        feature_type: found.feature_type,
        sub_type: found.sub_type,
        value: found.value,
        description: found.description,
        location: token.bbox,
        page_num,
        tolerance: found.tolerance,
    })
}

fn metadata(text: &str) -> Option<Classification> {
    let (key, value) = patterns::match_metadata(text)?;
    Some(Classification {
        feature_type: FeatureType::Metadata,
        sub_type: Some(key.to_string()),
        description: Some(format!("{key}: {value}")),
        value,
        tolerance: None,
        numbered: false,
    })
}

fn table_header(text: &str) -> Option<Classification> {
    if !patterns::is_table_header(text) {
        return None;
    }
    Some(Classification {
        feature_type: FeatureType::Note,
        sub_type: Some("Table/Header".into()),
        value: text.to_string(),
        description: Some("Document Text".into()),
        tolerance: None,
        numbered: false,
    })
}

fn gdt(text: &str) -> Option<Classification> {
    let callout = patterns::match_gdt(text)?;
    let name = callout.symbol_name();
    // A lone diameter glyph starts a dimension, not a control frame.
    if name == patterns::DIAMETER {
        return None;
    }
    let description = if callout.datum.is_empty() {
        format!("Tol: {}", callout.tolerance)
    } else {
        format!("Tol: {} | Datum: {}", callout.tolerance, callout.datum)
    };
    Some(Classification::numbered(FeatureType::Gdt, name, text, &description))
}

fn thread(text: &str) -> Option<Classification> {
    patterns::is_thread(text)
        .then(|| Classification::numbered(FeatureType::Thread, "Thread", text, "Thread Callout"))
}

fn chamfer(text: &str) -> Option<Classification> {
    patterns::is_chamfer(text).then(|| {
        Classification::numbered(FeatureType::Chamfer, "Chamfer", text, "Chamfer Dimension")
    })
}

fn surface_finish(text: &str) -> Option<Classification> {
    patterns::is_surface_finish(text).then(|| {
        Classification::numbered(
            FeatureType::SurfaceFinish,
            "Roughness",
            text,
            "Surface Finish Spec",
        )
    })
}

fn hardness(text: &str) -> Option<Classification> {
    patterns::is_hardness(text).then(|| {
        Classification::numbered(FeatureType::Hardness, "Hardness", text, "Material Property")
    })
}

fn welding(text: &str) -> Option<Classification> {
    patterns::is_weld_note(text).then(|| {
        Classification::numbered(FeatureType::Welding, "Weld Note", text, "Welding Instruction")
    })
}

fn dimension(text: &str) -> Option<Classification> {
    let span = patterns::find_dimension(text)?;

    // Only the matched span is checked: "A3" still yields the dimension "3",
    // and "R5" is a radius rather than a label.
    if patterns::is_hole_label(span) && !span.starts_with(['R', 'r']) {
        return None;
    }
    if span.chars().count() >= MAX_DIMENSION_CHARS {
        return None;
    }

    let (feature_type, sub_type) = if span.contains(['Ø', '⌀']) {
        (FeatureType::HoleRadius, "Diameter")
    } else if span.contains('R') {
        (FeatureType::HoleRadius, "Radius")
    } else {
        (FeatureType::LinearDimension, "Linear")
    };

    let mut notes: Vec<String> = patterns::hole_modifiers(text)
        .into_iter()
        .map(String::from)
        .collect();
    let remainder = text.replace(span, "");
    let remainder = remainder.trim();
    if !remainder.is_empty() && !notes.iter().any(|n| n == remainder) {
        notes.push(remainder.to_string());
    }

    Some(Classification {
        feature_type,
        sub_type: Some(sub_type.into()),
        value: span.to_string(),
        description: if notes.is_empty() {
            None
        } else {
            Some(notes.join(", "))
        },
        tolerance: parse_tolerance(span),
        numbered: true,
    })
}
