use crate::model::ToleranceBand;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

type Build = fn(&[Decimal]) -> Option<ToleranceBand>;

/// Tolerance notations, tried in order. Every capture group is a number.
static FORMS: Lazy<Vec<(&'static str, Regex, Build)>> = Lazy::new(|| {
    let forms: [(&'static str, &str, Build); 7] = [
        // 13 ± 0.1
        ("symmetric", r"([\d.]+)\s*±\s*([\d.]+)", |n| {
            Some(ToleranceBand::new(
                n[0],
                n[0].checked_sub(n[1])?,
                n[0].checked_add(n[1])?,
            ))
        }),
        // 10 +0.2/-0.1, 10 +0.2 -0.1
        (
            "plus-minus",
            r"([\d.]+)\s*\+\s*([\d.]+)\s*(?:/\s*-|/|-)\s*([\d.]+)",
            |n| {
                Some(ToleranceBand::new(
                    n[0],
                    n[0].checked_sub(n[2])?,
                    n[0].checked_add(n[1])?,
                ))
            },
        ),
        // 45 +0.015 +0.005
        (
            "plus-plus",
            r"([\d.]+)\s*\+\s*([\d.]+)\s*/?\s*\+\s*([\d.]+)",
            |n| {
                Some(ToleranceBand::new(
                    n[0],
                    n[0].checked_add(n[2])?,
                    n[0].checked_add(n[1])?,
                ))
            },
        ),
        // 67 -0.1 -0.2
        (
            "minus-minus",
            r"([\d.]+)\s*-\s*([\d.]+)\s*/?\s*-\s*([\d.]+)",
            |n| {
                Some(ToleranceBand::new(
                    n[0],
                    n[0].checked_sub(n[2])?,
                    n[0].checked_sub(n[1])?,
                ))
            },
        ),
        // 12.1 +0.1 0
        (
            "plus-zero",
            r"([\d.]+)\s*\+\s*([\d.]+)(?:\s+|\s*/\s*)[+-]?0(?:\.0+)?\s*$",
            |n| Some(ToleranceBand::new(n[0], n[0], n[0].checked_add(n[1])?)),
        ),
        // 12.1 0 -0.1
        (
            "zero-minus",
            r"([\d.]+)(?:\s+|\s*/\s*)\+?0(?:\.0+)?\s*/?\s*-\s*([\d.]+)",
            |n| Some(ToleranceBand::new(n[0], n[0].checked_sub(n[1])?, n[0])),
        ),
        // 12
        ("bare", r"^([\d.]+)$", |n| Some(ToleranceBand::exact(n[0]))),
    ];
    forms
        .into_iter()
        .map(|(name, pattern, build)| (name, Regex::new(pattern).unwrap(), build))
        .collect()
});

/// Parse a dimension span into its nominal value and tolerance band.
///
/// Handles formats like:
/// - "13 ± 0.1" -> 13 in [12.9, 13.1]
/// - "10 +0.2/-0.1" -> 10 in [9.9, 10.2]
/// - "45 +0.015 +0.005" -> 45 in [45.005, 45.015]
/// - "67 -0.1 -0.2" -> 67 in [66.8, 66.9]
/// - "Ø 12.1 +0.1 0" -> 12.1 in [12.1, 12.2]
/// - "12.1 0 -0.1" -> 12.1 in [12.0, 12.1]
/// - "25" -> 25 in [25, 25]
///
/// A form whose numbers fail to parse (e.g. "1.2.3") or whose limits overflow is
/// skipped and the next one tried. Returns None when no form applies.
pub fn parse_tolerance(span: &str) -> Option<ToleranceBand> {
    let clean = span
        .trim_start_matches(|c: char| matches!(c, '⌀' | 'Ø' | 'R') || c.is_whitespace())
        .trim();

    for (name, re, build) in FORMS.iter() {
        let Some(caps) = re.captures(clean) else {
            continue;
        };
        let numbers: Option<Vec<Decimal>> = caps
            .iter()
            .skip(1)
            .map(|m| m.and_then(|m| Decimal::from_str(m.as_str()).ok()))
            .collect();
        let Some(numbers) = numbers else {
            log::trace!("tolerance '{}': malformed number in {} form", span, name);
            continue;
        };
        match build(&numbers) {
            Some(band) => {
                log::trace!("tolerance '{}' parsed as {}", span, name);
                return Some(band);
            }
            None => log::trace!("tolerance '{}': limits overflow in {} form", span, name),
        }
    }

    None
}
