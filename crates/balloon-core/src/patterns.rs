//! Lexical forms of drawing annotations.
//!
//! Pure lookup data: symbol tables, keyword lists and compiled expressions used by
//! the line assembler and the feature classifier.

use once_cell::sync::Lazy;
use regex::Regex;

/// GD&T characters and the characteristic each one denotes.
pub const GDT_SYMBOLS: &[(char, &str)] = &[
    ('⏥', "Flatness"),
    ('⏊', "Perpendicularity"),
    ('⌭', "Cylindricity"),
    ('◎', "Concentricity/Position"),
    ('⌖', "Position"),
    ('⏇', "Profile of Surface"),
    ('⏆', "Profile of Line"),
    ('⏃', "Runout"),
    ('⏄', "Total Runout"),
    ('⫽', "Parallelism"),
    ('∠', "Angularity"),
    ('⏤', "Straightness"),
    ('Ⓗ', "Maximum Material Condition (MMC)"),
    ('Ⓛ', "Least Material Condition (LMC)"),
    ('Ⓟ', "Projected Tolerance Zone"),
    ('⌀', "Diameter"),
    ('Ø', "Diameter"),
    ('⌯', "Symmetry"),
];

pub const DIAMETER: &str = "Diameter";

/// Title-block and table column captions.
pub const TABLE_HEADERS: &[&str] = &[
    "ITEM",
    "QTY",
    "DESCRIPTION",
    "PART NO",
    "MATERIAL",
    "ZONE",
    "REV",
    "DATE",
    "APPROVED",
    "CHECKED",
    "DRAWN",
    "ABOVE",
    "UPTO",
    "TOLERANCE",
    "LINEAR DIMENSIONS",
    "ANGULAR DIMENSIONS",
    "FINISHED SIZE",
    "HEAT TREATMENT",
    "SURFACE COATING",
    "TAG",
    "X LOC",
    "Y LOC",
    "HOLE TABLE",
    "SIZE",
];

/// Hole notes, fits and machining operations collected into a dimension's description.
pub const HOLE_MODIFIERS: &[&str] = &[
    "THRU", "DP", "DEPTH", "CBORE", "CSINK", "SPOTFACE", "EQ SP", "EQUI SP", "TYP", "PLACES",
    "PLCS", "H7", "g6", "H11", "h11", "DRILL", "REAM", "TAP", "BORE", "GRIND", "PITCH",
];

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

/// Title-block key/value lines, checked in this order.
static METADATA: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("PART_NUMBER", r"PART NUMBER|PART NO|P/N"),
        ("TITLE", r"DWG TITLE|TITLE"),
        ("MATERIAL", r"MATERIAL|MATL"),
        ("REVISION", r"REVISION|REV"),
        ("SCALE", r"SCALE"),
        ("SHEET", r"SHEET|SHT"),
        ("DATE", r"DATE"),
        ("WEIGHT", r"WEIGHT|MASS"),
    ]
    .into_iter()
    .map(|(key, keys)| {
        let pattern = format!(r"(?i)\b(?:{keys})\b\s*[:.-]?\s*(.*)");
        (key, compile(&pattern))
    })
    .collect()
});

static GDT_TEXT: Lazy<Regex> = Lazy::new(|| {
    let class: String = GDT_SYMBOLS
        .iter()
        .map(|(c, _)| regex::escape(&c.to_string()))
        .collect();
    compile(&format!(r"([{class}])\s*(\d+(?:\.\d+)?)\s*([A-Z\s]*)"))
});

static THREAD: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)\b(?:M\d+(?:\.\d+)?(?:\s*x\s*\d+(?:\.\d+)?)?|\d+(?:/\d+)?\s*-\s*\d+\s*(?:UNC|UNF|UNEF|NPT))\b",
    )
});

static CHAMFER: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b(?:C\s*\d+(?:\.\d+)?|\d+(?:\.\d+)?\s*x\s*45°?)\b"));

// Bare preferred Ra values only count when they are the whole line, so that
// tolerance numerals such as "+0.8" are not taken for a finish.
static SURFACE_FINISH: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)\b(?:(?:Ra|Rz|RMS)\s*\d+(?:\.\d+)?|\d+(?:\.\d+)?\s*(?:Ra|Rz|RMS)|N[1-9][0-2]?)\b|^\s*(?:0\.025|0\.05|0\.1|0\.2|0\.4|0\.8|1\.6|3\.2|6\.3|12\.5|25|50)\s*$",
    )
});

static HARDNESS: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b\d+(?:\.\d+)?\s*(?:HRC|HRB|HB|HV|HRA)\b"));

static WELDING: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b(?:WELD|FILLET|SEAM|SPOT WELD|ARC WELD)\b"));

// Nominal with optional diameter/radius prefix, then either a symmetric
// tolerance or a pair of limits ("+0.2 / +0.1", "+0.1 0", "0 -0.02").
static DIMENSION: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"[ØR\x{2300}]?\s*\d+(?:\.\d+)?(?:\s*±\s*\d+(?:\.\d+)?|\s*(?:[+-]?\d+(?:\.\d+)?|[+-]?0(?:\.0+)?)\s*/?\s*(?:[+-]?\d+(?:\.\d+)?|[+-]?0(?:\.0+)?))?",
    )
});

static MODIFIER: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^(?:\d+\s*x|@|TYP|PLACES|PLCS)"));

static HOLE_LABEL: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^[A-Z][0-9]{1,2}$"));

/// Name of a GD&T symbol character.
pub fn gdt_symbol_name(symbol: char) -> Option<&'static str> {
    GDT_SYMBOLS
        .iter()
        .find(|(c, _)| *c == symbol)
        .map(|(_, name)| *name)
}

/// First metadata key whose label is followed by a non-empty value.
pub fn match_metadata(text: &str) -> Option<(&'static str, String)> {
    METADATA.iter().find_map(|(key, re)| {
        let value = re.captures(text)?.get(1)?.as_str().trim();
        if value.is_empty() {
            None
        } else {
            Some((*key, value.to_string()))
        }
    })
}

pub fn is_table_header(text: &str) -> bool {
    let upper = text.to_uppercase();
    TABLE_HEADERS.iter().any(|h| upper.contains(h))
}

/// A GD&T symbol followed by a tolerance and optional datum letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GdtCallout<'a> {
    pub symbol: char,
    pub tolerance: &'a str,
    pub datum: &'a str,
}

impl GdtCallout<'_> {
    pub fn symbol_name(&self) -> &'static str {
        gdt_symbol_name(self.symbol).unwrap_or("Unknown Symbol")
    }
}

/// First GD&T callout in the text, if any.
pub fn match_gdt(text: &str) -> Option<GdtCallout<'_>> {
    let caps = GDT_TEXT.captures(text)?;
    Some(GdtCallout {
        symbol: caps.get(1)?.as_str().chars().next()?,
        tolerance: caps.get(2)?.as_str(),
        datum: caps.get(3).map_or("", |m| m.as_str().trim()),
    })
}

pub fn is_thread(text: &str) -> bool {
    THREAD.is_match(text)
}

pub fn is_chamfer(text: &str) -> bool {
    CHAMFER.is_match(text)
}

pub fn is_surface_finish(text: &str) -> bool {
    SURFACE_FINISH.is_match(text)
}

pub fn is_hardness(text: &str) -> bool {
    HARDNESS.is_match(text)
}

pub fn is_weld_note(text: &str) -> bool {
    WELDING.is_match(text)
}

/// Leftmost dimension/tolerance span in the text.
pub fn find_dimension(text: &str) -> Option<&str> {
    DIMENSION.find(text).map(|m| m.as_str())
}

/// Continuation lines such as "4X", "TYP" or "@ 90°".
pub fn is_modifier(text: &str) -> bool {
    MODIFIER.is_match(text)
}

/// Hole identifiers like "A1" or "B12".
pub fn is_hole_label(text: &str) -> bool {
    HOLE_LABEL.is_match(text)
}

/// Hole modifier keywords appearing anywhere in the text, in table order.
pub fn hole_modifiers(text: &str) -> Vec<&'static str> {
    HOLE_MODIFIERS
        .iter()
        .copied()
        .filter(|m| text.contains(m))
        .collect()
}
