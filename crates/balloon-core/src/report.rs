use crate::model::{Feature, FeatureType};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Widest tolerance band (inclusive) that still marks a linear dimension critical.
const CRITICAL_BAND: Decimal = Decimal::from_parts(5, 0, 0, false, 2); // 0.05

/// Inspection sheet section a numbered feature is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Critical,
    Linear,
    Holes,
    Threads,
    Gdt,
    Other,
}

impl Category {
    /// Section order on the sheet.
    pub const ORDER: [Category; 6] = [
        Category::Critical,
        Category::Linear,
        Category::Holes,
        Category::Threads,
        Category::Gdt,
        Category::Other,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::Critical => "Critical Dimensions",
            Category::Linear => "Linear Dimensions",
            Category::Holes => "Holes / Diameters",
            Category::Threads => "Threads",
            Category::Gdt => "GD&T",
            Category::Other => "Other",
        }
    }

    /// Whether rows of this section are judged against min/max. Threads and GD&T
    /// callouts are checked by hand.
    pub fn has_band(self) -> bool {
        matches!(self, Category::Critical | Category::Linear | Category::Holes)
    }

    /// Section for a numbered feature.
    pub fn of(feature: &Feature) -> Category {
        let critical = feature
            .tolerance
            .is_some_and(|t| t.width() > Decimal::ZERO && t.width() <= CRITICAL_BAND);
        match feature.sub_type.as_deref() {
            Some("Linear") if critical => Category::Critical,
            Some("Linear") => Category::Linear,
            Some("Diameter" | "Radius") => Category::Holes,
            Some("Thread") => Category::Threads,
            _ if feature.feature_type == FeatureType::Gdt => Category::Gdt,
            _ => Category::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

/// One numbered feature as listed on the inspection sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub balloon: u32,
    pub page_num: usize,
    pub sub_type: Option<String>,
    pub description: String,
    /// Callout text as printed on the drawing.
    pub nominal: String,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl ReportRow {
    /// Judge a measured value against the row's band. None means the row has no
    /// band and needs manual inspection.
    pub fn verdict(&self, actual: Decimal) -> Option<Verdict> {
        let (min, max) = (self.min?, self.max?);
        Some(if actual >= min && actual <= max {
            Verdict::Pass
        } else {
            Verdict::Fail
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub category: Category,
    pub title: &'static str,
    pub has_band: bool,
    pub rows: Vec<ReportRow>,
}

/// Everything an inspection-sheet writer needs: part metadata and the numbered
/// features grouped into sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InspectionReport {
    /// Title block fields keyed by their label. A later occurrence overwrites an
    /// earlier one.
    pub metadata: BTreeMap<String, String>,
    /// Non-empty sections in sheet order.
    pub sections: Vec<ReportSection>,
}

impl InspectionReport {
    pub fn section(&self, category: Category) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.category == category)
    }

    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }
}

/// Group finalized features into an inspection report.
///
/// Suppressed features are skipped, except metadata which feeds the header map.
pub fn build_report(features: &[Feature]) -> InspectionReport {
    let mut metadata = BTreeMap::new();
    let mut grouped: BTreeMap<Category, Vec<ReportRow>> = BTreeMap::new();

    for f in features {
        if f.feature_type == FeatureType::Metadata {
            if let Some(key) = &f.sub_type {
                metadata.insert(key.clone(), f.value.clone());
            }
            continue;
        }
        let Some(balloon) = f.id else {
            continue;
        };
        grouped.entry(Category::of(f)).or_default().push(ReportRow {
            balloon,
            page_num: f.page_num,
            sub_type: f.sub_type.clone(),
            description: f.description.clone().unwrap_or_default(),
            nominal: f.value.clone(),
            min: f.min_val(),
            max: f.max_val(),
        });
    }

    let sections = Category::ORDER
        .iter()
        .filter_map(|&category| {
            let rows = grouped.remove(&category)?;
            Some(ReportSection {
                category,
                title: category.title(),
                has_band: category.has_band(),
                rows,
            })
        })
        .collect();

    InspectionReport { metadata, sections }
}
