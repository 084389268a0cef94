use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned box in page units, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        BBox { x0, y0, x1, y1 }
    }

    /// Same box with coordinates re-ordered so that `x0 <= x1` and `y0 <= y1`.
    pub fn normalized(&self) -> BBox {
        BBox {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.x0 + self.x1) / 2.0,
            y: (self.y0 + self.y1) / 2.0,
        }
    }

    /// True for zero-area, inverted or non-finite boxes.
    pub fn is_degenerate(&self) -> bool {
        !(self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite())
            || self.x1 <= self.x0
            || self.y1 <= self.y0
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn expand(&self, d: f32) -> BBox {
        BBox {
            x0: self.x0 - d,
            y0: self.y0 - d,
            x1: self.x1 + d,
            y1: self.y1 + d,
        }
    }

    /// Interiors overlap. Boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Overlapping or touching, edges included.
    pub fn touches(&self, other: &BBox) -> bool {
        !(other.x0 > self.x1 || other.x1 < self.x0 || other.y0 > self.y1 || other.y1 < self.y0)
    }

    /// Point inside the box, edges included.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// Square footprint of a circle.
    pub fn around(center: Point, radius: f32) -> BBox {
        BBox {
            x0: center.x - radius,
            y0: center.y - radius,
            x1: center.x + radius,
            y1: center.y + radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureType {
    Metadata,
    Note,
    #[serde(rename = "GD&T")]
    Gdt,
    Thread,
    Chamfer,
    #[serde(rename = "Surface Finish")]
    SurfaceFinish,
    #[serde(rename = "Material/Hardness")]
    Hardness,
    Welding,
    #[serde(rename = "Hole/Radius")]
    HoleRadius,
    #[serde(rename = "Linear Dimension")]
    LinearDimension,
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeatureType::Metadata => "Metadata",
            FeatureType::Note => "Note",
            FeatureType::Gdt => "GD&T",
            FeatureType::Thread => "Thread",
            FeatureType::Chamfer => "Chamfer",
            FeatureType::SurfaceFinish => "Surface Finish",
            FeatureType::Hardness => "Material/Hardness",
            FeatureType::Welding => "Welding",
            FeatureType::HoleRadius => "Hole/Radius",
            FeatureType::LinearDimension => "Linear Dimension",
        };
        f.write_str(s)
    }
}

/// Inclusive tolerance interval around a nominal value. `min <= max` always holds.
///
/// Serialized as `nominal`, `min_val` and `max_val`, the names inspection-sheet
/// writers read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceBand {
    pub nominal: Decimal,
    #[serde(rename = "min_val")]
    pub min: Decimal,
    #[serde(rename = "max_val")]
    pub max: Decimal,
}

impl ToleranceBand {
    /// Build a band from two limits given in either order.
    pub fn new(nominal: Decimal, a: Decimal, b: Decimal) -> Self {
        ToleranceBand {
            nominal,
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn exact(nominal: Decimal) -> Self {
        ToleranceBand {
            nominal,
            min: nominal,
            max: nominal,
        }
    }

    pub fn width(&self) -> Decimal {
        self.max - self.min
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A classified annotation found on a drawing page.
///
/// `id == None` marks a suppressed feature (metadata, table content, zone labels):
/// it stays in the list but is never numbered or ballooned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: Option<u32>,
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    pub sub_type: Option<String>,
    pub value: String,
    pub description: Option<String>,
    pub location: BBox,
    pub page_num: usize,
    /// Flattened into the feature record; absent when no tolerance was parsed.
    #[serde(flatten)]
    pub tolerance: Option<ToleranceBand>,
}

impl Feature {
    pub fn is_numbered(&self) -> bool {
        self.id.is_some()
    }

    pub fn min_val(&self) -> Option<Decimal> {
        self.tolerance.map(|t| t.min)
    }

    pub fn max_val(&self) -> Option<Decimal> {
        self.tolerance.map(|t| t.max)
    }

    /// Drop the feature number and retag it as a noise note.
    pub fn suppress(&mut self, sub_type: &str) {
        self.id = None;
        self.feature_type = FeatureType::Note;
        self.sub_type = Some(sub_type.to_string());
    }
}

/// A numbered marker placed next to a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBalloon {
    pub feature_id: u32,
    pub page_num: usize,
    pub center: Point,
    /// Anchor on the feature box edge where the leader line starts.
    pub leader_start: Point,
    pub radius: f32,
    pub label: String,
    /// Placed by the overlap-permitting fallback.
    pub fallback: bool,
}

impl PlacedBalloon {
    pub fn footprint(&self) -> BBox {
        BBox::around(self.center, self.radius)
    }
}
