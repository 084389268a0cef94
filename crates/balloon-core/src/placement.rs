use crate::config::PlacementConfig;
use crate::model::{BBox, Feature, PlacedBalloon, Point};
use std::collections::BTreeMap;

/// Side of the feature box a balloon is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Left,
    Top,
    Bottom,
}

/// Search order at every offset.
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Right,
    Direction::Left,
    Direction::Top,
    Direction::Bottom,
];

impl Direction {
    /// Balloon center and leader anchor (edge midpoint) for this side.
    fn candidate(self, b: &BBox, offset: f32, radius: f32) -> (Point, Point) {
        let c = b.center();
        let reach = offset + radius;
        match self {
            Direction::Right => (Point::new(b.x1 + reach, c.y), Point::new(b.x1, c.y)),
            Direction::Left => (Point::new(b.x0 - reach, c.y), Point::new(b.x0, c.y)),
            Direction::Top => (Point::new(c.x, b.y0 - reach), Point::new(c.x, b.y0)),
            Direction::Bottom => (Point::new(c.x, b.y1 + reach), Point::new(c.x, b.y1)),
        }
    }
}

/// Place one balloon per numbered feature, page by page.
///
/// Greedy and order-sensitive: each feature takes the first free spot found
/// (offsets nearest first, then right, left, top, bottom), and that spot becomes
/// an obstacle for every later feature on the page. When nothing is free the
/// balloon goes to the right at the smallest offset, overlap or not.
pub fn place_balloons(features: &[Feature], config: &PlacementConfig) -> Vec<PlacedBalloon> {
    let mut pages: BTreeMap<usize, Vec<&Feature>> = BTreeMap::new();
    for f in features {
        pages.entry(f.page_num).or_default().push(f);
    }

    pages
        .into_iter()
        .flat_map(|(page_num, page_features)| place_page(page_num, &page_features, config))
        .collect()
}

fn place_page(
    page_num: usize,
    features: &[&Feature],
    config: &PlacementConfig,
) -> Vec<PlacedBalloon> {
    let radius = config.balloon_radius;
    let offsets = config.offsets();

    let mut occupied: Vec<BBox> = features
        .iter()
        .filter(|f| f.is_numbered() || config.avoid_suppressed)
        .map(|f| f.location)
        .collect();

    let mut balloons = Vec::new();
    for feature in features {
        let Some(id) = feature.id else {
            continue;
        };
        let own = feature.location;

        let free = offsets.iter().find_map(|&offset| {
            DIRECTIONS.iter().find_map(|dir| {
                let (center, anchor) = dir.candidate(&own, offset, radius);
                let footprint = BBox::around(center, radius);
                let blocked = occupied
                    .iter()
                    .any(|zone| *zone != own && footprint.intersects(zone));
                (!blocked).then_some((center, anchor))
            })
        });

        let fallback = free.is_none();
        let (center, leader_start) = free.unwrap_or_else(|| {
            log::debug!(
                "page {}: no free spot for #{}, overlapping to the right",
                page_num,
                id
            );
            Direction::Right.candidate(&own, config.min_offset, radius)
        });
        occupied.push(BBox::around(center, radius));

        balloons.push(PlacedBalloon {
            feature_id: id,
            page_num,
            center,
            leader_start,
            radius,
            label: id.to_string(),
            fallback,
        });
    }

    balloons
}
