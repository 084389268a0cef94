use crate::config::FilterConfig;
use crate::extraction::{PageContent, VectorRect};
use crate::model::{BBox, Feature, FeatureType};

pub const TABLE_HEADER: &str = "Table/Header";
pub const TABLE_CONTENT: &str = "Table/Content";
pub const TITLE_BLOCK: &str = "TitleBlock/Context";

/// Cells of the vector tables and title blocks drawn on a page.
///
/// Rectangles of cell-like size are linked when their slightly expanded bounds
/// touch; a connected group counts as a table when it has at least
/// `min_table_cells` members, or any members at all when its first cell starts in
/// the bottom band of the page where split title blocks live.
pub fn find_table_cells(
    rects: &[VectorRect],
    page_height: f32,
    config: &FilterConfig,
) -> Vec<BBox> {
    let cells: Vec<BBox> = rects
        .iter()
        .map(|r| r.bbox.normalized())
        .filter(|b| {
            b.width() > config.min_cell_width
                && b.width() < config.max_cell_width
                && b.height() > config.min_cell_height
                && b.height() < config.max_cell_height
        })
        .collect();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); cells.len()];
    for i in 0..cells.len() {
        let expanded = cells[i].expand(config.touch_tolerance);
        for j in (i + 1)..cells.len() {
            if expanded.touches(&cells[j]) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    let bottom_band = bottom_band_start(page_height, config);
    let mut visited = vec![false; cells.len()];
    let mut table_cells = Vec::new();

    for seed in 0..cells.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut component = Vec::new();
        let mut stack = vec![seed];
        while let Some(current) = stack.pop() {
            component.push(cells[current]);
            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }

        let min_cells = if cells[seed].y0 > bottom_band {
            1
        } else {
            config.min_table_cells
        };
        if component.len() >= min_cells {
            log::trace!(
                "table of {} cells seeded at {:?}",
                component.len(),
                cells[seed]
            );
            table_cells.extend(component);
        }
    }

    table_cells
}

/// Fallback title-block area around the metadata found in the bottom band.
pub fn title_block_zone(
    features: &[Feature],
    page_height: f32,
    config: &FilterConfig,
) -> Option<BBox> {
    let bottom_band = bottom_band_start(page_height, config);
    let bounds = features
        .iter()
        .filter(|f| f.feature_type == FeatureType::Metadata && f.location.y0 > bottom_band)
        .map(|f| f.location)
        .reduce(|a, b| a.union(&b))?;

    Some(BBox::new(
        bounds.x0 - config.title_block_near_pad,
        bounds.y0 - config.title_block_near_pad,
        bounds.x1 + config.title_block_far_pad,
        bounds.y1 + config.title_block_far_pad,
    ))
}

/// Areas below table headers, reaching to the page's right and bottom edges.
pub fn header_zones(
    features: &[Feature],
    page_width: f32,
    page_height: f32,
    config: &FilterConfig,
) -> Vec<BBox> {
    features
        .iter()
        .filter(|f| f.sub_type.as_deref() == Some(TABLE_HEADER))
        .map(|f| {
            BBox::new(
                f.location.x0 - config.header_left_pad,
                f.location.y0 - config.header_top_pad,
                page_width,
                page_height,
            )
        })
        .collect()
}

/// Un-number features whose center lies in a table, the title block, or below a
/// table header.
pub fn suppress_tables(
    mut features: Vec<Feature>,
    page: &PageContent,
    config: &FilterConfig,
) -> Vec<Feature> {
    let cells = find_table_cells(&page.rects, page.height, config);
    let title_block = title_block_zone(&features, page.height, config);
    let headers = header_zones(&features, page.width, page.height, config);

    for feature in features.iter_mut().filter(|f| f.is_numbered()) {
        let center = feature.location.center();
        let tag = if cells.iter().any(|c| c.contains(center)) {
            TABLE_CONTENT
        } else if title_block.is_some_and(|z| z.contains(center)) {
            TITLE_BLOCK
        } else if headers.iter().any(|z| z.contains(center)) {
            TABLE_CONTENT
        } else {
            continue;
        };
        log::debug!(
            "page {}: suppressing #{:?} '{}' as {}",
            feature.page_num,
            feature.id,
            feature.value,
            tag
        );
        feature.suppress(tag);
    }

    features
}

fn bottom_band_start(page_height: f32, config: &FilterConfig) -> f32 {
    page_height * (1.0 - config.bottom_fraction)
}
