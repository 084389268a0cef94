use crate::config::FilterConfig;
use crate::model::Feature;

pub const ZONE_INDEX: &str = "Zone Index";

/// Un-number short labels sitting wholly inside the page border band.
///
/// Drawing sheets carry zone references ("A", "3", "B4") along their edges; they
/// parse as dimensions but are not inspectable.
pub fn suppress_zone_labels(
    mut features: Vec<Feature>,
    page_width: f32,
    page_height: f32,
    config: &FilterConfig,
) -> Vec<Feature> {
    let margin = config.margin;
    for feature in features.iter_mut().filter(|f| f.is_numbered()) {
        let b = feature.location;
        let in_border = b.x1 < margin
            || b.x0 > page_width - margin
            || b.y1 < margin
            || b.y0 > page_height - margin;
        if in_border && feature.value.chars().count() <= config.zone_label_max_chars {
            log::debug!(
                "page {}: '{}' at {:?} is a zone index",
                feature.page_num,
                feature.value,
                b
            );
            feature.suppress(ZONE_INDEX);
        }
    }
    features
}
