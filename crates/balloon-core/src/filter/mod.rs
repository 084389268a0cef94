pub mod tables;
pub mod zones;

use crate::config::FilterConfig;
use crate::extraction::PageContent;
use crate::model::Feature;

pub use tables::suppress_tables;
pub use zones::suppress_zone_labels;

/// Run both noise passes over a page's features.
///
/// Suppressed features keep their place in the list; only their number and tag
/// change. Running this twice gives the same result as running it once.
pub fn filter_noise(
    features: Vec<Feature>,
    page: &PageContent,
    config: &FilterConfig,
) -> Vec<Feature> {
    let features = suppress_tables(features, page, config);
    suppress_zone_labels(features, page.width, page.height, config)
}
