pub mod classify;
pub mod config;
pub mod error;
pub mod extraction;
pub mod filter;
pub mod model;
pub mod parsing;
pub mod patterns;
pub mod placement;
pub mod report;

use classify::FeatureCounter;
use config::PipelineConfig;
use error::BalloonError;
use extraction::{PageContent, PageSource};
use model::{Feature, PlacedBalloon};
use report::InspectionReport;
use serde::Serialize;

pub use placement::place_balloons;

/// Features and balloons of a single drawing page.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub page_num: usize,
    /// All features in discovery order, suppressed ones included.
    pub features: Vec<Feature>,
    pub balloons: Vec<PlacedBalloon>,
}

/// Result of running the pipeline over every page of a document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    /// Name of the backend that supplied the pages.
    pub source: String,
    pub pages: Vec<PageResult>,
}

impl DocumentResult {
    /// Features of all pages, in page order.
    pub fn features(&self) -> Vec<Feature> {
        self.pages
            .iter()
            .flat_map(|p| p.features.iter().cloned())
            .collect()
    }

    pub fn balloons(&self) -> Vec<PlacedBalloon> {
        self.pages
            .iter()
            .flat_map(|p| p.balloons.iter().cloned())
            .collect()
    }

    /// Inspection report over the whole document.
    pub fn report(&self) -> InspectionReport {
        report::build_report(&self.features())
    }
}

/// Extract and classify the annotations of one page.
///
/// Text lines are assembled into tokens and classified; rectangular frames in the
/// raster (when one is supplied) continue the same numbering. Table, title block
/// and border-label noise is then un-numbered in place. Numbering restarts at 1
/// on every page.
///
/// The config is validated first, so hand-built configs are held to the same
/// rules as loaded ones.
pub fn extract_features(
    page: &PageContent,
    config: &PipelineConfig,
) -> Result<Vec<Feature>, BalloonError> {
    config::validate_config(config)?;
    page.validate()?;

    let tokens = parsing::assemble_tokens(&page.lines, &config.assembly);
    let mut counter = FeatureCounter::new();
    let mut features = classify::classify_tokens(&tokens, page.page_num, &mut counter);

    match &page.raster {
        Some(raster) if config.frames.enabled => {
            features.extend(classify::detect_frames(
                raster,
                page.width,
                page.height,
                page.page_num,
                &config.frames,
                &mut counter,
            ));
        }
        Some(_) => log::debug!("page {}: frame detection disabled", page.page_num),
        None => log::debug!("page {}: no raster, skipping frames", page.page_num),
    }

    let features = filter::filter_noise(features, page, &config.filter);
    let numbered = features.iter().filter(|f| f.is_numbered()).count();
    log::info!(
        "page {}: {} tokens, {} features, {} numbered",
        page.page_num,
        tokens.len(),
        features.len(),
        numbered
    );
    Ok(features)
}

/// Extract features of one page and place their balloons.
pub fn process_page(
    page: &PageContent,
    config: &PipelineConfig,
) -> Result<PageResult, BalloonError> {
    let features = extract_features(page, config)?;
    let balloons = place_balloons(&features, &config.placement);
    let fallbacks = balloons.iter().filter(|b| b.fallback).count();
    if fallbacks > 0 {
        log::warn!(
            "page {}: {} balloon(s) placed with overlap",
            page.page_num,
            fallbacks
        );
    }
    Ok(PageResult {
        page_num: page.page_num,
        features,
        balloons,
    })
}

/// Main API entry point: run the pipeline over every page a source supplies.
///
/// Pages are processed independently; the first invalid page aborts the run.
pub fn process_document(
    source: &dyn PageSource,
    config: &PipelineConfig,
) -> Result<DocumentResult, BalloonError> {
    config::validate_config(config)?;
    let pages = source.load_pages()?;
    log::info!("{}: {} page(s)", source.backend_name(), pages.len());

    let pages = pages
        .iter()
        .map(|page| process_page(page, config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DocumentResult {
        source: source.backend_name().to_string(),
        pages,
    })
}
