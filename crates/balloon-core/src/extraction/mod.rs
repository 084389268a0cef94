use crate::error::BalloonError;
use crate::model::BBox;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// One line of machine-readable text with its box, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    pub bbox: BBox,
}

impl TextLine {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        TextLine {
            text: text.into(),
            bbox,
        }
    }
}

/// Rectangle taken from the page's vector drawing commands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VectorRect {
    pub bbox: BBox,
}

/// Content of a single drawing page, as supplied by the PDF collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// Zero-based page index.
    pub page_num: usize,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<TextLine>,
    #[serde(default)]
    pub rects: Vec<VectorRect>,
    /// Rendered page. Frame detection is skipped without one.
    #[serde(skip)]
    pub raster: Option<DynamicImage>,
}

impl PageContent {
    pub fn new(page_num: usize, width: f32, height: f32) -> Self {
        PageContent {
            page_num,
            width,
            height,
            lines: Vec::new(),
            rects: Vec::new(),
            raster: None,
        }
    }

    /// Check the page geometry the pipeline relies on.
    pub fn validate(&self) -> Result<(), BalloonError> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if !ok(self.width) || !ok(self.height) {
            return Err(BalloonError::InvalidPage {
                page: self.page_num,
                reason: format!("page size {}x{} is not usable", self.width, self.height),
            });
        }
        if let Some(img) = &self.raster {
            if img.width() == 0 || img.height() == 0 {
                return Err(BalloonError::InvalidPage {
                    page: self.page_num,
                    reason: "raster image is empty".into(),
                });
            }
        }
        Ok(())
    }
}

/// Trait for drawing page backends (PDF loaders, fixtures, pre-extracted JSON).
pub trait PageSource: Send + Sync {
    /// Load every page of the document, in page order.
    fn load_pages(&self) -> Result<Vec<PageContent>, BalloonError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Pages loaded from a JSON array of `PageContent` (text and vectors only).
pub struct JsonPageSource {
    json: String,
}

impl JsonPageSource {
    pub fn new(json: impl Into<String>) -> Self {
        JsonPageSource { json: json.into() }
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self, BalloonError> {
        Ok(JsonPageSource {
            json: std::fs::read_to_string(path)?,
        })
    }
}

impl PageSource for JsonPageSource {
    fn load_pages(&self) -> Result<Vec<PageContent>, BalloonError> {
        let pages: Vec<PageContent> = serde_json::from_str(&self.json)?;
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "json"
    }
}
