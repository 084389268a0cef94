pub mod engine;
pub mod frames;

pub use engine::{classify_token, classify_tokens, FeatureCounter, RULES};
pub use frames::detect_frames;
