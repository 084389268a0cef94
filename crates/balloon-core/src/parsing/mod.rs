pub mod lines;
pub mod tolerance;

pub use lines::{assemble_tokens, Token};
pub use tolerance::parse_tolerance;
