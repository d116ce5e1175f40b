//! Request body extractors with improved rejection handling.
//!
//! Drop-in replacements for the stock axum extractors that turn
//! rejections into the crate's structured error responses instead of
//! plain-text bodies.

mod enhanced_json;
mod validated_json;

pub use enhanced_json::Json;
pub use validated_json::ValidateJson;
