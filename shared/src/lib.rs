//! Shared types for the label toolchain
//!
//! The layout model consumed by the printer-language generators.

pub mod models;

// Re-exports
pub use models::{LabelDocument, LabelElement};
pub use serde::{Deserialize, Serialize};
