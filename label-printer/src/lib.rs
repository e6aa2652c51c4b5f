//! # label-printer
//!
//! Turns a label layout (paper size in mm plus an ordered list of text,
//! line and barcode elements) into printer command text.
//!
//! ## Scope
//!
//! This crate handles WHAT the printer is told:
//! - CPCL pages (`! 0 203 203 ...`, space-separated commands)
//! - TSPL labels (`SIZE`/`GAP`/`CLS`, comma-separated commands)
//! - mm to dot conversion at 203 DPI
//! - device byte encoding (UTF-8 or GBK)
//!
//! Moving bytes to a printer stays in application code.
//!
//! Generation is pure and synchronous. The whole document is validated
//! first; on any error no command text is returned.
//!
//! ## Example
//!
//! ```ignore
//! use label_printer::{generate_cpcl, generate_tspl, LabelDocument, LabelElement};
//!
//! let doc = LabelDocument::new(50.0, 30.0)
//!     .with_element(LabelElement::text(5.0, 5.0, "HELLO"))
//!     .with_element(LabelElement::barcode(5.0, 12.0, "A-001", 10.0).with("showContent", true));
//!
//! let cpcl = generate_cpcl(&doc)?;
//! let tspl = generate_tspl(&doc)?;
//! ```

mod config;
mod cpcl;
mod encoding;
mod error;
mod layout;
mod tspl;
mod units;

use tracing::instrument;

// Re-exports
pub use config::{CpclConfig, TsplConfig, VerticalBarcodePolicy};
pub use cpcl::{CpclBuilder, CpclGenerator};
pub use encoding::{DeviceEncoding, Language, encode_commands};
pub use error::{LabelError, LabelResult};
pub use layout::{
    BarcodeElement, BarcodeOrientation, BarcodeText, BarcodeType, Element, Layout, LineElement,
    TextElement, validate, validate_parts,
};
pub use shared::models::{LabelDocument, LabelElement};
pub use tspl::{TsplBuilder, TsplGenerator};
pub use units::{DOTS_PER_MM, DPI, mm_to_dots};

/// Per-language entry points taking an element list and paper size
pub mod generate {
    pub use crate::cpcl::generate as cpcl;
    pub use crate::tspl::generate as tspl;
}

/// Generate CPCL commands for a document
#[instrument(skip(doc), fields(elements = doc.elements.len()))]
pub fn generate_cpcl(doc: &LabelDocument) -> LabelResult<String> {
    cpcl::generate_cpcl(doc)
}

/// Generate TSPL commands for a document
#[instrument(skip(doc), fields(elements = doc.elements.len()))]
pub fn generate_tspl(doc: &LabelDocument) -> LabelResult<String> {
    tspl::generate_tspl(doc)
}

/// Generate commands for `language` and encode them for the device
pub fn generate_bytes(doc: &LabelDocument, language: Language) -> LabelResult<Vec<u8>> {
    let commands = match language {
        Language::Cpcl => generate_cpcl(doc)?,
        Language::Tspl => generate_tspl(doc)?,
    };
    encode_commands(&commands, DeviceEncoding::default_for(language))
}

/// Parse the editor's JSON layout
pub fn parse_document(json: &str) -> LabelResult<LabelDocument> {
    Ok(serde_json::from_str(json)?)
}
