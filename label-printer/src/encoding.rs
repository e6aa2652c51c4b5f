//! Device byte encoding for generated command streams
//!
//! Generators return UTF-8 text. Label printers sold with the CJK font
//! pack (`TSS24.BF2`) read text as GBK, so TSPL output is re-encoded
//! before it goes on the wire. Commands themselves are ASCII and map to
//! the same bytes in either encoding.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{LabelError, LabelResult};

/// Target printer command language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cpcl,
    Tspl,
}

/// Byte encoding the printer expects for text arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceEncoding {
    Utf8,
    Gbk,
}

impl DeviceEncoding {
    /// Encoding matching each generator's default fonts
    pub fn default_for(language: Language) -> Self {
        match language {
            Language::Cpcl => DeviceEncoding::Utf8,
            Language::Tspl => DeviceEncoding::Gbk,
        }
    }

    fn name(self) -> &'static str {
        match self {
            DeviceEncoding::Utf8 => "UTF-8",
            DeviceEncoding::Gbk => "GBK",
        }
    }
}

/// Encode a generated command stream for the printer
///
/// GBK encoding is strict: a character GBK cannot represent fails instead
/// of being replaced, since a substituted `?` would silently change
/// barcode data.
#[instrument(skip(commands), fields(len = commands.len()))]
pub fn encode_commands(commands: &str, encoding: DeviceEncoding) -> LabelResult<Vec<u8>> {
    match encoding {
        DeviceEncoding::Utf8 => Ok(commands.as_bytes().to_vec()),
        DeviceEncoding::Gbk => encode_gbk(commands),
    }
}

fn encode_gbk(s: &str) -> LabelResult<Vec<u8>> {
    let (bytes, _, had_errors) = encoding_rs::GBK.encode(s);
    if !had_errors {
        return Ok(bytes.into_owned());
    }

    // Find the offending character for the error report
    let character = s
        .chars()
        .find(|c| {
            let mut buf = [0u8; 4];
            let (_, _, bad) = encoding_rs::GBK.encode(c.encode_utf8(&mut buf));
            bad
        })
        .unwrap_or(char::REPLACEMENT_CHARACTER);

    Err(LabelError::Encoding {
        character,
        encoding: DeviceEncoding::Gbk.name(),
    })
}
