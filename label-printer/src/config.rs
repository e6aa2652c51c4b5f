//! Generator configuration
//!
//! Defaults reproduce the fixed values both printer families expect;
//! `from_env` lets a deployment override them without code changes.
//! Every value ends up inside the command stream, so generators check the
//! config before writing anything.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LabelError, LabelResult};

/// Parse an override, keeping `default` when the variable is unset
fn env_override<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    field: &'static str,
    default: T,
) -> LabelResult<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| LabelError::InvalidConfig {
            field,
            reason: format!("{}={:?} is not a valid value", key, raw),
        }),
    }
}

/// CPCL page setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpclConfig {
    /// Dots subtracted from the page height so the printer does not
    /// spill onto a second label
    pub footer_reserve_dots: i64,
}

impl Default for CpclConfig {
    fn default() -> Self {
        Self {
            footer_reserve_dots: 12,
        }
    }
}

impl CpclConfig {
    /// Read `LABEL_CPCL_FOOTER_DOTS`
    pub fn from_env() -> LabelResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LabelResult<Self> {
        let defaults = Self::default();
        let config = Self {
            footer_reserve_dots: env_override(
                &lookup,
                "LABEL_CPCL_FOOTER_DOTS",
                "footer_reserve_dots",
                defaults.footer_reserve_dots,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LabelResult<()> {
        if self.footer_reserve_dots < 0 {
            return Err(LabelError::InvalidConfig {
                field: "footer_reserve_dots",
                reason: format!("must be >= 0, got {}", self.footer_reserve_dots),
            });
        }
        Ok(())
    }
}

/// What the TSPL generator does with a vertical barcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalBarcodePolicy {
    /// Fail generation with `UnsupportedOrientation`
    #[default]
    Reject,
    /// Print it horizontally and log a warning
    Normalize,
}

impl FromStr for VerticalBarcodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "normalize" => Ok(Self::Normalize),
            other => Err(format!("unknown vertical barcode policy: {}", other)),
        }
    }
}

/// TSPL page setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TsplConfig {
    /// Font resource for TEXT; the default is the simplified-Chinese
    /// bitmap font so CJK product names print
    pub font: String,
    /// Gap between labels (mm)
    pub gap_mm: f64,
    /// Gap offset (mm)
    pub gap_offset_mm: f64,
    pub vertical_barcode: VerticalBarcodePolicy,
}

impl Default for TsplConfig {
    fn default() -> Self {
        Self {
            font: "TSS24.BF2".to_string(),
            gap_mm: 2.0,
            gap_offset_mm: 0.0,
            vertical_barcode: VerticalBarcodePolicy::Reject,
        }
    }
}

impl TsplConfig {
    /// Read the `LABEL_TSPL_*` overrides
    pub fn from_env() -> LabelResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LabelResult<Self> {
        let defaults = Self::default();
        let config = Self {
            font: lookup("LABEL_TSPL_FONT").unwrap_or(defaults.font),
            gap_mm: env_override(&lookup, "LABEL_TSPL_GAP_MM", "gap_mm", defaults.gap_mm)?,
            gap_offset_mm: env_override(
                &lookup,
                "LABEL_TSPL_GAP_OFFSET_MM",
                "gap_offset_mm",
                defaults.gap_offset_mm,
            )?,
            vertical_barcode: env_override(
                &lookup,
                "LABEL_TSPL_VERTICAL_BARCODE",
                "vertical_barcode",
                defaults.vertical_barcode,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the vertical barcode policy
    pub fn with_vertical_barcode(mut self, policy: VerticalBarcodePolicy) -> Self {
        self.vertical_barcode = policy;
        self
    }

    pub fn validate(&self) -> LabelResult<()> {
        if self.font.is_empty() {
            return Err(LabelError::InvalidConfig {
                field: "font",
                reason: "is empty".to_string(),
            });
        }
        if self.font.contains(['\r', '\n', '"']) {
            return Err(LabelError::InvalidConfig {
                field: "font",
                reason: format!("{:?} contains a line break or quote", self.font),
            });
        }
        for (field, mm) in [("gap_mm", self.gap_mm), ("gap_offset_mm", self.gap_offset_mm)] {
            if !mm.is_finite() || mm < 0.0 {
                return Err(LabelError::InvalidConfig {
                    field,
                    reason: format!("must be a finite value >= 0 mm, got {}", mm),
                });
            }
        }
        Ok(())
    }
}
