//! Label Layout Model
//!
//! The unit-agnostic label description produced by the layout editor.
//! Positions and sizes are in millimetres unless a field says otherwise.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Element type tag for text elements
pub const ELEMENT_TEXT: &str = "text";
/// Element type tag for line elements
pub const ELEMENT_LINE: &str = "line";
/// Element type tag for barcode elements
pub const ELEMENT_BARCODE: &str = "barcode";

/// Label document: paper size plus ordered elements
///
/// Print order is list order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelDocument {
    pub paper_width: f64,
    pub paper_height: f64,
    #[serde(default)]
    pub elements: Vec<LabelElement>,
}

impl LabelDocument {
    pub fn new(paper_width: f64, paper_height: f64) -> Self {
        Self {
            paper_width,
            paper_height,
            elements: Vec::new(),
        }
    }

    /// Append an element (builder style)
    pub fn with_element(mut self, element: LabelElement) -> Self {
        self.elements.push(element);
        self
    }
}

/// One visual element as stored by the editor
///
/// `properties` is kept loosely typed; its shape depends on `element_type`:
///
/// | type      | properties                                                        |
/// |-----------|-------------------------------------------------------------------|
/// | `text`    | `content`, `font`, `size`                                         |
/// | `line`    | `x1`, `y1`, `x2`, `y2` (mm), `thickness` (dots)                   |
/// | `barcode` | `content`, `type`, `orientation`, `narrowBarWidth` (dots),        |
/// |           | `wideToNarrowRatio`, `barcodeHeight` (mm), `showContent`,         |
/// |           | `barcodeTextFont`, `barcodeTextSize`, `barcodeTextOffset` (mm)    |
///
/// Note that `size` and `wideToNarrowRatio` mean different things to each
/// printer language; see the generator docs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelElement {
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl LabelElement {
    pub fn new(element_type: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            element_type: element_type.into(),
            x: Some(x),
            y: Some(y),
            properties: Map::new(),
        }
    }

    /// Text element with default font and size
    pub fn text(x: f64, y: f64, content: impl Into<String>) -> Self {
        Self::new(ELEMENT_TEXT, x, y).with("content", content.into())
    }

    /// Line element between two points (mm)
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(ELEMENT_LINE, x1, y1)
            .with("x1", x1)
            .with("y1", y1)
            .with("x2", x2)
            .with("y2", y2)
    }

    /// Barcode element with a bar height in mm
    pub fn barcode(x: f64, y: f64, content: impl Into<String>, barcode_height: f64) -> Self {
        Self::new(ELEMENT_BARCODE, x, y)
            .with("content", content.into())
            .with("barcodeHeight", barcode_height)
    }

    /// Set a property (builder style)
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Remove a property (builder style)
    pub fn without(mut self, key: &str) -> Self {
        self.properties.remove(key);
        self
    }
}
