//! Validated label layout
//!
//! Turns the editor's loosely typed [`LabelDocument`] into a closed set of
//! typed elements. Both generators consume [`Layout`] only, so a document
//! is fully checked before a single command is written.

use serde_json::{Map, Value};
use shared::models::{ELEMENT_BARCODE, ELEMENT_LINE, ELEMENT_TEXT, LabelDocument, LabelElement};

use crate::error::{LabelError, LabelResult};

/// A document whose every element passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub paper_width: f64,
    pub paper_height: f64,
    pub elements: Vec<Element>,
}

/// Label element, one variant per drawable primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextElement),
    Line(LineElement),
    Barcode(BarcodeElement),
}

/// Text element
///
/// `size` is a font-size index in CPCL but a uniform magnification factor
/// in TSPL. Both readings are kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub font: u32,
    pub size: u32,
}

/// Straight line between two points (mm); thickness is in dots
#[derive(Debug, Clone, PartialEq)]
pub struct LineElement {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub thickness: u32,
}

/// Logical barcode symbology
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarcodeType {
    Code39,
    Code128,
    /// Unrecognised name; printed as CODE 128
    Other(String),
}

impl BarcodeType {
    fn parse(name: &str) -> Self {
        match name {
            "CODE 39" => BarcodeType::Code39,
            "CODE 128" => BarcodeType::Code128,
            other => BarcodeType::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarcodeOrientation {
    #[default]
    Normal,
    Vertical,
}

/// Human-readable line under a barcode
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeText {
    pub font: u32,
    pub size: u32,
    /// Gap between bars and text, in mm
    pub offset: f64,
}

/// Barcode element
///
/// `wide_to_narrow_ratio` is passed through by CPCL, while TSPL wants an
/// absolute wide-bar width and pre-multiplies it with `narrow_bar_width`.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeElement {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub barcode_type: BarcodeType,
    pub orientation: BarcodeOrientation,
    /// Dots
    pub narrow_bar_width: u32,
    pub wide_to_narrow_ratio: u32,
    /// Millimetres
    pub height: f64,
    /// `Some` when the content is printed under the bars
    pub text: Option<BarcodeText>,
}

const DEFAULT_TEXT_FONT: u32 = 0;
const DEFAULT_TEXT_SIZE: u32 = 1;
const DEFAULT_THICKNESS: u32 = 1;
const DEFAULT_NARROW_BAR_WIDTH: u32 = 2;
const DEFAULT_WIDE_TO_NARROW_RATIO: u32 = 3;
const DEFAULT_BARCODE_TEXT_FONT: u32 = 7;
const DEFAULT_BARCODE_TEXT_SIZE: u32 = 1;
const DEFAULT_BARCODE_TEXT_OFFSET_MM: f64 = 1.0;

/// Validate a document and apply per-field defaults
pub fn validate(doc: &LabelDocument) -> LabelResult<Layout> {
    validate_parts(&doc.elements, doc.paper_width, doc.paper_height)
}

/// Validate elements and paper size given separately
pub fn validate_parts(
    elements: &[LabelElement],
    paper_width: f64,
    paper_height: f64,
) -> LabelResult<Layout> {
    let paper_width = paper_dimension("paperWidth", paper_width)?;
    let paper_height = paper_dimension("paperHeight", paper_height)?;

    let elements = elements
        .iter()
        .enumerate()
        .map(|(index, element)| validate_element(index, element))
        .collect::<LabelResult<Vec<_>>>()?;

    Ok(Layout {
        paper_width,
        paper_height,
        elements,
    })
}

fn paper_dimension(field: &'static str, mm: f64) -> LabelResult<f64> {
    if !mm.is_finite() {
        return Err(LabelError::DegenerateGeometry {
            field,
            reason: format!("is not a finite number ({})", mm),
        });
    }
    if mm <= 0.0 {
        return Err(LabelError::DegenerateGeometry {
            field,
            reason: format!("must be greater than 0 mm, got {}", mm),
        });
    }
    Ok(mm)
}

fn validate_element(index: usize, element: &LabelElement) -> LabelResult<Element> {
    let props = Props {
        index,
        map: &element.properties,
    };

    match element.element_type.as_str() {
        ELEMENT_TEXT => Ok(Element::Text(TextElement {
            x: position(index, "x", element.x)?,
            y: position(index, "y", element.y)?,
            content: props.content()?,
            font: props.optional_u32("font", DEFAULT_TEXT_FONT, 0)?,
            size: props.optional_u32("size", DEFAULT_TEXT_SIZE, 0)?,
        })),
        ELEMENT_LINE => Ok(Element::Line(LineElement {
            x1: props.required_mm("x1")?,
            y1: props.required_mm("y1")?,
            x2: props.required_mm("x2")?,
            y2: props.required_mm("y2")?,
            thickness: props.optional_u32("thickness", DEFAULT_THICKNESS, 1)?,
        })),
        ELEMENT_BARCODE => {
            let x = position(index, "x", element.x)?;
            let y = position(index, "y", element.y)?;
            let content = props.content()?;
            if content.is_empty() {
                return Err(props.invalid("content", "barcode content is empty"));
            }

            let barcode_type = props
                .optional_str("type")?
                .map(BarcodeType::parse)
                .unwrap_or(BarcodeType::Code128);
            let orientation = match props.optional_str("orientation")? {
                None => BarcodeOrientation::Normal,
                Some(name) => parse_orientation(name).ok_or_else(|| {
                    props.invalid("orientation", format!("unknown orientation `{}`", name))
                })?,
            };

            let text = if props.optional_bool("showContent")? {
                Some(BarcodeText {
                    font: props.optional_u32("barcodeTextFont", DEFAULT_BARCODE_TEXT_FONT, 0)?,
                    size: props.optional_u32("barcodeTextSize", DEFAULT_BARCODE_TEXT_SIZE, 0)?,
                    offset: props.optional_mm("barcodeTextOffset", DEFAULT_BARCODE_TEXT_OFFSET_MM)?,
                })
            } else {
                None
            };

            Ok(Element::Barcode(BarcodeElement {
                x,
                y,
                content,
                barcode_type,
                orientation,
                narrow_bar_width: props.optional_u32("narrowBarWidth", DEFAULT_NARROW_BAR_WIDTH, 1)?,
                wide_to_narrow_ratio: props.optional_u32(
                    "wideToNarrowRatio",
                    DEFAULT_WIDE_TO_NARROW_RATIO,
                    1,
                )?,
                height: props.required_mm("barcodeHeight")?,
                text,
            }))
        }
        other => Err(LabelError::UnsupportedElementType {
            index,
            element_type: other.to_string(),
        }),
    }
}

fn parse_orientation(name: &str) -> Option<BarcodeOrientation> {
    // Older layouts store the CPCL keyword itself
    match name.to_ascii_lowercase().as_str() {
        "normal" | "barcode" => Some(BarcodeOrientation::Normal),
        "vertical" | "vbarcode" => Some(BarcodeOrientation::Vertical),
        _ => None,
    }
}

fn position(index: usize, field: &'static str, value: Option<f64>) -> LabelResult<f64> {
    let mm = value.ok_or(LabelError::MissingRequiredField { index, field })?;
    check_mm(index, field, mm)
}

fn check_mm(index: usize, field: &'static str, mm: f64) -> LabelResult<f64> {
    if !mm.is_finite() {
        return Err(LabelError::InvalidField {
            index,
            field,
            reason: "not a finite number".to_string(),
        });
    }
    if mm < 0.0 {
        return Err(LabelError::InvalidField {
            index,
            field,
            reason: format!("negative value {} mm", mm),
        });
    }
    Ok(mm)
}

/// Typed accessor over an element's property map
struct Props<'a> {
    index: usize,
    map: &'a Map<String, Value>,
}

impl Props<'_> {
    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> LabelError {
        LabelError::InvalidField {
            index: self.index,
            field,
            reason: reason.into(),
        }
    }

    fn missing(&self, field: &'static str) -> LabelError {
        LabelError::MissingRequiredField {
            index: self.index,
            field,
        }
    }

    /// `null` counts as absent, as the editor writes it for cleared inputs
    fn get(&self, field: &str) -> Option<&Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    /// Printable content; numbers are accepted and stringified
    fn content(&self) -> LabelResult<String> {
        let content = match self.get("content") {
            None => return Err(self.missing("content")),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(self.invalid("content", format!("expected a string, got {}", other)));
            }
        };
        if content.contains(['\r', '\n']) {
            return Err(self.invalid("content", "line breaks would split the command line"));
        }
        Ok(content)
    }

    fn optional_str(&self, field: &'static str) -> LabelResult<Option<&str>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.invalid(field, format!("expected a string, got {}", other))),
        }
    }

    fn number(&self, field: &'static str) -> LabelResult<Option<f64>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(field, "not representable as a number")),
            Some(other) => Err(self.invalid(field, format!("expected a number, got {}", other))),
        }
    }

    fn required_mm(&self, field: &'static str) -> LabelResult<f64> {
        let mm = self.number(field)?.ok_or_else(|| self.missing(field))?;
        check_mm(self.index, field, mm)
    }

    fn optional_mm(&self, field: &'static str, default: f64) -> LabelResult<f64> {
        match self.number(field)? {
            Some(mm) => check_mm(self.index, field, mm),
            None => Ok(default),
        }
    }

    fn optional_u32(&self, field: &'static str, default: u32, min: u32) -> LabelResult<u32> {
        let Some(value) = self.number(field)? else {
            return Ok(default);
        };
        if value.fract() != 0.0 || value < min as f64 || value > u32::MAX as f64 {
            return Err(self.invalid(
                field,
                format!("expected an integer >= {}, got {}", min, value),
            ));
        }
        Ok(value as u32)
    }

    fn optional_bool(&self, field: &'static str) -> LabelResult<bool> {
        match self.get(field) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.invalid(field, format!("expected a boolean, got {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(elements: Vec<LabelElement>) -> LabelDocument {
        LabelDocument {
            paper_width: 50.0,
            paper_height: 30.0,
            elements,
        }
    }

    #[test]
    fn test_text_defaults() {
        let layout = validate(&doc(vec![LabelElement::text(5.0, 5.0, "HELLO")])).unwrap();
        assert_eq!(
            layout.elements[0],
            Element::Text(TextElement {
                x: 5.0,
                y: 5.0,
                content: "HELLO".to_string(),
                font: 0,
                size: 1,
            })
        );
    }

    #[test]
    fn test_barcode_defaults() {
        let layout = validate(&doc(vec![LabelElement::barcode(1.0, 2.0, "123", 10.0)])).unwrap();
        let Element::Barcode(b) = &layout.elements[0] else {
            panic!("expected barcode");
        };
        assert_eq!(b.barcode_type, BarcodeType::Code128);
        assert_eq!(b.orientation, BarcodeOrientation::Normal);
        assert_eq!(b.narrow_bar_width, 2);
        assert_eq!(b.wide_to_narrow_ratio, 3);
        assert_eq!(b.text, None);
    }

    #[test]
    fn test_barcode_text_defaults_when_shown() {
        let el = LabelElement::barcode(1.0, 2.0, "123", 10.0).with("showContent", true);
        let layout = validate(&doc(vec![el])).unwrap();
        let Element::Barcode(b) = &layout.elements[0] else {
            panic!("expected barcode");
        };
        assert_eq!(
            b.text,
            Some(BarcodeText {
                font: 7,
                size: 1,
                offset: 1.0
            })
        );
    }

    #[test]
    fn test_unknown_barcode_type_kept() {
        let el = LabelElement::barcode(0.0, 0.0, "4006381333931", 8.0).with("type", "EAN13");
        let layout = validate(&doc(vec![el])).unwrap();
        let Element::Barcode(b) = &layout.elements[0] else {
            panic!("expected barcode");
        };
        assert_eq!(b.barcode_type, BarcodeType::Other("EAN13".to_string()));
    }

    #[test]
    fn test_orientation_aliases() {
        for (name, expected) in [
            ("normal", BarcodeOrientation::Normal),
            ("BARCODE", BarcodeOrientation::Normal),
            ("vertical", BarcodeOrientation::Vertical),
            ("VBARCODE", BarcodeOrientation::Vertical),
        ] {
            let el = LabelElement::barcode(0.0, 0.0, "1", 8.0).with("orientation", name);
            let layout = validate(&doc(vec![el])).unwrap();
            let Element::Barcode(b) = &layout.elements[0] else {
                panic!("expected barcode");
            };
            assert_eq!(b.orientation, expected, "orientation {}", name);
        }

        let el = LabelElement::barcode(0.0, 0.0, "1", 8.0).with("orientation", "diagonal");
        assert!(matches!(
            validate(&doc(vec![el])),
            Err(LabelError::InvalidField { field: "orientation", .. })
        ));
    }

    #[test]
    fn test_missing_barcode_height() {
        let el = LabelElement::barcode(0.0, 0.0, "1", 8.0).without("barcodeHeight");
        let err = validate(&doc(vec![LabelElement::text(0.0, 0.0, "ok"), el])).unwrap_err();
        assert_eq!(
            err,
            LabelError::MissingRequiredField {
                index: 1,
                field: "barcodeHeight"
            }
        );
    }

    #[test]
    fn test_missing_line_endpoint() {
        let el = LabelElement::line(0.0, 0.0, 10.0, 0.0).without("y2");
        let err = validate(&doc(vec![el])).unwrap_err();
        assert_eq!(err, LabelError::MissingRequiredField { index: 0, field: "y2" });
    }

    #[test]
    fn test_null_counts_as_missing() {
        let el = LabelElement::text(0.0, 0.0, "x").with("content", Value::Null);
        let err = validate(&doc(vec![el])).unwrap_err();
        assert_eq!(err, LabelError::MissingRequiredField { index: 0, field: "content" });
    }

    #[test]
    fn test_missing_position() {
        let mut el = LabelElement::text(0.0, 0.0, "x");
        el.y = None;
        let err = validate(&doc(vec![el])).unwrap_err();
        assert_eq!(err, LabelError::MissingRequiredField { index: 0, field: "y" });
    }

    #[test]
    fn test_unsupported_element_type() {
        let el = LabelElement::new("image", 0.0, 0.0);
        let err = validate(&doc(vec![LabelElement::text(0.0, 0.0, "a"), el])).unwrap_err();
        assert_eq!(
            err,
            LabelError::UnsupportedElementType {
                index: 1,
                element_type: "image".to_string()
            }
        );
    }

    #[test]
    fn test_negative_coordinate_rejected() {
        let err = validate(&doc(vec![LabelElement::text(-1.0, 0.0, "a")])).unwrap_err();
        assert!(matches!(err, LabelError::InvalidField { index: 0, field: "x", .. }));

        let err = validate(&doc(vec![LabelElement::line(0.0, 0.0, 10.0, 0.0).with("x2", -3.0)]))
            .unwrap_err();
        assert!(matches!(err, LabelError::InvalidField { field: "x2", .. }));
    }

    #[test]
    fn test_line_break_in_content_rejected() {
        let err = validate(&doc(vec![LabelElement::text(0.0, 0.0, "a\r\nPRINT")])).unwrap_err();
        assert!(matches!(err, LabelError::InvalidField { field: "content", .. }));
    }

    #[test]
    fn test_numeric_content_accepted() {
        let el = LabelElement::barcode(0.0, 0.0, "x", 8.0).with("content", 12345);
        let layout = validate(&doc(vec![el])).unwrap();
        let Element::Barcode(b) = &layout.elements[0] else {
            panic!("expected barcode");
        };
        assert_eq!(b.content, "12345");
    }

    #[test]
    fn test_integer_ranges() {
        let el = LabelElement::line(0.0, 0.0, 10.0, 0.0).with("thickness", 0);
        assert!(matches!(
            validate(&doc(vec![el])),
            Err(LabelError::InvalidField { field: "thickness", .. })
        ));

        let el = LabelElement::text(0.0, 0.0, "a").with("size", 1.5);
        assert!(matches!(
            validate(&doc(vec![el])),
            Err(LabelError::InvalidField { field: "size", .. })
        ));

        let el = LabelElement::text(0.0, 0.0, "a").with("font", "big");
        assert!(matches!(
            validate(&doc(vec![el])),
            Err(LabelError::InvalidField { field: "font", .. })
        ));

        let el = LabelElement::text(0.0, 0.0, "a").with("size", json!(3.0));
        assert!(validate(&doc(vec![el])).is_ok());
    }

    #[test]
    fn test_degenerate_paper() {
        let mut d = doc(vec![]);
        d.paper_height = 0.0;
        assert!(matches!(
            validate(&d),
            Err(LabelError::DegenerateGeometry { field: "paperHeight", .. })
        ));

        let mut d = doc(vec![]);
        d.paper_width = f64::NAN;
        assert!(matches!(
            validate(&d),
            Err(LabelError::DegenerateGeometry { field: "paperWidth", .. })
        ));
    }

    #[test]
    fn test_order_preserved() {
        let layout = validate(&doc(vec![
            LabelElement::line(0.0, 0.0, 1.0, 0.0),
            LabelElement::text(0.0, 0.0, "a"),
            LabelElement::barcode(0.0, 0.0, "1", 8.0),
        ]))
        .unwrap();
        assert!(matches!(layout.elements[0], Element::Line(_)));
        assert!(matches!(layout.elements[1], Element::Text(_)));
        assert!(matches!(layout.elements[2], Element::Barcode(_)));
    }
}
