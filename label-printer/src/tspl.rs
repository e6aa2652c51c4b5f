//! TSPL label generator
//!
//! Renders a [`Layout`] as TSPL: `COMMAND arg,arg,...` per CRLF-terminated
//! line. The page size is given in millimetres, everything else in dots.
//!
//! Differences from CPCL that are kept on purpose:
//! - text `size` is a magnification factor applied to both axes
//! - lines become filled `BAR` rectangles
//! - the wide bar width is absolute (`narrow * ratio`)
//! - barcode text style (font, size, offset) has no TSPL equivalent and is
//!   ignored; only the on/off flag survives
//! - vertical barcodes are handled by [`VerticalBarcodePolicy`]

use shared::models::{LabelDocument, LabelElement};
use tracing::{debug, instrument, warn};

use crate::config::{TsplConfig, VerticalBarcodePolicy};
use crate::error::{LabelError, LabelResult};
use crate::layout::{
    BarcodeElement, BarcodeOrientation, BarcodeType, Element, Layout, LineElement, TextElement,
    validate, validate_parts,
};
use crate::units::mm_to_dots;

/// Quote a TSPL string argument
///
/// An embedded `"` is written as the `\["]` escape.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\[\"]"))
}

/// String-based TSPL command builder
pub struct TsplBuilder {
    buf: String,
}

impl TsplBuilder {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(512),
        }
    }

    fn command(&mut self, line: &str) -> &mut Self {
        self.buf.push_str(line);
        self.buf.push_str("\r\n");
        self
    }

    /// Label size in millimetres
    pub fn size(&mut self, width_mm: f64, height_mm: f64) -> &mut Self {
        self.command(&format!("SIZE {} mm,{} mm", width_mm, height_mm))
    }

    pub fn gap(&mut self, gap_mm: f64, offset_mm: f64) -> &mut Self {
        self.command(&format!("GAP {} mm,{} mm", gap_mm, offset_mm))
    }

    pub fn direction(&mut self, direction: u8) -> &mut Self {
        self.command(&format!("DIRECTION {}", direction))
    }

    /// Clear the image buffer
    pub fn cls(&mut self) -> &mut Self {
        self.command("CLS")
    }

    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        x: i64,
        y: i64,
        font: &str,
        rotation: u32,
        x_mul: u32,
        y_mul: u32,
        content: &str,
    ) -> &mut Self {
        self.command(&format!(
            "TEXT {},{},{},{},{},{},{}",
            x,
            y,
            quoted(font),
            rotation,
            x_mul,
            y_mul,
            quoted(content)
        ))
    }

    /// Filled rectangle
    pub fn bar(&mut self, x: i64, y: i64, width: i64, height: i64) -> &mut Self {
        self.command(&format!("BAR {},{},{},{}", x, y, width, height))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn barcode(
        &mut self,
        x: i64,
        y: i64,
        type_code: &str,
        height_dots: i64,
        human_readable: bool,
        rotation: u32,
        narrow: u32,
        wide: u32,
        content: &str,
    ) -> &mut Self {
        self.command(&format!(
            "BARCODE {},{},{},{},{},{},{},{},{}",
            x,
            y,
            quoted(type_code),
            height_dots,
            u8::from(human_readable),
            rotation,
            narrow,
            wide,
            quoted(content)
        ))
    }

    /// `PRINT <sets>,<copies>`
    pub fn print(&mut self, sets: u32, copies: u32) -> &mut Self {
        self.command(&format!("PRINT {},{}", sets, copies))
    }

    /// Finalize and return the accumulated commands
    pub fn finalize(self) -> String {
        self.buf
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

impl Default for TsplBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// TSPL barcode type code
///
/// Anything other than CODE 39 prints as CODE 128.
pub fn barcode_type_code(barcode_type: &BarcodeType) -> &'static str {
    match barcode_type {
        BarcodeType::Code39 => "39",
        BarcodeType::Code128 | BarcodeType::Other(_) => "128",
    }
}

/// TSPL label generator
#[derive(Debug, Clone, Default)]
pub struct TsplGenerator {
    config: TsplConfig,
}

impl TsplGenerator {
    pub fn new(config: TsplConfig) -> Self {
        Self { config }
    }

    /// Validate and render a document
    pub fn generate(&self, doc: &LabelDocument) -> LabelResult<String> {
        self.render(&validate(doc)?)
    }

    /// Render an already validated layout
    #[instrument(skip(self, layout), fields(elements = layout.elements.len()))]
    pub fn render(&self, layout: &Layout) -> LabelResult<String> {
        self.config.validate()?;
        let mut b = TsplBuilder::new();
        b.size(layout.paper_width, layout.paper_height);
        b.gap(self.config.gap_mm, self.config.gap_offset_mm);
        b.direction(0);
        b.cls();

        for (index, element) in layout.elements.iter().enumerate() {
            match element {
                Element::Text(text) => self.render_text(&mut b, text),
                Element::Line(line) => render_line(&mut b, line),
                Element::Barcode(barcode) => self.render_barcode(&mut b, index, barcode)?,
            }
        }

        b.print(1, 1);

        let out = b.finalize();
        debug!(len = out.len(), "TSPL label generated");
        Ok(out)
    }

    fn render_text(&self, b: &mut TsplBuilder, text: &TextElement) {
        // Multipliers start at 1
        let mul = text.size.max(1);
        b.text(
            mm_to_dots(text.x),
            mm_to_dots(text.y),
            &self.config.font,
            0,
            mul,
            mul,
            &text.content,
        );
    }

    fn render_barcode(
        &self,
        b: &mut TsplBuilder,
        index: usize,
        barcode: &BarcodeElement,
    ) -> LabelResult<()> {
        if barcode.orientation == BarcodeOrientation::Vertical {
            match self.config.vertical_barcode {
                VerticalBarcodePolicy::Reject => {
                    return Err(LabelError::UnsupportedOrientation {
                        index,
                        field: "orientation",
                        language: "TSPL",
                    });
                }
                VerticalBarcodePolicy::Normalize => {
                    warn!(index, "vertical barcode printed in normal orientation");
                }
            }
        }

        let wide = barcode
            .narrow_bar_width
            .saturating_mul(barcode.wide_to_narrow_ratio);
        b.barcode(
            mm_to_dots(barcode.x),
            mm_to_dots(barcode.y),
            barcode_type_code(&barcode.barcode_type),
            mm_to_dots(barcode.height),
            barcode.text.is_some(),
            0,
            barcode.narrow_bar_width,
            wide,
            &barcode.content,
        );
        Ok(())
    }
}

/// Lines are drawn as bars along their longer axis
///
/// Equal extents count as horizontal. The length never drops below the
/// thickness, so a zero-length line still prints a square dot.
fn render_line(b: &mut TsplBuilder, line: &LineElement) {
    let x1 = mm_to_dots(line.x1);
    let y1 = mm_to_dots(line.y1);
    let x2 = mm_to_dots(line.x2);
    let y2 = mm_to_dots(line.y2);
    let thickness = i64::from(line.thickness);

    let width = (x2 - x1).abs();
    let height = (y2 - y1).abs();
    let (x, y) = (x1.min(x2), y1.min(y2));

    if width >= height {
        b.bar(x, y, width.max(thickness), thickness);
    } else {
        b.bar(x, y, thickness, height.max(thickness));
    }
}

/// Generate a TSPL command stream with default settings
pub fn generate_tspl(doc: &LabelDocument) -> LabelResult<String> {
    TsplGenerator::default().generate(doc)
}

/// Generate TSPL from an element list and paper size (mm)
pub fn generate(
    elements: &[LabelElement],
    paper_width: f64,
    paper_height: f64,
) -> LabelResult<String> {
    TsplGenerator::default().render(&validate_parts(elements, paper_width, paper_height)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(out: &str) -> Vec<&str> {
        out.split_terminator("\r\n").collect()
    }

    fn body(out: &str) -> Vec<&str> {
        let l = lines(out);
        l[4..l.len() - 1].to_vec()
    }

    #[test]
    fn test_hello_label() {
        let doc = LabelDocument::new(50.0, 30.0).with_element(LabelElement::text(5.0, 5.0, "HELLO"));
        let out = generate_tspl(&doc).unwrap();

        assert_eq!(
            out,
            "SIZE 50 mm,30 mm\r\n\
             GAP 2 mm,0 mm\r\n\
             DIRECTION 0\r\n\
             CLS\r\n\
             TEXT 40,40,\"TSS24.BF2\",0,1,1,\"HELLO\"\r\n\
             PRINT 1,1\r\n"
        );
    }

    #[test]
    fn test_fractional_paper_size() {
        let out = generate(&[], 40.5, 25.0).unwrap();
        assert_eq!(lines(&out)[0], "SIZE 40.5 mm,25 mm");
    }

    #[test]
    fn test_text_size_is_multiplier() {
        let big = LabelElement::text(1.0, 1.0, "BIG").with("size", 3).with("font", 5);
        let zero = LabelElement::text(1.0, 1.0, "Z").with("size", 0);
        let out = generate(&[big, zero], 50.0, 30.0).unwrap();

        assert_eq!(
            body(&out),
            vec![
                "TEXT 8,8,\"TSS24.BF2\",0,3,3,\"BIG\"",
                "TEXT 8,8,\"TSS24.BF2\",0,1,1,\"Z\"",
            ]
        );
    }

    #[test]
    fn test_quote_escaped() {
        let el = LabelElement::text(0.0, 0.0, "12\" pizza");
        let out = generate(&[el], 50.0, 30.0).unwrap();
        assert_eq!(body(&out)[0], "TEXT 0,0,\"TSS24.BF2\",0,1,1,\"12\\[\"] pizza\"");
    }

    #[test]
    fn test_horizontal_line() {
        let el = LabelElement::line(45.0, 3.0, 5.0, 3.0).with("thickness", 2);
        let out = generate(&[el], 50.0, 30.0).unwrap();
        assert_eq!(body(&out)[0], "BAR 40,24,320,2");
    }

    #[test]
    fn test_vertical_line() {
        let el = LabelElement::line(10.0, 25.0, 10.5, 5.0).with("thickness", 4);
        let out = generate(&[el], 50.0, 30.0).unwrap();
        assert_eq!(body(&out)[0], "BAR 80,40,4,160");
    }

    #[test]
    fn test_diagonal_tie_is_horizontal() {
        let el = LabelElement::line(0.0, 0.0, 2.0, 2.0);
        let out = generate(&[el], 50.0, 30.0).unwrap();
        assert_eq!(body(&out)[0], "BAR 0,0,16,1");
    }

    #[test]
    fn test_zero_length_line_is_square() {
        let el = LabelElement::line(1.0, 1.0, 1.0, 1.0).with("thickness", 3);
        let out = generate(&[el], 50.0, 30.0).unwrap();
        assert_eq!(body(&out)[0], "BAR 8,8,3,3");
    }

    #[test]
    fn test_barcode() {
        let el = LabelElement::barcode(2.0, 10.0, "ABC", 10.0)
            .with("type", "CODE 39")
            .with("narrowBarWidth", 3)
            .with("wideToNarrowRatio", 2)
            .with("showContent", true)
            .with("barcodeTextFont", 4);
        let out = generate(&[el], 50.0, 30.0).unwrap();

        // Text style is not expressible in TSPL
        assert_eq!(body(&out), vec!["BARCODE 16,80,\"39\",80,1,0,3,6,\"ABC\""]);
    }

    #[test]
    fn test_barcode_defaults_and_fallback_type() {
        let el = LabelElement::barcode(0.0, 0.0, "4006381333931", 8.0).with("type", "EAN13");
        let out = generate(&[el], 50.0, 30.0).unwrap();
        assert_eq!(body(&out)[0], "BARCODE 0,0,\"128\",64,0,0,2,6,\"4006381333931\"");
    }

    #[test]
    fn test_vertical_barcode_rejected_by_default() {
        let el = LabelElement::barcode(0.0, 0.0, "1", 8.0).with("orientation", "vertical");
        let err = generate(&[LabelElement::text(0.0, 0.0, "a"), el], 50.0, 30.0).unwrap_err();
        assert_eq!(
            err,
            LabelError::UnsupportedOrientation {
                index: 1,
                field: "orientation",
                language: "TSPL"
            }
        );
    }

    #[test]
    fn test_vertical_barcode_normalized() {
        let generator = TsplGenerator::new(
            TsplConfig::default().with_vertical_barcode(VerticalBarcodePolicy::Normalize),
        );
        let doc = LabelDocument::new(50.0, 30.0).with_element(
            LabelElement::barcode(0.0, 0.0, "1", 8.0).with("orientation", "VBARCODE"),
        );
        let out = generator.generate(&doc).unwrap();
        assert_eq!(body(&out)[0], "BARCODE 0,0,\"128\",64,0,0,2,6,\"1\"");
    }

    #[test]
    fn test_bad_config_produces_nothing() {
        let doc = LabelDocument::new(50.0, 30.0).with_element(LabelElement::text(0.0, 0.0, "x"));

        let injected = TsplGenerator::new(TsplConfig {
            font: "A\r\nPRINT 99".to_string(),
            ..TsplConfig::default()
        });
        assert!(matches!(
            injected.generate(&doc),
            Err(LabelError::InvalidConfig { field: "font", .. })
        ));

        let nan_gap = TsplGenerator::new(TsplConfig {
            gap_mm: f64::NAN,
            ..TsplConfig::default()
        });
        assert!(matches!(
            nan_gap.generate(&doc),
            Err(LabelError::InvalidConfig { field: "gap_mm", .. })
        ));

        let negative_offset = TsplGenerator::new(TsplConfig {
            gap_offset_mm: -5.0,
            ..TsplConfig::default()
        });
        assert!(matches!(
            negative_offset.generate(&doc),
            Err(LabelError::InvalidConfig { field: "gap_offset_mm", .. })
        ));
    }

    #[test]
    fn test_custom_gap_and_font() {
        let generator = TsplGenerator::new(TsplConfig {
            font: "3".to_string(),
            gap_mm: 3.5,
            gap_offset_mm: 1.0,
            ..TsplConfig::default()
        });
        let doc = LabelDocument::new(50.0, 30.0).with_element(LabelElement::text(0.0, 0.0, "x"));
        let out = generator.generate(&doc).unwrap();
        let l = lines(&out);

        assert_eq!(l[1], "GAP 3.5 mm,1 mm");
        assert_eq!(l[4], "TEXT 0,0,\"3\",0,1,1,\"x\"");
    }
}
