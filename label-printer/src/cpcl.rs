//! CPCL label generator
//!
//! Renders a [`Layout`] as a CPCL page: one space-separated command per
//! CRLF-terminated line, every coordinate in dots.
//!
//! ## Barcode text state
//!
//! `BARCODE-TEXT` is printer-global: once set it applies to every later
//! `BARCODE`/`VBARCODE` in the stream. The generator therefore writes the
//! style line right before each barcode that shows its content, and writes
//! `BARCODE-TEXT OFF` before a barcode without content if an earlier one
//! left the text switched on.
//!
//! ## Barcode types
//!
//! CODE 39 is written as `39` and everything else as `128`. Streams from
//! the previous designer sent `3` for CODE 39, so byte-for-byte comparisons
//! against them differ on that token.

use shared::models::{LabelDocument, LabelElement};
use tracing::{debug, instrument};

use crate::config::CpclConfig;
use crate::error::{LabelError, LabelResult};
use crate::layout::{
    BarcodeElement, BarcodeOrientation, BarcodeType, Element, Layout, LineElement, TextElement,
    validate, validate_parts,
};
use crate::units::{DPI, mm_to_dots};

/// String-based CPCL command builder
pub struct CpclBuilder {
    buf: String,
}

impl CpclBuilder {
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

    /// `! <offset> <hres> <vres> <height> <qty>`
    pub fn header(&mut self, height_dots: i64, copies: u32) -> &mut Self {
        self.command(&format!("! 0 {} {} {} {}", DPI, DPI, height_dots, copies))
    }

    pub fn page_width(&mut self, width_dots: i64) -> &mut Self {
        self.command(&format!("PAGE-WIDTH {}", width_dots))
    }

    pub fn page_start(&mut self) -> &mut Self {
        self.command("PAGE-START")
    }

    pub fn text(&mut self, font: u32, size: u32, x: i64, y: i64, content: &str) -> &mut Self {
        self.command(&format!("TEXT {} {} {} {} {}", font, size, x, y, content))
    }

    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, width: u32) -> &mut Self {
        self.command(&format!("LINE {} {} {} {} {}", x0, y0, x1, y1, width))
    }

    /// Human-readable text style for all following barcodes
    pub fn barcode_text(&mut self, font: u32, size: u32, offset_dots: i64) -> &mut Self {
        self.command(&format!("BARCODE-TEXT {} {} {}", font, size, offset_dots))
    }

    pub fn barcode_text_off(&mut self) -> &mut Self {
        self.command("BARCODE-TEXT OFF")
    }

    /// `BARCODE|VBARCODE <type> <width> <ratio> <height> <x> <y> <data>`
    #[allow(clippy::too_many_arguments)]
    pub fn barcode(
        &mut self,
        vertical: bool,
        type_code: &str,
        narrow: u32,
        ratio: u32,
        height_dots: i64,
        x: i64,
        y: i64,
        content: &str,
    ) -> &mut Self {
        let keyword = if vertical { "VBARCODE" } else { "BARCODE" };
        self.command(&format!(
            "{} {} {} {} {} {} {} {}",
            keyword, type_code, narrow, ratio, height_dots, x, y, content
        ))
    }

    pub fn page_end(&mut self) -> &mut Self {
        self.command("PAGE-END")
    }

    pub fn form(&mut self) -> &mut Self {
        self.command("FORM")
    }

    pub fn print(&mut self) -> &mut Self {
        self.command("PRINT")
    }

    /// Finalize and return the accumulated commands
    pub fn finalize(self) -> String {
        self.buf
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

impl Default for CpclBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// CPCL barcode type code
///
/// Anything other than CODE 39 prints as CODE 128. CODE 39 uses the CPCL
/// symbology name `39`; older layouts printed with the designer's own
/// generator were sent `3`.
pub fn barcode_type_code(barcode_type: &BarcodeType) -> &'static str {
    match barcode_type {
        BarcodeType::Code39 => "39",
        BarcodeType::Code128 | BarcodeType::Other(_) => "128",
    }
}

/// CPCL label generator
///
/// `TEXT` size is the printer's discrete font-size index, and the barcode
/// ratio is passed through unchanged.
#[derive(Debug, Clone, Default)]
pub struct CpclGenerator {
    config: CpclConfig,
}

impl CpclGenerator {
    pub fn new(config: CpclConfig) -> Self {
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
        let height_dots = mm_to_dots(layout.paper_height) - self.config.footer_reserve_dots;
        if height_dots <= 0 {
            return Err(LabelError::DegenerateGeometry {
                field: "paperHeight",
                reason: format!(
                    "{} mm leaves {} dots after the {}-dot footer reserve",
                    layout.paper_height, height_dots, self.config.footer_reserve_dots
                ),
            });
        }
        let width_dots = mm_to_dots(layout.paper_width);
        if width_dots <= 0 {
            return Err(LabelError::DegenerateGeometry {
                field: "paperWidth",
                reason: format!("{} mm is less than one dot", layout.paper_width),
            });
        }

        let mut b = CpclBuilder::new();
        b.header(height_dots, 1);
        b.page_width(width_dots);
        b.page_start();

        let mut barcode_text_on = false;
        for element in &layout.elements {
            match element {
                Element::Text(text) => render_text(&mut b, text),
                Element::Line(line) => render_line(&mut b, line),
                Element::Barcode(barcode) => {
                    render_barcode(&mut b, barcode, &mut barcode_text_on)
                }
            }
        }

        b.page_end();
        b.form();
        b.print();

        let out = b.finalize();
        debug!(len = out.len(), "CPCL label generated");
        Ok(out)
    }
}

fn render_text(b: &mut CpclBuilder, text: &TextElement) {
    b.text(
        text.font,
        text.size,
        mm_to_dots(text.x),
        mm_to_dots(text.y),
        &text.content,
    );
}

fn render_line(b: &mut CpclBuilder, line: &LineElement) {
    // Thickness is already in dots
    b.line(
        mm_to_dots(line.x1),
        mm_to_dots(line.y1),
        mm_to_dots(line.x2),
        mm_to_dots(line.y2),
        line.thickness,
    );
}

fn render_barcode(b: &mut CpclBuilder, barcode: &BarcodeElement, text_on: &mut bool) {
    match &barcode.text {
        Some(text) => {
            b.barcode_text(text.font, text.size, mm_to_dots(text.offset));
            *text_on = true;
        }
        None if *text_on => {
            b.barcode_text_off();
            *text_on = false;
        }
        None => {}
    }

    b.barcode(
        barcode.orientation == BarcodeOrientation::Vertical,
        barcode_type_code(&barcode.barcode_type),
        barcode.narrow_bar_width,
        barcode.wide_to_narrow_ratio,
        mm_to_dots(barcode.height),
        mm_to_dots(barcode.x),
        mm_to_dots(barcode.y),
        &barcode.content,
    );
}

/// Generate a CPCL command stream with default settings
pub fn generate_cpcl(doc: &LabelDocument) -> LabelResult<String> {
    CpclGenerator::default().generate(doc)
}

/// Generate CPCL from an element list and paper size (mm)
pub fn generate(
    elements: &[LabelElement],
    paper_width: f64,
    paper_height: f64,
) -> LabelResult<String> {
    CpclGenerator::default().render(&validate_parts(elements, paper_width, paper_height)?)
}
