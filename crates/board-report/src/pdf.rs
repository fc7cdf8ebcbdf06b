//! One-page PDF rendering of a [`DetailSheet`].

use board_core::error::{BoardError, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::detail::DetailSheet;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LEFT_MARGIN_MM: f32 = 35.0;
const TITLE_Y_MM: f32 = 282.0;
const FIRST_LINE_Y_MM: f32 = 271.5;
const LINE_STEP_MM: f32 = 7.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;

/// A line of body text and its baseline, in millimetres from the page bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub y_mm: f32,
    pub text: String,
}

/// Place the body lines of `sheet` top-down. Lines that would cross the
/// bottom margin are dropped and a final "..." takes their place.
pub fn layout(sheet: &DetailSheet) -> Vec<PlacedLine> {
    let mut placed = Vec::with_capacity(sheet.lines.len());
    let mut y = FIRST_LINE_Y_MM;
    for line in &sheet.lines {
        if y - LINE_STEP_MM < BOTTOM_MARGIN_MM {
            placed.push(PlacedLine {
                y_mm: y,
                text: "...".to_string(),
            });
            break;
        }
        placed.push(PlacedLine {
            y_mm: y,
            text: line.clone(),
        });
        y -= LINE_STEP_MM;
    }
    placed
}

/// Render `sheet` onto a single A4 page using [`layout`].
pub fn render_pdf(sheet: &DetailSheet) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        sheet.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| BoardError::Render(e.to_string()))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| BoardError::Render(e.to_string()))?;

    let layer = doc.get_page(page).get_layer(layer);
    layer.use_text(
        sheet.title.as_str(),
        16.0,
        Mm(LEFT_MARGIN_MM),
        Mm(TITLE_Y_MM),
        &bold,
    );
    for line in layout(sheet) {
        layer.use_text(line.text, 12.0, Mm(LEFT_MARGIN_MM), Mm(line.y_mm), &regular);
    }

    doc.save_to_bytes().map_err(|e| BoardError::Render(e.to_string()))
}
