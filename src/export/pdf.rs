//! Lays the report out as a landscape A4 table using the builtin Helvetica fonts.
//!
//! The builtin fonts only cover Latin-1, so any other character is written as `?`.

use crate::export::{Marker, Report, ReportRow};
use crate::model::TransactionStatus;
use crate::Result;
use anyhow::anyhow;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rgb,
};

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const HEADER_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 9.0;
const ROW_HEIGHT: f32 = 7.0;
const LAYER: &str = "Layer 1";

/// Column widths in millimetres, in `ReportRow::HEADERS` order.
const COLUMN_WIDTHS: [f32; 8] = [20.0, 24.0, 28.0, 34.0, 30.0, 95.0, 26.0, 16.0];

/// Helvetica at the body size fits roughly this many characters per millimetre.
const CHARS_PER_MM: f32 = 0.55;

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn black() -> Color {
    rgb(0.0, 0.0, 0.0)
}

fn status_color(status: TransactionStatus) -> Color {
    match status {
        TransactionStatus::Success => rgb(0.0, 0.5, 0.0),
        TransactionStatus::Failure => rgb(0.8, 0.0, 0.0),
        TransactionStatus::Processing => rgb(0.6, 0.3, 0.0),
    }
}

fn marker_color(marker: Marker) -> Color {
    match marker {
        Marker::Credit => rgb(0.0, 0.5, 0.0),
        _ => rgb(0.8, 0.0, 0.0),
    }
}

/// Replaces every character the builtin fonts cannot draw with `?`.
fn latin1(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{a0}'..='\u{ff}' => c,
            _ => '?',
        })
        .collect()
}

/// Shortens `text` so that it fits in a column `width` millimetres wide.
fn fit(text: &str, width: f32) -> String {
    let text = latin1(text);
    let max = ((width - 2.0) * CHARS_PER_MM).floor().max(4.0) as usize;
    if text.chars().count() <= max {
        text
    } else {
        let kept: String = text.chars().take(max - 3).collect();
        format!("{kept}...")
    }
}

fn column_x(index: usize) -> f32 {
    MARGIN + COLUMN_WIDTHS[..index].iter().sum::<f32>()
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Writes one page after another, starting a new page with a repeated header when the current one
/// is full.
struct Writer {
    doc: PdfDocumentReference,
    fonts: Fonts,
    layer: PdfLayerReference,
    y: f32,
}

impl Writer {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| anyhow!("Unable to load the Helvetica font: {e:?}"))?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| anyhow!("Unable to load the Helvetica Bold font: {e:?}"))?,
        };
        let layer = doc.get_page(page).get_layer(layer);
        let mut writer = Self {
            doc,
            fonts,
            layer,
            y: PAGE_HEIGHT - MARGIN - 5.0,
        };
        writer.layer.set_fill_color(black());
        writer
            .layer
            .use_text(latin1(title), TITLE_SIZE, Mm(MARGIN), Mm(writer.y), &writer.fonts.bold);
        writer.y -= ROW_HEIGHT * 1.5;
        writer.header();
        Ok(writer)
    }

    fn header(&mut self) {
        self.layer.set_fill_color(black());
        for (i, heading) in ReportRow::HEADERS.iter().enumerate() {
            self.layer.use_text(
                *heading,
                HEADER_SIZE,
                Mm(column_x(i)),
                Mm(self.y),
                &self.fonts.bold,
            );
        }
        self.y -= ROW_HEIGHT;
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN - 5.0;
        self.header();
    }

    fn row(&mut self, row: &ReportRow) {
        if self.y < MARGIN + ROW_HEIGHT {
            self.new_page();
        }
        let cells = row.cells();
        for (i, cell) in cells.iter().enumerate() {
            let color = match i {
                6 => status_color(row.status),
                7 => marker_color(row.marker),
                _ => black(),
            };
            self.layer.set_fill_color(color);
            self.layer.use_text(
                fit(cell, COLUMN_WIDTHS[i]),
                BODY_SIZE,
                Mm(column_x(i)),
                Mm(self.y),
                &self.fonts.regular,
            );
        }
        self.y -= ROW_HEIGHT;
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| anyhow!("Unable to write the PDF report: {e:?}"))
    }
}

pub(super) fn render(report: &Report) -> Result<Vec<u8>> {
    let mut writer = Writer::new(report.title())?;
    for row in report.rows() {
        writer.row(row);
    }
    writer.finish()
}
