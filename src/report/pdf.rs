use crate::model::{AggregateReport, ReportError, Result};
use crate::report::layout::{self, DocumentLayout, Font, Rgb8, Shape, BORDER, PAGE_HEIGHT, PAGE_WIDTH};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};
use std::fmt::Debug;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const LAYER: &str = "Layer 1";
const BORDER_THICKNESS: f32 = 0.75;

pub trait PdfReport {
    /// Lays the report out and writes it to `path`.
    fn write_pdf(&self, path: &Path) -> Result<DocumentLayout>;
}

impl PdfReport for AggregateReport {
    fn write_pdf(&self, path: &Path) -> Result<DocumentLayout> {
        let layout = layout::layout(self);
        let title = format!("Commit report: {}", self.developer_name());
        let (doc, first_page, first_layer) =
            PdfDocument::new(title.as_str(), mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER);
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_error)?,
            mono: doc.add_builtin_font(BuiltinFont::Courier).map_err(pdf_error)?,
        };

        for (number, page) in layout.pages.iter().enumerate() {
            let (page_index, layer_index) = if number == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER)
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);
            for shape in &page.shapes {
                draw(&layer, &fonts, shape);
            }
        }

        let file = File::create(path)?;
        doc.save(&mut BufWriter::new(file)).map_err(pdf_error)?;
        Ok(layout)
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
            Font::Mono => &self.mono,
        }
    }
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, shape: &Shape) {
    match shape {
        Shape::Cell {
            x,
            y,
            width,
            height,
            fill,
        } => {
            layer.set_fill_color(color(*fill));
            layer.set_outline_color(color(BORDER));
            layer.set_outline_thickness(BORDER_THICKNESS);
            let rect = Rect::new(
                mm(*x),
                mm(PAGE_HEIGHT - y - height),
                mm(x + width),
                mm(PAGE_HEIGHT - y),
            )
            .with_mode(PaintMode::FillStroke);
            layer.add_rect(rect);
        }
        Shape::Text {
            x,
            y,
            size,
            font,
            color: text_color,
            text,
        } => {
            layer.set_fill_color(color(*text_color));
            layer.use_text(text.as_str(), *size, mm(*x), mm(PAGE_HEIGHT - y), fonts.get(*font));
        }
    }
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn color(rgb: Rgb8) -> Color {
    let Rgb8(r, g, b) = rgb;
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn pdf_error(err: impl Debug) -> ReportError {
    ReportError::Pdf(format!("{err:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommitRecord, DateRange, RepositorySummary};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn report() -> AggregateReport {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        AggregateReport::new(
            "Jane Doe",
            date,
            DateRange::parse("2024-01-01", "2025-02-15").unwrap(),
            vec![
                RepositorySummary::new(
                    "alpha",
                    vec![CommitRecord::new(date, "abcdef0123", "Add parser")],
                ),
                RepositorySummary::new("beta", vec![]),
            ],
        )
    }

    #[test]
    fn writes_a_pdf_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let layout = report().write_pdf(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.rows_for(0).count(), 1);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("report.pdf");
        assert!(matches!(report().write_pdf(&path), Err(ReportError::Io(_))));
    }
}
