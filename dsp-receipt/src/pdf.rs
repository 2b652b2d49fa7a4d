use chrono::NaiveDateTime;
use printpdf::image_crate::{self, GenericImageView};
use printpdf::lopdf::{self, Object, StringFormat};
use printpdf::{
    BuiltinFont, CustomPdfConformance, Image, ImageTransform, IndirectFontRef, Line, Mm,
    OffsetDateTime, PdfConformance, PdfDocument, PdfLayerReference, Point, Pt,
};
use std::path::Path;
use tracing::warn;

use crate::layout::{DrawOp, PAGE_HEIGHT, PAGE_WIDTH};
use crate::metrics::Font;
use crate::RenderError;

const LAYER_NAME: &str = "Receipt";
const RULE_THICKNESS: f32 = 1.0;
const IMAGE_DPI: f32 = 300.0;

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

fn pdf_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Helvetica => &self.regular,
            Font::HelveticaBold => &self.bold,
        }
    }
}

/// Wall-clock time stamped into the document info dictionary, written with a
/// zero offset so it reads the same as the footer.
fn pdf_date(generated_at: NaiveDateTime) -> Result<OffsetDateTime, RenderError> {
    OffsetDateTime::from_unix_timestamp(generated_at.and_utc().timestamp()).map_err(pdf_error)
}

/// Replay a display list on a single A4 page and serialize the document.
///
/// Output depends only on the arguments: the same `document_id`, `generated_at`
/// and display list always produce the same bytes.
pub fn write_pdf(
    title: &str,
    document_id: &str,
    generated_at: NaiveDateTime,
    ops: &[DrawOp],
) -> Result<Vec<u8>, RenderError> {
    let date = pdf_date(generated_at)?;
    let (doc, page, layer) = PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME);
    // Plain PDF: no ICC profile or XMP packet for a one-page receipt.
    let doc = doc
        .with_conformance(PdfConformance::Custom(CustomPdfConformance {
            requires_icc_profile: false,
            requires_xmp_metadata: false,
            ..Default::default()
        }))
        .with_document_id(document_id.to_string())
        .with_creation_date(date)
        .with_mod_date(date)
        .with_metadata_date(date);

    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
    };

    let canvas = doc.get_page(page).get_layer(layer);
    canvas.set_outline_thickness(RULE_THICKNESS);

    for op in ops {
        match op {
            DrawOp::Image { path, x, y, width } => draw_image(&canvas, path, *x, *y, *width),
            DrawOp::Text { text, font, size, x, y } => {
                canvas.use_text(text.as_str(), *size, mm(*x), mm(*y), fonts.get(*font));
            }
            DrawOp::Rule { x1, y1, x2, y2 } => {
                canvas.add_line(Line {
                    points: vec![
                        (Point::new(mm(*x1), mm(*y1)), false),
                        (Point::new(mm(*x2), mm(*y2)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }

    let bytes = doc.save_to_bytes().map_err(pdf_error)?;
    pin_trailer_id(&bytes, document_id)
}

/// printpdf stamps a random `/ID` into the trailer on every save; replace it
/// with `document_id` for both the permanent and the changing half.
fn pin_trailer_id(bytes: &[u8], document_id: &str) -> Result<Vec<u8>, RenderError> {
    let mut doc = lopdf::Document::load_mem(bytes).map_err(pdf_error)?;
    let id = Object::String(document_id.as_bytes().to_vec(), StringFormat::Literal);
    doc.trailer.set("ID", Object::Array(vec![id.clone(), id]));

    let mut out = Vec::with_capacity(bytes.len());
    doc.save_to(&mut out).map_err(pdf_error)?;
    Ok(out)
}

/// Best effort: an unreadable logo is logged and left out.
fn draw_image(canvas: &PdfLayerReference, path: &Path, x: f32, y: f32, width: f32) {
    let decoded = match image_crate::open(path) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Skipping logo {}: {}", path.display(), e);
            return;
        }
    };

    let natural_width = decoded.width() as f32 * 72.0 / IMAGE_DPI;
    if natural_width <= 0.0 {
        warn!("Skipping logo {}: empty image", path.display());
        return;
    }
    let scale = width / natural_width;

    Image::from_dynamic_image(&decoded).add_to_layer(
        canvas.clone(),
        ImageTransform {
            translate_x: Some(mm(x)),
            translate_y: Some(mm(y)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 14).unwrap().and_hms_opt(h, 30, 0).unwrap()
    }

    fn sample_ops() -> Vec<DrawOp> {
        vec![
            DrawOp::Text {
                text: "Code suivi : DSP-Q4W7E2R9".to_string(),
                font: Font::HelveticaBold,
                size: 12.0,
                x: 300.0,
                y: 780.0,
            },
            DrawOp::Rule { x1: 42.5, y1: 770.0, x2: 552.7, y2: 770.0 },
        ]
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_empty_display_list_still_produces_pdf() {
        let bytes = write_pdf("empty", "DSP-00000000", at(9), &[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_same_inputs_give_identical_bytes() {
        let first = write_pdf("receipt", "DSP-Q4W7E2R9", at(9), &sample_ops()).unwrap();
        let second = write_pdf("receipt", "DSP-Q4W7E2R9", at(9), &sample_ops()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_document_id_and_dates_are_embedded() {
        let bytes = write_pdf("receipt", "DSP-Q4W7E2R9", at(9), &sample_ops()).unwrap();

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let ids: Vec<&[u8]> = doc
            .trailer
            .get(b"ID")
            .and_then(Object::as_array)
            .unwrap()
            .iter()
            .map(|id| id.as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![&b"DSP-Q4W7E2R9"[..], &b"DSP-Q4W7E2R9"[..]]);

        assert!(contains(&bytes, b"D:20250214093000+00'00'"));
        assert!(!contains(&bytes, b"D:20250214103000"));
    }

    #[test]
    fn test_generation_time_changes_bytes() {
        let morning = write_pdf("receipt", "DSP-Q4W7E2R9", at(9), &sample_ops()).unwrap();
        let evening = write_pdf("receipt", "DSP-Q4W7E2R9", at(19), &sample_ops()).unwrap();
        assert_ne!(morning, evening);
    }

    #[test]
    fn test_unreadable_logo_is_skipped() {
        let ops = vec![DrawOp::Image {
            path: "does/not/exist.png".into(),
            x: 0.0,
            y: 0.0,
            width: 100.0,
        }];
        assert!(write_pdf("no logo", "DSP-00000000", at(9), &ops).is_ok());
    }
}
