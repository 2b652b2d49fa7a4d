//! Fixed A4 receipt template.
//!
//! The layout stage turns an order into a display list of absolutely placed
//! draw operations. It knows nothing about PDF; [`crate::pdf`] replays the list.
//! All coordinates are PDF points with the origin at the bottom-left corner.

use chrono::NaiveDateTime;
use dsp_core::{Order, TrackingCode};
use std::path::{Path, PathBuf};

use crate::metrics::Font;

/// Points per centimetre.
pub const CM: f32 = 72.0 / 2.54;

pub const PAGE_WIDTH: f32 = 595.2756;
pub const PAGE_HEIGHT: f32 = 841.8898;

pub const TITLE: &str = "BON DE LIVRAISON";
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;
const FOOTER_SIZE: f32 = 10.0;

const LOGO_X: f32 = 1.5 * CM;
const LOGO_TOP_OFFSET: f32 = 4.0 * CM;
const LOGO_WIDTH: f32 = 4.0 * CM;
const HEADER_OFFSET: f32 = 2.0 * CM;
const HEADER_RIGHT_MARGIN: f32 = 2.0 * CM;
const RULE_MARGIN: f32 = 1.5 * CM;
const HEADER_RULE_OFFSET: f32 = 2.5 * CM;
const BODY_TOP_OFFSET: f32 = 5.0 * CM;
const LABEL_X: f32 = 2.0 * CM;
const VALUE_X: f32 = 8.0 * CM;
const TYPE_LINE_ADVANCE: f32 = 1.2 * CM;
const LINE_ADVANCE: f32 = 1.0 * CM;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Image anchored at its bottom-left corner, scaled to `width` with the
    /// aspect ratio preserved.
    Image { path: PathBuf, x: f32, y: f32, width: f32 },
    /// Text whose baseline starts at (`x`, `y`).
    Text { text: String, font: Font, size: f32, x: f32, y: f32 },
    /// Straight stroke between two points.
    Rule { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl DrawOp {
    fn text(text: impl Into<String>, font: Font, size: f32, x: f32, y: f32) -> Self {
        DrawOp::Text { text: text.into(), font, size, x, y }
    }

    fn centered(text: impl Into<String>, font: Font, size: f32, center_x: f32, y: f32) -> Self {
        let text = text.into();
        let x = center_x - font.text_width(&text, size) / 2.0;
        DrawOp::Text { text, font, size, x, y }
    }

    fn right_aligned(text: impl Into<String>, font: Font, size: f32, right_x: f32, y: f32) -> Self {
        let text = text.into();
        let x = right_x - font.text_width(&text, size);
        DrawOp::Text { text, font, size, x, y }
    }

    fn rule(y: f32) -> Self {
        DrawOp::Rule {
            x1: RULE_MARGIN,
            y1: y,
            x2: PAGE_WIDTH - RULE_MARGIN,
            y2: y,
        }
    }
}

/// Lay out one receipt page.
///
/// `logo` must already be known to exist; the caller decides whether to pass it.
pub fn layout_receipt(
    order: &Order,
    tracking_code: &TrackingCode,
    generated_at: NaiveDateTime,
    logo: Option<&Path>,
) -> Vec<DrawOp> {
    let mut ops = Vec::new();

    // Header
    if let Some(path) = logo {
        ops.push(DrawOp::Image {
            path: path.to_path_buf(),
            x: LOGO_X,
            y: PAGE_HEIGHT - LOGO_TOP_OFFSET,
            width: LOGO_WIDTH,
        });
    }

    let header_y = PAGE_HEIGHT - HEADER_OFFSET;
    ops.push(DrawOp::centered(TITLE, Font::HelveticaBold, TITLE_SIZE, PAGE_WIDTH / 2.0, header_y));
    ops.push(DrawOp::right_aligned(
        format!("Code suivi : {}", tracking_code),
        Font::HelveticaBold,
        BODY_SIZE,
        PAGE_WIDTH - HEADER_RIGHT_MARGIN,
        header_y,
    ));
    ops.push(DrawOp::rule(PAGE_HEIGHT - HEADER_RULE_OFFSET));

    // Body
    let mut y = PAGE_HEIGHT - BODY_TOP_OFFSET;
    ops.push(DrawOp::text(
        format!("Type de livraison : {}", order.delivery_type().display_name()),
        Font::HelveticaBold,
        BODY_SIZE,
        LABEL_X,
        y,
    ));
    y -= TYPE_LINE_ADVANCE;

    for line in order.receipt_lines() {
        ops.push(DrawOp::text(format!("• {}", line.label), Font::Helvetica, BODY_SIZE, LABEL_X, y));
        ops.push(DrawOp::text(line.value, Font::HelveticaBold, BODY_SIZE, VALUE_X, y));
        y -= LINE_ADVANCE;
    }

    // Footer
    ops.push(DrawOp::rule(y));
    y -= LINE_ADVANCE;
    ops.push(DrawOp::text(
        format!("Date de génération : {}", generated_at.format(TIMESTAMP_FORMAT)),
        Font::Helvetica,
        FOOTER_SIZE,
        LABEL_X,
        y,
    ));

    ops
}
