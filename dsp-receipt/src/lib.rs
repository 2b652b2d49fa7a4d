pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod renderer;

pub use layout::{layout_receipt, DrawOp};
pub use metrics::Font;
pub use renderer::{ReceiptRenderer, RendererConfig};

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("I/O error while writing receipt: {0}")]
    Io(#[from] io::Error),
    #[error("PDF serialization failed: {0}")]
    Pdf(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
