use chrono::{Local, NaiveDateTime};
use dsp_core::{Order, TrackingCode};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::layout::{layout_receipt, DrawOp, TITLE};
use crate::pdf::write_pdf;
use crate::{RenderError, RenderResult};

#[derive(Debug, Clone, Default)]
pub struct RendererConfig {
    /// Logo drawn in the header. A path that does not exist is ignored.
    pub logo_path: Option<PathBuf>,
}

/// Lays out and writes delivery receipts.
#[derive(Debug, Clone, Default)]
pub struct ReceiptRenderer {
    config: RendererConfig,
}

impl ReceiptRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    fn logo(&self) -> Option<&Path> {
        self.config.logo_path.as_deref().filter(|path| path.is_file())
    }

    pub fn layout(&self, order: &Order, tracking_code: &TrackingCode, generated_at: NaiveDateTime) -> Vec<DrawOp> {
        layout_receipt(order, tracking_code, generated_at, self.logo())
    }

    pub fn render_bytes(
        &self,
        order: &Order,
        tracking_code: &TrackingCode,
        generated_at: NaiveDateTime,
    ) -> RenderResult<Vec<u8>> {
        let ops = self.layout(order, tracking_code, generated_at);
        write_pdf(
            &format!("{} {}", TITLE, tracking_code),
            tracking_code.as_str(),
            generated_at,
            &ops,
        )
    }

    /// Render with the current local time and write to `path`.
    pub fn render(&self, order: &Order, tracking_code: &TrackingCode, path: &Path) -> RenderResult<()> {
        self.render_at(order, tracking_code, Local::now().naive_local(), path)
    }

    /// Render and write to `path`.
    ///
    /// The bytes land in a temporary file next to `path` first and are renamed
    /// into place, so readers never see a half-written receipt. An existing
    /// file at `path` is replaced.
    pub fn render_at(
        &self,
        order: &Order,
        tracking_code: &TrackingCode,
        generated_at: NaiveDateTime,
        path: &Path,
    ) -> RenderResult<()> {
        let bytes = self.render_bytes(order, tracking_code, generated_at)?;

        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| RenderError::Io(e.error))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
