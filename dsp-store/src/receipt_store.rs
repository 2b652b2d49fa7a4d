use chrono::NaiveDateTime;
use dsp_core::TrackingCode;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app_config::{Config, FileNaming};
use crate::{StoreError, StoreResult};

/// URL segment the static directory is mounted under.
pub const STATIC_MOUNT: &str = "static";

pub const RECEIPT_EXTENSION: &str = "pdf";

const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Where a receipt will be written and how it is reached over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSlot {
    pub file_name: String,
    pub path: PathBuf,
    /// Path relative to the site root, e.g. `static/pdfs/<file_name>`.
    pub public_path: String,
}

/// Names receipt files and owns the directory they are written to.
///
/// Files are never cleaned up here; retention is handled outside the service.
#[derive(Debug, Clone)]
pub struct ReceiptStore {
    static_dir: PathBuf,
    receipts_subdir: String,
    file_prefix: String,
    naming: FileNaming,
}

impl ReceiptStore {
    pub fn new(
        static_dir: impl Into<PathBuf>,
        receipts_subdir: impl Into<String>,
        file_prefix: impl Into<String>,
        naming: FileNaming,
    ) -> Self {
        Self {
            static_dir: static_dir.into(),
            receipts_subdir: receipts_subdir.into(),
            file_prefix: file_prefix.into(),
            naming,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.storage.static_dir.clone(),
            config.storage.receipts_subdir.clone(),
            config.receipt.file_prefix.clone(),
            config.receipt.naming,
        )
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn output_dir(&self) -> PathBuf {
        self.static_dir.join(&self.receipts_subdir)
    }

    /// Create the output directory if needed. Safe to call repeatedly.
    pub fn ensure_output_dir(&self) -> StoreResult<PathBuf> {
        let dir = self.output_dir();
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    pub fn file_name(&self, tracking_code: &TrackingCode, at: NaiveDateTime) -> String {
        let stamp = at.format(FILE_TIMESTAMP_FORMAT);
        match self.naming {
            FileNaming::Timestamp => format!("{}_{}.{}", self.file_prefix, stamp, RECEIPT_EXTENSION),
            FileNaming::Unique => format!(
                "{}_{}_{}.{}",
                self.file_prefix,
                stamp,
                tracking_code.suffix(),
                RECEIPT_EXTENSION
            ),
        }
    }

    pub fn public_path(&self, file_name: &str) -> String {
        format!("{}/{}/{}", STATIC_MOUNT, self.receipts_subdir, file_name)
    }

    /// Reserve a destination for a new receipt, creating the directory on first use.
    pub fn allocate(&self, tracking_code: &TrackingCode, at: NaiveDateTime) -> StoreResult<ReceiptSlot> {
        let dir = self.ensure_output_dir()?;
        let file_name = self.file_name(tracking_code, at);
        let path = dir.join(&file_name);

        if path.exists() {
            debug!("Receipt {} already exists and will be replaced", file_name);
        }

        Ok(ReceiptSlot {
            public_path: self.public_path(&file_name),
            path,
            file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dsp_core::{SeededCodeSource, TrackingCodeSource};

    fn at(s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap().and_hms_opt(23, 59, s).unwrap()
    }

    fn code(seed: u64) -> TrackingCode {
        SeededCodeSource::new("DSP", seed).next_code()
    }

    #[test]
    fn test_timestamp_file_name_format() {
        let store = ReceiptStore::new("static", "pdfs", "bon_livraison", FileNaming::Timestamp);
        assert_eq!(
            store.file_name(&code(1), at(7)),
            "bon_livraison_20250131_235907.pdf"
        );
    }

    #[test]
    fn test_same_second_collides_in_timestamp_mode() {
        let store = ReceiptStore::new("static", "pdfs", "bon_livraison", FileNaming::Timestamp);
        assert_eq!(
            store.file_name(&code(1), at(1)),
            store.file_name(&code(2), at(1))
        );
    }

    #[test]
    fn test_unique_mode_disambiguates_same_second() {
        let store = ReceiptStore::new("static", "pdfs", "bon_livraison", FileNaming::Unique);
        let first = store.file_name(&code(1), at(1));
        let second = store.file_name(&code(2), at(1));

        assert_eq!(first, format!("bon_livraison_20250131_235901_{}.pdf", code(1).suffix()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_allocate_creates_directory_idempotently() {
        let root = tempfile::tempdir().unwrap();
        let store = ReceiptStore::new(root.path(), "pdfs", "bon_livraison", FileNaming::Timestamp);

        let slot = store.allocate(&code(1), at(0)).unwrap();
        assert!(root.path().join("pdfs").is_dir());
        assert_eq!(slot.path, root.path().join("pdfs").join(&slot.file_name));
        assert_eq!(slot.public_path, format!("static/pdfs/{}", slot.file_name));

        store.allocate(&code(1), at(0)).unwrap();
        store.ensure_output_dir().unwrap();
    }

    #[test]
    fn test_allocate_fails_when_static_dir_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("static");
        std::fs::write(&blocker, b"").unwrap();

        let store = ReceiptStore::new(&blocker, "pdfs", "bon_livraison", FileNaming::Timestamp);
        let result = store.allocate(&code(1), at(0));

        assert!(matches!(result, Err(StoreError::CreateDir { .. })));
    }
}
