pub mod app_config;
pub mod receipt_store;

pub use app_config::{Config, FileNaming};
pub use receipt_store::{ReceiptSlot, ReceiptStore, STATIC_MOUNT};

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to create receipt directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
