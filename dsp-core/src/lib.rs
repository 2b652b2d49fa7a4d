pub mod order;
pub mod template;
pub mod tracking;

pub use order::{DeliveryType, Order};
pub use template::{DeliveryTemplate, FieldSpec, ReceiptLine};
pub use tracking::{RandomCodeSource, SeededCodeSource, TrackingCode, TrackingCodeSource};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Order payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

pub type CoreResult<T> = Result<T, CoreError>;
