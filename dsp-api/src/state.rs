use std::sync::Arc;
use dsp_core::{RandomCodeSource, TrackingCodeSource};
use dsp_receipt::{ReceiptRenderer, RendererConfig};
use dsp_store::{Config, ReceiptStore};

#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<ReceiptRenderer>,
    pub store: Arc<ReceiptStore>,
    pub codes: Arc<dyn TrackingCodeSource>,
    pub public_base_url: Option<String>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self::with_code_source(config, Arc::new(RandomCodeSource::new(config.receipt.tracking_prefix.clone())))
    }

    /// Same as [`AppState::from_config`] with a caller-supplied code source.
    pub fn with_code_source(config: &Config, codes: Arc<dyn TrackingCodeSource>) -> Self {
        let renderer = ReceiptRenderer::new(RendererConfig {
            logo_path: Some(config.receipt.logo_path.clone()),
        });

        Self {
            renderer: Arc::new(renderer),
            store: Arc::new(ReceiptStore::from_config(config)),
            codes,
            public_base_url: config.server.public_base_url.clone(),
        }
    }
}
