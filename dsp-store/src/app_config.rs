use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub receipt: ReceiptConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Overrides the `<scheme>://<host>/` root taken from the request.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Sub-directory of `static_dir` receiving generated receipts.
    pub receipts_subdir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReceiptConfig {
    pub logo_path: PathBuf,
    pub file_prefix: String,
    pub tracking_prefix: String,
    #[serde(default)]
    pub naming: FileNaming,
}

/// How receipt file names are derived.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileNaming {
    /// `<prefix>_<YYYYMMDD>_<HHMMSS>.pdf`. Two receipts in the same second share a name.
    #[default]
    Timestamp,
    /// Timestamp plus the tracking-code suffix.
    Unique,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 5000,
                public_base_url: None,
            },
            storage: StorageConfig {
                static_dir: PathBuf::from("static"),
                receipts_subdir: "pdfs".to_string(),
            },
            receipt: ReceiptConfig {
                logo_path: PathBuf::from("static/images/Dsp_logo-1.png"),
                file_prefix: "bon_livraison".to_string(),
                tracking_prefix: dsp_core::tracking::DEFAULT_TRACKING_PREFIX.to_string(),
                naming: FileNaming::Timestamp,
            },
        }
    }
}

impl Config {
    /// Built-in defaults, so every file source can stay optional.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Config::default();

        config::Config::builder()
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("storage.static_dir", defaults.storage.static_dir.to_string_lossy().into_owned())?
            .set_default("storage.receipts_subdir", defaults.storage.receipts_subdir)?
            .set_default("receipt.logo_path", defaults.receipt.logo_path.to_string_lossy().into_owned())?
            .set_default("receipt.file_prefix", defaults.receipt.file_prefix)?
            .set_default("receipt.tracking_prefix", defaults.receipt.tracking_prefix)?
            .set_default("receipt.naming", "timestamp")
    }

    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::builder()?
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local, untracked overrides
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `DSP__RECEIPT__NAMING=unique`
            .add_source(config::Environment::with_prefix("DSP").prefix_separator("__").separator("__"))
            // Hosting platforms hand out the port as a bare PORT variable
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        s.try_deserialize()
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.storage.static_dir.join(&self.storage.receipts_subdir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    #[test]
    fn test_defaults_deserialize() {
        let config: Config = Config::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 5000);
        assert!(config.server.public_base_url.is_none());
        assert_eq!(config.receipts_dir(), PathBuf::from("static").join("pdfs"));
        assert_eq!(config.receipt.logo_path, PathBuf::from("static/images/Dsp_logo-1.png"));
        assert_eq!(config.receipt.naming, FileNaming::Timestamp);
    }

    #[test]
    fn test_file_source_overrides_defaults() {
        let overrides = r#"
            [server]
            port = 8080
            public_base_url = "https://receipts.example.com/"

            [receipt]
            naming = "unique"
        "#;

        let config: Config = Config::builder()
            .unwrap()
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.public_base_url.as_deref(), Some("https://receipts.example.com/"));
        assert_eq!(config.receipt.naming, FileNaming::Unique);
        assert_eq!(config.receipt.file_prefix, "bon_livraison");
    }

    #[test]
    fn test_string_port_override_is_coerced() {
        let config: Config = Config::builder()
            .unwrap()
            .set_override_option("server.port", Some("9090".to_string()))
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9090);
    }
}
