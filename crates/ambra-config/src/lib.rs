//! Configuration for the Ambra SDK.
//!
//! Provides TOML-based client configuration with:
//! - Service URL, storage scheme and request tuning (timeout, page size)
//! - Credentials or a pre-issued session id
//! - Config file layering (user config dir + project-local overrides)
//! - Environment overrides (`AMBRA_URL`, `AMBRA_USERNAME`, `AMBRA_PASSWORD`, `AMBRA_SID`)

pub mod client;
pub mod discovery;
pub mod error;

pub use client::{ClientConfig, DEFAULT_PAGE_SIZE, DEFAULT_SERVICE_URL, DEFAULT_TIMEOUT_SECS};
pub use discovery::{
    ConfigSource, LayerStatus, LoadedConfig, load_config, load_config_file, load_config_with_env,
    load_config_with_options, save_config, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
