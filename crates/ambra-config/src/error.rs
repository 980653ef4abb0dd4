//! Config errors.

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Saving a config file or its parent directory failed.
    #[error("cannot write {path}: {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config cannot be rendered as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Parsed fine but the value cannot be used, e.g. a zero timeout.
    #[error("config field `{field}` {reason}")]
    InvalidValue { field: String, reason: String },
}
