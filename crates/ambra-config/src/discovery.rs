//! Locating, layering and persisting config files.
//!
//! Layers, lowest precedence first:
//! 1. user file: `$AMBRA_CONFIG_DIR/config.toml`, else `<platform config dir>/ambra/config.toml`
//! 2. project file: `<project dir>/ambra.toml`
//! 3. `AMBRA_*` environment variables

use std::fs;
use std::path::{Path, PathBuf};

use crate::{ClientConfig, ConfigError, Result};

const USER_FILE: &str = "config.toml";
const PROJECT_FILE: &str = "ambra.toml";
const CONFIG_DIR_VAR: &str = "AMBRA_CONFIG_DIR";

/// What happened to one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerStatus {
    /// No file at the path.
    Missing,
    /// Parsed and merged.
    Applied,
    /// Present but unreadable or malformed; the reason is kept.
    Skipped(String),
}

/// One candidate config file.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub status: LayerStatus,
}

/// Merged configuration plus how it was assembled.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ClientConfig,
    /// Candidate files in precedence order, lowest first.
    pub sources: Vec<ConfigSource>,
    /// Human-readable problems worth surfacing to a user.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Files that contributed to the merged config.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|source| source.status == LayerStatus::Applied)
            .map(|source| source.path.as_path())
            .collect()
    }
}

/// Discover and merge config using the default user directory.
///
/// `project_dir` defaults to the working directory.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Discover and merge config; `config_dir` replaces the user directory.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    load_config_with_env(project_dir, config_dir, |key| std::env::var(key).ok())
}

/// Like [`load_config_with_options`], reading `AMBRA_*` overrides through
/// `env` instead of the process environment.
pub fn load_config_with_env<F>(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
    env: F,
) -> Result<LoadedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let candidates = [
        config_dir
            .map(Path::to_path_buf)
            .or_else(user_config_dir)
            .map(|dir| dir.join(USER_FILE)),
        Some(project_dir.unwrap_or(Path::new(".")).join(PROJECT_FILE)),
    ];

    let mut loaded = LoadedConfig {
        config: ClientConfig::new(),
        sources: Vec::new(),
        warnings: Vec::new(),
    };

    for path in candidates.into_iter().flatten() {
        let status = match read_layer(&path) {
            Ok(None) => LayerStatus::Missing,
            Ok(Some(layer)) => {
                tracing::debug!(path = %path.display(), "applied config layer");
                loaded.config.merge(layer);
                LayerStatus::Applied
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring config file");
                loaded
                    .warnings
                    .push(format!("ignored {}: {}", path.display(), err));
                LayerStatus::Skipped(err.to_string())
            }
        };
        loaded.sources.push(ConfigSource { path, status });
    }

    if loaded.config.password.is_some() {
        loaded.warnings.push(
            "a config file stores the password in plaintext; prefer AMBRA_PASSWORD".to_string(),
        );
    }

    loaded.config.apply_env_with(env);
    loaded.config.validate()?;
    Ok(loaded)
}

/// Read and parse one file.
pub fn load_config_file(path: &Path) -> Result<ClientConfig> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    ClientConfig::from_toml(&text)
}

/// Write `config` to `path`, creating missing directories.
pub fn save_config(config: &ClientConfig, path: &Path) -> Result<()> {
    let write_err = |target: &Path, source| ConfigError::WriteFile {
        path: target.display().to_string(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| write_err(dir, e))?;
    }
    fs::write(path, config.to_toml()?).map_err(|e| write_err(path, e))
}

/// The user config file, if a config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    Some(user_config_dir()?.join(USER_FILE))
}

/// `AMBRA_CONFIG_DIR` when set and non-empty, else `<platform config dir>/ambra`.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_VAR) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|dir| dir.join("ambra")),
    }
}

/// `Ok(None)` when nothing is at `path`.
fn read_layer(path: &Path) -> Result<Option<ClientConfig>> {
    if !path.is_file() {
        return Ok(None);
    }
    load_config_file(path).map(Some)
}
