//! Configuration File Loading
//!
//! Finds, parses, validates and saves configuration files. TOML is the
//! default format; JSON is accepted for files ending in `.json`.

use super::Config;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "PAGOLATERM_CONFIG";

/// Configuration file loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Directories searched for `config.toml` / `config.json`
    search_paths: Vec<PathBuf>,
    /// Path of the last successfully loaded file
    current_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension, defaulting to TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

impl ConfigLoader {
    /// Create a loader with the default search paths
    pub fn new() -> Self {
        Self::with_search_paths(Self::default_search_paths())
    }

    /// Create a loader searching only `search_paths`
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            current_path: None,
        }
    }

    /// Load configuration from `$PAGOLATERM_CONFIG` or the default search
    /// paths, falling back to defaults when nothing is found.
    pub fn load() -> Result<Config> {
        if let Ok(explicit) = env::var(CONFIG_ENV_VAR) {
            return Self::load_from_path(Path::new(&explicit));
        }

        let mut loader = Self::new();
        match loader.find_and_load()? {
            Some(config) => Ok(config),
            None => {
                warn!("No configuration file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Load and validate one specific file
    pub fn load_from_path(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(Error::ConfigNotFound);
        }

        let config = Self::load_config_file(path, ConfigFormat::from_path(path))?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Search the configured paths; `Ok(None)` when no file exists
    pub fn find_and_load(&mut self) -> Result<Option<Config>> {
        for dir in &self.search_paths {
            for format in [ConfigFormat::Toml, ConfigFormat::Json] {
                let path = dir.join("config").with_extension(format.extension());
                if !path.exists() {
                    continue;
                }

                match Self::load_config_file(&path, format).and_then(|c| c.validate().map(|_| c)) {
                    Ok(config) => {
                        info!("Configuration loaded from {}", path.display());
                        self.current_path = Some(path);
                        return Ok(Some(config));
                    }
                    Err(e) => {
                        // Keep searching; a broken file should not hide a good one
                        warn!("Skipping config {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(None)
    }

    /// Path of the file loaded by [`find_and_load`](Self::find_and_load)
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Save configuration; the format follows the file extension
    pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let format = ConfigFormat::from_path(path);
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| {
                Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                }
            })?,
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })?
            }
        };

        fs::write(path, content)?;
        Ok(())
    }

    fn load_config_file(path: &Path, format: ConfigFormat) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        match format {
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                format: format.name().to_string(),
                reason: e.to_string(),
            }),
            ConfigFormat::Json => {
                serde_json::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("pagolaterm"));
        }

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("pagolaterm"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".pagolaterm"));
        }

        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join(".pagolaterm"));
        }

        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
