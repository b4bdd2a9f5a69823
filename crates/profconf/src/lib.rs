//! Configuration loading for melody-profile.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/melody-profile/config.toml` (system)
//! 2. `~/.config/melody-profile/config.toml` (user)
//! 3. `./melody-profile.toml` (local override, replaced by `--config`)
//! 4. Environment variables (`MELODY_PROFILE_*`, `RUST_LOG`)
//!
//! Only keys present in a file override earlier layers.
//!
//! # Example Config
//!
//! ```toml
//! [input]
//! delimiter = "tab"
//! key_column = "key"
//! pitches_column = "spelled_pitches"
//! id_column = "id"
//!
//! [output]
//! format = "json"
//! transposed = true
//!
//! [logging]
//! log_level = "debug"
//! ```

pub mod loader;

pub use loader::{
    discover_config_files, discover_config_files_with_override, ConfigLayer, ConfigSources,
};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// How the corpus table is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Field delimiter byte. Written in files as a one-character string or `"tab"`.
    pub delimiter: u8,
    pub key_column: String,
    pub pitches_column: String,
    /// Column used to name pieces in logs and errors.
    pub id_column: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            key_column: "key".to_string(),
            pitches_column: "spelled_pitches".to_string(),
            id_column: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Write root-relative profiles (bin 0 = tonic) instead of absolute ones.
    pub transposed: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            transposed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string, e.g. `info` or `melody_profile=debug`.
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl ProfileConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load with an explicit config file in place of `./melody-profile.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = ProfileConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let layer = loader::load_from_file(&path)?;
            layer.apply(&mut config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources)?;

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# melody-profile configuration\n\n");

        output.push_str("[input]\n");
        output.push_str(&format!(
            "delimiter = {}\n",
            quoted(&loader::format_delimiter(self.input.delimiter))
        ));
        output.push_str(&format!("key_column = {}\n", quoted(&self.input.key_column)));
        output.push_str(&format!(
            "pitches_column = {}\n",
            quoted(&self.input.pitches_column)
        ));
        if let Some(id) = &self.input.id_column {
            output.push_str(&format!("id_column = {}\n", quoted(id)));
        }

        output.push_str("\n[output]\n");
        output.push_str(&format!("format = {}\n", quoted(self.output.format.as_str())));
        output.push_str(&format!("transposed = {}\n", self.output.transposed));

        output.push_str("\n[logging]\n");
        output.push_str(&format!("log_level = {}\n", quoted(&self.logging.log_level)));

        output
    }
}

/// A TOML string literal, escaped.
fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
