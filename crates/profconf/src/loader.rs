//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, OutputFormat, ProfileConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided it replaces the local override. A CLI path
/// that does not exist is still returned so loading reports it.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/melody-profile/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("melody-profile/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("melody-profile.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Keys set by one config file. Unset keys leave earlier layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub delimiter: Option<u8>,
    pub key_column: Option<String>,
    pub pitches_column: Option<String>,
    pub id_column: Option<String>,
    pub format: Option<OutputFormat>,
    pub transposed: Option<bool>,
    pub log_level: Option<String>,
}

impl ConfigLayer {
    /// Overlay this layer onto `config`.
    pub fn apply(&self, config: &mut ProfileConfig) {
        if let Some(v) = self.delimiter {
            config.input.delimiter = v;
        }
        if let Some(v) = &self.key_column {
            config.input.key_column = v.clone();
        }
        if let Some(v) = &self.pitches_column {
            config.input.pitches_column = v.clone();
        }
        if let Some(v) = &self.id_column {
            config.input.id_column = Some(v.clone());
        }
        if let Some(v) = self.format {
            config.output.format = v;
        }
        if let Some(v) = self.transposed {
            config.output.transposed = v;
        }
        if let Some(v) = &self.log_level {
            config.logging.log_level = v.clone();
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    input: RawInput,
    #[serde(default)]
    output: RawOutput,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Debug, Default, Deserialize)]
struct RawInput {
    delimiter: Option<String>,
    key_column: Option<String>,
    pitches_column: Option<String>,
    id_column: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOutput {
    format: Option<String>,
    transposed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLogging {
    log_level: Option<String>,
}

/// Load a config layer from a TOML file.
pub fn load_from_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

/// Parse a config layer from TOML string.
pub(crate) fn parse_toml(contents: &str, path: &Path) -> Result<ConfigLayer, ConfigError> {
    let raw: RawConfig = toml::from_str(contents).map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let delimiter = raw
        .input
        .delimiter
        .as_deref()
        .map(|v| parse_delimiter("input.delimiter", v))
        .transpose()?;
    let format = raw
        .output
        .format
        .as_deref()
        .map(|v| parse_format("output.format", v))
        .transpose()?;

    Ok(ConfigLayer {
        delimiter,
        key_column: raw.input.key_column,
        pitches_column: raw.input.pitches_column,
        id_column: raw.input.id_column,
        format,
        transposed: raw.output.transposed,
        log_level: raw.logging.log_level,
    })
}

/// Parse a delimiter: `"tab"`, `"\t"`, or a single ASCII character.
pub fn parse_delimiter(key: &str, value: &str) -> Result<u8, ConfigError> {
    match value {
        "tab" | "\\t" | "\t" => return Ok(b'\t'),
        _ => {}
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' => {
            Ok(c as u8)
        }
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: format!("expected a single ASCII character or \"tab\", got {:?}", value),
        }),
    }
}

/// Inverse of [`parse_delimiter`], for writing config files.
pub fn format_delimiter(delimiter: u8) -> String {
    if delimiter == b'\t' {
        "tab".to_string()
    } else {
        (delimiter as char).to_string()
    }
}

fn parse_format(key: &str, value: &str) -> Result<OutputFormat, ConfigError> {
    OutputFormat::parse(value).ok_or_else(|| ConfigError::Invalid {
        key: key.to_string(),
        message: format!("expected \"csv\" or \"json\", got {:?}", value),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: format!("expected a boolean, got {:?}", value),
        }),
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(
    config: &mut ProfileConfig,
    sources: &mut ConfigSources,
) -> Result<(), ConfigError> {
    apply_env_overrides_from(config, sources, env::vars())
}

fn take<'a>(
    vars: &'a HashMap<String, String>,
    sources: &mut ConfigSources,
    name: &str,
) -> Option<&'a String> {
    let value = vars.get(name)?;
    sources.env_overrides.push(name.to_string());
    Some(value)
}

/// Apply overrides from an explicit set of variables.
///
/// Later entries in the fixed order below win: `RUST_LOG` beats
/// `MELODY_PROFILE_LOG_LEVEL`.
pub fn apply_env_overrides_from(
    config: &mut ProfileConfig,
    sources: &mut ConfigSources,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<(), ConfigError> {
    let vars: HashMap<String, String> = vars.into_iter().collect();
    let mut layer = ConfigLayer::default();

    if let Some(v) = take(&vars, sources, "MELODY_PROFILE_DELIMITER") {
        layer.delimiter = Some(parse_delimiter("MELODY_PROFILE_DELIMITER", v)?);
    }
    if let Some(v) = take(&vars, sources, "MELODY_PROFILE_KEY_COLUMN") {
        layer.key_column = Some(v.clone());
    }
    if let Some(v) = take(&vars, sources, "MELODY_PROFILE_PITCHES_COLUMN") {
        layer.pitches_column = Some(v.clone());
    }
    if let Some(v) = take(&vars, sources, "MELODY_PROFILE_ID_COLUMN") {
        layer.id_column = Some(v.clone());
    }
    if let Some(v) = take(&vars, sources, "MELODY_PROFILE_FORMAT") {
        layer.format = Some(parse_format("MELODY_PROFILE_FORMAT", v)?);
    }
    if let Some(v) = take(&vars, sources, "MELODY_PROFILE_TRANSPOSED") {
        layer.transposed = Some(parse_bool("MELODY_PROFILE_TRANSPOSED", v)?);
    }
    if let Some(v) = take(&vars, sources, "MELODY_PROFILE_LOG_LEVEL") {
        layer.log_level = Some(v.clone());
    }
    if let Some(v) = take(&vars, sources, "RUST_LOG") {
        layer.log_level = Some(v.clone());
    }

    layer.apply(config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_discover_config_files() {
        // Just verify it doesn't panic
        let _files = discover_config_files();
    }

    #[test]
    fn test_cli_path_is_always_listed() {
        let files = discover_config_files_with_override(Some(Path::new("/nonexistent/x.toml")));
        assert_eq!(files.last(), Some(&PathBuf::from("/nonexistent/x.toml")));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
[input]
key_column = "tonality"
"#;
        let layer = parse_toml(toml, Path::new("test.toml")).unwrap();
        assert_eq!(layer.key_column.as_deref(), Some("tonality"));
        assert_eq!(layer.delimiter, None);

        let mut config = ProfileConfig::default();
        layer.apply(&mut config);
        assert_eq!(config.input.key_column, "tonality");
        // Other values should be defaults
        assert_eq!(config.input.pitches_column, "spelled_pitches");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[input]
delimiter = ";"
key_column = "k"
pitches_column = "notes"
id_column = "signature"

[output]
format = "json"
transposed = false

[logging]
log_level = "debug"
"#;
        let layer = parse_toml(toml, Path::new("test.toml")).unwrap();
        let mut config = ProfileConfig::default();
        layer.apply(&mut config);

        assert_eq!(config.input.delimiter, b';');
        assert_eq!(config.input.key_column, "k");
        assert_eq!(config.input.pitches_column, "notes");
        assert_eq!(config.input.id_column.as_deref(), Some("signature"));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.output.transposed);
        assert_eq!(config.logging.log_level, "debug");
    }

    #[test]
    fn test_later_layers_win_per_key() {
        let first = parse_toml("[input]\nkey_column = \"a\"\nid_column = \"id\"\n", Path::new("1")).unwrap();
        let second = parse_toml("[input]\nkey_column = \"b\"\n", Path::new("2")).unwrap();

        let mut config = ProfileConfig::default();
        first.apply(&mut config);
        second.apply(&mut config);
        assert_eq!(config.input.key_column, "b");
        assert_eq!(config.input.id_column.as_deref(), Some("id"));
    }

    #[test]
    fn test_invalid_values() {
        let err = parse_toml("[input]\ndelimiter = \"::\"\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "input.delimiter"));

        let err = parse_toml("[output]\nformat = \"xml\"\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "output.format"));

        let err = parse_toml("[input\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_delimiter_forms() {
        assert_eq!(parse_delimiter("d", "tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter("d", "\\t").unwrap(), b'\t');
        assert_eq!(parse_delimiter("d", ",").unwrap(), b',');
        assert_eq!(parse_delimiter("d", "|").unwrap(), b'|');
        assert!(parse_delimiter("d", "").is_err());
        assert!(parse_delimiter("d", "é").is_err());
        assert_eq!(format_delimiter(b'\t'), "tab");
        assert_eq!(format_delimiter(b';'), ";");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ProfileConfig::default();
        let mut sources = ConfigSources::default();
        apply_env_overrides_from(
            &mut config,
            &mut sources,
            vars(&[
                ("MELODY_PROFILE_DELIMITER", "tab"),
                ("MELODY_PROFILE_FORMAT", "JSON"),
                ("MELODY_PROFILE_TRANSPOSED", "0"),
                ("MELODY_PROFILE_LOG_LEVEL", "warn"),
                ("RUST_LOG", "trace"),
                ("UNRELATED", "x"),
            ]),
        )
        .unwrap();

        assert_eq!(config.input.delimiter, b'\t');
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.output.transposed);
        assert_eq!(config.logging.log_level, "trace");
        assert_eq!(sources.env_overrides.len(), 5);
        assert!(!sources.env_overrides.contains(&"UNRELATED".to_string()));
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = ProfileConfig::default();
        let mut sources = ConfigSources::default();
        let err = apply_env_overrides_from(
            &mut config,
            &mut sources,
            vars(&[("MELODY_PROFILE_TRANSPOSED", "maybe")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(config.output.transposed);
    }
}
