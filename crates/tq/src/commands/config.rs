//! The tq settings file and the `config` subcommands.
//!
//! The file renames the document attributes fields are read from and names
//! an interactions file for `my:` terms when `--interactions` is not given.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tag_query_rs::FieldTable;

use super::{CommandContext, CommandError, Result};

/// Schema version written by this build of tq.
const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TQ_CONFIG";

/// Settings read from `config.toml`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Schema version; absent means current.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Interactions file used when `--interactions` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactions: Option<PathBuf>,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Field to attribute overrides, e.g. `tags = "tags"`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            interactions: None,
            output: OutputConfig::default(),
            attributes: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Builds the field table with this config's attribute overrides.
    pub fn field_table(&self) -> FieldTable {
        for field in self.attributes.keys() {
            if FieldTable::new().kind(field).is_none() {
                tracing::warn!(field = %field, "ignoring attribute override for unknown field");
            }
        }
        FieldTable::new().with_attributes(&self.attributes)
    }

    /// Whether colored output is allowed by the config.
    pub fn colors_enabled(&self) -> bool {
        self.output.color.unwrap_or(true)
    }
}

/// `[output]` table.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// `false` turns colored tables off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// `$XDG_CONFIG_HOME/tq`, else `~/.config/tq`.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("tq"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("tq"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Resolves `config.toml`, honouring `TQ_CONFIG`.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Reads attribute overrides and the interactions path from disk.
///
/// A missing file yields the defaults.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    tracing::debug!(path = %path.display(), version = config.version, "loaded config");
    migrate_config(config)
}

/// Stamps the current schema version, warning on files from a newer tq.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        tracing::warn!(
            version = config.version,
            supported = CONFIG_VERSION,
            "config was written by a newer tq"
        );
    }
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Prints the settings and the effective field to attribute table.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let table = config.field_table();
        let attributes: BTreeMap<&str, &str> = table.attributes().collect();
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
            "attributes": attributes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors && config.colors_enabled() {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        println!("Settings:");
        if let Some(ref interactions) = config.interactions {
            println!("  interactions: {}", interactions.display());
        }

        println!("\n[output]");
        if let Some(color) = config.output.color {
            println!("  color: {}", color);
        }

        println!("\n[attributes]");
        for (field, attribute) in config.field_table().attributes() {
            let marker = if config.attributes.contains_key(field) {
                " (override)"
            } else {
                ""
            };
            println!("  {field}: {attribute}{marker}");
        }
    }

    Ok(())
}

/// Prints where tq looks for its settings file.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::TempDir;

    /// Points `TQ_CONFIG` at `path` for the duration of `f`.
    fn with_config_env<T>(path: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let original = env::var(CONFIG_ENV).ok();
        env::set_var(CONFIG_ENV, path);
        let result = f();
        match original {
            Some(val) => env::set_var(CONFIG_ENV, val),
            None => env::remove_var(CONFIG_ENV),
        }
        result
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.interactions.is_none());
        assert!(config.output.color.is_none());
        assert!(config.attributes.is_empty());
        assert!(config.colors_enabled());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
version = 1
interactions = "/tmp/interactions.json"

[output]
color = false

[attributes]
tags = "tags"
id = "id"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(
            config.interactions,
            Some(PathBuf::from("/tmp/interactions.json"))
        );
        assert_eq!(config.output.color, Some(false));
        assert!(!config.colors_enabled());

        let table = config.field_table();
        assert_eq!(table.attribute("tags"), Some("tags"));
        assert_eq!(table.id_attribute(), Some("id"));
        assert_eq!(table.attribute("score"), Some("data-score"));
    }

    #[test]
    fn test_config_deserialization_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.attributes.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.output.color = Some(true);
        config
            .attributes
            .insert("tags".to_string(), "tags".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("version = 1"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("color = true"));
        assert!(toml_str.contains("[attributes]"));
    }

    #[test]
    fn test_unknown_attribute_override_is_ignored() {
        let mut config = Config::default();
        config
            .attributes
            .insert("favourites".to_string(), "data-favs".to_string());
        let table = config.field_table();
        assert_eq!(table, FieldTable::new());
    }

    #[test]
    fn test_migrate_config_sets_current_version() {
        let config = Config {
            version: 99,
            ..Config::default()
        };
        let migrated = migrate_config(config).unwrap();
        assert_eq!(migrated.version, CONFIG_VERSION);
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        let resolved = with_config_env(&path, get_config_path).unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    #[serial]
    fn test_load_config_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");
        let config = with_config_env(&path, load_config).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.interactions.is_none());
    }

    #[test]
    #[serial]
    fn test_load_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[attributes]\nscore = \"score\"").unwrap();

        let config = with_config_env(&path, load_config).unwrap();
        assert_eq!(config.field_table().attribute("score"), Some("score"));
    }

    #[test]
    #[serial]
    fn test_load_config_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "version = [").unwrap();

        let err = with_config_env(&path, load_config).unwrap_err();
        assert!(matches!(err, CommandError::Config(_)));
    }
}
