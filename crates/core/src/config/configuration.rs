//! Layered key/value configuration.
//!
//! Keys are `:`-separated section paths and compare case-insensitively
//! (`Jwt:Key` and `jwt:key` are the same key). Layers are applied in the order
//! they are added to the [`ConfigurationBuilder`]; a later layer overrides an
//! earlier one key by key.

use crate::config::ConfigError;
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Section separator used in configuration keys
pub const KEY_DELIMITER: &str = ":";

/// Separator used in environment variable names in place of `:`
pub const ENV_DELIMITER: &str = "__";

/// Default prefix for environment variables read by the host
pub const ENV_PREFIX: &str = "RYM__";

/// Layer a configuration value was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Environment variable name
    EnvVar(String),
    /// Settings file path or label
    File(String),
    /// Set in code through [`ConfigurationBuilder::set`]
    Programmatic,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::EnvVar(name) => write!(f, "env {}", name),
            ConfigSource::File(path) => write!(f, "file {}", path),
            ConfigSource::Programmatic => f.write_str("code"),
        }
    }
}

#[derive(Debug, Clone)]
struct ConfigEntry {
    value: String,
    source: ConfigSource,
}

/// Read-only configuration handle
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    values: BTreeMap<String, ConfigEntry>,
}

impl Configuration {
    /// Start building a configuration
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// A configuration without any keys
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a raw value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(|entry| entry.value.as_str())
    }

    /// Get a value or fall back to a default
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Get a value parsed into `T`; `Ok(None)` when the key is absent
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
                ConfigError::invalid_value(key, raw, format!("{} ({})", std::any::type_name::<T>(), e))
            }),
        }
    }

    /// Get a value that must be present and non-empty
    pub fn require(&self, key: &str, hint: &str) -> Result<&str, ConfigError> {
        match self.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::missing_required(key, hint)),
        }
    }

    /// Where a key's current value came from
    pub fn source(&self, key: &str) -> Option<&ConfigSource> {
        self.values.get(&normalize_key(key)).map(|entry| &entry.source)
    }

    /// Sub-configuration rooted at `name`, with the section prefix stripped
    pub fn section(&self, name: &str) -> Configuration {
        let prefix = format!("{}{}", normalize_key(name), KEY_DELIMITER);
        let values = self
            .values
            .iter()
            .filter_map(|(key, entry)| {
                key.strip_prefix(&prefix)
                    .map(|rest| (rest.to_string(), entry.clone()))
            })
            .collect();
        Configuration { values }
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(&normalize_key(key))
    }

    /// All keys, normalized and sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builder applying configuration layers in order
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    values: BTreeMap<String, ConfigEntry>,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single value
    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value.into(), ConfigSource::Programmatic);
        self
    }

    /// Layer a YAML settings file. A missing optional file is skipped.
    pub fn add_yaml_file(self, path: impl AsRef<Path>, optional: bool) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        if optional && !path.exists() {
            tracing::debug!(path = %shown, "Optional settings file not found, skipping");
            return Ok(self);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: shown.clone(),
            source,
        })?;

        self.add_yaml_str(&content, &shown)
    }

    /// Layer YAML content; `origin` is recorded as the value source
    pub fn add_yaml_str(mut self, content: &str, origin: &str) -> Result<Self, ConfigError> {
        let document: YamlValue =
            serde_yaml::from_str(content).map_err(|source| ConfigError::FileParse {
                path: origin.to_string(),
                source,
            })?;

        let mut flattened = Vec::new();
        flatten_yaml("", &document, &mut flattened);

        for (key, value) in flattened {
            self.insert(&key, value, ConfigSource::File(origin.to_string()));
        }
        Ok(self)
    }

    /// Layer the process environment variables starting with `prefix`
    pub fn add_env_vars(self, prefix: &str) -> Self {
        self.add_env_pairs(std::env::vars(), prefix)
    }

    /// Layer explicit `(name, value)` pairs as if they were environment variables
    pub fn add_env_pairs<I, K, V>(mut self, vars: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in vars {
            let name = name.as_ref();
            let Some(stripped) = strip_prefix_ignore_case(name, prefix) else {
                continue;
            };
            if stripped.is_empty() {
                continue;
            }
            let key = stripped.replace(ENV_DELIMITER, KEY_DELIMITER);
            self.insert(&key, value.into(), ConfigSource::EnvVar(name.to_string()));
        }
        self
    }

    pub fn build(self) -> Configuration {
        Configuration {
            values: self.values,
        }
    }

    fn insert(&mut self, key: &str, value: String, source: ConfigSource) {
        let key = normalize_key(key);
        if let Some(previous) = self.values.get(&key) {
            tracing::trace!(key = %key, from = %previous.source, to = %source, "Configuration value overridden");
        }
        self.values.insert(key, ConfigEntry { value, source });
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    match name.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&name[prefix.len()..]),
        _ => None,
    }
}

fn join_key(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}{}{}", prefix, KEY_DELIMITER, segment)
    }
}

/// Flatten nested mappings into `a:b:c` keys; sequence items get their index
fn flatten_yaml(prefix: &str, value: &YamlValue, out: &mut Vec<(String, String)>) {
    match value {
        YamlValue::Mapping(map) => {
            for (k, v) in map {
                let segment = match k {
                    YamlValue::String(s) => s.clone(),
                    other => scalar_to_string(other),
                };
                flatten_yaml(&join_key(prefix, &segment), v, out);
            }
        }
        YamlValue::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_yaml(&join_key(prefix, &index.to_string()), item, out);
            }
        }
        YamlValue::Tagged(tagged) => flatten_yaml(prefix, &tagged.value, out),
        scalar => {
            if !prefix.is_empty() {
                out.push((prefix.to_string(), scalar_to_string(scalar)));
            }
        }
    }
}

fn scalar_to_string(value: &YamlValue) -> String {
    match value {
        YamlValue::Null => String::new(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SETTINGS: &str = r#"
Jwt:
  Key: "file-secret"
  Issuer: rym
Server:
  Port: 5000
ConnectionStrings:
  DefaultConnection: "Server=localhost;Database=rym"
Cors:
  Origins:
    - http://localhost:3000
    - http://localhost:3001
"#;

    #[test]
    fn test_yaml_is_flattened_with_case_insensitive_keys() {
        let config = Configuration::builder()
            .add_yaml_str(SETTINGS, "appsettings.yaml")
            .unwrap()
            .build();

        assert_eq!(config.get("jwt:key"), Some("file-secret"));
        assert_eq!(config.get("JWT:ISSUER"), Some("rym"));
        assert_eq!(config.get("cors:origins:1"), Some("http://localhost:3001"));
        assert_eq!(config.get_parsed::<u16>("server:port").unwrap(), Some(5000));
        assert_eq!(
            config.source("jwt:key"),
            Some(&ConfigSource::File("appsettings.yaml".to_string()))
        );
    }

    #[test]
    fn test_env_layer_overrides_file_layer() {
        let config = Configuration::builder()
            .add_yaml_str(SETTINGS, "appsettings.yaml")
            .unwrap()
            .add_env_pairs(
                vec![
                    ("RYM__JWT__KEY", "env-secret"),
                    ("PATH", "/usr/bin"),
                    ("RYM__", "ignored"),
                ],
                ENV_PREFIX,
            )
            .build();

        assert_eq!(config.get("jwt:key"), Some("env-secret"));
        assert_eq!(
            config.source("jwt:key"),
            Some(&ConfigSource::EnvVar("RYM__JWT__KEY".to_string()))
        );
        assert_eq!(config.source("jwt:key").unwrap().to_string(), "env RYM__JWT__KEY");
        assert!(!config.contains("path"));
        assert_eq!(config.get("jwt:issuer"), Some("rym"));
    }

    #[test]
    fn test_section_strips_prefix() {
        let config = Configuration::builder()
            .add_yaml_str(SETTINGS, "appsettings.yaml")
            .unwrap()
            .build();

        let jwt = config.section("Jwt");
        assert_eq!(jwt.len(), 2);
        assert_eq!(jwt.get("key"), Some("file-secret"));
        assert!(config.section("missing").is_empty());
    }

    #[test]
    fn test_require_and_parse_errors() {
        let config = Configuration::builder()
            .set("server:port", "not-a-port")
            .set("jwt:key", "  ")
            .build();

        assert!(config.get_parsed::<u16>("server:port").is_err());
        assert!(config.require("jwt:key", "set a key").is_err());
        assert!(config.require("jwt:issuer", "set an issuer").is_err());
        assert_eq!(config.get_or("server:host", "0.0.0.0"), "0.0.0.0");
    }

    #[test]
    fn test_optional_file_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("appsettings.development.yaml");
        let builder = Configuration::builder().add_yaml_file(&missing, true).unwrap();
        assert!(builder.build().is_empty());

        assert!(Configuration::builder().add_yaml_file(&missing, false).is_err());

        let present = dir.path().join("appsettings.yaml");
        let mut file = std::fs::File::create(&present).unwrap();
        file.write_all(b"Server:\n  Host: 127.0.0.1\n").unwrap();

        let config = Configuration::builder()
            .add_yaml_file(&present, true)
            .unwrap()
            .build();
        assert_eq!(config.get("server:host"), Some("127.0.0.1"));
        assert!(matches!(
            config.source("server:host"),
            Some(ConfigSource::File(path)) if path.ends_with("appsettings.yaml")
        ));
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let result = Configuration::builder().add_yaml_str("Jwt: [unclosed", "broken.yaml");
        assert!(matches!(result, Err(ConfigError::FileParse { .. })));
    }
}
