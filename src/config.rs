//! Engine configuration
//!
//! Content types are escape tables mapping single characters to replacement
//! text. The built-in `TEXT` and `HTML` types come from an embedded default
//! configuration; a TOML file can override them, add new ones and pick the
//! default content type.
//!
//! ```toml
//! default_content_type = "XML"
//!
//! [content_types.XML]
//! "&" = "&amp;"
//! "<" = "&lt;"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("escape key {key:?} of content type '{content_type}' must be a single character")]
    InvalidEscapeKey { content_type: String, key: String },
    #[error("default content type '{0}' is not defined")]
    UnknownDefault(String),
}

/// Escape table of one content type: character -> replacement
pub type EscapeTable = BTreeMap<char, String>;

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Content type used at the start of every template and partial
    pub default_content_type: String,
    /// Escape tables by content type id
    pub content_types: BTreeMap<String, EscapeTable>,
}

/// TOML structure for deserializing configuration
#[derive(Deserialize)]
struct TomlConfig {
    default_content_type: Option<String>,
    #[serde(default)]
    content_types: BTreeMap<String, BTreeMap<String, String>>,
}

const DEFAULT_CONFIG: &str = r##"
default_content_type = "HTML"

# Output verbatim
[content_types.TEXT]

[content_types.HTML]
"&" = "&amp;"
"<" = "&lt;"
">" = "&gt;"
'"' = "&quot;"
"'" = "&#39;"
"##;

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string, layered over the defaults
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge(parse_toml(content)?)?;
        Ok(config)
    }

    fn merge(&mut self, parsed: TomlConfig) -> Result<(), ConfigError> {
        for (id, table) in parsed.content_types {
            let table = escape_table(&id, table)?;
            self.content_types.insert(id, table);
        }
        if let Some(default) = parsed.default_content_type {
            self.default_content_type = default;
        }
        if !self.content_types.contains_key(&self.default_content_type) {
            return Err(ConfigError::UnknownDefault(
                self.default_content_type.clone(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let parsed = parse_toml(DEFAULT_CONFIG).expect("Default config should be valid TOML");
        let mut config = EngineConfig {
            default_content_type: String::new(),
            content_types: BTreeMap::new(),
        };
        config
            .merge(parsed)
            .expect("Default config should define its default content type");
        config
    }
}

fn parse_toml(content: &str) -> Result<TomlConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

fn escape_table(
    content_type: &str,
    table: BTreeMap<String, String>,
) -> Result<EscapeTable, ConfigError> {
    table
        .into_iter()
        .map(|(key, replacement)| {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok((c, replacement)),
                _ => Err(ConfigError::InvalidEscapeKey {
                    content_type: content_type.to_string(),
                    key,
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.default_content_type, "HTML");
        assert!(config.content_types["TEXT"].is_empty());
        let html = &config.content_types["HTML"];
        assert_eq!(html.get(&'&').map(String::as_str), Some("&amp;"));
        assert_eq!(html.get(&'"').map(String::as_str), Some("&quot;"));
        assert_eq!(html.len(), 5);
    }

    #[test]
    fn test_add_content_type() {
        let config = EngineConfig::from_str(
            r#"
[content_types.LATEX]
"%" = "\\%"
"&" = "\\&"
"#,
        )
        .expect("Should parse");
        assert_eq!(config.default_content_type, "HTML");
        assert!(config.content_types.contains_key("HTML"));
        assert_eq!(
            config.content_types["LATEX"].get(&'%').map(String::as_str),
            Some("\\%")
        );
    }

    #[test]
    fn test_change_default() {
        let config = EngineConfig::from_str(r#"default_content_type = "TEXT""#).expect("Should parse");
        assert_eq!(config.default_content_type, "TEXT");
    }

    #[test]
    fn test_unknown_default_is_rejected() {
        let result = EngineConfig::from_str(r#"default_content_type = "YAML""#);
        assert!(matches!(result, Err(ConfigError::UnknownDefault(id)) if id == "YAML"));
    }

    #[test]
    fn test_multi_character_key_is_rejected() {
        let result = EngineConfig::from_str(
            r#"
[content_types.BAD]
"ab" = "x"
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidEscapeKey { .. })));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = EngineConfig::from_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
