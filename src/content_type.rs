//! Content types: output escaping policies
//!
//! Every interpolated value passes through the escaper of the active content
//! type. The registry is an explicit value owned by a [`Library`] (or created
//! on the fly for standalone templates), so independent engines never share
//! escaping state.
//!
//! [`Library`]: crate::Library

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::{ConfigError, EngineConfig, EscapeTable};

/// An output escaping policy
pub trait ContentType: Send + Sync + fmt::Debug {
    fn escape(&self, text: &str) -> String;
}

/// Content type driven by a character replacement table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Escaper {
    table: EscapeTable,
}

impl Escaper {
    pub fn new(table: EscapeTable) -> Self {
        Self { table }
    }
}

impl ContentType for Escaper {
    fn escape(&self, text: &str) -> String {
        if self.table.is_empty() {
            return text.to_string();
        }
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            match self.table.get(&c) {
                Some(replacement) => escaped.push_str(replacement),
                None => escaped.push(c),
            }
        }
        escaped
    }
}

/// Registry of content types by id
#[derive(Debug, Clone)]
pub struct ContentTypes {
    types: HashMap<String, Arc<dyn ContentType>>,
    default_id: String,
}

impl ContentTypes {
    /// Build a registry from configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let types = config
            .content_types
            .iter()
            .map(|(id, table)| {
                let escaper: Arc<dyn ContentType> = Arc::new(Escaper::new(table.clone()));
                (id.clone(), escaper)
            })
            .collect::<HashMap<_, _>>();

        if !types.contains_key(&config.default_content_type) {
            return Err(ConfigError::UnknownDefault(
                config.default_content_type.clone(),
            ));
        }

        Ok(Self {
            types,
            default_id: config.default_content_type.clone(),
        })
    }

    /// Register (or replace) a content type
    pub fn register(&mut self, id: impl Into<String>, content_type: impl ContentType + 'static) {
        self.types.insert(id.into(), Arc::new(content_type));
    }

    pub fn get(&self, id: &str) -> Option<&dyn ContentType> {
        self.types.get(id).map(|ct| ct.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    /// Id of the content type every template starts with
    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    pub fn default_type(&self) -> &dyn ContentType {
        self.types[&self.default_id].as_ref()
    }

    /// Change the default content type
    pub fn set_default(&mut self, id: &str) -> Result<(), ConfigError> {
        if !self.contains(id) {
            return Err(ConfigError::UnknownDefault(id.to_string()));
        }
        self.default_id = id.to_string();
        Ok(())
    }
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
            .expect("Default config should produce a valid registry")
    }
}
