//! Template library for resolving partials and parents by name

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::content_type::ContentTypes;
use crate::error::ParseError;
use crate::template::Template;
use crate::value::Value;

/// Errors that can occur while loading templates into a library
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The template file could not be read
    #[error("error reading template file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The template failed to compile
    #[error("error compiling template '{name}': {source}")]
    Parse { name: String, source: ParseError },
}

/// A name to template mapping
///
/// Build the library before rendering from it: registration takes `&mut self`
/// and rendering only needs `&self`.
#[derive(Debug, Clone, Default)]
pub struct Library {
    templates: HashMap<String, Template>,
    content_types: ContentTypes,
}

impl Library {
    /// Create an empty library with the built-in content types
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty library whose content types come from `config`
    pub fn with_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            templates: HashMap::new(),
            content_types: ContentTypes::from_config(config)?,
        })
    }

    /// Register a compiled template, replacing any template of the same name
    pub fn register(&mut self, name: impl Into<String>, template: Template) {
        let name = name.into();
        debug!(template = name.as_str(), "registered template");
        self.templates.insert(name, template);
    }

    /// Compile `source` with this library's content types and register it
    pub fn register_source(&mut self, name: impl Into<String>, source: &str) -> Result<(), ParseError> {
        let template = Template::with_content_types(source, &self.content_types)?;
        self.register(name, template);
        Ok(())
    }

    /// Load a template file, registering it under its file stem
    ///
    /// `partials/header.mustache` is registered as `header`.
    pub fn register_file(&mut self, path: &Path) -> Result<(), LibraryError> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = std::fs::read_to_string(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.register_source(name.clone(), &source)
            .map_err(|source| LibraryError::Parse { name, source })
    }

    /// Load several template files, skipping the ones that fail
    ///
    /// Returns the number of templates registered.
    pub fn register_files<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut registered = 0;
        for path in paths {
            match self.register_file(path.as_ref()) {
                Ok(()) => registered += 1,
                Err(err) => warn!(error = %err, "skipping template"),
            }
        }
        registered
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Names of all registered templates
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|s| s.as_str())
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Render the template registered as `name`, `None` if there is none
    pub fn render(&self, name: &str, data: &Value) -> Option<String> {
        Some(self.get(name)?.render_with(data, self))
    }
}
