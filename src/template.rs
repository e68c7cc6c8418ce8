//! Compiled templates

use crate::content_type::ContentTypes;
use crate::error::ParseError;
use crate::library::Library;
use crate::parser::{parse, Token, TokenTree};
use crate::renderer::{render_tokens, RenderContext};
use crate::value::Value;

/// A template compiled once and rendered any number of times
///
/// The token tree is immutable after compilation, so a template can be
/// rendered from several threads at once.
#[derive(Debug, Clone)]
pub struct Template {
    tokens: TokenTree,
    content_types: ContentTypes,
}

impl Template {
    /// Compile a template with the built-in content types
    ///
    /// # Example
    ///
    /// ```rust
    /// use mustachio::{Template, Value};
    ///
    /// let template = Template::new("Hello {{name}}!").unwrap();
    /// let data: Value = [("name", "World")].into_iter().collect();
    /// assert_eq!(template.render(&data), "Hello World!");
    /// ```
    pub fn new(source: &str) -> Result<Self, ParseError> {
        Self::with_content_types(source, &ContentTypes::default())
    }

    /// Compile a template against a content type registry
    ///
    /// `{{%CONTENT_TYPE: id}}` pragmas are checked against `content_types`,
    /// which is also used when the template is rendered on its own.
    pub fn with_content_types(source: &str, content_types: &ContentTypes) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: parse(source, content_types)?,
            content_types: content_types.clone(),
        })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Render without partials
    pub fn render(&self, data: &Value) -> String {
        let context = RenderContext::new(data, &self.content_types, None);
        render_tokens(&self.tokens, &context)
    }

    /// Render, resolving partials and parents in `library`
    pub fn render_with(&self, data: &Value, library: &Library) -> String {
        let context = RenderContext::new(data, library.content_types(), Some(library));
        render_tokens(&self.tokens, &context)
    }
}
