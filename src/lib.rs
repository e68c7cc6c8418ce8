//! Mustachio - a logic-less Mustache template engine
//!
//! Templates are compiled once into a token tree and rendered against a
//! [`Value`]. Partials, parents and dynamic partials resolve through a
//! [`Library`]; output escaping is driven by a [`ContentTypes`] registry.
//!
//! # Example
//!
//! ```rust
//! use mustachio::{render, Value};
//!
//! let data = Value::from_json_str(r#"{"name": "Tom & Jerry"}"#).unwrap();
//! assert_eq!(render("Hi {{name}}", &data).unwrap(), "Hi Tom &amp; Jerry");
//! ```

pub mod config;
pub mod content_type;
pub mod error;
pub mod library;
pub mod parser;
pub mod renderer;
pub mod template;
pub mod value;

pub use config::{ConfigError, EngineConfig};
pub use content_type::{ContentType, ContentTypes, Escaper};
pub use error::{ParseError, ParseErrorKind};
pub use library::{Library, LibraryError};
pub use template::Template;
pub use value::{DataError, DataFormat, Lambda, Object, Value};

/// Compile and render a template in one step
///
/// # Example
///
/// ```rust
/// use mustachio::{render, Value};
///
/// let data: Value = [("items", vec!["a", "b", "c"])].into_iter().collect();
/// let output = render("{{#items}}{{.}}{{^last()}}, {{/last()}}{{/items}}", &data).unwrap();
/// assert_eq!(output, "a, b, c");
/// ```
pub fn render(source: &str, data: &Value) -> Result<String, ParseError> {
    Ok(Template::new(source)?.render(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_escapes_by_default() {
        let data: Value = [("x", "A&B")].into_iter().collect();
        assert_eq!(render("{{x}}", &data).unwrap(), "A&amp;B");
        assert_eq!(render("{{{x}}}", &data).unwrap(), "A&B");
        assert_eq!(render("{{&x}}", &data).unwrap(), "A&B");
    }

    #[test]
    fn test_render_reports_parse_errors() {
        let err = render("line one\n{{#a}}{{/b}}", &Value::Null).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::SectionCloseNameIncorrect);
        assert_eq!(err.line, 2);
    }
}
