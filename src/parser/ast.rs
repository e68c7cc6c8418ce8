//! Abstract syntax tree for compiled templates

use std::collections::HashMap;

/// A compiled template body
pub type TokenTree = Vec<Token>;

/// Block overrides collected from a parent tag, keyed by block name
pub type Overrides = HashMap<String, TokenTree>;

/// Tag delimiters, `{{` and `}}` unless changed with a set-delimiter tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub start: String,
    pub end: String,
}

impl Delimiters {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

/// A variable name together with the transforms applied to it
///
/// `reversed(sorted(items))` has the name `items` and the transforms
/// `["sorted", "reversed"]`, innermost first, which is also the order in
/// which they are applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagExpression {
    pub name: String,
    pub transforms: Vec<String>,
}

impl TagExpression {
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transforms: Vec::new(),
        }
    }
}

/// A section body together with the source it was compiled from
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBody {
    pub tokens: TokenTree,
    /// Unparsed body text, handed to section lambdas
    pub raw: String,
    /// Delimiters active at the section, used to re-parse lambda output
    pub delimiters: Delimiters,
}

/// A node of the compiled template
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Text(String),
    Variable(TagExpression),
    UnescapedVariable(TagExpression),
    Section {
        expr: TagExpression,
        body: SectionBody,
    },
    InvertedSection {
        expr: TagExpression,
        body: SectionBody,
    },
    /// `{{$name}}` directly inside a parent tag: an override
    BlockDefinition {
        name: String,
        body: TokenTree,
    },
    /// `{{$name}}` anywhere else: a block with default content
    BlockExpansion {
        name: String,
        default: TokenTree,
        indentation: Option<String>,
    },
    /// `{{>name}}`, or `{{<name}}...{{/name}}` when `overrides` is set
    Partial {
        name: String,
        indentation: Option<String>,
        overrides: Option<Overrides>,
    },
    /// `{{>*name}}` or `{{<*name}}...{{/*name}}`
    DynamicPartial {
        name: String,
        indentation: Option<String>,
        overrides: Option<Overrides>,
    },
    /// `{{%CONTENT_TYPE: id}}`
    ContentTypePragma(String),
}

impl Token {
    /// True for text made only of whitespace
    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, Token::Text(text) if text.chars().all(char::is_whitespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delimiters() {
        let delimiters = Delimiters::default();
        assert_eq!(delimiters.start, "{{");
        assert_eq!(delimiters.end, "}}");
    }

    #[test]
    fn test_whitespace_text() {
        assert!(Token::Text(" \t\n".to_string()).is_whitespace_text());
        assert!(!Token::Text(" x ".to_string()).is_whitespace_text());
        assert!(!Token::Variable(TagExpression::variable("x")).is_whitespace_text());
    }
}
