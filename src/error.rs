//! Error types for template parsing

use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::scanner::ScanError;

/// What went wrong while compiling a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The scanner ran past the end of the buffer
    ScanOverflow,
    /// A close tag does not match the open section
    SectionCloseNameIncorrect,
    /// A tag was not terminated, or its name is malformed
    UnfinishedName,
    /// End of input while a section is still open
    ExpectedSectionEnd,
    InvalidSetDelimiter,
    TransformAppliedToInheritanceSection,
    IllegalTokenInsideInheritSection,
    InvalidConfigVariableSyntax,
    UnrecognisedConfigVariable,
}

impl ParseErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ParseErrorKind::ScanOverflow => "unexpected end of template",
            ParseErrorKind::SectionCloseNameIncorrect => {
                "close tag does not match the open section"
            }
            ParseErrorKind::UnfinishedName => "unfinished tag name",
            ParseErrorKind::ExpectedSectionEnd => "expected a section close tag",
            ParseErrorKind::InvalidSetDelimiter => "invalid set delimiter tag",
            ParseErrorKind::TransformAppliedToInheritanceSection => {
                "transforms cannot be applied to an inheritance block"
            }
            ParseErrorKind::IllegalTokenInsideInheritSection => {
                "only block definitions are allowed inside a parent tag"
            }
            ParseErrorKind::InvalidConfigVariableSyntax => "invalid configuration tag syntax",
            ParseErrorKind::UnrecognisedConfigVariable => "unrecognised configuration variable",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A fatal template compilation error with its position in the source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column}: {line_text}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset of the failure
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
    /// Text of the offending line, without its terminator
    pub line_text: String,
}

impl ParseError {
    /// Build an error for `offset`, deriving line and column from `source`
    pub fn new(kind: ParseErrorKind, source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }

        let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);

        Self {
            kind,
            offset,
            line: source[..line_start].matches('\n').count() + 1,
            column: source[line_start..offset].chars().count() + 1,
            line_text: source[line_start..line_end]
                .trim_end_matches('\r')
                .to_string(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let end = source[self.offset..]
            .chars()
            .next()
            .map_or(self.offset, |c| self.offset + c.len_utf8());

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, self.offset)
            .with_message(self.kind.message())
            .with_label(
                Label::new((filename, self.offset..end))
                    .with_message(format!(
                        "{} (line {}, column {})",
                        self.kind, self.line, self.column
                    ))
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl ScanError {
    pub(crate) fn into_parse_error(self, source: &str) -> ParseError {
        match self {
            ScanError::Overflow { offset } => {
                ParseError::new(ParseErrorKind::ScanOverflow, source, offset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_on_first_line() {
        let err = ParseError::new(ParseErrorKind::UnfinishedName, "ab{{c d}}", 5);
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 6);
        assert_eq!(err.line_text, "ab{{c d}}");
    }

    #[test]
    fn test_position_on_later_line() {
        let source = "first\r\nsecond {{/x}}\nthird";
        let offset = source.find("{{/x}}").unwrap();
        let err = ParseError::new(ParseErrorKind::SectionCloseNameIncorrect, source, offset);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 8);
        assert_eq!(err.line_text, "second {{/x}}");
    }

    #[test]
    fn test_position_at_end_of_input() {
        let source = "{{#a}}\nbody";
        let err = ParseError::new(ParseErrorKind::ExpectedSectionEnd, source, source.len());
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 5);
        assert_eq!(err.line_text, "body");
    }

    #[test]
    fn test_columns_count_characters() {
        let source = "éé{{";
        let err = ParseError::new(ParseErrorKind::UnfinishedName, source, 4);
        assert_eq!(err.column, 3);
    }

    #[test]
    fn test_display() {
        let err = ParseError::new(ParseErrorKind::UnfinishedName, "{{a b}}", 4);
        assert_eq!(
            err.to_string(),
            "unfinished tag name at line 1, column 5: {{a b}}"
        );
    }

    #[test]
    fn test_format_mentions_file_and_message() {
        let source = "{{#a}}\n{{/b}}\n";
        let err = ParseError::new(ParseErrorKind::SectionCloseNameIncorrect, source, 7);
        let report = err.format(source, "page.mustache");
        assert!(report.contains("page.mustache"));
        assert!(report.contains("close tag does not match the open section"));
    }
}
