//! Template parser
//!
//! A single recursive pass over the source: text is split into line-sized
//! `Text` tokens, tags are dispatched on their sigil and every section body
//! is compiled by a nested call that returns when it meets its close tag.
//!
//! Structural tags that sit alone on their line (standalone tags) swallow
//! the line's indentation and terminator. Interpolations never do.

use std::collections::HashMap;

use crate::content_type::ContentTypes;
use crate::error::{ParseError, ParseErrorKind};
use crate::parser::ast::{Delimiters, Overrides, SectionBody, TagExpression, Token, TokenTree};
use crate::parser::grammar::parse_tag_expression;
use crate::parser::scanner::{ScanError, Scanner};

/// Compile template source into a token tree
pub fn parse(source: &str, content_types: &ContentTypes) -> Result<TokenTree, ParseError> {
    parse_with_delimiters(source, Delimiters::default(), content_types)
}

/// Compile template source starting from the given delimiters
pub fn parse_with_delimiters(
    source: &str,
    delimiters: Delimiters,
    content_types: &ContentTypes,
) -> Result<TokenTree, ParseError> {
    let mut parser = TemplateParser {
        scanner: Scanner::new(source),
        content_types,
    };
    let state = ParserState {
        section: None,
        at_line_start: true,
        delimiters,
    };
    Ok(parser.parse_tokens(state)?.tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Section,
    Inverted,
    Block,
    Parent,
}

#[derive(Debug, Clone)]
struct OpenSection {
    name: String,
    transforms: Vec<String>,
    kind: SectionKind,
}

#[derive(Debug, Clone)]
struct ParserState {
    section: Option<OpenSection>,
    at_line_start: bool,
    delimiters: Delimiters,
}

impl ParserState {
    fn open(&self, name: &str, transforms: &[String], kind: SectionKind, at_line_start: bool) -> Self {
        Self {
            section: Some(OpenSection {
                name: name.to_string(),
                transforms: transforms.to_vec(),
                kind,
            }),
            at_line_start,
            delimiters: self.delimiters.clone(),
        }
    }

    fn inside_parent(&self) -> bool {
        matches!(&self.section, Some(open) if open.kind == SectionKind::Parent)
    }
}

/// Tokens of a section body, returned when its close tag is reached
struct Body {
    tokens: TokenTree,
    /// Offset of the close tag's start delimiter
    end: usize,
    /// Whether the close tag was standalone
    closed_standalone: bool,
}

struct TemplateParser<'s, 'c> {
    scanner: Scanner<'s>,
    content_types: &'c ContentTypes,
}

impl<'s, 'c> TemplateParser<'s, 'c> {
    fn parse_tokens(&mut self, mut state: ParserState) -> Result<Body, ParseError> {
        let mut tokens = Vec::new();
        let mut whitespace = String::new();

        while !self.scanner.at_end() {
            if state.at_line_start {
                whitespace = self.scanner.read_while(is_inline_space).to_string();
            }

            let text = self.read_text(&state.delimiters.start)?;

            if self.scanner.current() == Some('\n') {
                self.advance()?;
                tokens.push(Token::Text(format!("{whitespace}{text}\n")));
                whitespace.clear();
                state.at_line_start = true;
                continue;
            }

            if !text.is_empty() {
                tokens.push(Token::Text(format!("{whitespace}{text}")));
                whitespace.clear();
                state.at_line_start = false;
            }

            if self.scanner.at_end() {
                if !whitespace.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut whitespace)));
                }
                break;
            }

            let tag_start = self.scanner.offset();
            self.scanner.read_literal(&state.delimiters.start);

            let standalone = match self.scanner.current() {
                Some(sigil @ ('#' | '^')) => {
                    self.advance()?;
                    let expr = self.parse_expression(&state.delimiters.end)?;
                    let standalone = self.is_standalone(&state);
                    if standalone {
                        whitespace.clear();
                    } else {
                        flush(&mut tokens, &mut whitespace);
                    }
                    let kind = if sigil == '#' {
                        SectionKind::Section
                    } else {
                        SectionKind::Inverted
                    };
                    let body_start = self.scanner.offset();
                    let body = self.parse_tokens(state.open(
                        &expr.name,
                        &expr.transforms,
                        kind,
                        standalone,
                    ))?;
                    let section = SectionBody {
                        tokens: body.tokens,
                        raw: self.scanner.source()[body_start..body.end].to_string(),
                        delimiters: state.delimiters.clone(),
                    };
                    tokens.push(match kind {
                        SectionKind::Section => Token::Section {
                            expr,
                            body: section,
                        },
                        _ => Token::InvertedSection {
                            expr,
                            body: section,
                        },
                    });
                    body.closed_standalone
                }

                Some('$') => {
                    self.advance()?;
                    let expr = self.parse_expression(&state.delimiters.end)?;
                    if !expr.transforms.is_empty() {
                        return Err(self.error(
                            ParseErrorKind::TransformAppliedToInheritanceSection,
                            tag_start,
                        ));
                    }
                    let standalone = self.is_standalone(&state);
                    let indentation = if standalone {
                        Some(std::mem::take(&mut whitespace)).filter(|w| !w.is_empty())
                    } else {
                        flush(&mut tokens, &mut whitespace);
                        None
                    };
                    let inside_parent = state.inside_parent();
                    let body = self.parse_tokens(state.open(
                        &expr.name,
                        &[],
                        SectionKind::Block,
                        standalone,
                    ))?;
                    tokens.push(if inside_parent {
                        Token::BlockDefinition {
                            name: expr.name,
                            body: body.tokens,
                        }
                    } else {
                        Token::BlockExpansion {
                            name: expr.name,
                            default: body.tokens,
                            indentation,
                        }
                    });
                    body.closed_standalone
                }

                Some('/') => {
                    self.advance()?;
                    let expr = self.parse_close_expression(&state.delimiters.end)?;
                    let matches = state.section.as_ref().is_some_and(|open| {
                        open.name == expr.name && open.transforms == expr.transforms
                    });
                    if !matches {
                        return Err(
                            self.error(ParseErrorKind::SectionCloseNameIncorrect, tag_start)
                        );
                    }
                    let standalone = self.is_standalone(&state);
                    if !standalone {
                        flush(&mut tokens, &mut whitespace);
                    }
                    return Ok(Body {
                        tokens,
                        end: tag_start,
                        closed_standalone: standalone,
                    });
                }

                Some('{') => {
                    flush(&mut tokens, &mut whitespace);
                    self.advance()?;
                    let terminator = format!("}}{}", state.delimiters.end);
                    let expr = self.parse_expression(&terminator)?;
                    tokens.push(Token::UnescapedVariable(expr));
                    false
                }

                Some('&') => {
                    flush(&mut tokens, &mut whitespace);
                    self.advance()?;
                    let expr = self.parse_expression(&state.delimiters.end)?;
                    tokens.push(Token::UnescapedVariable(expr));
                    false
                }

                Some('!') => {
                    self.advance()?;
                    self.scanner
                        .read_until(&state.delimiters.end, true, true)
                        .map_err(|_| self.error(ParseErrorKind::UnfinishedName, tag_start))?;
                    let standalone = self.is_standalone(&state);
                    if !standalone {
                        flush(&mut tokens, &mut whitespace);
                    }
                    standalone
                }

                Some('>') => {
                    self.advance()?;
                    let dynamic = self.scanner.read_literal("*");
                    let name = self.parse_partial_name(&state.delimiters.end, tag_start)?;
                    let standalone = self.is_standalone(&state);
                    let indentation = if standalone {
                        Some(std::mem::take(&mut whitespace)).filter(|w| !w.is_empty())
                    } else {
                        flush(&mut tokens, &mut whitespace);
                        None
                    };
                    tokens.push(partial_token(name, dynamic, indentation, None));
                    standalone
                }

                Some('<') => {
                    self.advance()?;
                    let dynamic = self.scanner.read_literal("*");
                    let name = self.parse_partial_name(&state.delimiters.end, tag_start)?;
                    let opened_standalone = self.is_standalone(&state);
                    let leading = std::mem::take(&mut whitespace);
                    let section_name = if dynamic { format!("*{name}") } else { name.clone() };
                    // `{{<p}}{{/p}}` alone on a line is standalone as a whole
                    let body = self.parse_tokens(state.open(
                        &section_name,
                        &[],
                        SectionKind::Parent,
                        opened_standalone || state.at_line_start,
                    ))?;
                    let overrides = collect_overrides(body.tokens)
                        .map_err(|kind| self.error(kind, tag_start))?;
                    let standalone = opened_standalone || body.closed_standalone;
                    let indentation = if standalone {
                        Some(leading).filter(|w| !w.is_empty())
                    } else {
                        if !leading.is_empty() {
                            tokens.push(Token::Text(leading));
                        }
                        None
                    };
                    tokens.push(partial_token(name, dynamic, indentation, Some(overrides)));
                    body.closed_standalone
                }

                Some('=') => {
                    self.advance()?;
                    state.delimiters = self.parse_set_delimiter(&state.delimiters.end, tag_start)?;
                    let standalone = self.is_standalone(&state);
                    if !standalone {
                        flush(&mut tokens, &mut whitespace);
                    }
                    standalone
                }

                Some('%') => {
                    self.advance()?;
                    let content_type = self.parse_pragma(&state.delimiters.end, tag_start)?;
                    let standalone = self.is_standalone(&state);
                    if !standalone {
                        flush(&mut tokens, &mut whitespace);
                    }
                    tokens.push(Token::ContentTypePragma(content_type));
                    standalone
                }

                _ => {
                    flush(&mut tokens, &mut whitespace);
                    let expr = self.parse_expression(&state.delimiters.end)?;
                    tokens.push(Token::Variable(expr));
                    false
                }
            };

            if standalone {
                whitespace.clear();
            }
            state.at_line_start = standalone;
        }

        if state.section.is_some() {
            return Err(self.error(ParseErrorKind::ExpectedSectionEnd, self.scanner.offset()));
        }

        Ok(Body {
            tokens,
            end: self.scanner.offset(),
            closed_standalone: false,
        })
    }

    /// Read text up to the next start delimiter or newline
    fn read_text(&mut self, start_delimiter: &str) -> Result<&'s str, ParseError> {
        let start = self.scanner.position();
        while let Some(c) = self.scanner.current() {
            if c == '\n' || self.scanner.starts_with(start_delimiter) {
                break;
            }
            self.advance()?;
        }
        Ok(self.scanner.text_since(start))
    }

    /// A tag is standalone when it began a line (after optional indentation)
    /// and only spaces follow it up to a line terminator or end of input.
    /// A standalone tag consumes that trailing whitespace and terminator.
    fn is_standalone(&mut self, state: &ParserState) -> bool {
        if !state.at_line_start {
            return false;
        }
        let saved = self.scanner.position();
        self.scanner.read_while(is_inline_space);
        if self.scanner.at_end()
            || self.scanner.read_literal("\r\n")
            || self.scanner.read_literal("\n")
        {
            return true;
        }
        self.scanner.restore(saved);
        false
    }

    /// Parse a variable or section name up to `terminator`
    fn parse_expression(&mut self, terminator: &str) -> Result<TagExpression, ParseError> {
        let start = self.scanner.offset();
        let text = self.read_tag_text(terminator)?;
        if text.contains('*') {
            return Err(self.error(ParseErrorKind::UnfinishedName, start));
        }
        parse_tag_expression(text).ok_or_else(|| self.error(ParseErrorKind::UnfinishedName, start))
    }

    /// Parse the name of a close tag, which may carry the `*` of a dynamic parent
    fn parse_close_expression(&mut self, terminator: &str) -> Result<TagExpression, ParseError> {
        let start = self.scanner.offset();
        let text = self.read_tag_text(terminator)?;
        let (dynamic, name) = match text.strip_prefix('*') {
            Some(name) => (true, name.trim_start()),
            None => (false, text),
        };
        if name.contains('*') {
            return Err(self.error(ParseErrorKind::UnfinishedName, start));
        }
        let mut expr = parse_tag_expression(name)
            .ok_or_else(|| self.error(ParseErrorKind::UnfinishedName, start))?;
        if dynamic {
            expr.name.insert(0, '*');
        }
        Ok(expr)
    }

    /// Trimmed tag content up to and including `terminator`
    fn read_tag_text(&mut self, terminator: &str) -> Result<&'s str, ParseError> {
        let start = self.scanner.offset();
        self.scanner
            .read_until(terminator, true, true)
            .map(str::trim)
            .map_err(|_| self.error(ParseErrorKind::UnfinishedName, start))
    }

    fn parse_partial_name(&mut self, end: &str, tag_start: usize) -> Result<String, ParseError> {
        let name = self
            .scanner
            .read_until(end, true, true)
            .map_err(|_| self.error(ParseErrorKind::UnfinishedName, tag_start))?
            .trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(self.error(ParseErrorKind::UnfinishedName, tag_start));
        }
        Ok(name.to_string())
    }

    /// `{{=<start> <end>=}}`
    fn parse_set_delimiter(&mut self, end: &str, tag_start: usize) -> Result<Delimiters, ParseError> {
        let kind = ParseErrorKind::InvalidSetDelimiter;

        self.scanner.read_while(char::is_whitespace);
        let start_delimiter = self
            .scanner
            .read_until_char(char::is_whitespace, true)
            .map_err(|_| self.error(kind, tag_start))?;
        self.scanner.read_while(char::is_whitespace);
        let end_delimiter = self
            .scanner
            .read_until_char(|c| c == '=' || c.is_whitespace(), true)
            .map_err(|_| self.error(kind, tag_start))?;
        self.scanner.read_while(char::is_whitespace);

        if !self.scanner.read_literal("=") || !self.scanner.read_literal(end) {
            return Err(self.error(kind, tag_start));
        }
        if start_delimiter.is_empty() || end_delimiter.is_empty() || start_delimiter.contains('=') {
            return Err(self.error(kind, tag_start));
        }
        Ok(Delimiters::new(start_delimiter, end_delimiter))
    }

    /// `{{%CONTENT_TYPE: <id>}}`
    fn parse_pragma(&mut self, end: &str, tag_start: usize) -> Result<String, ParseError> {
        self.scanner.read_while(char::is_whitespace);
        let variable = self
            .scanner
            .read_while(|c| c.is_alphanumeric() || c == '_');
        self.scanner.read_while(char::is_whitespace);
        if variable.is_empty() || !self.scanner.read_literal(":") {
            return Err(self.error(ParseErrorKind::InvalidConfigVariableSyntax, tag_start));
        }
        self.scanner.read_while(char::is_whitespace);
        let value = self
            .scanner
            .read_while(|c| c.is_alphanumeric() || c == '_' || c == '-');
        self.scanner.read_while(char::is_whitespace);
        if value.is_empty() || !self.scanner.read_literal(end) {
            return Err(self.error(ParseErrorKind::InvalidConfigVariableSyntax, tag_start));
        }

        match variable {
            "CONTENT_TYPE" if self.content_types.contains(value) => Ok(value.to_string()),
            _ => Err(self.error(ParseErrorKind::UnrecognisedConfigVariable, tag_start)),
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.scanner
            .advance()
            .map_err(|err: ScanError| err.into_parse_error(self.scanner.source()))
    }

    fn error(&self, kind: ParseErrorKind, offset: usize) -> ParseError {
        ParseError::new(kind, self.scanner.source(), offset)
    }
}

fn is_inline_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Emit buffered indentation as ordinary text
fn flush(tokens: &mut TokenTree, whitespace: &mut String) {
    if !whitespace.is_empty() {
        tokens.push(Token::Text(std::mem::take(whitespace)));
    }
}

fn partial_token(
    name: String,
    dynamic: bool,
    indentation: Option<String>,
    overrides: Option<Overrides>,
) -> Token {
    if dynamic {
        Token::DynamicPartial {
            name,
            indentation,
            overrides,
        }
    } else {
        Token::Partial {
            name,
            indentation,
            overrides,
        }
    }
}

/// Gather the block definitions of a parent tag body
fn collect_overrides(body: TokenTree) -> Result<Overrides, ParseErrorKind> {
    let mut overrides = HashMap::new();
    for token in body {
        match token {
            Token::BlockDefinition { name, body } => {
                overrides.insert(name, body);
            }
            token if token.is_whitespace_text() => {}
            _ => return Err(ParseErrorKind::IllegalTokenInsideInheritSection),
        }
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> TokenTree {
        parse(source, &ContentTypes::default()).expect("Should parse")
    }

    fn compile_err(source: &str) -> ParseErrorKind {
        parse(source, &ContentTypes::default())
            .expect_err("Should fail")
            .kind
    }

    fn text(s: &str) -> Token {
        Token::Text(s.to_string())
    }

    fn var(name: &str) -> Token {
        Token::Variable(TagExpression::variable(name))
    }

    #[test]
    fn test_text_split_per_line() {
        assert_eq!(
            compile("one\ntwo\nthree"),
            vec![text("one\n"), text("two\n"), text("three")]
        );
    }

    #[test]
    fn test_variables() {
        assert_eq!(
            compile("Hi {{ name }}!"),
            vec![text("Hi "), var("name"), text("!")]
        );
        assert_eq!(
            compile("{{{html}}}{{&raw}}"),
            vec![
                Token::UnescapedVariable(TagExpression::variable("html")),
                Token::UnescapedVariable(TagExpression::variable("raw")),
            ]
        );
    }

    #[test]
    fn test_interpolation_is_never_standalone() {
        assert_eq!(
            compile("  {{x}}\n"),
            vec![text("  "), var("x"), text("\n")]
        );
    }

    #[test]
    fn test_section() {
        let tokens = compile("{{#items}}[{{.}}]{{/items}}");
        match &tokens[..] {
            [Token::Section { expr, body }] => {
                assert_eq!(expr.name, "items");
                assert_eq!(body.raw, "[{{.}}]");
                assert_eq!(body.tokens, vec![text("["), var("."), text("]")]);
            }
            other => panic!("Expected a section, got {other:?}"),
        }
    }

    #[test]
    fn test_standalone_section_lines_are_removed() {
        let tokens = compile("{{#a}}\n  line\n  {{/a}}\nafter");
        match &tokens[..] {
            [Token::Section { body, .. }, after] => {
                assert_eq!(body.tokens, vec![text("  line\n")]);
                assert_eq!(body.raw, "  line\n  ");
                assert_eq!(after, &text("after"));
            }
            other => panic!("Expected a section, got {other:?}"),
        }
    }

    #[test]
    fn test_standalone_open_with_inline_close() {
        let tokens = compile("  {{#a}}\nx{{/a}} y\n");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], text(" y\n"));
    }

    #[test]
    fn test_inline_section_keeps_whitespace() {
        let tokens = compile(" {{#a}}x{{/a}} \n");
        assert_eq!(tokens[0], text(" "));
        assert!(matches!(tokens[1], Token::Section { .. }));
        assert_eq!(tokens[2], text(" \n"));
    }

    #[test]
    fn test_standalone_comment_removed() {
        assert_eq!(
            compile("begin\n  {{! comment }}\nend\n"),
            vec![text("begin\n"), text("end\n")]
        );
    }

    #[test]
    fn test_inline_comment_keeps_surroundings() {
        assert_eq!(
            compile("a {{! comment }} b\n"),
            vec![text("a "), text(" b\n")]
        );
    }

    #[test]
    fn test_standalone_crlf() {
        assert_eq!(
            compile("|\r\n{{! x }}\r\n|"),
            vec![text("|\r\n"), text("|")]
        );
    }

    #[test]
    fn test_standalone_at_end_of_input() {
        assert_eq!(compile("x\n  {{! end }}"), vec![text("x\n")]);
    }

    #[test]
    fn test_trailing_whitespace_kept() {
        assert_eq!(compile("x\n  "), vec![text("x\n"), text("  ")]);
    }

    #[test]
    fn test_standalone_partial_records_indentation() {
        assert_eq!(
            compile("  {{> item }}\n"),
            vec![Token::Partial {
                name: "item".to_string(),
                indentation: Some("  ".to_string()),
                overrides: None,
            }]
        );
    }

    #[test]
    fn test_standalone_parent_records_indentation() {
        let parent = |indentation: Option<&str>| Token::Partial {
            name: "base".to_string(),
            indentation: indentation.map(str::to_string),
            overrides: Some(Overrides::new()),
        };
        assert_eq!(
            compile("a\n  {{<base}}\n  {{/base}}\nb\n"),
            vec![text("a\n"), parent(Some("  ")), text("b\n")]
        );
        assert_eq!(
            compile("a\n  {{<base}}{{/base}}\nb\n"),
            vec![text("a\n"), parent(Some("  ")), text("b\n")]
        );
        assert_eq!(
            compile("  {{<base}}{{/base}} x\n"),
            vec![text("  "), parent(None), text(" x\n")]
        );
    }

    #[test]
    fn test_whitespace_around_tag_expression() {
        assert_eq!(
            compile("{{ f( x ) }}"),
            vec![Token::Variable(TagExpression {
                name: "x".to_string(),
                transforms: vec!["f".to_string()],
            })]
        );
        assert!(matches!(
            compile("{{# f( x ) }}{{/ f(x) }}")[..],
            [Token::Section { .. }]
        ));
    }

    #[test]
    fn test_star_only_prefixes_dynamic_close() {
        assert_eq!(compile_err("{{a*b}}"), ParseErrorKind::UnfinishedName);
        assert_eq!(compile_err("{{#*a}}{{/*a}}"), ParseErrorKind::UnfinishedName);
        assert_eq!(compile_err("{{<*a}}{{/*a*}}"), ParseErrorKind::UnfinishedName);
        assert_eq!(
            compile_err("{{<a}}{{/*a}}"),
            ParseErrorKind::SectionCloseNameIncorrect
        );
        assert_eq!(compile("{{<*a}}{{/ *a }}").len(), 1);
    }

    #[test]
    fn test_inline_partial_has_no_indentation() {
        assert_eq!(
            compile("> {{>item}}\n"),
            vec![
                text("> "),
                Token::Partial {
                    name: "item".to_string(),
                    indentation: None,
                    overrides: None,
                },
                text("\n"),
            ]
        );
    }

    #[test]
    fn test_dynamic_partial() {
        assert_eq!(
            compile("{{>*which}}"),
            vec![Token::DynamicPartial {
                name: "which".to_string(),
                indentation: None,
                overrides: None,
            }]
        );
    }

    #[test]
    fn test_transform_chain() {
        assert_eq!(
            compile("{{reversed(sorted(x))}}"),
            vec![Token::Variable(TagExpression {
                name: "x".to_string(),
                transforms: vec!["sorted".to_string(), "reversed".to_string()],
            })]
        );
    }

    #[test]
    fn test_close_must_repeat_transforms() {
        assert!(matches!(
            compile("{{#first()}}x{{/first()}}")[..],
            [Token::Section { .. }]
        ));
        assert_eq!(
            compile_err("{{#first()}}x{{/first}}"),
            ParseErrorKind::SectionCloseNameIncorrect
        );
    }

    #[test]
    fn test_set_delimiter() {
        assert_eq!(
            compile("{{=<% %>=}}<% name %>{{x}}"),
            vec![var("name"), text("{{x}}")]
        );
    }

    #[test]
    fn test_set_delimiter_is_standalone() {
        assert_eq!(
            compile("  {{= | | =}}\n|x|\n"),
            vec![var("x"), text("\n")]
        );
    }

    #[test]
    fn test_section_keeps_delimiters_for_lambdas() {
        let tokens = compile("{{=| |=}}|#l|a|/l|");
        match &tokens[..] {
            [Token::Section { body, .. }] => {
                assert_eq!(body.delimiters, Delimiters::new("|", "|"));
                assert_eq!(body.raw, "a");
            }
            other => panic!("Expected a section, got {other:?}"),
        }
    }

    #[test]
    fn test_block_expansion_and_definition() {
        let tokens = compile("{{$title}}Default{{/title}}");
        assert_eq!(
            tokens,
            vec![Token::BlockExpansion {
                name: "title".to_string(),
                default: vec![text("Default")],
                indentation: None,
            }]
        );

        let tokens = compile("{{<base}}\n  {{$title}}Mine{{/title}}\n{{/base}}\n");
        match &tokens[..] {
            [Token::Partial {
                name,
                overrides: Some(overrides),
                ..
            }] => {
                assert_eq!(name, "base");
                assert_eq!(overrides["title"], vec![text("Mine")]);
            }
            other => panic!("Expected a parent partial, got {other:?}"),
        }
    }

    #[test]
    fn test_content_type_pragma() {
        assert_eq!(
            compile("{{% CONTENT_TYPE: TEXT }}\n{{x}}"),
            vec![Token::ContentTypePragma("TEXT".to_string()), var("x")]
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(compile_err("{{#a}}x"), ParseErrorKind::ExpectedSectionEnd);
        assert_eq!(compile_err("{{#a}}x{{/b}}"), ParseErrorKind::SectionCloseNameIncorrect);
        assert_eq!(compile_err("{{/a}}"), ParseErrorKind::SectionCloseNameIncorrect);
        assert_eq!(compile_err("{{a b}}"), ParseErrorKind::UnfinishedName);
        assert_eq!(compile_err("{{name"), ParseErrorKind::UnfinishedName);
        assert_eq!(compile_err("{{{name}}"), ParseErrorKind::UnfinishedName);
        assert_eq!(compile_err("{{! never closed"), ParseErrorKind::UnfinishedName);
        assert_eq!(compile_err("{{f(x}}"), ParseErrorKind::UnfinishedName);
        assert_eq!(compile_err("{{=<%=}}"), ParseErrorKind::InvalidSetDelimiter);
        assert_eq!(compile_err("{{= <% %> }}"), ParseErrorKind::InvalidSetDelimiter);
        assert_eq!(
            compile_err("{{$f(x)}}{{/f(x)}}"),
            ParseErrorKind::TransformAppliedToInheritanceSection
        );
        assert_eq!(
            compile_err("{{<base}}{{x}}{{/base}}"),
            ParseErrorKind::IllegalTokenInsideInheritSection
        );
        assert_eq!(
            compile_err("{{<base}}text{{/base}}"),
            ParseErrorKind::IllegalTokenInsideInheritSection
        );
        assert_eq!(
            compile_err("{{% CONTENT_TYPE TEXT }}"),
            ParseErrorKind::InvalidConfigVariableSyntax
        );
        assert_eq!(
            compile_err("{{% CONTENT_TYPE: YAML }}"),
            ParseErrorKind::UnrecognisedConfigVariable
        );
        assert_eq!(
            compile_err("{{% ENCODING: UTF8 }}"),
            ParseErrorKind::UnrecognisedConfigVariable
        );
    }

    #[test]
    fn test_error_position() {
        let err = parse("line one\n  {{#a}}\n{{/b}}", &ContentTypes::default()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::SectionCloseNameIncorrect);
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 1);
        assert_eq!(err.line_text, "{{/b}}");
    }
}
