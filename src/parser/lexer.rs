//! Lexer for tag expressions using logos
//!
//! A tag expression is the body of a variable or section tag once the
//! delimiters and sigil are stripped, e.g. `name`, `user.name` or
//! `reversed(sorted(items))`.

use logos::Logos;

/// Byte range in the tag expression
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TagToken {
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,

    // Variable and transform names, dotted paths included
    #[regex(r"[^() \t\r\n]+", |lex| lex.slice().to_string())]
    Name(String),
}

/// Lex a tag expression into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (TagToken, Span)> + '_ {
    TagToken::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
