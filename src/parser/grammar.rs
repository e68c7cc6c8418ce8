//! Tag expression grammar using chumsky
//!
//! ```text
//! expression := NAME ( "(" expression? ")" )?
//! ```
//!
//! `f(g(x))` yields the variable `x` with transforms `[g, f]`. A call with no
//! argument, such as `first()`, applies the transform to the current
//! sequence context and yields an empty variable name.

use chumsky::prelude::*;

use crate::parser::ast::TagExpression;
use crate::parser::lexer::{self, TagToken};

/// Parse the text of a tag into a variable name and transform chain
///
/// Returns `None` when the text is not a well formed call expression or a
/// plain name contains whitespace.
pub fn parse_tag_expression(text: &str) -> Option<TagExpression> {
    if !text.contains(|c: char| c == '(' || c == ')') {
        return (!text.contains(char::is_whitespace)).then(|| TagExpression::variable(text));
    }

    let tokens: Vec<TagToken> = lexer::lex(text).map(|(tok, _)| tok).collect();
    let expression = expression_parser()
        .parse(tokens.as_slice())
        .into_result()
        .ok();
    expression
}

fn expression_parser<'a>(
) -> impl Parser<'a, &'a [TagToken], TagExpression, extra::Err<Rich<'a, TagToken>>> + Clone {
    let name = select! {
        TagToken::Name(s) => s,
    };

    let expression = recursive(|expression| {
        name.clone().then(
            expression
                .or_not()
                .delimited_by(just(TagToken::ParenOpen), just(TagToken::ParenClose))
                .or_not(),
        )
        .map(
            |(name, call): (String, Option<Option<TagExpression>>)| match call {
                None => TagExpression::variable(name),
                Some(None) => TagExpression {
                    name: String::new(),
                    transforms: vec![name],
                },
                Some(Some(mut inner)) => {
                    inner.transforms.push(name);
                    inner
                }
            },
        )
    });

    expression.then_ignore(end())
}
