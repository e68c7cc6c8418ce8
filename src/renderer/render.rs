//! Token tree walker
//!
//! Rendering never fails. A missing variable, a transform without a result or
//! an unknown partial all produce empty output.

use std::borrow::Cow;

use tracing::debug;

use crate::parser::ast::{Overrides, SectionBody, TagExpression, Token};
use crate::parser::parse_with_delimiters;
use crate::renderer::context::{RenderContext, SequenceInfo};
use crate::renderer::transform::apply_chain;
use crate::value::{Lambda, Value};

/// Render a token tree against a context
pub fn render_tokens(tokens: &[Token], context: &RenderContext<'_>) -> String {
    let mut output = String::new();
    let mut switched: Option<RenderContext<'_>> = None;

    for token in tokens {
        if let Token::ContentTypePragma(id) = token {
            let current = switched.as_ref().unwrap_or(context);
            switched = Some(current.with_content_type(id));
            continue;
        }
        let context = switched.as_ref().unwrap_or(context);
        let rendered = render_token(token, context);
        append(&mut output, &rendered, context.indentation());
    }

    output
}

/// Append rendered text, indenting it when it starts a new line
fn append(output: &mut String, rendered: &str, indentation: Option<&str>) {
    if rendered.is_empty() {
        return;
    }
    if let Some(indentation) = indentation {
        if output.ends_with('\n') {
            output.push_str(indentation);
        }
    }
    output.push_str(rendered);
}

fn render_token(token: &Token, context: &RenderContext<'_>) -> String {
    match token {
        Token::Text(text) => text.clone(),

        Token::Variable(expr) => match resolve_lambda_chain(resolve(context, expr)) {
            Some(value) => context.content_type().escape(&value.render_text()),
            None => String::new(),
        },

        Token::UnescapedVariable(expr) => match resolve_lambda_chain(resolve(context, expr)) {
            Some(value) => value.render_text(),
            None => String::new(),
        },

        Token::Section { expr, body } => render_section(expr, body, context),

        Token::InvertedSection { expr, body } => render_inverted(expr, body, context),

        Token::BlockDefinition { name, .. } => {
            unreachable!("block definition `{name}` outside of a parent tag")
        }

        Token::BlockExpansion {
            name,
            default,
            indentation,
        } => match context.override_for(name) {
            Some(body) => {
                let block = context.with_block_expansion(indentation.as_deref());
                indent_first_line(render_tokens(body, &block), indentation.as_deref())
            }
            None => render_tokens(default, context),
        },

        Token::Partial {
            name,
            indentation,
            overrides,
        } => render_partial(name, indentation.as_deref(), overrides.as_ref(), context),

        Token::DynamicPartial {
            name,
            indentation,
            overrides,
        } => {
            let resolved = resolve(context, &TagExpression::variable(name.as_str()));
            match resolved.as_deref() {
                Some(Value::String(partial)) => {
                    render_partial(partial, indentation.as_deref(), overrides.as_ref(), context)
                }
                _ => {
                    debug!(name = name.as_str(), "dynamic partial name is not a string");
                    String::new()
                }
            }
        }

        Token::ContentTypePragma(_) => String::new(),
    }
}

fn render_partial(
    name: &str,
    indentation: Option<&str>,
    overrides: Option<&Overrides>,
    context: &RenderContext<'_>,
) -> String {
    let Some(template) = context.library().and_then(|library| library.get(name)) else {
        debug!(partial = name, "partial not found");
        return String::new();
    };
    let partial = context.with_partial(indentation, overrides);
    indent_first_line(render_tokens(template.tokens(), &partial), indentation)
}

/// Prefix the first line of a standalone tag's output with its indentation
fn indent_first_line(rendered: String, indentation: Option<&str>) -> String {
    match indentation {
        Some(indentation) if !rendered.is_empty() => format!("{indentation}{rendered}"),
        _ => rendered,
    }
}

fn render_section(expr: &TagExpression, body: &SectionBody, context: &RenderContext<'_>) -> String {
    let Some(value) = resolve(context, expr) else {
        return String::new();
    };

    if let Value::Lambda(lambda) = value.as_ref() {
        return match call_section_lambda(lambda, body) {
            Value::String(source) => {
                match parse_with_delimiters(&source, body.delimiters.clone(), context.content_types()) {
                    Ok(tokens) => render_tokens(&tokens, context),
                    Err(err) => {
                        debug!(error = %err, "section lambda output is not a valid template");
                        String::new()
                    }
                }
            }
            value => render_section_value(&value, body, context),
        };
    }

    render_section_value(&value, body, context)
}

/// Invoke a section lambda with the raw body until it yields a non-lambda
fn call_section_lambda(lambda: &Lambda, body: &SectionBody) -> Value {
    let mut result = lambda.call(&body.raw);
    while let Value::Lambda(next) = result {
        result = next.call(&body.raw);
    }
    result
}

fn render_section_value(value: &Value, body: &SectionBody, context: &RenderContext<'_>) -> String {
    match value {
        Value::Sequence(items) => {
            let mut output = String::new();
            for (index, item) in items.iter().enumerate() {
                let element = context.with_sequence(item, SequenceInfo::new(index, items.len()));
                let rendered = render_tokens(&body.tokens, &element);
                append(&mut output, &rendered, context.indentation());
            }
            output
        }
        Value::Bool(true) => render_tokens(&body.tokens, context),
        value if is_falsy(value) => String::new(),
        value => render_tokens(&body.tokens, &context.with_object(value)),
    }
}

fn render_inverted(expr: &TagExpression, body: &SectionBody, context: &RenderContext<'_>) -> String {
    let Some(value) = resolve(context, expr) else {
        return render_tokens(&body.tokens, context);
    };

    match value.as_ref() {
        // Template text counts as present
        Value::Lambda(lambda) => match call_section_lambda(lambda, body) {
            Value::String(_) => String::new(),
            result => render_inverted_value(&result, body, context),
        },
        value => render_inverted_value(value, body, context),
    }
}

fn render_inverted_value(value: &Value, body: &SectionBody, context: &RenderContext<'_>) -> String {
    match value {
        Value::Sequence(items) if items.is_empty() => {
            render_tokens(&body.tokens, &context.with_object(value))
        }
        value if is_falsy(value) => render_tokens(&body.tokens, context),
        _ => String::new(),
    }
}

/// Values a section treats as missing
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::Int(number) => *number == 0,
        Value::Float(number) => *number == 0.0,
        value => value.is_null(),
    }
}

/// Invoke lambdas with empty input until a non-lambda value is produced
fn resolve_lambda_chain(value: Option<Cow<'_, Value>>) -> Option<Cow<'_, Value>> {
    let mut value = value?;
    while let Value::Lambda(lambda) = value.as_ref() {
        value = Cow::Owned(lambda.call(""));
    }
    Some(value).filter(|value| !value.is_null())
}

/// Resolve a tag expression against the context, applying its transforms
pub fn resolve<'v>(context: &RenderContext<'v>, expr: &TagExpression) -> Option<Cow<'v, Value>> {
    let base = if expr.name == "." {
        Cow::Borrowed(context.top())
    } else if expr.name.is_empty() && !expr.transforms.is_empty() {
        Cow::Owned(Value::custom(context.sequence()?))
    } else if let Some(scoped) = expr.name.strip_prefix('.') {
        resolve_path(context.top(), scoped.split('.'))?
    } else {
        let mut segments = expr.name.split('.');
        let first = segments.next()?;
        let found = context
            .stack()
            .iter()
            .rev()
            .find_map(|&frame| frame.child(first))?;
        descend(found, segments)?
    };

    if expr.transforms.is_empty() {
        Some(base)
    } else {
        apply_chain(base.into_owned(), &expr.transforms).map(Cow::Owned)
    }
}

fn resolve_path<'v, 'n>(
    root: &'v Value,
    segments: impl Iterator<Item = &'n str>,
) -> Option<Cow<'v, Value>> {
    descend(Cow::Borrowed(root), segments)
}

/// Walk the remaining path segments strictly within `value`
fn descend<'v, 'n>(
    value: Cow<'v, Value>,
    segments: impl Iterator<Item = &'n str>,
) -> Option<Cow<'v, Value>> {
    segments.into_iter().try_fold(value, |value, segment| match value {
        Cow::Borrowed(value) => value.child(segment),
        Cow::Owned(value) => value.child(segment).map(|child| Cow::Owned(child.into_owned())),
    })
}
