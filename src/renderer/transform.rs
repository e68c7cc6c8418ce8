//! Built-in transforms
//!
//! A transform is looked up by name on the receiver's type. `None` means the
//! type does not support the transform or the transform has no result, and
//! the whole tag expression then renders as a miss.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::value::Value;

/// Apply the transform `name` to `value`
pub fn apply(value: &Value, name: &str) -> Option<Value> {
    match value {
        Value::String(text) => string_transform(text, name),
        Value::Int(number) => int_transform(*number, name),
        Value::Float(number) => float_transform(*number, name),
        Value::Sequence(items) => sequence_transform(items, name),
        Value::Map(map) => map_transform(map, name),
        Value::Custom(object) => object.transform(name),
        Value::Null | Value::Bool(_) | Value::Lambda(_) => None,
    }
}

/// Apply a chain of transforms in order, stopping at the first miss
pub fn apply_chain(value: Value, transforms: &[String]) -> Option<Value> {
    transforms
        .iter()
        .try_fold(value, |value, name| apply(&value, name))
}

fn string_transform(text: &str, name: &str) -> Option<Value> {
    let value: Value = match name {
        "empty" => text.is_empty().into(),
        "count" => text.chars().count().into(),
        "capitalized" => capitalize_words(text).into(),
        "lowercased" => text.to_lowercase().into(),
        "uppercased" => text.to_uppercase().into(),
        "reversed" => text.chars().rev().collect::<String>().into(),
        _ => return None,
    };
    Some(value)
}

fn int_transform(number: i64, name: &str) -> Option<Value> {
    let value: Value = match name {
        "equalzero" => (number == 0).into(),
        "plusone" => number.checked_add(1)?.into(),
        "minusone" => number.checked_sub(1)?.into(),
        "even" => (number % 2 == 0).into(),
        "odd" => (number % 2 != 0).into(),
        _ => return None,
    };
    Some(value)
}

fn float_transform(number: f64, name: &str) -> Option<Value> {
    let value: Value = match name {
        "equalzero" => (number == 0.0).into(),
        "plusone" => (number + 1.0).into(),
        "minusone" => (number - 1.0).into(),
        _ => return None,
    };
    Some(value)
}

fn sequence_transform(items: &[Value], name: &str) -> Option<Value> {
    let value: Value = match name {
        "first" => items.first()?.clone(),
        "last" => items.last()?.clone(),
        "count" => items.len().into(),
        "empty" => items.is_empty().into(),
        "reversed" => Value::Sequence(items.iter().rev().cloned().collect()),
        "sorted" => Value::Sequence(sorted(items)?),
        _ => return None,
    };
    Some(value)
}

fn map_transform(map: &HashMap<String, Value>, name: &str) -> Option<Value> {
    let value: Value = match name {
        "count" => map.len().into(),
        "empty" => map.is_empty().into(),
        "enumerated" => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Value::Sequence(
                keys.into_iter()
                    .map(|key| {
                        [
                            ("key", Value::from(key.as_str())),
                            ("value", map[key].clone()),
                        ]
                        .into_iter()
                        .collect()
                    })
                    .collect(),
            )
        }
        _ => return None,
    };
    Some(value)
}

/// Uppercase the first letter of every word, lowercase the rest
fn capitalize_words(text: &str) -> String {
    let mut capitalized = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            capitalized.push(c);
            word_start = true;
        } else if word_start {
            capitalized.extend(c.to_uppercase());
            word_start = false;
        } else {
            capitalized.extend(c.to_lowercase());
        }
    }
    capitalized
}

/// Sort values of one comparable kind, `None` for mixed or unordered input
fn sorted(items: &[Value]) -> Option<Vec<Value>> {
    let mut sorted = items.to_vec();
    let mut comparable = true;
    sorted.sort_by(|a, b| {
        compare(a, b).unwrap_or_else(|| {
            comparable = false;
            Ordering::Equal
        })
    });
    comparable.then_some(sorted)
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        _ => None,
    }
}
