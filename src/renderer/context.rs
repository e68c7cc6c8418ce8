//! Render context: the state carried through a render call
//!
//! A context is never mutated. Entering a section, a partial or a block
//! derives a new context that borrows from the old one for a shorter
//! lifetime, so the derived values can point into data that only lives for
//! the duration of that nested render.

use std::collections::HashMap;

use crate::content_type::{ContentType, ContentTypes};
use crate::library::Library;
use crate::parser::ast::{Overrides, Token};
use crate::value::{Object, Value};

/// Position of the current element while iterating a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceInfo {
    pub first: bool,
    pub last: bool,
    pub index: usize,
}

impl SequenceInfo {
    pub fn new(index: usize, len: usize) -> Self {
        Self {
            first: index == 0,
            last: index + 1 == len,
            index,
        }
    }
}

impl Object for SequenceInfo {
    fn transform(&self, name: &str) -> Option<Value> {
        match name {
            "first" => Some(self.first.into()),
            "last" => Some(self.last.into()),
            "index" => Some(self.index.into()),
            "even" => Some((self.index % 2 == 0).into()),
            "odd" => Some((self.index % 2 == 1).into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    stack: Vec<&'a Value>,
    sequence: Option<SequenceInfo>,
    indentation: Option<String>,
    overrides: HashMap<&'a str, &'a [Token]>,
    content_type: &'a dyn ContentType,
    content_types: &'a ContentTypes,
    library: Option<&'a Library>,
}

impl<'a> RenderContext<'a> {
    /// Context for a top-level render of `root`
    pub fn new(root: &'a Value, content_types: &'a ContentTypes, library: Option<&'a Library>) -> Self {
        Self {
            stack: vec![root],
            sequence: None,
            indentation: None,
            overrides: HashMap::new(),
            content_type: content_types.default_type(),
            content_types,
            library,
        }
    }

    /// The object stack, outermost first
    pub fn stack(&self) -> &[&'a Value] {
        &self.stack
    }

    /// Most recently pushed object
    pub fn top(&self) -> &'a Value {
        self.stack[self.stack.len() - 1]
    }

    pub fn sequence(&self) -> Option<SequenceInfo> {
        self.sequence
    }

    pub fn indentation(&self) -> Option<&str> {
        self.indentation.as_deref()
    }

    pub fn override_for(&self, name: &str) -> Option<&'a [Token]> {
        self.overrides.get(name).copied()
    }

    pub fn content_type(&self) -> &'a dyn ContentType {
        self.content_type
    }

    pub fn content_types(&self) -> &'a ContentTypes {
        self.content_types
    }

    pub fn library(&self) -> Option<&'a Library> {
        self.library
    }

    /// Push an object, leaving any sequence iteration
    pub fn with_object<'b>(&self, object: &'b Value) -> RenderContext<'b>
    where
        'a: 'b,
    {
        self.derive(object, None)
    }

    /// Push the element of a sequence at the given position
    pub fn with_sequence<'b>(&self, element: &'b Value, info: SequenceInfo) -> RenderContext<'b>
    where
        'a: 'b,
    {
        self.derive(element, Some(info))
    }

    /// Enter a partial: indentation accumulates, overrides already in scope
    /// win over the partial's own, and the content type is reset
    pub fn with_partial<'b>(
        &self,
        indentation: Option<&str>,
        overrides: Option<&'b Overrides>,
    ) -> RenderContext<'b>
    where
        'a: 'b,
    {
        let mut inherited: HashMap<&'b str, &'b [Token]> = self.overrides.clone();
        if let Some(overrides) = overrides {
            for (name, body) in overrides {
                inherited.entry(name.as_str()).or_insert(body.as_slice());
            }
        }

        RenderContext {
            stack: self.stack.clone(),
            sequence: None,
            indentation: self.indented(indentation),
            overrides: inherited,
            content_type: self.content_types.default_type(),
            content_types: self.content_types,
            library: self.library,
        }
    }

    /// Enter a block whose content is indented by `indentation`
    pub fn with_block_expansion(&self, indentation: Option<&str>) -> RenderContext<'a> {
        RenderContext {
            indentation: self.indented(indentation),
            ..self.clone()
        }
    }

    /// Switch the active content type, keeping the current one when `id` is
    /// not registered
    pub fn with_content_type(&self, id: &str) -> RenderContext<'a> {
        let content_type = match self.content_types.get(id) {
            Some(content_type) => content_type,
            None => {
                tracing::warn!(content_type = id, "unknown content type, keeping current");
                self.content_type
            }
        };
        RenderContext {
            content_type,
            ..self.clone()
        }
    }

    fn derive<'b>(&self, object: &'b Value, sequence: Option<SequenceInfo>) -> RenderContext<'b>
    where
        'a: 'b,
    {
        let mut stack: Vec<&'b Value> = self.stack.clone();
        stack.push(object);
        RenderContext {
            stack,
            sequence,
            indentation: self.indentation.clone(),
            overrides: self.overrides.clone(),
            content_type: self.content_type,
            content_types: self.content_types,
            library: self.library,
        }
    }

    fn indented(&self, indentation: Option<&str>) -> Option<String> {
        match (&self.indentation, indentation) {
            (Some(outer), Some(inner)) => Some(format!("{outer}{inner}")),
            (Some(outer), None) => Some(outer.clone()),
            (None, inner) => inner.map(str::to_string),
        }
    }
}
