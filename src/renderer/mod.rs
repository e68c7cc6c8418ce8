//! Renderer for compiled templates
//!
//! This module walks a token tree against a [`RenderContext`] and produces
//! the output text.

pub mod context;
pub mod render;
pub mod transform;

pub use context::{RenderContext, SequenceInfo};
pub use render::{render_tokens, resolve};
