//! Rendering parsed templates against a context.

use crate::context::{Context, Value};
use crate::error::{Result, TemplateError, ValueKind};
use crate::parser::{LineIndex, Node};
use serde::{Deserialize, Serialize};

/// How rendering treats names that are absent from the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Fail with `MissingVariable` instead of rendering nothing
    pub strict: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::strict()
    }
}

impl RenderOptions {
    /// Missing names are errors
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Missing variables render as the empty string, missing sections as nothing
    pub fn permissive() -> Self {
        Self { strict: false }
    }
}

/// Contexts visible at one point of the walk, outermost first.
struct Scopes<'a> {
    frames: Vec<&'a Context>,
}

impl<'a> Scopes<'a> {
    fn lookup(&self, name: &str) -> Option<&'a Value> {
        self.frames.iter().rev().find_map(|&frame| frame.get(name))
    }
}

/// A node list being walked; sections also track the element being rendered.
struct Frame<'a> {
    nodes: &'a [Node],
    next: usize,
    items: Option<(&'a [Context], usize)>,
}

pub(crate) struct Renderer<'t> {
    lines: &'t LineIndex,
    options: RenderOptions,
}

impl<'t> Renderer<'t> {
    pub(crate) fn new(lines: &'t LineIndex, options: RenderOptions) -> Self {
        Self { lines, options }
    }

    /// Walks the tree with an explicit stack, so nesting depth is bounded
    /// by memory rather than by the thread's stack.
    pub(crate) fn render<'a>(
        &self,
        nodes: &'a [Node],
        context: &'a Context,
        capacity: usize,
    ) -> Result<String> {
        let mut out = String::with_capacity(capacity);
        let mut scopes = Scopes {
            frames: vec![context],
        };
        let mut stack = vec![Frame {
            nodes,
            next: 0,
            items: None,
        }];

        while let Some(frame) = stack.last_mut() {
            let nodes = frame.nodes;
            let Some(node) = nodes.get(frame.next) else {
                // Body finished: move to the next element or leave the section.
                match frame.items {
                    Some((items, idx)) if idx + 1 < items.len() => {
                        frame.items = Some((items, idx + 1));
                        frame.next = 0;
                        scopes.frames.pop();
                        scopes.frames.push(&items[idx + 1]);
                    }
                    Some(_) => {
                        scopes.frames.pop();
                        stack.pop();
                    }
                    None => {
                        stack.pop();
                    }
                }
                continue;
            };
            frame.next += 1;

            match node {
                Node::Text(text) => out.push_str(text),
                Node::Variable { name, offset } => match scopes.lookup(name) {
                    Some(Value::Scalar(value)) => out.push_str(value),
                    Some(Value::List(_)) => {
                        return Err(self.mismatch(name, *offset, ValueKind::Scalar, ValueKind::Sequence))
                    }
                    None => self.missing(name, *offset)?,
                },
                Node::Section {
                    name,
                    offset,
                    children,
                } => match scopes.lookup(name) {
                    Some(Value::List(items)) => {
                        if let Some(first) = items.first() {
                            scopes.frames.push(first);
                            stack.push(Frame {
                                nodes: children,
                                next: 0,
                                items: Some((items.as_slice(), 0)),
                            });
                        }
                    }
                    Some(Value::Scalar(_)) => {
                        return Err(self.mismatch(name, *offset, ValueKind::Sequence, ValueKind::Scalar))
                    }
                    None => self.missing(name, *offset)?,
                },
            }
        }

        Ok(out)
    }

    fn missing(&self, name: &str, offset: usize) -> Result<()> {
        if self.options.strict {
            return Err(TemplateError::MissingVariable {
                name: name.to_string(),
                line: self.lines.line(offset),
            });
        }
        tracing::trace!(key = name, "Missing name rendered as empty");
        Ok(())
    }

    fn mismatch(
        &self,
        name: &str,
        offset: usize,
        expected: ValueKind,
        found: ValueKind,
    ) -> TemplateError {
        TemplateError::TypeMismatch {
            name: name.to_string(),
            expected,
            found,
            line: self.lines.line(offset),
        }
    }
}
