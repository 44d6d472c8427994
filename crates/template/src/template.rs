//! Parsed, immutable templates.

use crate::context::Context;
use crate::error::{ParseError, Result};
use crate::parser::{self, LineIndex, Node, ParseOptions};
use crate::render::{RenderOptions, Renderer};
use tracing::instrument;

/// A template parsed once and rendered any number of times.
///
/// `Template` holds no interior mutability, so a single instance can be
/// shared across threads and rendered concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
    lines: LineIndex,
    source_len: usize,
}

impl Template {
    /// Parse with default options (literal text kept byte-for-byte)
    pub fn parse(source: &str) -> std::result::Result<Self, ParseError> {
        Self::parse_with(source, ParseOptions::default())
    }

    /// Parse with explicit options
    pub fn parse_with(source: &str, options: ParseOptions) -> std::result::Result<Self, ParseError> {
        let lines = LineIndex::new(source);
        let nodes = parser::parse(source, &lines, options)?;
        tracing::debug!(
            bytes = source.len(),
            nodes = nodes.len(),
            standalone_lines = options.standalone_lines,
            "Template parsed"
        );
        Ok(Self {
            nodes,
            lines,
            source_len: source.len(),
        })
    }

    /// Render in strict mode
    pub fn render(&self, context: &Context) -> Result<String> {
        self.render_with(context, &RenderOptions::default())
    }

    /// Render with explicit options.
    ///
    /// On error nothing is returned; partial output is discarded.
    #[instrument(level = "debug", skip_all, fields(strict = options.strict))]
    pub fn render_with(&self, context: &Context, options: &RenderOptions) -> Result<String> {
        let output = Renderer::new(&self.lines, *options).render(&self.nodes, context, self.source_len)?;
        tracing::debug!(bytes = output.len(), "Template rendered");
        Ok(output)
    }

    /// Distinct variable names, in order of first appearance
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        walk(&self.nodes, |node| {
            if let Node::Variable { name, .. } = node {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
        });
        names
    }

    /// Distinct section names, in order of first appearance
    pub fn sections(&self) -> Vec<&str> {
        let mut names = Vec::new();
        walk(&self.nodes, |node| {
            if let Node::Section { name, .. } = node {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
        });
        names
    }
}

impl std::str::FromStr for Template {
    type Err = ParseError;

    fn from_str(source: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(source)
    }
}

/// Visit every node in source order without recursing.
fn walk<'a>(nodes: &'a [Node], mut visit: impl FnMut(&'a Node)) {
    let mut stack = vec![nodes.iter()];
    while let Some(iter) = stack.last_mut() {
        match iter.next() {
            Some(node) => {
                visit(node);
                if let Node::Section { children, .. } = node {
                    stack.push(children.iter());
                }
            }
            None => {
                stack.pop();
            }
        }
    }
}
