//! Template parsing.
//!
//! Source text is first split into tokens (literal runs and tags), optionally
//! stripped of standalone section lines, and then folded into a node tree.

use crate::error::{ParseError, ParseErrorKind};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Leading characters of mustache tags this renderer does not implement.
const UNSUPPORTED_SIGILS: &[char] = &['^', '!', '&', '>', '<', '=', '{'];

/// A node of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    /// Literal text, emitted unchanged
    Text(String),
    /// `{{name}}`
    Variable {
        /// Looked up in the current scope
        name: String,
        /// Byte offset of the tag in the source
        offset: usize,
    },
    /// `{{#name}} ... {{/name}}`
    Section {
        /// Name of the sequence to iterate
        name: String,
        /// Byte offset of the opening tag in the source
        offset: usize,
        /// Body rendered once per element
        children: Vec<Node>,
    },
}

// Section bodies are released through a work list; the derived drop would
// recurse once per nesting level.
impl Drop for Node {
    fn drop(&mut self) {
        let Node::Section { children, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let Node::Section { children, .. } = &mut node {
                pending.append(children);
            }
        }
    }
}

/// Parser settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Drop lines that hold nothing but a section tag and whitespace
    pub standalone_lines: bool,
}

impl ParseOptions {
    /// Enable standalone line stripping
    #[must_use]
    pub fn standalone_lines(mut self, enabled: bool) -> Self {
        self.standalone_lines = enabled;
        self
    }
}

/// Maps byte offsets to line and column numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line containing `offset`
    pub(crate) fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    /// 1-based line and character column of `offset`
    pub(crate) fn location(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = self.line(offset);
        let line_start = self.starts[line - 1];
        let column = source[line_start..offset].chars().count() + 1;
        (line, column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Text,
    Variable(String),
    Open(String),
    Close(String),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

impl Token {
    fn is_text(&self) -> bool {
        self.kind == TokenKind::Text
    }

    fn is_section_tag(&self) -> bool {
        matches!(self.kind, TokenKind::Open(_) | TokenKind::Close(_))
    }
}

/// Parse `source` into a node tree.
pub(crate) fn parse(
    source: &str,
    lines: &LineIndex,
    options: ParseOptions,
) -> Result<Vec<Node>, ParseError> {
    let error = |kind: ParseErrorKind, offset: usize| {
        let (line, column) = lines.location(source, offset);
        ParseError {
            kind,
            offset,
            line,
            column,
        }
    };

    let mut tokens = tokenize(source).map_err(|(kind, offset)| error(kind, offset))?;
    if options.standalone_lines {
        strip_standalone_lines(source, &mut tokens);
    }

    // Each open section parks its parent's node list here until it closes.
    let mut stack: Vec<(String, usize, Vec<Node>)> = Vec::new();
    let mut current: Vec<Node> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Text => {
                if token.start < token.end {
                    current.push(Node::Text(source[token.start..token.end].to_string()));
                }
            }
            TokenKind::Variable(name) => current.push(Node::Variable {
                name,
                offset: token.start,
            }),
            TokenKind::Open(name) => {
                stack.push((name, token.start, std::mem::take(&mut current)));
            }
            TokenKind::Close(name) => {
                let Some((open_name, open_offset, parent)) = stack.pop() else {
                    return Err(error(ParseErrorKind::UnexpectedClose(name), token.start));
                };
                if open_name != name {
                    return Err(error(
                        ParseErrorKind::MismatchedClose {
                            expected: open_name,
                            found: name,
                        },
                        token.start,
                    ));
                }
                let children = std::mem::replace(&mut current, parent);
                current.push(Node::Section {
                    name,
                    offset: open_offset,
                    children,
                });
            }
        }
    }

    if let Some((name, offset, _)) = stack.pop() {
        return Err(error(ParseErrorKind::UnclosedSection(name), offset));
    }

    Ok(current)
}

fn tokenize(source: &str) -> Result<Vec<Token>, (ParseErrorKind, usize)> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(rel) = source[pos..].find(OPEN) {
        let start = pos + rel;
        if start > pos {
            tokens.push(Token {
                kind: TokenKind::Text,
                start: pos,
                end: start,
            });
        }

        let inner_start = start + OPEN.len();
        let Some(close_rel) = source[inner_start..].find(CLOSE) else {
            return Err((ParseErrorKind::UnterminatedTag, start));
        };
        let inner_end = inner_start + close_rel;
        let end = inner_end + CLOSE.len();

        let kind = classify(&source[inner_start..inner_end]).map_err(|kind| (kind, start))?;
        tokens.push(Token { kind, start, end });
        pos = end;
    }

    if pos < source.len() {
        tokens.push(Token {
            kind: TokenKind::Text,
            start: pos,
            end: source.len(),
        });
    }

    Ok(tokens)
}

fn classify(raw: &str) -> Result<TokenKind, ParseErrorKind> {
    let trimmed = raw.trim();
    let Some(first) = trimmed.chars().next() else {
        return Err(ParseErrorKind::EmptyTag);
    };

    if UNSUPPORTED_SIGILS.contains(&first) {
        return Err(ParseErrorKind::UnsupportedDirective(trimmed.to_string()));
    }

    let (name, make): (&str, fn(String) -> TokenKind) = match first {
        '#' => (trimmed[1..].trim(), TokenKind::Open),
        '/' => (trimmed[1..].trim(), TokenKind::Close),
        _ => (trimmed, TokenKind::Variable),
    };

    if name.is_empty() {
        return Err(ParseErrorKind::EmptyTag);
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || c == '{' || c == '}')
    {
        return Err(ParseErrorKind::InvalidName(name.to_string()));
    }

    Ok(make(name.to_string()))
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c == ' ' || c == '\t' || c == '\r')
}

/// Whether the section tag at `idx` is alone on its line.
fn is_standalone(source: &str, tokens: &[Token], idx: usize) -> bool {
    let before = match idx.checked_sub(1).map(|prev| &tokens[prev]) {
        None => true,
        Some(prev) if prev.is_text() => {
            let text = &source[prev.start..prev.end];
            match text.rfind('\n') {
                Some(nl) => is_blank(&text[nl + 1..]),
                None => prev.start == 0 && is_blank(text),
            }
        }
        Some(_) => false,
    };

    let after = match tokens.get(idx + 1) {
        None => true,
        Some(next) if next.is_text() => {
            let text = &source[next.start..next.end];
            match text.find('\n') {
                Some(nl) => is_blank(&text[..nl]),
                None => next.end == source.len() && is_blank(text),
            }
        }
        Some(_) => false,
    };

    before && after
}

fn strip_standalone_lines(source: &str, tokens: &mut [Token]) {
    // Decide on the untouched source first; neighbouring tags share text runs.
    let standalone: Vec<usize> = (0..tokens.len())
        .filter(|&idx| tokens[idx].is_section_tag() && is_standalone(source, tokens, idx))
        .collect();

    for idx in standalone {
        if let Some(prev) = idx.checked_sub(1).map(|p| &mut tokens[p]) {
            if prev.is_text() {
                prev.end = match source[prev.start..prev.end].rfind('\n') {
                    Some(nl) => prev.start + nl + 1,
                    None => prev.start,
                };
            }
        }
        if let Some(next) = tokens.get_mut(idx + 1) {
            if next.is_text() {
                next.start = match source[next.start..next.end].find('\n') {
                    Some(nl) => next.start + nl + 1,
                    None => next.end,
                };
            }
        }
    }
}
