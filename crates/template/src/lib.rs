//! Mustache-style template rendering for white-label build scripts.
//!
//! The supported syntax is deliberately small:
//! - `{{name}}` substitutes a scalar from the context
//! - `{{#name}} ... {{/name}}` repeats the body once per mapping in a sequence,
//!   with that mapping's keys shadowing the enclosing scope
//!
//! # Example
//!
//! ```rust
//! use whitelabel_template::{render, Context};
//!
//! let ctx = Context::new().with(
//!     "items",
//!     vec![Context::new().with("v", "a"), Context::new().with("v", "b")],
//! );
//! assert_eq!(render("{{#items}}{{v}},{{/items}}", &ctx).unwrap(), "a,b,");
//! ```

#![warn(missing_docs)]

mod context;
mod error;
mod parser;
mod render;
mod template;

pub use context::{Context, Value};
pub use error::{ParseError, ParseErrorKind, Result, TemplateError, ValueKind};
pub use parser::ParseOptions;
pub use render::RenderOptions;
pub use template::Template;

/// Parse and render in one step, in strict mode.
pub fn render(source: &str, context: &Context) -> Result<String> {
    Template::parse(source)?.render(context)
}

/// Parse and render in one step with explicit options.
pub fn render_with(
    source: &str,
    context: &Context,
    parse: ParseOptions,
    options: &RenderOptions,
) -> Result<String> {
    Template::parse_with(source, parse)?.render_with(context, options)
}
