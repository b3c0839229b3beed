//! Strict renderer for `{{ ... }}` template strings.
//!
//! The same code path renders entry names and file contents, so an expression
//! produces the same text wherever it appears. Rendering is always strict:
//! a variable that is not in the [`Context`] is an error, never an empty string.
//!
//! ## Usage
//!
//! ```ignore
//! use scaffold_kit_core::context::Context;
//! use scaffold_kit_core::templates::renderer::TemplateRenderer;
//!
//! let context = Context::new().with("project_name", "Widget");
//! let renderer = TemplateRenderer::new(&context);
//! let output = renderer.render("# {{project_name}}", Path::new("README.md.j2"))?;
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use crate::context::Context;
use crate::error::Result;
use crate::templates::expression::{self, Expression};

/// One piece of a parsed template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Expr(Expression),
}

/// A template string split into literal text and expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`, reporting errors against `origin`.
    pub fn parse(source: &str, origin: &Path) -> Result<Self> {
        let mut segments = Vec::new();
        let mut pos = 0;

        while let Some(found) = source[pos..].find("{{") {
            let open = pos + found;
            if open > pos {
                segments.push(Segment::Text(source[pos..open].to_string()));
            }
            let (expr, end) = expression::parse_at(source, open, origin)?;
            segments.push(Segment::Expr(expr));
            pos = end;
        }
        if pos < source.len() {
            segments.push(Segment::Text(source[pos..].to_string()));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the template contains no expressions at all.
    pub fn is_static(&self) -> bool {
        self.expressions().next().is_none()
    }

    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Expr(e) => Some(e),
            Segment::Text(_) => None,
        })
    }

    /// Every context variable the template reads.
    pub fn variables(&self) -> BTreeSet<&str> {
        self.expressions().filter_map(Expression::variable).collect()
    }

    pub fn render(&self, context: &Context) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Expr(expr) => out.push_str(&expr.evaluate(context)?),
            }
        }
        Ok(out)
    }
}

/// Renders template strings against one fixed context.
pub struct TemplateRenderer<'a> {
    context: &'a Context,
}

impl<'a> TemplateRenderer<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// Parse and render a template string in one step.
    pub fn render(&self, template: &str, origin: &Path) -> Result<String> {
        Template::parse(template, origin)?.render(self.context)
    }
}
