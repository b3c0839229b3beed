//! Unified error types for scaffold-kit.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Where an expression sits inside a template: the template entry path plus
/// a 1-based line and column within that entry's name or content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Compute the line/column of byte offset `offset` within `source`.
    pub fn at(path: impl Into<PathBuf>, source: &str, offset: usize) -> Self {
        let before = &source[..offset.min(source.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            path: path.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
    }
}

/// All errors that can occur while loading or rendering templates.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    // --- Expressions ---

    /// An expression references a variable absent from the context.
    #[error("unresolved variable '{name}' in `{{{{{expression}}}}}` at {location}")]
    UnresolvedVariable {
        name: String,
        expression: String,
        location: Location,
    },

    /// A chained transform is not one of the recognized transforms.
    #[error("unsupported transform '{transform}' in `{{{{{expression}}}}}` at {location} (supported: lower, upper, title, capitalize, strip, lstrip, rstrip, replace)")]
    UnsupportedTransform {
        transform: String,
        expression: String,
        location: Location,
    },

    /// The expression text does not parse (bad syntax, wrong arity, unterminated `{{`).
    #[error("invalid expression `{{{{{expression}}}}}` at {location}: {message}")]
    InvalidExpression {
        message: String,
        expression: String,
        location: Location,
    },

    // --- Output tree ---

    /// A target path already exists and overwrite was not requested.
    #[error("destination already contains {0}")]
    DestinationConflict(PathBuf),

    /// A rendered entry name is empty, `.`/`..`, or contains a path separator.
    #[error("template entry {template_path} renders to invalid name '{name}'")]
    InvalidName { name: String, template_path: PathBuf },

    /// Two sibling template entries render to the same output name.
    #[error("two template entries render to the same output path {0}")]
    NameCollision(PathBuf),

    // --- Templates and configuration ---

    /// No template with this name exists in the library.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// The template root does not exist or is not a directory.
    #[error("template directory not found: {0}")]
    TemplateDirNotFound(PathBuf),

    /// A manifest or context file exists but contains invalid JSON.
    #[error("failed to parse {path}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A `key=value` assignment could not be parsed.
    #[error("invalid variable assignment '{0}' (expected NAME=VALUE)")]
    InvalidAssignment(String),

    // --- Hooks ---

    /// A post-create hook exited unsuccessfully.
    #[error("hook `{command}` failed: {status}")]
    HookFailed { command: String, status: String },

    // --- General ---

    /// A filesystem operation failed on a specific path.
    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScaffoldError {
    /// Build a closure that wraps an [`std::io::Error`] with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Alias for `Result<T, ScaffoldError>`.
pub type Result<T> = std::result::Result<T, ScaffoldError>;
