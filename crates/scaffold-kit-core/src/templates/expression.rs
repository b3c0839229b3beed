//! The `{{ ... }}` expression language.
//!
//! An expression is a base value followed by zero or more chained transforms:
//!
//! ```text
//! {{ project_name }}
//! {{ project_name.lower().replace('-', '_') }}
//! {{ '{{' }}                      <- string literal base, emits a literal "{{"
//! ```
//!
//! Transforms are a closed set ([`Transform`]); anything else fails to parse.
//! Arguments are single- or double-quoted string literals supporting the
//! escapes `\\`, `\'`, `\"`, `\n` and `\t`.

use std::fmt;
use std::path::Path;

use crate::context::Context;
use crate::error::{Location, Result, ScaffoldError};

/// A string transform applied to the value produced by the previous step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    Lower,
    Upper,
    /// Upper-case the first letter of every word, lower-case the rest.
    Title,
    /// Upper-case the first character, lower-case the rest.
    Capitalize,
    Strip,
    LStrip,
    RStrip,
    Replace { from: String, to: String },
}

impl Transform {
    pub const NAMES: &'static [&'static str] = &[
        "lower",
        "upper",
        "title",
        "capitalize",
        "strip",
        "lstrip",
        "rstrip",
        "replace",
    ];

    /// Build a transform from its call name and literal arguments.
    ///
    /// Returns `Ok(None)` for an unknown name and `Err(message)` for a known
    /// name called with the wrong number of arguments.
    fn from_call(name: &str, mut args: Vec<String>) -> std::result::Result<Option<Self>, String> {
        let expected = match name {
            "replace" => 2,
            n if Self::NAMES.contains(&n) => 0,
            _ => return Ok(None),
        };
        if args.len() != expected {
            return Err(format!(
                "{name}() takes {expected} arguments, got {}",
                args.len()
            ));
        }

        let transform = match name {
            "lower" => Self::Lower,
            "upper" => Self::Upper,
            "title" => Self::Title,
            "capitalize" => Self::Capitalize,
            "strip" => Self::Strip,
            "lstrip" => Self::LStrip,
            "rstrip" => Self::RStrip,
            _ => {
                let to = args.pop().unwrap_or_default();
                let from = args.pop().unwrap_or_default();
                Self::Replace { from, to }
            }
        };
        Ok(Some(transform))
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            Self::Lower => input.to_lowercase(),
            Self::Upper => input.to_uppercase(),
            Self::Title => title_case(input),
            Self::Capitalize => {
                let mut chars = input.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            }
            Self::Strip => input.trim().to_string(),
            Self::LStrip => input.trim_start().to_string(),
            Self::RStrip => input.trim_end().to_string(),
            Self::Replace { from, to } => input.replace(from.as_str(), to),
        }
    }
}

fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// The value an expression starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base {
    Variable(String),
    Literal(String),
}

/// A parsed `{{ ... }}` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub base: Base,
    pub transforms: Vec<Transform>,
    /// Inner text between the delimiters, trimmed.
    pub text: String,
    pub location: Location,
}

impl Expression {
    /// The context variable this expression reads, if any.
    pub fn variable(&self) -> Option<&str> {
        match &self.base {
            Base::Variable(name) => Some(name),
            Base::Literal(_) => None,
        }
    }

    /// Resolve the base against `context` and apply every transform in order.
    pub fn evaluate(&self, context: &Context) -> Result<String> {
        let mut value = match &self.base {
            Base::Variable(name) => context
                .get(name)
                .ok_or_else(|| ScaffoldError::UnresolvedVariable {
                    name: name.clone(),
                    expression: self.text.clone(),
                    location: self.location.clone(),
                })?
                .to_string(),
            Base::Literal(s) => s.clone(),
        };
        for transform in &self.transforms {
            value = transform.apply(&value);
        }
        Ok(value)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{{}}}}}", self.text)
    }
}

/// Find the `}}` closing an expression whose body starts at `start`.
///
/// Delimiters inside quoted literals are skipped. Returns the byte offset of
/// the closing `}}`.
pub(crate) fn find_close(source: &str, start: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'\'' || b == b'"' {
                    quote = Some(b);
                } else if b == b'}' && bytes.get(i + 1) == Some(&b'}') {
                    return Some(i);
                }
            }
        }
        i += 1;
    }
    None
}

/// Parse the expression whose `{{` opens at byte `open` in `source`.
///
/// Returns the expression and the byte offset just past its closing `}}`.
pub(crate) fn parse_at(source: &str, open: usize, origin: &Path) -> Result<(Expression, usize)> {
    let location = Location::at(origin, source, open);
    let body_start = open + 2;

    let Some(close) = find_close(source, body_start) else {
        let rest = &source[body_start..];
        let text = rest.lines().next().unwrap_or("").trim().to_string();
        return Err(ScaffoldError::InvalidExpression {
            message: "unterminated expression, expected `}}`".into(),
            expression: text,
            location,
        });
    };

    let text = source[body_start..close].trim().to_string();
    let invalid = |message: String| ScaffoldError::InvalidExpression {
        message,
        expression: text.clone(),
        location: location.clone(),
    };

    let mut parser = Parser::new(&text);
    let (base, transforms) = parser.parse().map_err(|e| match e {
        ParseError::Invalid(message) => invalid(message),
        ParseError::UnknownTransform(transform) => ScaffoldError::UnsupportedTransform {
            transform,
            expression: text.clone(),
            location: location.clone(),
        },
    })?;

    Ok((
        Expression {
            base,
            transforms,
            text,
            location,
        },
        close + 2,
    ))
}

enum ParseError {
    Invalid(String),
    UnknownTransform(String),
}

type ParseResult<T> = std::result::Result<T, ParseError>;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn parse(&mut self) -> ParseResult<(Base, Vec<Transform>)> {
        self.skip_ws();
        let base = match self.peek() {
            None => return Err(ParseError::Invalid("empty expression".into())),
            Some('\'' | '"') => Base::Literal(self.string_literal()?),
            Some(c) if is_ident_start(c) => Base::Variable(self.identifier()),
            Some(c) => {
                return Err(ParseError::Invalid(format!(
                    "expected a variable name, found '{c}'"
                )))
            }
        };

        let mut transforms = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => break,
                Some('.') => {
                    self.bump();
                }
                Some(c) => {
                    return Err(ParseError::Invalid(format!(
                        "unexpected '{c}', transforms are chained with '.'"
                    )))
                }
            }

            self.skip_ws();
            let name = match self.peek() {
                Some(c) if is_ident_start(c) => self.identifier(),
                _ => return Err(ParseError::Invalid("expected a transform name after '.'".into())),
            };
            self.skip_ws();
            if self.peek() != Some('(') {
                return Err(ParseError::Invalid(format!(
                    "'{name}' is not called; attribute access is not supported"
                )));
            }
            self.bump();
            let args = self.arguments()?;

            match Transform::from_call(&name, args) {
                Ok(Some(t)) => transforms.push(t),
                Ok(None) => return Err(ParseError::UnknownTransform(name)),
                Err(message) => return Err(ParseError::Invalid(message)),
            }
        }

        Ok((base, transforms))
    }

    /// Parse a comma-separated literal list after `(`, consuming the `)`.
    fn arguments(&mut self) -> ParseResult<Vec<String>> {
        let mut args = Vec::new();
        self.skip_ws();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(args);
        }
        loop {
            self.skip_ws();
            match self.peek() {
                Some('\'' | '"') => args.push(self.string_literal()?),
                _ => {
                    return Err(ParseError::Invalid(
                        "transform arguments must be quoted string literals".into(),
                    ))
                }
            }
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(')') => return Ok(args),
                Some(c) => {
                    return Err(ParseError::Invalid(format!(
                        "expected ',' or ')' in argument list, found '{c}'"
                    )))
                }
                None => {
                    return Err(ParseError::Invalid(
                        "expected ')' to close the argument list".into(),
                    ))
                }
            }
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn string_literal(&mut self) -> ParseResult<String> {
        let Some(quote) = self.bump() else {
            return Err(ParseError::Invalid("expected a string literal".into()));
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::Invalid("unterminated string literal".into())),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => {
                        return Err(ParseError::Invalid("unterminated string literal".into()))
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
