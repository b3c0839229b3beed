//! Template system for project scaffolding.
//!
//! - [`expression`]: the `{{ ... }}` expression parser and evaluator
//! - [`renderer`]: strict rendering of whole template strings
//! - [`tree`]: template trees, loaded from disk or assembled in code
//! - [`embedded`]: built-in templates compiled in via [`include_str!`]
//!
//! ## Template syntax
//!
//! Any entry name may contain expressions. File contents are only rendered
//! when the file name ends in `.j2`; the suffix is removed from the output
//! name. Everything else is copied byte-for-byte.
//!
//! ```text
//! files/
//! ├── README.md.j2                                   -> README.md (rendered)
//! ├── src/{{project_name.lower().replace('-', '_')}}/ -> src/my_app/
//! └── tests/__init__.py                              -> tests/__init__.py (copied)
//! ```
//!
//! **Warning**: built-in template files in `templates/` and the constants in
//! [`embedded`] must stay in sync. The `include_str!` paths are checked at compile-time.

pub mod embedded;
pub mod expression;
pub mod renderer;
pub mod tree;
