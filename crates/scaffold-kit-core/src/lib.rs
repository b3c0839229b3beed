//! Core library for scaffold-kit.
//!
//! Turns a template tree plus a [`context::Context`] of named values into a
//! concrete project directory. Entry names and `.j2` file contents share one
//! small expression language (`{{ project_name.lower().replace('-', '_') }}`),
//! implemented in [`templates`]. The [`scaffold::Scaffolder`] renders a tree in
//! memory, stages it next to the destination, and commits it in one move.
//!
//! Around that core:
//! - [`library`]: named templates on disk (`template.json` + `files/`) and built-ins
//! - [`manifest`]: template manifests: variables, defaults, hooks, required tools
//! - [`hooks`]: post-create shell commands rendered with the same context
//! - [`prerequisites`]: `PATH` checks for tools a generated project expects

pub mod context;
pub mod error;
pub mod hooks;
pub mod library;
pub mod manifest;
pub mod prerequisites;
pub mod scaffold;
pub mod templates;
