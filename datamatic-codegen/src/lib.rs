//! Template expansion engine for Datamatic.
//!
//! Turns `.dm.` templates into source files by repeating marked blocks once
//! per component of a spec and substituting `{{Comp::...}}` / `{{Attr::...}}`
//! tokens.
//!
//! # Module Organization
//!
//! - [`pattern`] - Exact, template and variadic name matching
//! - [`types`] - Type-driven rendering of default values (TypeRenderer)
//! - [`methods`] - Token methods and the evaluation context (MethodRegistry)
//! - [`token`] - Inline token grammar
//! - [`filter`] - Flag-filtered spec views
//! - [`expand`] - Block scanning and expansion
//! - [`engine`] - Engine builder, extensions and file emission

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod emit;
pub mod engine;
mod error;
pub mod expand;
pub mod filter;
pub mod methods;
pub mod pattern;
pub mod token;
pub mod types;
mod validate;

pub use emit::Emitted;
pub use engine::{Engine, EngineBuilder, Extension, FnExtension, Registries};
pub use error::{Error, Result};
pub use filter::{FilteredAttribute, FilteredComponent, FilteredSpec};
pub use methods::{EvalContext, MethodRegistry};
pub use token::{Namespace, Token};
pub use types::TypeRenderer;
pub use validate::validate_defaults;
