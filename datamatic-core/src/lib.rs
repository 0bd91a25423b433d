//! Core file utilities for Datamatic.
//!
//! This crate provides the write-if-changed output file and the
//! generated-file banner hook shared by the expansion engine and the CLI.

mod banner;
mod file;

pub use banner::{Banner, CommentBanner, GENERATED_MARKER, NoBanner};
pub use file::{OutputFile, TEMPLATE_MARKER, WriteResult, destination_for, is_template};
