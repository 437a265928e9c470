//! SimForge Artifacts
//!
//! The two output dialects a generation can target and the deterministic,
//! model-free processing applied to every candidate:
//! - [`extract`]: pull a clean candidate out of free-form model output
//! - [`validate_local`]: structural checks (delimiters, imports, return
//!   marker for component source; strict parse for command lists)
//!
//! Nothing in this crate performs I/O or fails: extraction always yields a
//! string and validation always yields a [`ValidationVerdict`].

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod extract;
mod kind;
mod lexer;
mod validate;
mod verdict;

pub use extract::{
    bulleted_items, extract, extract_command_list, extract_component, numbered_items,
    remove_trailing_commas, MIN_PROSE_LEN, MIN_TRAILING_LEN,
};
pub use kind::{ArtifactKind, CommandList, UnknownArtifactKind, COMMANDS_KEY, ENTRY_MARKER};
pub use lexer::{is_fence_line, is_import_line};
pub use validate::{validate_command_list, validate_component, validate_local};
pub use verdict::ValidationVerdict;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
