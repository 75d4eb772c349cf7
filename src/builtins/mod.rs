//! Built-in Requirement Library — the closed set of requirements every
//! verification run checks unless the DOMLR source opts out with
//! `ignore-builtin`.

mod common;
mod library;
mod types;

pub use library::catalog;
pub use types::{BuiltinCtx, BuiltinOutcome, BuiltinRequirement};
