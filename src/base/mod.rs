//! Foundation types shared by every other module in this crate.
//!
//! - [`Span`], [`Position`] — line/column source locations for diagnostics.
//! - [`LineIndex`] — byte-offset-to-line/column conversion.
//! - [`Name`], [`Interner`] — string interning for mangled attribute,
//!   association, and class names.
//! - [`SourceId`] — distinguishes the DOML model source from the DOMLR
//!   requirements source in diagnostics that can point at either.
//!
//! This module has no dependencies on other crate modules.

mod intern;
mod span;

pub use intern::{Interner, Name};
pub use span::{LineCol, LineIndex, Position, Span};

pub use text_size::{TextRange, TextSize};

/// Which source document a diagnostic's span refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// The DOML model (after XMI decoding, conceptually — spans here are
    /// best-effort since the XMI adapter is an external collaborator).
    Model,
    /// The DOMLR requirements source text.
    Requirements,
}
