//! Errors raised while constructing an [`super::SmtEncoding`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("metamodel declares no classes; cannot build a non-empty Class sort")]
    EmptyClassSort,

    #[error("element {0:?} has no elem_class mapping (builder invariant violated)")]
    MissingElemClass(String),
}
