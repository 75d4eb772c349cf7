//! Errors raised while building an [`super::IntermediateModel`] from an
//! [`super::ObjectGraph`].

use thiserror::Error;

use crate::metamodel::MetamodelError;

#[derive(Debug, Error)]
pub enum ImError {
    #[error(transparent)]
    Metamodel(#[from] MetamodelError),

    #[error("object {id:?} declares unknown class {class:?}")]
    UnknownClass { id: String, class: String },

    #[error("association {class}::{association} on {id:?} targets unknown object {target:?}")]
    DanglingAssociationTarget {
        id: String,
        class: String,
        association: String,
        target: String,
    },

    #[error("{class}::{attribute} on {id:?} failed to parse: {reason}")]
    MalformedSpecialAttribute {
        id: String,
        class: String,
        attribute: String,
        reason: String,
    },

    #[error("duplicate object id {0:?}")]
    DuplicateId(String),
}
