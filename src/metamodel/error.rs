//! Metamodel load/resolution errors.

use thiserror::Error;

/// Errors raised while loading a versioned schema or resolving a name
/// against it.
///
/// `UnknownVersion` and `MalformedSchema` are fatal input errors.
/// `AttributeNotFound`/`AssociationNotFound` are surfaced to the
/// DOMLR compiler as a named, recoverable resolution error — they carry
/// edit-distance suggestions so a typo like `cpu_cunt` points back at
/// `cpu_count`.
#[derive(Debug, Error)]
pub enum MetamodelError {
    #[error("unknown DOML version: {0}")]
    UnknownVersion(String),

    #[error("malformed metamodel schema for {version}: {reason}")]
    MalformedSchema { version: String, reason: String },

    #[error("unresolvable superclass {superclass:?} referenced by class {class}")]
    UnknownSuperclass { class: String, superclass: String },

    #[error("unknown class {name}{}", suggestions_suffix(.suggestions))]
    UnknownClass { name: String, suggestions: Vec<String> },

    #[error("association {class}::{association} targets unknown class {target}")]
    UnknownAssociationTarget {
        class: String,
        association: String,
        target: String,
    },

    #[error("attribute {local_name} not found on {class} or its superclasses{}",
        suggestions_suffix(.suggestions))]
    AttributeNotFound {
        class: String,
        local_name: String,
        suggestions: Vec<String>,
    },

    #[error("association {local_name} not found on {class} or its superclasses{}",
        suggestions_suffix(.suggestions))]
    AssociationNotFound {
        class: String,
        local_name: String,
        suggestions: Vec<String>,
    },

    #[error("inverse-association pair references unknown association {0}")]
    UnknownInverseAssociation(String),
}

fn suggestions_suffix(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}
