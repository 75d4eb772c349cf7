//! Intermediate Model — a normalized, identifier-keyed entity graph built
//! from a DOML document, independent of the document's surface syntax.
//!
//! The source document itself (XMI, YAML, whatever) is out of scope;
//! callers hand us an [`ObjectGraph`] and we produce the
//! [`IntermediateModel`] the encoder consumes.

mod builder;
mod element;
mod error;
mod inverse;
mod special_parsers;

pub use builder::{build, ObjectGraph, RawAssociation, RawAttribute, RawObject, RawScalar};
pub use element::{AttrValue, ImElement};
pub use error::ImError;
pub use inverse::reciprocate_inverse_associations;
pub use special_parsers::{parse_cidr, parse_endpoint, parse_memory_mb, CidrBlock, Endpoint};

use indexmap::IndexMap;

use crate::base::{Interner, Name};
use crate::metamodel::DomlVersion;

/// The full normalized graph: every element keyed by its interned name.
#[derive(Debug, Clone)]
pub struct IntermediateModel {
    pub version: DomlVersion,
    pub elements: IndexMap<Name, ImElement>,
    /// Owns the element-id strings `Name`s point into; kept alongside the
    /// graph so diagnostics can print a human-readable id for a `Name`
    /// without the encoder or driver needing their own copy.
    pub interner: Interner,
}

impl IntermediateModel {
    pub fn get(&self, name: Name) -> Option<&ImElement> {
        self.elements.get(&name)
    }

    pub fn resolve_id(&self, name: Name) -> &str {
        self.interner.resolve(name)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &ImElement)> {
        self.elements.iter()
    }
}
