//! Metamodel Registry — versioned class/attribute/association schemas.
//!
//! Each [`DomlVersion`] owns a [`Metamodel`] (qualified class name ->
//! [`ClassDef`]) plus a list of inverse-association pairs, loaded once from
//! an embedded YAML document and shared by reference thereafter.

mod assets;
mod error;
mod registry;
mod types;

pub use error::MetamodelError;
pub use registry::MetamodelRegistry;
pub use types::{
    AssociationDef, AttributeDef, ClassDef, DefaultValue, DomlVersion, InverseAssociations,
    Metamodel, Multiplicity, PrimitiveType,
};
