//! XMI deserialization seam. This crate does not reimplement an XMI
//! parser: only the contract an adapter must satisfy is named here.

use thiserror::Error;

use crate::im::RawObject;
use crate::metamodel::DomlVersion;

/// A flat object graph, ready to hand to [`crate::im::build`].
pub type RawObjectGraph = Vec<RawObject>;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("document declares no recognizable schema version")]
    UnknownVersion,
}

/// Turns a serialized DOML document into a [`RawObjectGraph`] plus the
/// schema version it was written against.
///
/// An implementation should try the newest supported [`DomlVersion`]
/// first and fall back to older ones, honoring an explicit version
/// attribute on the document root when present.
pub trait XmiAdapter {
    fn load(
        &self,
        bytes: &[u8],
        explicit_version: Option<DomlVersion>,
    ) -> Result<(RawObjectGraph, DomlVersion), AdapterError>;
}
