//! The crate-level error type: every condition fatal enough to abort a
//! whole verification run rather than being captured per-requirement.
//! These are fatal input errors: malformed schemas, unknown versions,
//! unreadable models.
//!
//! Resolution and type errors against an individual DOMLR requirement are
//! deliberately *not* representable here — those are caught by the driver
//! and folded into that one requirement's [`crate::result::RequirementOutcome`]
//! as `Undetermined`, never propagated up to fail the run.

use thiserror::Error;

use crate::domlr::DomlrError;
use crate::encoding::EncodingError;
use crate::im::ImError;
use crate::metamodel::MetamodelError;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error(transparent)]
    Metamodel(#[from] MetamodelError),

    #[error(transparent)]
    Im(#[from] ImError),

    #[error(transparent)]
    Domlr(#[from] DomlrError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
