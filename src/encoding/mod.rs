//! SMT Encoding — lowers a metamodel + Intermediate Model pair into Z3
//! sorts, relations and background axioms.
//!
//! One [`SmtEncoding`] is built per verification worker (one
//! `z3::Context` per rayon thread), since `z3::Context` is not `Sync`.

mod background;
mod consistency;
mod error;
mod sorts;
mod types;

pub use error::EncodingError;
pub use types::{AttrDataSort, EnumSort, SmtEncoding, SmtSorts};

use tracing::info_span;
use z3::{Context, Solver};

use crate::im::IntermediateModel;
use crate::metamodel::{DomlVersion, Metamodel, MetamodelRegistry};

/// Whether to assert the optional type/multiplicity/inverse consistency
/// axioms alongside the background facts (set by the `check-consistency`
/// directive).
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingOptions {
    pub check_consistency: bool,
}

/// Build the sorts, relations and background facts for `im`, optionally
/// adding the consistency axioms, and assert everything onto `solver`.
pub fn encode<'ctx>(
    ctx: &'ctx Context,
    solver: &Solver<'ctx>,
    metamodel: &Metamodel,
    registry: &MetamodelRegistry,
    version: DomlVersion,
    im: &IntermediateModel,
    options: EncodingOptions,
) -> Result<SmtEncoding<'ctx>, EncodingError> {
    let span = info_span!("encoding build", version = ?version, elements = im.len(), check_consistency = options.check_consistency);
    let _enter = span.enter();

    let sorts = sorts::build_sorts(ctx, metamodel, im)?;
    let encoding = background::build_encoding(ctx, sorts);
    background::assert_background(ctx, solver, &encoding, im);
    if options.check_consistency {
        consistency::assert_consistency(ctx, solver, &encoding, metamodel, registry, version);
    }
    Ok(encoding)
}
