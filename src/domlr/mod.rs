//! DOMLR: the small first-order requirement DSL the driver runs alongside
//! the Built-in Requirement Library. A source file is flag directives followed by
//! zero or more requirement declarations; compiling one walks lex, parse,
//! name resolution, FOL lowering and polarity flipping in that order,
//! each stage failing only the requirement it's working on (a resolution
//! or type error) or the whole file (a lex/syntax error, since no tree
//! survives to resolve anything against).

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod polarity;
pub mod resolve;

use std::collections::HashSet;

use tracing::info_span;

pub use ast::{Directive, DomlrSource, RequirementDecl};
pub use diagnostics::DomlrError;
pub use lower::{LowerCtx, LoweredViolation};
pub use parser::parse;

/// Parse a DOMLR source file and check its directives for the one
/// file-level structural rule the parser itself can't enforce: no
/// `skip` id may repeat. A repeated skip id is a compile error, not a
/// silent no-op.
pub fn compile(source: &str) -> Result<DomlrSource, DomlrError> {
    let span = info_span!("domlr compile", bytes = source.len());
    let _enter = span.enter();

    let parsed = parser::parse(source)?;
    let mut seen = HashSet::new();
    for directive in &parsed.directives {
        if let Directive::Skip(id) = directive {
            if !seen.insert(id.clone()) {
                return Err(DomlrError::DuplicateSkip { requirement: "<directives>".to_string(), id: id.clone() });
            }
        }
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_skip_directive() {
        let src = "skip builtin.vm_iface\nskip builtin.vm_iface\n\"r\" { forall v. v is infrastructure.VirtualMachine } error \"x\"";
        let err = compile(src).unwrap_err();
        assert!(matches!(err, DomlrError::DuplicateSkip { .. }));
    }

    #[test]
    fn accepts_distinct_skip_directives() {
        let src = "skip builtin.vm_iface\nskip builtin.iface_uniq\n\"r\" { forall v. v is infrastructure.VirtualMachine } error \"x\"";
        assert!(compile(src).is_ok());
    }
}
