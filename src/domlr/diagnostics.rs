//! DOMLR compile-time diagnostics: input (syntax), resolution, and type
//! errors.

use text_size::TextSize;
use thiserror::Error;

use crate::metamodel::MetamodelError;

/// A syntax error: unexpected token, carrying the admissible token set
/// and an optional near-miss hint for a specific near-miss character,
/// e.g. a `.` where a scope arrow `::` is expected.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub offset: TextSize,
    pub found: String,
    pub expected: Vec<&'static str>,
    pub hint: Option<&'static str>,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "at byte {}: unexpected {:?}, expected one of [{}]",
            u32::from(self.offset),
            self.found,
            self.expected.join(", ")
        )?;
        if let Some(hint) = self.hint {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

/// Every DOMLR-stage error, fatal to the offending requirement only. A
/// lexical or syntax error aborts the whole parse of the source file,
/// since no tree can be produced to resolve further requirements
/// against.
#[derive(Debug, Error)]
pub enum DomlrError {
    #[error("lexical error: unrecognized character at byte {0:?}")]
    Lex(TextSize),

    #[error("syntax error {0}")]
    Syntax(SyntaxError),

    #[error("in requirement {requirement:?}: {source}")]
    Resolution {
        requirement: String,
        #[source]
        source: MetamodelError,
    },

    #[error("in requirement {requirement:?}: unknown variable {name:?}")]
    UnboundVariable { requirement: String, name: String },

    #[error("in requirement {requirement:?}: ordering operator {op:?} is not legal on string/boolean operands")]
    IllegalOrdering { requirement: String, op: &'static str },

    #[error("in requirement {requirement:?}: cannot compare a {lhs_ty} attribute against a {rhs_ty} literal")]
    HeterogeneousComparison {
        requirement: String,
        lhs_ty: &'static str,
        rhs_ty: &'static str,
    },

    #[error("in requirement {requirement:?}: duplicate directive skip id {0:?}", .id)]
    DuplicateSkip { requirement: String, id: String },
}

/// A hint table entry keyed on a specific near-miss token text. Looked
/// up by the parser when a `.` appears where `::`
/// was expected, a common slip given DOMLR accepts both separators in
/// qualified names but not in the quantifier-binder dot.
pub fn near_miss_hint(found: &str, expected: &[&'static str]) -> Option<&'static str> {
    if found == "." && expected.contains(&"::") {
        Some("use `::` to separate a class from its attribute/association, or `forall`/`exists` binder dot only after a lowercase variable")
    } else if found == "=" && expected.contains(&"==") {
        Some("DOMLR equality is `==`, not `=`")
    } else {
        None
    }
}
