//! Polarity handling.
//!
//! A requirement with no leading `-` states the property its author wants
//! to hold; the solver must be asked whether its *negation* holds (a
//! witness of violation) so that `sat` can keep meaning "violated"
//! uniformly across built-ins and user requirements alike ([`crate::result::Verdict::from_z3_result`]).
//! A leading `-` means the author already wrote the violation condition
//! directly (mirroring the built-in library's own convention), so no
//! further negation is applied. Negation is pushed through the AST (rather
//! than applied to the lowered `z3::ast::Bool`) so that the resulting
//! outer existentials can be Skolemized for witness extraction
//! ([`super::lower::lower_violation`]) instead of staying trapped inside
//! an opaque `not(forall ...)` term.

use super::ast::Expr;

/// The formula that should be asserted to the solver so that `sat` means
/// "this requirement is violated".
pub fn violation_form(flipped: bool, body: &Expr) -> Expr {
    if flipped {
        body.clone()
    } else {
        negate(body)
    }
}

/// Structural negation in negation-normal form: quantifiers flip kind,
/// connectives apply De Morgan, and a predicate atom is simply wrapped
/// (there's no separate "negated atom" AST node, and none is needed —
/// [`super::lower::lower_expr`] already handles `Expr::Not` by negating
/// the lowered `Bool`).
pub fn negate(expr: &Expr) -> Expr {
    match expr {
        Expr::Forall(var, body) => Expr::Exists(var.clone(), Box::new(negate(body))),
        Expr::Exists(var, body) => Expr::Forall(var.clone(), Box::new(negate(body))),
        Expr::Not(inner) => (**inner).clone(),
        Expr::And(a, b) => Expr::Or(Box::new(negate(a)), Box::new(negate(b))),
        Expr::Or(a, b) => Expr::And(Box::new(negate(a)), Box::new(negate(b))),
        Expr::Implies(a, b) => Expr::And(a.clone(), Box::new(negate(b))),
        // ¬(a ↔ b) ≡ (a ↔ ¬b).
        Expr::Iff(a, b) => Expr::Iff(a.clone(), Box::new(negate(b))),
        atom => Expr::Not(Box::new(atom.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domlr::ast::{CompareOp, Literal, RawName, VarRef};
    use text_size::TextRange;

    fn var(name: &str) -> VarRef {
        VarRef { name: name.to_string(), range: TextRange::new(0.into(), 0.into()) }
    }

    fn raw(name: &str) -> RawName {
        RawName { raw: name.to_string(), range: TextRange::new(0.into(), 0.into()) }
    }

    #[test]
    fn negating_forall_yields_exists() {
        let body = Expr::Forall(
            var("v"),
            Box::new(Expr::HasAttrLiteral(var("v"), raw("infrastructure.ComputingNode::cpu_count"), CompareOp::Ge, Literal::Int(2))),
        );
        let negated = negate(&body);
        assert!(matches!(negated, Expr::Exists(..)));
    }

    #[test]
    fn double_negation_is_identity() {
        let atom = Expr::IsVar(var("a"), var("b"));
        let once = negate(&atom);
        let twice = negate(&once);
        assert!(matches!(twice, Expr::IsVar(..)));
    }

    #[test]
    fn flipped_body_is_returned_unchanged() {
        let atom = Expr::IsVar(var("a"), var("b"));
        match violation_form(true, &atom) {
            Expr::IsVar(..) => {}
            other => panic!("expected the body verbatim, got {other:?}"),
        }
    }

    #[test]
    fn unflipped_body_is_negated() {
        let atom = Expr::IsVar(var("a"), var("b"));
        match violation_form(false, &atom) {
            Expr::Not(_) => {}
            other => panic!("expected a negation, got {other:?}"),
        }
    }
}
