//! AST -> first-order-logic lowering.
//!
//! Each [`super::ast::Expr`] node becomes a [`z3::ast::Bool`] closed over
//! the worker's own [`z3::Context`], mirroring the shape of
//! `crate::builtins::types`'s combinators (`is_instance_of`, `has_assoc`,
//! ...) but built from resolved DOMLR syntax rather than hardcoded
//! mangled names. Those combinators live in a private submodule of
//! `builtins` and so aren't reusable here; the handful duplicated below
//! are the minimum needed to cover DOMLR's smaller predicate surface.

use std::collections::HashMap;

use z3::ast::{forall_const, exists_const, Ast, Bool, Datatype, Int};
use z3::Context;

use crate::encoding::SmtEncoding;
use crate::metamodel::{DomlVersion, MetamodelRegistry, PrimitiveType};

use super::ast::{CompareOp, Expr, Literal, RawName, RequirementDecl, VarRef};
use super::diagnostics::DomlrError;
use super::resolve;

/// Everything a DOMLR requirement body needs to lower itself to Z3.
pub struct LowerCtx<'a, 'ctx> {
    pub ctx: &'ctx Context,
    pub encoding: &'a SmtEncoding<'ctx>,
    pub registry: &'a MetamodelRegistry,
    pub version: DomlVersion,
}

type Env<'ctx> = HashMap<String, Datatype<'ctx>>;

/// Lower one requirement's body. The result is *not* pre-negated: the
/// caller (the requirement record built in [`super::requirement`])
/// applies `flipped`, matching the built-in library's "store the
/// violation condition" convention only where the source text actually
/// asked for it via a leading `-`.
pub fn lower_requirement<'a, 'ctx>(lc: &LowerCtx<'a, 'ctx>, req: &RequirementDecl) -> Result<Bool<'ctx>, DomlrError> {
    let mut env = Env::new();
    lower_expr(lc, &req.name, &mut env, &req.body)
}

/// A lowered violation formula plus the free witness constants pulled out
/// of its leading existentials, for diagnostic rendering.
pub struct LoweredViolation<'ctx> {
    pub witnesses: Vec<(String, Datatype<'ctx>)>,
    pub formula: Bool<'ctx>,
}

/// Lower an already-[`super::polarity::violation_form`]-flipped body,
/// peeling the leading run of `Expr::Exists` nodes into free constants
/// instead of wrapping them with `exists_const`. A `sat` model can then
/// be asked directly what each witness was bound to; any `Exists` past
/// the first non-existential node, or nested inside
/// `And`/`Or`/etc., still gets the ordinary `exists_const` treatment from
/// [`lower_expr`] and so contributes no named witness — this covers the
/// common "some element violates..." shape without requiring every
/// requirement author to write their existentials first.
pub fn lower_violation<'a, 'ctx>(
    lc: &LowerCtx<'a, 'ctx>,
    requirement: &str,
    body: &Expr,
) -> Result<LoweredViolation<'ctx>, DomlrError> {
    let elem_sort = &lc.encoding.sorts.element.datatype.sort;
    let mut env = Env::new();
    let mut witnesses = Vec::new();
    let mut cursor = body;
    while let Expr::Exists(var, inner) = cursor {
        let bound = Datatype::fresh_const(lc.ctx, &var.name, elem_sort);
        env.insert(var.name.clone(), bound.clone());
        witnesses.push((var.name.clone(), bound));
        cursor = inner;
    }
    let formula = lower_expr(lc, requirement, &mut env, cursor)?;
    Ok(LoweredViolation { witnesses, formula })
}

fn lower_expr<'a, 'ctx>(
    lc: &LowerCtx<'a, 'ctx>,
    requirement: &str,
    env: &mut Env<'ctx>,
    expr: &Expr,
) -> Result<Bool<'ctx>, DomlrError> {
    match expr {
        Expr::Forall(var, body) => lower_quantifier(lc, requirement, env, var, body, true),
        Expr::Exists(var, body) => lower_quantifier(lc, requirement, env, var, body, false),
        Expr::Not(inner) => Ok(lower_expr(lc, requirement, env, inner)?.not()),
        Expr::And(a, b) => {
            let (a, b) = (lower_expr(lc, requirement, env, a)?, lower_expr(lc, requirement, env, b)?);
            Ok(Bool::and(lc.ctx, &[&a, &b]))
        }
        Expr::Or(a, b) => {
            let (a, b) = (lower_expr(lc, requirement, env, a)?, lower_expr(lc, requirement, env, b)?);
            Ok(Bool::or(lc.ctx, &[&a, &b]))
        }
        Expr::Implies(a, b) => {
            let (a, b) = (lower_expr(lc, requirement, env, a)?, lower_expr(lc, requirement, env, b)?);
            Ok(a.implies(&b))
        }
        Expr::Iff(a, b) => {
            let (a, b) = (lower_expr(lc, requirement, env, a)?, lower_expr(lc, requirement, env, b)?);
            Ok(a._eq(&b))
        }
        Expr::IsClass(subject, class_ref) => {
            let e = lookup(env, requirement, subject)?;
            let class = resolve::resolve_class(lc.registry, lc.version, requirement, class_ref)?;
            Ok(is_instance_of(lc, &e, &class.name))
        }
        Expr::IsVar(subject, other) => {
            let e1 = lookup(env, requirement, subject)?;
            let e2 = lookup(env, requirement, other)?;
            Ok(e1._eq(&e2))
        }
        Expr::HasAssoc(subject, member, target) => {
            let e1 = lookup(env, requirement, subject)?;
            let e2 = lookup(env, requirement, target)?;
            let (owner, assoc) = resolve::resolve_association(lc.registry, lc.version, requirement, member)?;
            let mangled = resolve::mangled(owner, &assoc.name);
            Ok(has_assoc(lc, &e1, &mangled, &e2))
        }
        Expr::HasAttrLiteral(subject, member, op, literal) => {
            let e = lookup(env, requirement, subject)?;
            lower_has_attr_literal(lc, requirement, &e, member, *op, literal)
        }
        Expr::HasAttrAttr(lhs, lhs_member, op, rhs, rhs_member) => {
            let e1 = lookup(env, requirement, lhs)?;
            let e2 = lookup(env, requirement, rhs)?;
            lower_has_attr_attr(lc, requirement, &e1, lhs_member, *op, &e2, rhs_member)
        }
    }
}

fn lower_quantifier<'a, 'ctx>(
    lc: &LowerCtx<'a, 'ctx>,
    requirement: &str,
    env: &mut Env<'ctx>,
    var: &VarRef,
    body: &Expr,
    universal: bool,
) -> Result<Bool<'ctx>, DomlrError> {
    let elem_sort = &lc.encoding.sorts.element.datatype.sort;
    let bound = Datatype::fresh_const(lc.ctx, &var.name, elem_sort);

    let shadowed = env.insert(var.name.clone(), bound.clone());
    let body_bool = lower_expr(lc, requirement, env, body);
    match shadowed {
        Some(prev) => {
            env.insert(var.name.clone(), prev);
        }
        None => {
            env.remove(&var.name);
        }
    }
    let body_bool = body_bool?;

    Ok(if universal {
        forall_const(lc.ctx, &[&bound], &[], &body_bool)
    } else {
        exists_const(lc.ctx, &[&bound], &[], &body_bool)
    })
}

fn lookup<'ctx>(env: &Env<'ctx>, requirement: &str, var: &VarRef) -> Result<Datatype<'ctx>, DomlrError> {
    env.get(&var.name).cloned().ok_or_else(|| DomlrError::UnboundVariable {
        requirement: requirement.to_string(),
        name: var.name.clone(),
    })
}

fn literal_type_name(literal: &Literal) -> &'static str {
    match literal {
        Literal::Int(_) => "integer",
        Literal::Str(_) => "string",
        Literal::Bool(_) => "boolean",
    }
}

fn lower_has_attr_literal<'a, 'ctx>(
    lc: &LowerCtx<'a, 'ctx>,
    requirement: &str,
    subject: &Datatype<'ctx>,
    member: &RawName,
    op: CompareOp,
    literal: &Literal,
) -> Result<Bool<'ctx>, DomlrError> {
    let (owner, attr) = resolve::resolve_attribute(lc.registry, lc.version, requirement, member)?;
    let mangled = resolve::mangled(owner, &attr.name);
    let attr_key = lc
        .encoding
        .sorts
        .attribute
        .constant(&mangled)
        .expect("an attribute resolved against the same registry must exist in the encoding's Attribute sort");

    match (attr.ty, literal) {
        (PrimitiveType::Boolean, Literal::Bool(b)) => {
            if op.is_ordering() {
                return Err(DomlrError::IllegalOrdering { requirement: requirement.to_string(), op: op_name(op) });
            }
            let value = lc.encoding.sorts.attr_data.boolean(&Bool::from_bool(lc.ctx, *b));
            let holds = lc.encoding.attr.apply(&[subject, &attr_key, &value]).as_bool().unwrap();
            Ok(if op == CompareOp::Ne { holds.not() } else { holds })
        }
        (PrimitiveType::Integer, Literal::Int(n)) => {
            let v = Int::fresh_const(lc.ctx, "v");
            let wrapped = lc.encoding.sorts.attr_data.int(&v);
            let holds = lc.encoding.attr.apply(&[subject, &attr_key, &wrapped]).as_bool().unwrap();
            let literal = Int::from_i64(lc.ctx, *n);
            let compared = int_compare(&v, op, &literal);
            let body = Bool::and(lc.ctx, &[&holds, &compared]);
            Ok(exists_const(lc.ctx, &[&v], &[], &body))
        }
        (PrimitiveType::String | PrimitiveType::EnumKind, Literal::Str(s)) => {
            if op.is_ordering() {
                return Err(DomlrError::IllegalOrdering { requirement: requirement.to_string(), op: op_name(op) });
            }
            let symbol_sort = &lc.encoding.sorts.string_symbol.datatype.sort;
            let sym = Datatype::fresh_const(lc.ctx, "s", symbol_sort);
            let wrapped = lc.encoding.sorts.attr_data.string(&sym);
            let holds = lc.encoding.attr.apply(&[subject, &attr_key, &wrapped]).as_bool().unwrap();
            // A literal absent from the model's StringSymbol sort can never
            // be equal to any bound `sym`, so `eq` is unconditionally false
            // and `!=` correctly degrades to "the attribute has some value".
            let eq = match lc.encoding.sorts.string_symbol.constant(s) {
                Some(literal_symbol) => sym._eq(&literal_symbol),
                None => Bool::from_bool(lc.ctx, false),
            };
            let compared = if op == CompareOp::Ne { eq.not() } else { eq };
            let body = Bool::and(lc.ctx, &[&holds, &compared]);
            Ok(exists_const(lc.ctx, &[&sym], &[], &body))
        }
        (ty, lit) => Err(DomlrError::HeterogeneousComparison {
            requirement: requirement.to_string(),
            lhs_ty: primitive_type_name(ty),
            rhs_ty: literal_type_name(lit),
        }),
    }
}

fn lower_has_attr_attr<'a, 'ctx>(
    lc: &LowerCtx<'a, 'ctx>,
    requirement: &str,
    lhs: &Datatype<'ctx>,
    lhs_member: &RawName,
    op: CompareOp,
    rhs: &Datatype<'ctx>,
    rhs_member: &RawName,
) -> Result<Bool<'ctx>, DomlrError> {
    let (lhs_owner, lhs_attr) = resolve::resolve_attribute(lc.registry, lc.version, requirement, lhs_member)?;
    let (rhs_owner, rhs_attr) = resolve::resolve_attribute(lc.registry, lc.version, requirement, rhs_member)?;

    if lhs_attr.ty != rhs_attr.ty {
        return Err(DomlrError::HeterogeneousComparison {
            requirement: requirement.to_string(),
            lhs_ty: primitive_type_name(lhs_attr.ty),
            rhs_ty: primitive_type_name(rhs_attr.ty),
        });
    }
    if op.is_ordering() && !matches!(lhs_attr.ty, PrimitiveType::Integer) {
        return Err(DomlrError::IllegalOrdering { requirement: requirement.to_string(), op: op_name(op) });
    }

    let lhs_key = lc.encoding.sorts.attribute.constant(&resolve::mangled(lhs_owner, &lhs_attr.name)).expect("resolved attribute must be in Attribute sort");
    let rhs_key = lc.encoding.sorts.attribute.constant(&resolve::mangled(rhs_owner, &rhs_attr.name)).expect("resolved attribute must be in Attribute sort");

    match lhs_attr.ty {
        PrimitiveType::Integer => {
            let v1 = Int::fresh_const(lc.ctx, "v1");
            let v2 = Int::fresh_const(lc.ctx, "v2");
            let w1 = lc.encoding.sorts.attr_data.int(&v1);
            let w2 = lc.encoding.sorts.attr_data.int(&v2);
            let holds1 = lc.encoding.attr.apply(&[lhs, &lhs_key, &w1]).as_bool().unwrap();
            let holds2 = lc.encoding.attr.apply(&[rhs, &rhs_key, &w2]).as_bool().unwrap();
            let compared = int_compare(&v1, op, &v2);
            let body = Bool::and(lc.ctx, &[&holds1, &holds2, &compared]);
            Ok(exists_const(lc.ctx, &[&v1, &v2], &[], &body))
        }
        PrimitiveType::Boolean => {
            let v1 = Bool::fresh_const(lc.ctx, "v1");
            let v2 = Bool::fresh_const(lc.ctx, "v2");
            let w1 = lc.encoding.sorts.attr_data.boolean(&v1);
            let w2 = lc.encoding.sorts.attr_data.boolean(&v2);
            let holds1 = lc.encoding.attr.apply(&[lhs, &lhs_key, &w1]).as_bool().unwrap();
            let holds2 = lc.encoding.attr.apply(&[rhs, &rhs_key, &w2]).as_bool().unwrap();
            let eq = v1._eq(&v2);
            let compared = if op == CompareOp::Ne { eq.not() } else { eq };
            let body = Bool::and(lc.ctx, &[&holds1, &holds2, &compared]);
            Ok(exists_const(lc.ctx, &[&v1, &v2], &[], &body))
        }
        PrimitiveType::String | PrimitiveType::EnumKind => {
            let symbol_sort = &lc.encoding.sorts.string_symbol.datatype.sort;
            let v1 = Datatype::fresh_const(lc.ctx, "v1", symbol_sort);
            let v2 = Datatype::fresh_const(lc.ctx, "v2", symbol_sort);
            let w1 = lc.encoding.sorts.attr_data.string(&v1);
            let w2 = lc.encoding.sorts.attr_data.string(&v2);
            let holds1 = lc.encoding.attr.apply(&[lhs, &lhs_key, &w1]).as_bool().unwrap();
            let holds2 = lc.encoding.attr.apply(&[rhs, &rhs_key, &w2]).as_bool().unwrap();
            let eq = v1._eq(&v2);
            let compared = if op == CompareOp::Ne { eq.not() } else { eq };
            let body = Bool::and(lc.ctx, &[&holds1, &holds2, &compared]);
            Ok(exists_const(lc.ctx, &[&v1, &v2], &[], &body))
        }
    }
}

fn int_compare<'ctx>(lhs: &Int<'ctx>, op: CompareOp, rhs: &Int<'ctx>) -> Bool<'ctx> {
    match op {
        CompareOp::Eq => lhs._eq(rhs),
        CompareOp::Ne => lhs._eq(rhs).not(),
        CompareOp::Lt => lhs.lt(rhs),
        CompareOp::Le => lhs.le(rhs),
        CompareOp::Gt => lhs.gt(rhs),
        CompareOp::Ge => lhs.ge(rhs),
    }
}

fn op_name(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "==",
        CompareOp::Ne => "!=",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
    }
}

fn primitive_type_name(ty: PrimitiveType) -> &'static str {
    match ty {
        PrimitiveType::Boolean => "boolean",
        PrimitiveType::Integer => "integer",
        PrimitiveType::String => "string",
        PrimitiveType::EnumKind => "enum",
    }
}

/// `exists e: Element. elem_class(e) in subclasses(class)`. Duplicated
/// from `crate::builtins::types::is_instance_of` since that combinator is
/// private to the `builtins` module; kept to the same shape deliberately.
fn is_instance_of<'ctx>(lc: &LowerCtx<'_, 'ctx>, e: &Datatype<'ctx>, class: &str) -> Bool<'ctx> {
    let classes = lc
        .registry
        .subclasses(lc.version, class)
        .unwrap_or(&[])
        .iter()
        .filter_map(|c| lc.encoding.sorts.class.constant(c))
        .collect::<Vec<_>>();
    let actual = lc.encoding.elem_class.apply(&[e]).as_datatype().unwrap();
    let eqs: Vec<Bool<'ctx>> = classes.iter().map(|c| actual._eq(c)).collect();
    let refs: Vec<&Bool<'ctx>> = eqs.iter().collect();
    if refs.is_empty() {
        Bool::from_bool(lc.ctx, false)
    } else {
        Bool::or(lc.ctx, &refs)
    }
}

fn has_assoc<'ctx>(lc: &LowerCtx<'_, 'ctx>, e1: &Datatype<'ctx>, mangled: &str, e2: &Datatype<'ctx>) -> Bool<'ctx> {
    match lc.encoding.sorts.association.constant(&mangled.to_string()) {
        Some(member) => lc.encoding.assoc.apply(&[e1, &member, e2]).as_bool().unwrap(),
        None => Bool::from_bool(lc.ctx, false),
    }
}

