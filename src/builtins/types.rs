//! Shared plumbing for built-in requirement bodies.

use z3::ast::{Ast, Bool, Datatype};
use z3::Context;

use crate::encoding::SmtEncoding;
use crate::metamodel::{DomlVersion, MetamodelRegistry};

/// Everything a built-in requirement body needs to construct its formula.
pub struct BuiltinCtx<'a, 'ctx> {
    pub ctx: &'ctx Context,
    pub encoding: &'a SmtEncoding<'ctx>,
    pub registry: &'a MetamodelRegistry,
    pub version: DomlVersion,
}

/// A built-in formula plus the free (Skolem) constants whose model
/// assignment, once the formula is found `sat`, names a concrete witness
/// for the violation — e.g. the offending VM, or a pair of clashing
/// interfaces. Left genuinely free rather than wrapped in an outer
/// `exists` so the driver's model query can read them straight off the
/// model: an unconstrained free constant is exactly as satisfiable as an
/// existential over it, but only the free form keeps its assignment
/// inspectable afterward.
pub struct BuiltinOutcome<'ctx> {
    pub witnesses: Vec<(&'static str, Datatype<'ctx>)>,
    pub formula: Bool<'ctx>,
}

/// A requirement body is built fresh per worker (it closes over that
/// worker's own `z3::Context`), hence a higher-ranked function pointer
/// rather than a stored `Bool`.
pub type BuiltinBuilder = for<'a, 'ctx> fn(&BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx>;

/// One catalog entry. `build` yields the *flipped* formula: every
/// built-in formula states the violation condition, so `sat` on it means
/// the requirement is violated. `error_template` substitutes `{name}`
/// placeholders from `witnesses` to produce a plain-English violation
/// message.
#[derive(Clone, Copy)]
pub struct BuiltinRequirement {
    pub id: &'static str,
    pub description: &'static str,
    pub error_template: &'static str,
    pub build: BuiltinBuilder,
}

/// A fresh free constant of sort `Element`, to be asserted as (some
/// witness of class `class`) & (the rest of the violation body). Not
/// wrapped in `exists` — see [`BuiltinOutcome`].
pub fn class_witness<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>, name: &'static str) -> Datatype<'ctx> {
    let elem_sort = &bc.encoding.sorts.element.datatype.sort;
    Datatype::fresh_const(bc.ctx, name, elem_sort)
}

/// `elem_class(e) in subclasses(class)`.
pub fn is_instance_of<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>, e: &Datatype<'ctx>, class: &str) -> Bool<'ctx> {
    let classes = bc
        .registry
        .subclasses(bc.version, class)
        .unwrap_or(&[])
        .iter()
        .filter_map(|c| bc.encoding.sorts.class.constant(c))
        .collect::<Vec<_>>();
    let actual = bc.encoding.elem_class.apply(&[e]).as_datatype().unwrap();
    let eqs: Vec<Bool<'ctx>> = classes.iter().map(|c| actual._eq(c)).collect();
    let refs: Vec<&Bool<'ctx>> = eqs.iter().collect();
    if refs.is_empty() {
        Bool::from_bool(bc.ctx, false)
    } else {
        Bool::or(bc.ctx, &refs)
    }
}

/// `assoc(e1, member, e2)` for a mangled association name. Returns
/// `false` if the version's metamodel doesn't declare `member` at all
/// (lets a single requirement body degrade gracefully across versions
/// that lack a class/association it references).
pub fn has_assoc<'a, 'ctx>(
    bc: &BuiltinCtx<'a, 'ctx>,
    e1: &Datatype<'ctx>,
    mangled: &str,
    e2: &Datatype<'ctx>,
) -> Bool<'ctx> {
    match bc.encoding.sorts.association.constant(&mangled.to_string()) {
        Some(member) => bc.encoding.assoc.apply(&[e1, &member, e2]).as_bool().unwrap(),
        None => Bool::from_bool(bc.ctx, false),
    }
}

/// `exists t: Element. assoc(e, member, t)`.
pub fn has_any_assoc<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>, e: &Datatype<'ctx>, mangled: &str) -> Bool<'ctx> {
    let elem_sort = &bc.encoding.sorts.element.datatype.sort;
    let t = Datatype::fresh_const(bc.ctx, "t", elem_sort);
    let body = has_assoc(bc, e, mangled, &t);
    z3::ast::exists_const(bc.ctx, &[&t], &[], &body)
}

/// `exists t: Element. assoc(e1, member1, t) & assoc(e2, member2, t)` —
/// "`e1` and `e2` both relate to some common target", e.g. two interfaces
/// that belong to the same network.
pub fn shared_assoc_target<'a, 'ctx>(
    bc: &BuiltinCtx<'a, 'ctx>,
    e1: &Datatype<'ctx>,
    member1: &str,
    e2: &Datatype<'ctx>,
    member2: &str,
) -> Bool<'ctx> {
    let elem_sort = &bc.encoding.sorts.element.datatype.sort;
    let t = Datatype::fresh_const(bc.ctx, "t", elem_sort);
    let has1 = has_assoc(bc, e1, member1, &t);
    let has2 = has_assoc(bc, e2, member2, &t);
    let body = Bool::and(bc.ctx, &[&has1, &has2]);
    z3::ast::exists_const(bc.ctx, &[&t], &[], &body)
}

/// `exists v: Int. attr(e1, member1, Int(v)) & attr(e2, member2, Int(v))` —
/// "`e1.member1` and `e2.member2` share some concrete integer value",
/// used to compare endpoint/port-style attributes without extracting a
/// scalar witness.
pub fn shared_int_attr<'a, 'ctx>(
    bc: &BuiltinCtx<'a, 'ctx>,
    e1: &Datatype<'ctx>,
    member1: &str,
    e2: &Datatype<'ctx>,
    member2: &str,
) -> Bool<'ctx> {
    let (Some(m1), Some(m2)) = (
        bc.encoding.sorts.attribute.constant(&member1.to_string()),
        bc.encoding.sorts.attribute.constant(&member2.to_string()),
    ) else {
        return Bool::from_bool(bc.ctx, false);
    };
    let v = z3::ast::Int::fresh_const(bc.ctx, "v");
    let data = bc.encoding.sorts.attr_data.int(&v);
    let has1 = bc.encoding.attr.apply(&[e1, &m1, &data]).as_bool().unwrap();
    let has2 = bc.encoding.attr.apply(&[e2, &m2, &data]).as_bool().unwrap();
    let body = Bool::and(bc.ctx, &[&has1, &has2]);
    z3::ast::exists_const(bc.ctx, &[&v], &[], &body)
}

/// As [`shared_int_attr`] but for `String`-typed attributes, bound over
/// the finite `StringSymbol` sort.
pub fn shared_str_attr<'a, 'ctx>(
    bc: &BuiltinCtx<'a, 'ctx>,
    e1: &Datatype<'ctx>,
    member1: &str,
    e2: &Datatype<'ctx>,
    member2: &str,
) -> Bool<'ctx> {
    let (Some(m1), Some(m2)) = (
        bc.encoding.sorts.attribute.constant(&member1.to_string()),
        bc.encoding.sorts.attribute.constant(&member2.to_string()),
    ) else {
        return Bool::from_bool(bc.ctx, false);
    };
    let symbol_sort = &bc.encoding.sorts.string_symbol.datatype.sort;
    let s = Datatype::fresh_const(bc.ctx, "s", symbol_sort);
    let data = bc.encoding.sorts.attr_data.string(&s);
    let has1 = bc.encoding.attr.apply(&[e1, &m1, &data]).as_bool().unwrap();
    let has2 = bc.encoding.attr.apply(&[e2, &m2, &data]).as_bool().unwrap();
    let body = Bool::and(bc.ctx, &[&has1, &has2]);
    z3::ast::exists_const(bc.ctx, &[&s], &[], &body)
}
