//! Optional consistency axioms: attribute/association multiplicity and
//! association target-class typing.
//!
//! Inverse-association agreement is not an SMT axiom here: the Intermediate
//! Model builder reciprocates every declared inverse pair while constructing
//! the model (see [`crate::im::inverse`]), so a built `IntermediateModel`
//! can never disagree with its own inverse declarations in the first place.
//!
//! These axioms are off by default because they add real solving cost —
//! they quantify over the full `AttrData`/`Element` domain rather than only
//! the ground facts already in the Intermediate Model, which is what lets
//! them catch a requirement that (incorrectly) presupposes a model shape
//! the metamodel forbids.

use z3::ast::{forall_const, Ast, Bool, Datatype};
use z3::{Context, Solver};

use crate::metamodel::{Metamodel, MetamodelRegistry, Multiplicity};

use super::types::SmtEncoding;

pub fn assert_consistency<'ctx>(
    ctx: &'ctx Context,
    solver: &Solver<'ctx>,
    encoding: &SmtEncoding<'ctx>,
    metamodel: &Metamodel,
    registry: &MetamodelRegistry,
    version: crate::metamodel::DomlVersion,
) {
    let sorts = &encoding.sorts;

    for class_def in metamodel.values() {
        for attr in class_def.attributes.values() {
            let Some(attr_const) = sorts.attribute.constant(&format!("{}::{}", class_def.name, attr.name)) else {
                continue;
            };
            if attr.multiplicity.upper_one {
                assert_at_most_one(ctx, solver, encoding, &attr_const, true);
            }
            if attr.multiplicity.lower_one {
                assert_at_least_one(ctx, solver, encoding, &attr_const, true, class_def, registry, version);
            }
        }

        for assoc in class_def.associations.values() {
            let Some(assoc_const) = sorts.association.constant(&format!("{}::{}", class_def.name, assoc.name)) else {
                continue;
            };
            if assoc.multiplicity.upper_one {
                assert_at_most_one(ctx, solver, encoding, &assoc_const, false);
            }
            assert_association_target_type(ctx, solver, encoding, &assoc_const, &assoc.target_class, registry, version);
        }
    }
}

/// `forall e, v1, v2. (rel(e, member, v1) & rel(e, member, v2)) -> v1 = v2`,
/// where `rel` is `attr` (`is_attr = true`) or `assoc`.
fn assert_at_most_one<'ctx>(
    ctx: &'ctx Context,
    solver: &Solver<'ctx>,
    encoding: &SmtEncoding<'ctx>,
    member_const: &Datatype<'ctx>,
    is_attr: bool,
) {
    let sorts = &encoding.sorts;
    let elem_sort = &sorts.element.datatype.sort;
    let value_sort = if is_attr { &sorts.attr_data.datatype.sort } else { elem_sort };

    let e = Datatype::fresh_const(ctx, "e", elem_sort);
    let v1 = Datatype::fresh_const(ctx, "v1", value_sort);
    let v2 = Datatype::fresh_const(ctx, "v2", value_sort);

    let rel = if is_attr { &encoding.attr } else { &encoding.assoc };
    let holds1 = rel.apply(&[&e, member_const, &v1]).as_bool().unwrap();
    let holds2 = rel.apply(&[&e, member_const, &v2]).as_bool().unwrap();
    let body = Bool::and(ctx, &[&holds1, &holds2]).implies(&v1._eq(&v2));

    let axiom = forall_const(ctx, &[&e, &v1, &v2], &[], &body);
    solver.assert(&axiom);
}

/// `forall e. elem_class(e) in subclasses(owner) -> exists v. attr(e, member, v)`.
/// Declaring-class membership is enumerated at build time via the
/// registry's subclass index rather than an SMT-level `is-a` predicate.
fn assert_at_least_one<'ctx>(
    ctx: &'ctx Context,
    solver: &Solver<'ctx>,
    encoding: &SmtEncoding<'ctx>,
    member_const: &Datatype<'ctx>,
    is_attr: bool,
    owner: &crate::metamodel::ClassDef,
    registry: &MetamodelRegistry,
    version: crate::metamodel::DomlVersion,
) {
    let sorts = &encoding.sorts;
    let elem_sort = &sorts.element.datatype.sort;
    let value_sort = if is_attr { &sorts.attr_data.datatype.sort } else { elem_sort };

    let Ok(owning_classes) = registry.subclasses(version, &owner.name) else { return };
    let Some(class_consts): Option<Vec<_>> = owning_classes.iter().map(|c| sorts.class.constant(c)).collect()
    else {
        return;
    };

    let e = Datatype::fresh_const(ctx, "e", elem_sort);
    let v = Datatype::fresh_const(ctx, "v", value_sort);

    let is_owning_class = or_eq(&encoding.elem_class.apply(&[&e]), &class_consts);
    let rel = if is_attr { &encoding.attr } else { &encoding.assoc };
    let has_value = rel.apply(&[&e, member_const, &v]).as_bool().unwrap();
    let exists_value = z3::ast::exists_const(ctx, &[&v], &[], &has_value);

    let axiom = forall_const(ctx, &[&e], &[], &is_owning_class.implies(&exists_value));
    solver.assert(&axiom);
}

/// `forall e1, e2. assoc(e1, member, e2) -> elem_class(e2) in subclasses(target)`.
fn assert_association_target_type<'ctx>(
    ctx: &'ctx Context,
    solver: &Solver<'ctx>,
    encoding: &SmtEncoding<'ctx>,
    member_const: &Datatype<'ctx>,
    target_class: &str,
    registry: &MetamodelRegistry,
    version: crate::metamodel::DomlVersion,
) {
    let sorts = &encoding.sorts;
    let elem_sort = &sorts.element.datatype.sort;

    let Ok(target_classes) = registry.subclasses(version, target_class) else { return };
    let Some(class_consts): Option<Vec<_>> = target_classes.iter().map(|c| sorts.class.constant(c)).collect()
    else {
        return;
    };

    let e1 = Datatype::fresh_const(ctx, "e1", elem_sort);
    let e2 = Datatype::fresh_const(ctx, "e2", elem_sort);

    let holds = encoding.assoc.apply(&[&e1, member_const, &e2]).as_bool().unwrap();
    let is_target_class = or_eq(&encoding.elem_class.apply(&[&e2]), &class_consts);

    let axiom = forall_const(ctx, &[&e1, &e2], &[], &holds.implies(&is_target_class));
    solver.assert(&axiom);
}

fn or_eq<'ctx>(value: &z3::ast::Dynamic<'ctx>, candidates: &[Datatype<'ctx>]) -> Bool<'ctx> {
    let ctx = value.get_ctx();
    let value_dt = value.as_datatype().expect("elem_class returns a Class datatype value");
    let eqs: Vec<Bool<'ctx>> = candidates.iter().map(|c| value_dt._eq(c)).collect();
    let refs: Vec<&Bool<'ctx>> = eqs.iter().collect();
    if refs.is_empty() {
        Bool::from_bool(ctx, false)
    } else {
        Bool::or(ctx, &refs)
    }
}
