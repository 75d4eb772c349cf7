//! Background axioms: the direct encoding of the Intermediate Model into
//! the `elem_class`/`attr`/`assoc` relations.
//!
//! `elem_class` facts are ground assertions, one per IM element. `attr`
//! and `assoc` additionally get a closure axiom per element/member pair
//! so the relations denote *exactly* the IM's facts rather than merely
//! containing them: without it, `attr`/`assoc` are free uninterpreted
//! relations and a solver can satisfy a "violation exists" query with
//! facts the model never actually has.

use z3::ast::{forall_const, Ast, Bool, Datatype, Int};
use z3::{Context, FuncDecl, Solver, Sort};

use crate::im::{AttrValue, ImElement, IntermediateModel};

use super::types::{SmtEncoding, SmtSorts};

pub fn build_encoding<'ctx>(ctx: &'ctx Context, sorts: SmtSorts<'ctx>) -> SmtEncoding<'ctx> {
    let elem_class = FuncDecl::new(ctx, "elem_class", &[&sorts.element.datatype.sort], &sorts.class.datatype.sort);
    let attr = FuncDecl::new(
        ctx,
        "attr",
        &[&sorts.element.datatype.sort, &sorts.attribute.datatype.sort, &sorts.attr_data.datatype.sort],
        &Sort::bool(ctx),
    );
    let assoc = FuncDecl::new(
        ctx,
        "assoc",
        &[&sorts.element.datatype.sort, &sorts.association.datatype.sort, &sorts.element.datatype.sort],
        &Sort::bool(ctx),
    );
    SmtEncoding { sorts, elem_class, attr, assoc }
}

/// Assert `encoding`'s relations into exact agreement with `im`: a ground
/// `elem_class` fact per element, plus a closure axiom per
/// element/attribute-member and element/association-member pair so that
/// `attr`/`assoc` hold on *exactly* the IM's recorded tuples for that pair —
/// never more, via the closure's `<-`, and never fewer, via its `->`.
/// `class_of` must map each element to its *most specific* declared class
/// (the IM stores the concrete class directly on [`crate::im::ImElement`]).
pub fn assert_background(ctx: &Context, solver: &Solver, encoding: &SmtEncoding<'_>, im: &IntermediateModel) {
    let sorts = &encoding.sorts;

    for (name, element) in im.iter() {
        let Some(elem_const) = sorts.element.constant(name) else { continue };
        let Some(class_const) = sorts.class.constant(&element.class) else { continue };
        let lhs = encoding.elem_class.apply(&[&elem_const]);
        solver.assert(&lhs._eq(&class_const));

        for mangled_attr in sorts.attribute.index.keys() {
            let Some(attr_const) = sorts.attribute.constant(mangled_attr) else { continue };
            assert_attr_closure(ctx, solver, sorts, encoding, &elem_const, &attr_const, mangled_attr, element);
        }

        for mangled_assoc in sorts.association.index.keys() {
            let Some(assoc_const) = sorts.association.constant(mangled_assoc) else { continue };
            assert_assoc_closure(ctx, solver, sorts, encoding, &elem_const, &assoc_const, mangled_assoc, element);
        }
    }
}

/// `forall v. attr(e, member, v) <-> (v = v1 \/ ... \/ vn)`, over the
/// concrete values `im` records for `(e, member)`. An element with no
/// recorded value for `member` gets the empty disjunction, i.e.
/// `forall v. not attr(e, member, v)`.
fn assert_attr_closure<'ctx>(
    ctx: &'ctx Context,
    solver: &Solver<'ctx>,
    sorts: &SmtSorts<'ctx>,
    encoding: &SmtEncoding<'ctx>,
    elem_const: &Datatype<'ctx>,
    member_const: &Datatype<'ctx>,
    mangled_attr: &str,
    element: &ImElement,
) {
    let v = Datatype::fresh_const(ctx, "v", &sorts.attr_data.datatype.sort);
    let recorded: Vec<Bool<'ctx>> = element
        .attribute(mangled_attr)
        .iter()
        .map(|value| v._eq(&lower_attr_value(ctx, sorts, value)))
        .collect();
    let rhs = or_or_false(ctx, &recorded);

    let holds = encoding.attr.apply(&[elem_const, member_const, &v]).as_bool().expect("attr relation returns Bool");
    let iff = Bool::and(ctx, &[&holds.implies(&rhs), &rhs.implies(&holds)]);
    solver.assert(&forall_const(ctx, &[&v], &[], &iff));
}

/// `forall f. assoc(e, member, f) <-> (f = t1 \/ ... \/ tn)`, over the
/// concrete targets `im` records for `(e, member)`.
fn assert_assoc_closure<'ctx>(
    ctx: &'ctx Context,
    solver: &Solver<'ctx>,
    sorts: &SmtSorts<'ctx>,
    encoding: &SmtEncoding<'ctx>,
    elem_const: &Datatype<'ctx>,
    member_const: &Datatype<'ctx>,
    mangled_assoc: &str,
    element: &ImElement,
) {
    let f = Datatype::fresh_const(ctx, "f", &sorts.element.datatype.sort);
    let recorded: Vec<Bool<'ctx>> = element
        .association(mangled_assoc)
        .iter()
        .filter_map(|target| sorts.element.constant(target))
        .map(|target_const| f._eq(&target_const))
        .collect();
    let rhs = or_or_false(ctx, &recorded);

    let holds = encoding.assoc.apply(&[elem_const, member_const, &f]).as_bool().expect("assoc relation returns Bool");
    let iff = Bool::and(ctx, &[&holds.implies(&rhs), &rhs.implies(&holds)]);
    solver.assert(&forall_const(ctx, &[&f], &[], &iff));
}

/// The disjunction of `disjuncts`, or `false` for an empty list — a plain
/// `Bool::or` refuses an empty slice.
fn or_or_false<'ctx>(ctx: &'ctx Context, disjuncts: &[Bool<'ctx>]) -> Bool<'ctx> {
    if disjuncts.is_empty() {
        Bool::from_bool(ctx, false)
    } else {
        let refs: Vec<&Bool<'ctx>> = disjuncts.iter().collect();
        Bool::or(ctx, &refs)
    }
}

fn lower_attr_value<'ctx>(
    ctx: &'ctx Context,
    sorts: &SmtSorts<'ctx>,
    value: &AttrValue,
) -> z3::ast::Datatype<'ctx> {
    match value {
        AttrValue::Int(i) => sorts.attr_data.int(&Int::from_i64(ctx, *i)),
        AttrValue::Bool(b) => sorts.attr_data.boolean(&Bool::from_bool(ctx, *b)),
        AttrValue::Str(s) => {
            let symbol = sorts
                .string_symbol
                .constant(s)
                .expect("every literal string in the IM was registered in build_sorts");
            sorts.attr_data.string(&symbol)
        }
    }
}
