//! Builds the finite sorts from a metamodel + Intermediate Model pair.

use z3::{Context, DatatypeAccessor, DatatypeBuilder, Sort};

use crate::im::{AttrValue, IntermediateModel};
use crate::metamodel::Metamodel;

use super::error::EncodingError;
use super::types::{AttrDataSort, EnumSort, SmtSorts};

pub fn build_sorts<'ctx>(
    ctx: &'ctx Context,
    metamodel: &Metamodel,
    im: &IntermediateModel,
) -> Result<SmtSorts<'ctx>, EncodingError> {
    if metamodel.is_empty() {
        return Err(EncodingError::EmptyClassSort);
    }

    let class = build_enum(ctx, "Class", metamodel.keys().cloned());

    let mut mangled_attrs = Vec::new();
    let mut mangled_assocs = Vec::new();
    for class_def in metamodel.values() {
        for attr in class_def.attributes.keys() {
            mangled_attrs.push(format!("{}::{}", class_def.name, attr));
        }
        for assoc in class_def.associations.keys() {
            mangled_assocs.push(format!("{}::{}", class_def.name, assoc));
        }
    }
    let attribute = build_enum(ctx, "Attribute", mangled_attrs.into_iter());
    let association = build_enum(ctx, "Association", mangled_assocs.into_iter());

    let element = build_enum(ctx, "Element", im.elements.keys().copied());

    let mut strings: Vec<String> = im
        .elements
        .values()
        .flat_map(|e| e.attributes.values())
        .flatten()
        .filter_map(AttrValue::as_str)
        .map(str::to_string)
        .collect();
    strings.sort();
    strings.dedup();
    let string_symbol = build_enum(ctx, "StringSymbol", strings.into_iter());

    let attr_data_builder = DatatypeBuilder::new(ctx, "AttrData")
        .variant("Int", vec![("int_value", DatatypeAccessor::Sort(Sort::int(ctx)))])
        .variant("Bool", vec![("bool_value", DatatypeAccessor::Sort(Sort::bool(ctx)))])
        .variant(
            "Str",
            vec![("str_value", DatatypeAccessor::Sort(string_symbol.datatype.sort.clone()))],
        )
        .variant("Unbound", vec![]);
    let attr_data = AttrDataSort { datatype: attr_data_builder.finish() };

    Ok(SmtSorts { class, attribute, association, element, string_symbol, attr_data })
}

fn build_enum<'ctx, K, I>(ctx: &'ctx Context, name: &str, keys: I) -> EnumSort<'ctx, K>
where
    K: std::hash::Hash + Eq,
    I: Iterator<Item = K>,
{
    let keys: Vec<K> = keys.collect();
    let mut builder = DatatypeBuilder::new(ctx, name);
    for (i, _) in keys.iter().enumerate() {
        builder = builder.variant(&format!("{name}{i}"), vec![]);
    }
    let datatype = builder.finish();
    let index = keys.into_iter().enumerate().map(|(i, k)| (k, i)).collect();
    EnumSort { datatype, index }
}
