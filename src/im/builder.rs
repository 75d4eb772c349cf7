//! Builds an [`IntermediateModel`] from anything implementing
//! [`ObjectGraph`].
//!
//! [`ObjectGraph`] is the seam where the out-of-scope XMI adapter plugs
//! in: that adapter's job is entirely to turn an XMI document into a
//! `Vec<RawObject>`, nothing more. This module owns everything downstream
//! of that: class validation, attribute/association mangling via the
//! metamodel registry, default-value filling, and special-attribute
//! parsing.

use indexmap::IndexMap;
use tracing::info_span;

use crate::base::{Interner, Name};
use crate::metamodel::{DomlVersion, MetamodelRegistry};

use super::element::{AttrValue, ImElement};
use super::error::ImError;
use super::inverse::reciprocate_inverse_associations;
use super::special_parsers::{encode_endpoint, is_special, parse_cidr, parse_endpoint, parse_memory_mb};
use super::IntermediateModel;

/// A scalar value as it arrives from the source document, before it is
/// validated against the metamodel's declared attribute type.
#[derive(Debug, Clone, PartialEq)]
pub enum RawScalar {
    Int(i64),
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct RawAttribute {
    pub local_name: String,
    pub value: RawScalar,
}

#[derive(Debug, Clone)]
pub struct RawAssociation {
    pub local_name: String,
    pub target_id: String,
}

#[derive(Debug, Clone)]
pub struct RawObject {
    pub id: String,
    pub class: String,
    pub attributes: Vec<RawAttribute>,
    pub associations: Vec<RawAssociation>,
}

/// Anything that can enumerate a flat set of [`RawObject`]s is a valid
/// source for [`build`]. An XMI/KPAR/JSON-LD adapter implements this by
/// walking its own document model; it owns no knowledge of the metamodel
/// or of mangling.
pub trait ObjectGraph {
    fn objects(&self) -> &[RawObject];
}

/// A plain in-memory implementation, handy for tests and for callers that
/// already have a deserialized document in hand.
impl ObjectGraph for Vec<RawObject> {
    fn objects(&self) -> &[RawObject] {
        self
    }
}

pub fn build(
    version: DomlVersion,
    registry: &MetamodelRegistry,
    graph: &impl ObjectGraph,
) -> Result<IntermediateModel, ImError> {
    let objects = graph.objects();
    let span = info_span!("im build", version = ?version, objects = objects.len());
    let _enter = span.enter();

    let metamodel = registry.metamodel(version)?;

    let mut interner = Interner::new();
    let mut ids: IndexMap<String, Name> = IndexMap::new();
    for object in objects {
        let name = interner.intern(&object.id);
        if ids.insert(object.id.clone(), name).is_some() {
            return Err(ImError::DuplicateId(object.id.clone()));
        }
    }

    let mut elements: IndexMap<Name, ImElement> = IndexMap::new();
    for object in objects {
        if !metamodel.contains_key(&object.class) {
            return Err(ImError::UnknownClass {
                id: object.id.clone(),
                class: object.class.clone(),
            });
        }
        let name = ids[&object.id];
        elements.insert(name, ImElement::new(name, object.class.clone()));
    }

    for object in objects {
        let name = ids[&object.id];

        for raw_attr in &object.attributes {
            let (owner, def) =
                registry.resolve_attribute(version, &object.class, &raw_attr.local_name)?;
            let mangled = format!("{}::{}", owner.name, def.name);
            let value = lower_scalar(version, &object.id, &object.class, &raw_attr.local_name, &raw_attr.value)?;
            elements.get_mut(&name).unwrap().push_attribute(mangled, value);
        }

        for raw_assoc in &object.associations {
            let (owner, def) =
                registry.resolve_association(version, &object.class, &raw_assoc.local_name)?;
            let mangled = format!("{}::{}", owner.name, def.name);
            let target = *ids.get(&raw_assoc.target_id).ok_or_else(|| {
                ImError::DanglingAssociationTarget {
                    id: object.id.clone(),
                    class: object.class.clone(),
                    association: raw_assoc.local_name.clone(),
                    target: raw_assoc.target_id.clone(),
                }
            })?;
            elements.get_mut(&name).unwrap().push_association(mangled, target);
        }

        let defaults = registry.defaults_of(version, &object.class)?;
        for (local_name, def) in defaults {
            let (owner, _) = registry.resolve_attribute(version, &object.class, &local_name)?;
            let mangled = format!("{}::{}", owner.name, local_name);
            let element = elements.get_mut(&name).unwrap();
            if element.attribute(&mangled).is_empty() {
                for default in &def.default {
                    element.push_attribute(mangled.clone(), lower_default(default));
                }
            }
        }
    }

    let mut model = IntermediateModel { version, elements, interner };
    let pairs = registry.inverse_pairs(version)?.clone();
    reciprocate_inverse_associations(&mut model, &pairs);
    Ok(model)
}

fn lower_default(default: &crate::metamodel::DefaultValue) -> AttrValue {
    match default {
        crate::metamodel::DefaultValue::Int(i) => AttrValue::Int(*i),
        crate::metamodel::DefaultValue::Bool(b) => AttrValue::Bool(*b),
        crate::metamodel::DefaultValue::Str(s) => AttrValue::Str(s.clone()),
    }
}

fn lower_scalar(
    version: DomlVersion,
    id: &str,
    class: &str,
    attribute: &str,
    raw: &RawScalar,
) -> Result<AttrValue, ImError> {
    if is_special(version, class, attribute) {
        return lower_special(id, class, attribute, raw);
    }
    Ok(match raw {
        RawScalar::Int(i) => AttrValue::Int(*i),
        RawScalar::Bool(b) => AttrValue::Bool(*b),
        RawScalar::Str(s) => AttrValue::Str(s.clone()),
    })
}

fn lower_special(id: &str, class: &str, attribute: &str, raw: &RawScalar) -> Result<AttrValue, ImError> {
    if attribute == "endPoint" {
        return lower_endpoint(id, class, attribute, raw);
    }

    let text = match raw {
        RawScalar::Str(s) => s.as_str(),
        _ => {
            return Err(ImError::MalformedSpecialAttribute {
                id: id.to_string(),
                class: class.to_string(),
                attribute: attribute.to_string(),
                reason: "expected a string value".to_string(),
            })
        }
    };
    match attribute {
        "cidr" => {
            parse_cidr(text).ok_or_else(|| ImError::MalformedSpecialAttribute {
                id: id.to_string(),
                class: class.to_string(),
                attribute: attribute.to_string(),
                reason: format!("{text:?} is not a valid CIDR block"),
            })?;
            Ok(AttrValue::Str(text.to_string()))
        }
        "memory_mb" => {
            let mb = parse_memory_mb(text).ok_or_else(|| ImError::MalformedSpecialAttribute {
                id: id.to_string(),
                class: class.to_string(),
                attribute: attribute.to_string(),
                reason: format!("{text:?} is not a valid memory size"),
            })?;
            Ok(AttrValue::Int(mb))
        }
        other => Err(ImError::MalformedSpecialAttribute {
            id: id.to_string(),
            class: class.to_string(),
            attribute: attribute.to_string(),
            reason: format!("no special parser registered for {other:?}"),
        }),
    }
}

/// `endPoint` is declared `Integer` in the schema: a value that already
/// arrived as an int is the encoded value itself, while a `host:port`
/// string is folded down to that same integer via [`encode_endpoint`].
fn lower_endpoint(id: &str, class: &str, attribute: &str, raw: &RawScalar) -> Result<AttrValue, ImError> {
    match raw {
        RawScalar::Int(i) => Ok(AttrValue::Int(*i)),
        RawScalar::Str(s) => {
            let endpoint = parse_endpoint(s).ok_or_else(|| ImError::MalformedSpecialAttribute {
                id: id.to_string(),
                class: class.to_string(),
                attribute: attribute.to_string(),
                reason: format!("{s:?} is not a valid host:port endpoint"),
            })?;
            Ok(AttrValue::Int(encode_endpoint(&endpoint)))
        }
        RawScalar::Bool(_) => Err(ImError::MalformedSpecialAttribute {
            id: id.to_string(),
            class: class.to_string(),
            attribute: attribute.to_string(),
            reason: "expected an integer or a host:port string".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> MetamodelRegistry {
        MetamodelRegistry::load().unwrap()
    }

    #[test]
    fn builds_a_minimal_vm_and_interface() {
        let reg = registry();
        let objects = vec![
            RawObject {
                id: "vm1".to_string(),
                class: "infrastructure_VirtualMachine".to_string(),
                attributes: vec![RawAttribute { local_name: "cpu_count".to_string(), value: RawScalar::Int(4) }],
                associations: vec![RawAssociation { local_name: "ifaces".to_string(), target_id: "iface1".to_string() }],
            },
            RawObject {
                id: "iface1".to_string(),
                class: "infrastructure_NetworkInterface".to_string(),
                attributes: vec![RawAttribute { local_name: "endPoint".to_string(), value: RawScalar::Int(8080) }],
                associations: vec![],
            },
        ];
        let model = build(DomlVersion::V1_0, &reg, &objects).unwrap();
        assert_eq!(model.len(), 2);

        let vm_name = model.interner.resolve(model.elements.keys().find(|&&n| model.interner.resolve(n) == "vm1").copied().unwrap());
        assert_eq!(vm_name, "vm1");

        let iface1 = *model.elements.keys().find(|&&n| model.interner.resolve(n) == "iface1").unwrap();
        let back = model
            .elements
            .get(&iface1)
            .unwrap()
            .association("infrastructure_NetworkInterface::belongsToNode");
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn endpoint_text_is_folded_to_the_same_integer_as_host_port() {
        let reg = registry();
        let objects = vec![RawObject {
            id: "iface1".to_string(),
            class: "infrastructure_NetworkInterface".to_string(),
            attributes: vec![RawAttribute {
                local_name: "endPoint".to_string(),
                value: RawScalar::Str("10.0.0.1:8080".to_string()),
            }],
            associations: vec![],
        }];
        let model = build(DomlVersion::V1_0, &reg, &objects).unwrap();
        let iface = model.elements.values().next().unwrap();
        let endpoint = iface.attribute("infrastructure_NetworkInterface::endPoint");
        assert_eq!(endpoint, &[AttrValue::Int((167_772_161i64 << 16) | 8080)]);
    }

    #[test]
    fn unknown_class_is_an_error() {
        let reg = registry();
        let objects = vec![RawObject {
            id: "x".to_string(),
            class: "infrastructure_Wat".to_string(),
            attributes: vec![],
            associations: vec![],
        }];
        assert!(build(DomlVersion::V1_0, &reg, &objects).is_err());
    }

    #[test]
    fn defaults_fill_missing_attributes() {
        let reg = registry();
        let objects = vec![RawObject {
            id: "vm1".to_string(),
            class: "infrastructure_VirtualMachine".to_string(),
            attributes: vec![],
            associations: vec![],
        }];
        let model = build(DomlVersion::V1_0, &reg, &objects).unwrap();
        let vm = model.elements.values().next().unwrap();
        let cpu = vm.attribute("infrastructure_ComputingNode::cpu_count");
        assert_eq!(cpu, &[AttrValue::Int(1)]);
    }

    #[test]
    fn dangling_association_target_is_an_error() {
        let reg = registry();
        let objects = vec![RawObject {
            id: "vm1".to_string(),
            class: "infrastructure_VirtualMachine".to_string(),
            attributes: vec![],
            associations: vec![RawAssociation { local_name: "ifaces".to_string(), target_id: "missing".to_string() }],
        }];
        assert!(build(DomlVersion::V1_0, &reg, &objects).is_err());
    }
}
