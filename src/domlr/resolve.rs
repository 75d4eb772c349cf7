//! Qualified-name normalization and binding. DOMLR accepts four equivalent surface spellings for a
//! class or member reference — `Pkg.Class`, `Pkg_Class`,
//! `Pkg.Class::field`, `Pkg.Class.field` — which the lexer tokenizes as a
//! single opaque `Ident` (see [`super::lexer`]); this module turns that
//! raw text into the mangled `Package_Class`/`Package_Class::field` form
//! the metamodel and encoding already key everything by, then resolves it.

use crate::metamodel::{AssociationDef, AttributeDef, ClassDef, DomlVersion, MetamodelRegistry};

use super::ast::RawName;
use super::diagnostics::DomlrError;

/// `Pkg.Class` or `Pkg_Class` -> `Pkg_Class`. A name with no dot is assumed
/// already mangled.
pub fn normalize_class(raw: &str) -> String {
    let parts: Vec<&str> = raw.split('.').collect();
    match parts.len() {
        1 => parts[0].to_string(),
        _ => format!("{}_{}", parts[0], parts[1]),
    }
}

/// `Pkg.Class::field`, `Pkg_Class::field` or `Pkg.Class.field` -> `(Pkg_Class,
/// field)`. Returns `None` for a bare class reference with no member part
/// (a `Pkg.Class` with neither `::` nor a third dotted segment).
pub fn normalize_member(raw: &str) -> Option<(String, String)> {
    if let Some((class, member)) = raw.split_once("::") {
        return Some((normalize_class(class), member.to_string()));
    }
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() >= 3 {
        let member = parts[parts.len() - 1].to_string();
        let class = format!("{}_{}", parts[0], parts[1]);
        Some((class, member))
    } else {
        None
    }
}

/// Resolve a bare class reference (`x is Pkg.Class`).
pub fn resolve_class<'a>(
    registry: &'a MetamodelRegistry,
    version: DomlVersion,
    requirement: &str,
    name: &RawName,
) -> Result<&'a ClassDef, DomlrError> {
    let class = normalize_class(&name.raw);
    registry
        .resolve_class(version, &class)
        .map_err(|source| DomlrError::Resolution { requirement: requirement.to_string(), source })
}

/// Resolve an attribute member reference (`x has Pkg.Class::attr ...`),
/// walking the declaring class's superclass chain exactly as the encoder
/// does when mangling attribute names.
pub fn resolve_attribute<'a>(
    registry: &'a MetamodelRegistry,
    version: DomlVersion,
    requirement: &str,
    name: &RawName,
) -> Result<(&'a ClassDef, &'a AttributeDef), DomlrError> {
    let (class, member) = member_parts(requirement, name)?;
    registry
        .resolve_attribute(version, &class, &member)
        .map_err(|source| DomlrError::Resolution { requirement: requirement.to_string(), source })
}

/// As [`resolve_attribute`] but for associations.
pub fn resolve_association<'a>(
    registry: &'a MetamodelRegistry,
    version: DomlVersion,
    requirement: &str,
    name: &RawName,
) -> Result<(&'a ClassDef, &'a AssociationDef), DomlrError> {
    let (class, member) = member_parts(requirement, name)?;
    registry
        .resolve_association(version, &class, &member)
        .map_err(|source| DomlrError::Resolution { requirement: requirement.to_string(), source })
}

fn member_parts(requirement: &str, name: &RawName) -> Result<(String, String), DomlrError> {
    normalize_member(&name.raw).ok_or_else(|| DomlrError::UnboundVariable {
        requirement: requirement.to_string(),
        name: format!("{} (expected a `Class::member` or `Pkg.Class.member` reference)", name.raw),
    })
}

/// The mangled `Class::member` key the encoding's `Attribute`/`Association`
/// sorts are keyed by, once the declaring class is known (which may be an
/// ancestor of the class named in the surface syntax — `resolve_attribute`
/// returns the declaring `ClassDef`, not necessarily the one written).
pub fn mangled(owner: &ClassDef, member: &str) -> String {
    format!("{}::{}", owner.name, member)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_dotted_class() {
        assert_eq!(normalize_class("infrastructure.VirtualMachine"), "infrastructure_VirtualMachine");
    }

    #[test]
    fn normalizes_already_mangled_class() {
        assert_eq!(normalize_class("infrastructure_VirtualMachine"), "infrastructure_VirtualMachine");
    }

    #[test]
    fn normalizes_double_colon_member() {
        let (class, member) = normalize_member("infrastructure.ComputingNode::cpu_count").unwrap();
        assert_eq!(class, "infrastructure_ComputingNode");
        assert_eq!(member, "cpu_count");
    }

    #[test]
    fn normalizes_triple_dot_member() {
        let (class, member) = normalize_member("infrastructure.ComputingNode.cpu_count").unwrap();
        assert_eq!(class, "infrastructure_ComputingNode");
        assert_eq!(member, "cpu_count");
    }

    #[test]
    fn bare_class_reference_has_no_member() {
        assert_eq!(normalize_member("infrastructure.VirtualMachine"), None);
    }

    #[test]
    fn resolves_inherited_attribute_through_registry() {
        let registry = MetamodelRegistry::load().unwrap();
        let name = RawName {
            raw: "infrastructure.VirtualMachine::cpu_count".to_string(),
            range: text_size::TextRange::new(0.into(), 0.into()),
        };
        let (owner, attr) = resolve_attribute(&registry, DomlVersion::V1_0, "r", &name).unwrap();
        assert_eq!(owner.name, "infrastructure_ComputingNode");
        assert_eq!(attr.name, "cpu_count");
    }
}
