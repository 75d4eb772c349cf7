//! [`MetamodelRegistry`]: loads, caches and resolves the versioned schemas.
//!
//! Subclass/superclass closures are computed with a plain worklist rather
//! than a graph library, since class graphs are small and acyclic by
//! construction.

use std::sync::OnceLock;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::info_span;

use super::assets::raw_yaml;
use super::error::MetamodelError;
use super::types::{
    parse_default, parse_multiplicity, parse_type, AssociationDef, AttributeDef, ClassDef,
    DomlVersion, InverseAssociations, Metamodel, SchemaClass, SchemaDoc,
};

/// One version's fully-resolved schema: the class table plus its
/// inverse-association pairs and a reflexive-transitive subclass index.
struct Loaded {
    metamodel: Metamodel,
    inverse_pairs: InverseAssociations,
    /// class -> set of classes that are `class` or a transitive subclass of it.
    subclasses: FxHashMap<String, Vec<String>>,
    /// class -> chain from itself up to its root ancestor, inclusive.
    superclass_chain: FxHashMap<String, Vec<String>>,
}

/// Owns every supported [`DomlVersion`]'s parsed schema. Construction is
/// pure and infallible-by-construction for the embedded assets (a
/// malformed embedded schema is a programming error, not a runtime one —
/// [`MetamodelRegistry::global`] panics on it), but [`MetamodelRegistry::load`]
/// is exposed directly for callers who embed their own schema YAML.
pub struct MetamodelRegistry {
    versions: FxHashMap<DomlVersion, Loaded>,
}

impl MetamodelRegistry {
    /// Parse every embedded schema up front.
    pub fn load() -> Result<MetamodelRegistry, MetamodelError> {
        let span = info_span!("metamodel load", versions = DomlVersion::ALL.len());
        let _enter = span.enter();

        let mut versions = FxHashMap::default();
        for version in DomlVersion::ALL {
            versions.insert(version, load_one(version, raw_yaml(version))?);
        }
        Ok(MetamodelRegistry { versions })
    }

    /// Process-wide singleton, built once. Panics only if an embedded
    /// schema asset itself is malformed (a packaging bug, not user error).
    pub fn global() -> &'static MetamodelRegistry {
        static REGISTRY: OnceLock<MetamodelRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            MetamodelRegistry::load().expect("embedded metamodel schema failed to parse")
        })
    }

    fn loaded(&self, version: DomlVersion) -> Result<&Loaded, MetamodelError> {
        self.versions
            .get(&version)
            .ok_or_else(|| MetamodelError::UnknownVersion(version.as_str().to_string()))
    }

    pub fn metamodel(&self, version: DomlVersion) -> Result<&Metamodel, MetamodelError> {
        Ok(&self.loaded(version)?.metamodel)
    }

    /// Look up a fully-qualified class name (e.g. `infrastructure_VirtualMachine`),
    /// used by the DOMLR resolver once a raw surface reference has been
    /// normalized.
    pub fn resolve_class(&self, version: DomlVersion, name: &str) -> Result<&ClassDef, MetamodelError> {
        let loaded = self.loaded(version)?;
        loaded.metamodel.get(name).ok_or_else(|| MetamodelError::UnknownClass {
            name: name.to_string(),
            suggestions: rank_suggestions(name, loaded.metamodel.keys().cloned().collect()),
        })
    }

    pub fn inverse_pairs(&self, version: DomlVersion) -> Result<&InverseAssociations, MetamodelError> {
        Ok(&self.loaded(version)?.inverse_pairs)
    }

    /// `class` and every transitive subclass of it, including itself.
    pub fn subclasses(&self, version: DomlVersion, class: &str) -> Result<&[String], MetamodelError> {
        let loaded = self.loaded(version)?;
        Ok(loaded
            .subclasses
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    /// `class` followed by each ancestor up to the root, including itself.
    pub fn superclasses(&self, version: DomlVersion, class: &str) -> Result<&[String], MetamodelError> {
        let loaded = self.loaded(version)?;
        Ok(loaded
            .superclass_chain
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    /// Walk `class`'s superclass chain looking for an attribute named
    /// `local_name`, mirroring `get_mangled_attribute_name`: the first
    /// declaring class (closest to `class`) wins.
    pub fn resolve_attribute(
        &self,
        version: DomlVersion,
        class: &str,
        local_name: &str,
    ) -> Result<(&ClassDef, &AttributeDef), MetamodelError> {
        let loaded = self.loaded(version)?;
        for ancestor in self.superclasses(version, class)? {
            let def = &loaded.metamodel[ancestor];
            if let Some(attr) = def.attributes.get(local_name) {
                return Ok((def, attr));
            }
        }
        Err(MetamodelError::AttributeNotFound {
            class: class.to_string(),
            local_name: local_name.to_string(),
            suggestions: suggest_attribute(loaded, class, local_name),
        })
    }

    /// As [`Self::resolve_attribute`] but for associations.
    pub fn resolve_association(
        &self,
        version: DomlVersion,
        class: &str,
        local_name: &str,
    ) -> Result<(&ClassDef, &AssociationDef), MetamodelError> {
        let loaded = self.loaded(version)?;
        for ancestor in self.superclasses(version, class)? {
            let def = &loaded.metamodel[ancestor];
            if let Some(assoc) = def.associations.get(local_name) {
                return Ok((def, assoc));
            }
        }
        Err(MetamodelError::AssociationNotFound {
            class: class.to_string(),
            local_name: local_name.to_string(),
            suggestions: suggest_association(loaded, class, local_name),
        })
    }

    /// Attribute defaults declared anywhere in `class`'s superclass chain,
    /// keyed by local attribute name. A subclass default shadows an
    /// ancestor's (`get_mangled_attribute_defaults`).
    pub fn defaults_of(
        &self,
        version: DomlVersion,
        class: &str,
    ) -> Result<IndexMap<String, AttributeDef>, MetamodelError> {
        let loaded = self.loaded(version)?;
        let mut out: IndexMap<String, AttributeDef> = IndexMap::new();
        for ancestor in self.superclasses(version, class)?.iter().rev() {
            let def = &loaded.metamodel[ancestor];
            for (name, attr) in &def.attributes {
                out.insert(name.clone(), attr.clone());
            }
        }
        Ok(out)
    }
}

fn suggest_attribute(loaded: &Loaded, class: &str, local_name: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(chain) = loaded.superclass_chain.get(class) {
        for ancestor in chain {
            candidates.extend(loaded.metamodel[ancestor].attributes.keys().cloned());
        }
    }
    rank_suggestions(local_name, candidates)
}

fn suggest_association(loaded: &Loaded, class: &str, local_name: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(chain) = loaded.superclass_chain.get(class) {
        for ancestor in chain {
            candidates.extend(loaded.metamodel[ancestor].associations.keys().cloned());
        }
    }
    rank_suggestions(local_name, candidates)
}

/// Up to 3 candidates within edit distance 3 of `target`, closest first.
fn rank_suggestions(target: &str, candidates: Vec<String>) -> Vec<String> {
    let mut scored: Vec<(usize, String)> = candidates
        .into_iter()
        .map(|c| (strsim::levenshtein(target, &c), c))
        .filter(|(dist, _)| *dist <= 3)
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    scored.dedup_by(|a, b| a.1 == b.1);
    scored.into_iter().take(3).map(|(_, c)| c).collect()
}

fn load_one(version: DomlVersion, yaml: &str) -> Result<Loaded, MetamodelError> {
    let doc: SchemaDoc = serde_yaml::from_str(yaml).map_err(|e| MetamodelError::MalformedSchema {
        version: version.as_str().to_string(),
        reason: e.to_string(),
    })?;

    let mut metamodel: Metamodel = IndexMap::new();
    let mut inverse_of_refs: Vec<(String, String)> = Vec::new();

    let packages = [
        ("commons", &doc.commons),
        ("application", &doc.application),
        ("infrastructure", &doc.infrastructure),
        ("concrete", &doc.concrete),
    ];
    for (package, classes) in packages {
        for (local_class, schema_class) in classes {
            let qualified = format!("{package}_{local_class}");
            let class_def = lower_class(version, &qualified, schema_class, &mut inverse_of_refs)?;
            metamodel.insert(qualified, class_def);
        }
    }

    for class_def in metamodel.values() {
        if let Some(superclass) = &class_def.superclass {
            if !metamodel.contains_key(superclass) {
                return Err(MetamodelError::UnknownSuperclass {
                    class: class_def.name.clone(),
                    superclass: superclass.clone(),
                });
            }
        }
        for assoc in class_def.associations.values() {
            if !metamodel.contains_key(&assoc.target_class) {
                return Err(MetamodelError::UnknownAssociationTarget {
                    class: class_def.name.clone(),
                    association: assoc.name.clone(),
                    target: assoc.target_class.clone(),
                });
            }
        }
    }

    let mut inverse_pairs = InverseAssociations::new();
    for (owner_qualified_assoc, target_ref) in inverse_of_refs {
        let (target_class, target_assoc) =
            target_ref.split_once("::").ok_or_else(|| {
                MetamodelError::UnknownInverseAssociation(target_ref.clone())
            })?;
        if !metamodel
            .get(target_class)
            .map(|c| c.associations.contains_key(target_assoc))
            .unwrap_or(false)
        {
            return Err(MetamodelError::UnknownInverseAssociation(target_ref));
        }
        inverse_pairs.push((owner_qualified_assoc, target_ref));
    }

    let superclass_chain = build_superclass_chains(&metamodel);
    let subclasses = invert_chains(&superclass_chain);

    Ok(Loaded {
        metamodel,
        inverse_pairs,
        subclasses,
        superclass_chain,
    })
}

fn lower_class(
    version: DomlVersion,
    qualified: &str,
    schema_class: &SchemaClass,
    inverse_of_refs: &mut Vec<(String, String)>,
) -> Result<ClassDef, MetamodelError> {
    let superclass = schema_class.superclass.clone();

    let mut attributes = IndexMap::new();
    for (name, schema_attr) in &schema_class.attributes {
        attributes.insert(
            name.clone(),
            AttributeDef {
                name: name.clone(),
                ty: parse_type(&schema_attr.type_),
                multiplicity: parse_multiplicity(schema_attr.multiplicity.as_deref()),
                default: schema_attr
                    .default
                    .as_ref()
                    .map(parse_default)
                    .unwrap_or_default(),
            },
        );
    }

    let mut associations = IndexMap::new();
    for (name, schema_assoc) in &schema_class.associations {
        let target_class = schema_assoc.class.clone();
        associations.insert(
            name.clone(),
            AssociationDef {
                name: name.clone(),
                target_class,
                multiplicity: parse_multiplicity(schema_assoc.multiplicity.as_deref()),
            },
        );
        if let Some(inverse) = &schema_assoc.inverse_of {
            inverse_of_refs.push((format!("{qualified}::{name}"), inverse.clone()));
        }
    }

    let _ = version; // reserved: per-version lowering hooks land here if ever needed
    Ok(ClassDef {
        name: qualified.to_string(),
        superclass,
        attributes,
        associations,
    })
}

fn build_superclass_chains(metamodel: &Metamodel) -> FxHashMap<String, Vec<String>> {
    let mut chains = FxHashMap::default();
    for class in metamodel.keys() {
        let mut chain = vec![class.clone()];
        let mut current = class.as_str();
        while let Some(superclass) = metamodel.get(current).and_then(|c| c.superclass.as_deref()) {
            chain.push(superclass.to_string());
            current = superclass;
        }
        chains.insert(class.clone(), chain);
    }
    chains
}

fn invert_chains(chains: &FxHashMap<String, Vec<String>>) -> FxHashMap<String, Vec<String>> {
    let mut subclasses: FxHashMap<String, Vec<String>> = FxHashMap::default();
    for (class, chain) in chains {
        for ancestor in chain {
            subclasses.entry(ancestor.clone()).or_default().push(class.clone());
        }
    }
    subclasses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_embedded_versions() {
        let registry = MetamodelRegistry::load().expect("embedded schemas must parse");
        for version in DomlVersion::ALL {
            assert!(registry.metamodel(version).is_ok());
        }
    }

    #[test]
    fn virtual_machine_resolves_inherited_attribute() {
        let registry = MetamodelRegistry::load().unwrap();
        let (owner, attr) = registry
            .resolve_attribute(DomlVersion::V1_0, "infrastructure_VirtualMachine", "cpu_count")
            .expect("cpu_count is declared on the ComputingNode superclass");
        assert_eq!(owner.name, "infrastructure_ComputingNode");
        assert_eq!(attr.name, "cpu_count");
    }

    #[test]
    fn unknown_attribute_suggests_closest_match() {
        let registry = MetamodelRegistry::load().unwrap();
        let err = registry
            .resolve_attribute(DomlVersion::V1_0, "infrastructure_VirtualMachine", "cpu_cunt")
            .unwrap_err();
        match err {
            MetamodelError::AttributeNotFound { suggestions, .. } => {
                assert!(suggestions.contains(&"cpu_count".to_string()));
            }
            other => panic!("expected AttributeNotFound, got {other:?}"),
        }
    }

    #[test]
    fn v1_0_has_no_container_class() {
        let registry = MetamodelRegistry::load().unwrap();
        let metamodel = registry.metamodel(DomlVersion::V1_0).unwrap();
        assert!(!metamodel.contains_key("infrastructure_Container"));
        let metamodel_v2 = registry.metamodel(DomlVersion::V2_0).unwrap();
        assert!(metamodel_v2.contains_key("infrastructure_Container"));
    }

    #[test]
    fn subclasses_include_self_and_children() {
        let registry = MetamodelRegistry::load().unwrap();
        let subs = registry
            .subclasses(DomlVersion::V1_0, "infrastructure_ComputingNode")
            .unwrap();
        assert!(subs.iter().any(|c| c == "infrastructure_ComputingNode"));
        assert!(subs.iter().any(|c| c == "infrastructure_VirtualMachine"));
    }

    #[test]
    fn inverse_pairs_are_populated() {
        let registry = MetamodelRegistry::load().unwrap();
        let pairs = registry.inverse_pairs(DomlVersion::V1_0).unwrap();
        assert!(!pairs.is_empty());
    }
}
