//! [`ImElement`]: one normalized node of the Intermediate Model.
//!
//! Attribute and association keys are *mangled*: `Class::member`, where
//! `Class` is the class that actually declares the member (walked via
//! [`crate::metamodel::MetamodelRegistry::resolve_attribute`] /
//! `resolve_association`). Mangling is what lets two classes in the same
//! superclass chain each contribute a same-named member without collision.

use indexmap::IndexMap;

use crate::base::Name;

/// A single scalar attribute value, tagged so the SMT encoder's
/// `AttrData` sort construction has a single source of truth for the set
/// of constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl AttrValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// One Intermediate Model element: its declared class plus the multimaps
/// of mangled-name -> values/targets. Multi-valued by construction, even
/// when the metamodel says `0..1` — callers that need a single value call
/// `.first()` on the returned slice.
#[derive(Debug, Clone)]
pub struct ImElement {
    pub name: Name,
    pub class: String,
    pub attributes: IndexMap<String, Vec<AttrValue>>,
    pub associations: IndexMap<String, Vec<Name>>,
}

impl ImElement {
    pub fn new(name: Name, class: impl Into<String>) -> Self {
        ImElement {
            name,
            class: class.into(),
            attributes: IndexMap::new(),
            associations: IndexMap::new(),
        }
    }

    pub fn attribute(&self, mangled: &str) -> &[AttrValue] {
        self.attributes.get(mangled).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn association(&self, mangled: &str) -> &[Name] {
        self.associations.get(mangled).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push_attribute(&mut self, mangled: impl Into<String>, value: AttrValue) {
        self.attributes.entry(mangled.into()).or_default().push(value);
    }

    pub fn push_association(&mut self, mangled: impl Into<String>, target: Name) {
        let mangled = mangled.into();
        let targets = self.associations.entry(mangled).or_default();
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
}
