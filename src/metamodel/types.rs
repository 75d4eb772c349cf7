//! Metamodel data types: classes, attributes, associations and their
//! multiplicity/type constraints, as loaded from a versioned schema.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;

/// A supported DOML schema version. Each version is verified against its
/// own metamodel and built-in requirement library; nothing is back-ported
/// across versions (see DESIGN.md, Open Question: "reachable network").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DomlVersion {
    V1_0,
    V2_0,
    V2_1,
    V2_1_1,
}

impl DomlVersion {
    /// All versions, oldest first.
    pub const ALL: [DomlVersion; 4] = [
        DomlVersion::V1_0,
        DomlVersion::V2_0,
        DomlVersion::V2_1,
        DomlVersion::V2_1_1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DomlVersion::V1_0 => "v1.0",
            DomlVersion::V2_0 => "v2.0",
            DomlVersion::V2_1 => "v2.1",
            DomlVersion::V2_1_1 => "v2.1.1",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        DomlVersion::ALL.into_iter().find(|v| v.as_str() == s)
    }

    /// Versions newest-first, used when the XMI adapter contract is asked
    /// to infer a version by trying newest first.
    pub fn newest_first() -> impl Iterator<Item = DomlVersion> {
        DomlVersion::ALL.into_iter().rev()
    }
}

impl fmt::Display for DomlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Multiplicity bounds: lower bound is `0` or `1`; upper bound is `1` or
/// unbounded (`*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Multiplicity {
    pub lower_one: bool,
    pub upper_one: bool,
}

impl Multiplicity {
    pub const ZERO_OR_MANY: Multiplicity = Multiplicity { lower_one: false, upper_one: false };
    pub const ZERO_OR_ONE: Multiplicity = Multiplicity { lower_one: false, upper_one: true };
    pub const ONE: Multiplicity = Multiplicity { lower_one: true, upper_one: true };
    pub const ONE_OR_MANY: Multiplicity = Multiplicity { lower_one: true, upper_one: false };

    fn parse(s: &str) -> Option<Multiplicity> {
        match s {
            "0..1" => Some(Multiplicity::ZERO_OR_ONE),
            "1" | "1..1" => Some(Multiplicity::ONE),
            "1..*" => Some(Multiplicity::ONE_OR_MANY),
            "0..*" => Some(Multiplicity::ZERO_OR_MANY),
            _ => None,
        }
    }
}

/// A primitive attribute type. `EnumKind` covers the `GeneratorKind`-style
/// string-enumeration attributes (values restricted to a fixed token set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Integer,
    String,
    EnumKind,
}

/// A literal default value, as found in the metamodel schema.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct AttributeDef {
    pub name: String,
    pub ty: PrimitiveType,
    pub multiplicity: Multiplicity,
    pub default: Vec<DefaultValue>,
}

#[derive(Debug, Clone)]
pub struct AssociationDef {
    pub name: String,
    pub target_class: String,
    pub multiplicity: Multiplicity,
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Fully qualified name, e.g. `infrastructure_VirtualMachine`.
    pub name: String,
    pub superclass: Option<String>,
    /// Declaration order matters: it is preserved in the `Attribute` sort
    /// enumeration for reproducibility.
    pub attributes: IndexMap<String, AttributeDef>,
    pub associations: IndexMap<String, AssociationDef>,
}

/// `qualified class name -> ClassDef`, ordered by first declaration.
pub type Metamodel = IndexMap<String, ClassDef>;

/// Unordered pairs of fully-qualified association names that are mutual
/// inverses, e.g. `(infrastructure_ComputingNode::ifaces,
/// infrastructure_NetworkInterface::belongsTo)`.
pub type InverseAssociations = Vec<(String, String)>;

// ---------------------------------------------------------------------
// YAML schema document shape (deserialize target, then lowered to the
// types above by `registry::parse_metamodel`).
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SchemaDoc {
    #[serde(default)]
    pub commons: IndexMap<String, SchemaClass>,
    #[serde(default)]
    pub application: IndexMap<String, SchemaClass>,
    #[serde(default)]
    pub infrastructure: IndexMap<String, SchemaClass>,
    #[serde(default)]
    pub concrete: IndexMap<String, SchemaClass>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SchemaClass {
    pub superclass: Option<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, SchemaAttribute>,
    #[serde(default)]
    pub associations: IndexMap<String, SchemaAssociation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SchemaAttribute {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub multiplicity: Option<String>,
    #[serde(default)]
    pub default: Option<SchemaDefault>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SchemaDefault {
    One(SchemaScalar),
    Many(Vec<SchemaScalar>),
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub(crate) enum SchemaScalar {
    Int(i64),
    Bool(bool),
    Str(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct SchemaAssociation {
    pub class: String,
    #[serde(default)]
    pub multiplicity: Option<String>,
    #[serde(default)]
    pub inverse_of: Option<String>,
}

pub(crate) fn parse_multiplicity(s: Option<&str>) -> Multiplicity {
    s.and_then(Multiplicity::parse).unwrap_or(Multiplicity::ZERO_OR_MANY)
}

pub(crate) fn parse_type(s: &str) -> PrimitiveType {
    match s {
        "Boolean" => PrimitiveType::Boolean,
        "Integer" => PrimitiveType::Integer,
        "String" => PrimitiveType::String,
        _ => PrimitiveType::EnumKind,
    }
}

pub(crate) fn parse_default(d: &SchemaDefault) -> Vec<DefaultValue> {
    let lower = |s: &SchemaScalar| match s {
        SchemaScalar::Int(i) => DefaultValue::Int(*i),
        SchemaScalar::Bool(b) => DefaultValue::Bool(*b),
        SchemaScalar::Str(s) => DefaultValue::Str(s.clone()),
    };
    match d {
        SchemaDefault::One(s) => vec![lower(s)],
        SchemaDefault::Many(v) => v.iter().map(lower).collect(),
    }
}
