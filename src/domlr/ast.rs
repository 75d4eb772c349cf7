//! DOMLR abstract syntax tree.
//!
//! Produced by [`super::parser::parse`]; consumed by [`super::resolve`]
//! (name binding) and [`super::lower`] (FOL lowering). Kept as a tagged
//! tree rather than boxed closures so lowering stays a plain interpreter
//! over data, easy to test independently of a live encoding.

use text_size::TextRange;

/// One parsed DOMLR source file: its flag directives plus its ordered
/// requirement declarations.
#[derive(Debug, Clone, Default)]
pub struct DomlrSource {
    pub directives: Vec<Directive>,
    pub requirements: Vec<RequirementDecl>,
}

/// A flag directive: zero or more, one per line, must precede the
/// requirement list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    CheckConsistency,
    IgnoreBuiltin,
    Skip(String),
    Csp,
}

/// `[-] "Name" { body } error "template"`.
#[derive(Debug, Clone)]
pub struct RequirementDecl {
    /// A leading `-` sets this (the requirement's polarity).
    pub flipped: bool,
    pub name: String,
    pub name_range: TextRange,
    pub body: Expr,
    pub error_template: String,
}

/// A free or quantifier-bound element variable reference.
#[derive(Debug, Clone)]
pub struct VarRef {
    pub name: String,
    pub range: TextRange,
}

/// A class, attribute, or association reference in its raw surface
/// syntax (`Pkg.Class`, `Pkg_Class`, `Pkg.Class::field`, `Pkg.Class.field`)
/// — normalized and resolved by [`super::resolve`].
#[derive(Debug, Clone)]
pub struct RawName {
    pub raw: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Only equality/inequality are legal on string/bool operands;
    /// ordering operators on non-numeric operands are a compile-time
    /// type error.
    pub fn is_ordering(self) -> bool {
        matches!(self, CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Str(String),
    Bool(bool),
}

/// A requirement body expression.
#[derive(Debug, Clone)]
pub enum Expr {
    Forall(VarRef, Box<Expr>),
    Exists(VarRef, Box<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Implies(Box<Expr>, Box<Expr>),
    Iff(Box<Expr>, Box<Expr>),
    /// `x is ClassName`.
    IsClass(VarRef, RawName),
    /// `x is y`.
    IsVar(VarRef, VarRef),
    /// `x has Assoc y`.
    HasAssoc(VarRef, RawName, VarRef),
    /// `x has Attr op literal`.
    HasAttrLiteral(VarRef, RawName, CompareOp, Literal),
    /// `x has AttrA op y has AttrB`.
    HasAttrAttr(VarRef, RawName, CompareOp, VarRef, RawName),
}
