//! The finite sorts and relations the encoder builds, and the lookup
//! tables needed to go from an Intermediate Model name back to its Z3
//! constant and vice versa.
//!
//! `Class`, `Attribute`, `Association`, `Element` and `StringSymbol` are
//! each a finite enumeration sort (one constructor per class/mangled
//! attribute/mangled association/element/distinct string literal); `AttrData`
//! is a tagged union over `Int`/`Bool`/`StringSymbol` plus a reserved
//! placeholder constructor.

use std::collections::HashMap;

use z3::ast::Datatype;
use z3::{DatatypeSort, FuncDecl};

use crate::base::Name;

/// A finite enumeration sort plus the name -> constant lookup for it.
pub struct EnumSort<'ctx, K> {
    pub datatype: DatatypeSort<'ctx>,
    pub index: HashMap<K, usize>,
}

impl<'ctx, K: std::hash::Hash + Eq> EnumSort<'ctx, K> {
    pub fn constant(&self, key: &K) -> Option<Datatype<'ctx>> {
        let i = *self.index.get(key)?;
        Some(
            self.datatype.variants[i]
                .constructor
                .apply(&[])
                .as_datatype()
                .expect("nullary datatype constructor must yield a Datatype value"),
        )
    }

    /// The reverse of [`Self::constant`]: given a value evaluated out of a
    /// solver model, find which key it denotes. Every variant here is a
    /// nullary constructor, so a model value is always structurally
    /// identical to exactly one `variants[i].constructor.apply(&[])`; we
    /// compare their printed form rather than re-deriving an index, since
    /// `z3` exposes no cheaper "which constructor built this value" query
    /// for already-evaluated terms.
    ///
    /// Used by diagnostic rendering to turn a
    /// witness element's `Element` sort value back into the
    /// [`crate::base::Name`] the Intermediate Model knows it by.
    pub fn key_for_value(&self, value: &Datatype<'ctx>) -> Option<&K> {
        let printed = value.to_string();
        self.index.iter().find_map(|(k, &i)| {
            let candidate = self.datatype.variants[i].constructor.apply(&[]).as_datatype()?;
            (candidate.to_string() == printed).then_some(k)
        })
    }
}

/// The `AttrData` tagged union: `Int(i64) | Bool(bool) | Str(StringSymbol)`.
/// No `None` variant — absence is modeled by the `attr` relation simply not
/// holding for that `(Element, Attribute)` pair.
/// The fourth variant, `Unbound`, is never constructed by this crate's own
/// encoder; it keeps the sort's shape stable against a future synthesis
/// extension.
pub struct AttrDataSort<'ctx> {
    pub datatype: DatatypeSort<'ctx>,
}

impl<'ctx> AttrDataSort<'ctx> {
    pub const INT_VARIANT: usize = 0;
    pub const BOOL_VARIANT: usize = 1;
    pub const STR_VARIANT: usize = 2;
    pub const UNBOUND_VARIANT: usize = 3;

    pub fn int<'a>(&'a self, value: &z3::ast::Int<'ctx>) -> Datatype<'ctx> {
        self.datatype.variants[Self::INT_VARIANT]
            .constructor
            .apply(&[value])
            .as_datatype()
            .unwrap()
    }

    pub fn boolean<'a>(&'a self, value: &z3::ast::Bool<'ctx>) -> Datatype<'ctx> {
        self.datatype.variants[Self::BOOL_VARIANT]
            .constructor
            .apply(&[value])
            .as_datatype()
            .unwrap()
    }

    pub fn string<'a>(&'a self, value: &Datatype<'ctx>) -> Datatype<'ctx> {
        self.datatype.variants[Self::STR_VARIANT]
            .constructor
            .apply(&[value])
            .as_datatype()
            .unwrap()
    }
}

/// Every finite sort plus the lookup tables needed to map IM/metamodel
/// names onto Z3 constants. Lives for as long as the `z3::Context` it was
/// built in, hence the shared `'ctx` lifetime.
pub struct SmtSorts<'ctx> {
    pub class: EnumSort<'ctx, String>,
    pub attribute: EnumSort<'ctx, String>,
    pub association: EnumSort<'ctx, String>,
    pub element: EnumSort<'ctx, Name>,
    pub string_symbol: EnumSort<'ctx, String>,
    pub attr_data: AttrDataSort<'ctx>,
}

/// The three background relations plus the sorts they're defined over.
/// `elem_class` is a total function (every element has exactly one most
/// specific class); `attr` and `assoc` are plain boolean relations.
pub struct SmtEncoding<'ctx> {
    pub sorts: SmtSorts<'ctx>,
    pub elem_class: FuncDecl<'ctx>,
    pub attr: FuncDecl<'ctx>,
    pub assoc: FuncDecl<'ctx>,
}
