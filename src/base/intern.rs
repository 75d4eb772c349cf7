//! String interning for mangled attribute/association/class names and IM
//! element names.
//!
//! Encoding construction compares thousands of mangled names (`Class::attr`)
//! while building background axioms; interning turns those comparisons into
//! integer equality instead of repeated string hashing.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::sync::Arc;

/// An interned string. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

/// Owns the backing storage for [`Name`]s handed out by [`Interner::intern`].
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<SmolStr, u32>,
    strings: Vec<Arc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&id) = self.map.get(s) {
            return Name(id);
        }
        let id = self.strings.len() as u32;
        self.strings.push(Arc::from(s));
        self.map.insert(SmolStr::new(s), id);
        Name(id)
    }

    pub fn resolve(&self, name: Name) -> &str {
        &self.strings[name.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut interner = Interner::new();
        let a = interner.intern("infrastructure_VirtualMachine");
        let b = interner.intern("infrastructure_VirtualMachine");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "infrastructure_VirtualMachine");
    }

    #[test]
    fn distinct_strings_get_distinct_names() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        assert_ne!(a, b);
    }
}
