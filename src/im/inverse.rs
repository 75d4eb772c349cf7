//! Inverse-association reciprocation.
//!
//! For every declared inverse pair `(A::assoc, B::assoc')`, whenever an element `e1`
//! has `A::assoc -> e2`, `e2` must also have `B::assoc' -> e1`, and
//! vice versa. XMI documents only record one direction explicitly; this
//! fills in the other so downstream code never has to special-case
//! direction. Safe to run more than once — [`ImElement::push_association`]
//! already dedups targets, so a second pass is a no-op.

use crate::base::Name;
use crate::metamodel::InverseAssociations;

use super::IntermediateModel;

pub fn reciprocate_inverse_associations(model: &mut IntermediateModel, pairs: &InverseAssociations) {
    for (left, right) in pairs {
        apply_direction(model, left, right);
        apply_direction(model, right, left);
    }
}

/// For every `(source, target)` edge stored under `from_mangled` on some
/// element, ensure `target` carries a `to_mangled -> source` edge back.
fn apply_direction(model: &mut IntermediateModel, from_mangled: &str, to_mangled: &str) {
    let mut additions: Vec<(Name, Name)> = Vec::new();
    for (&source, element) in model.elements.iter() {
        for &target in element.association(from_mangled) {
            additions.push((target, source));
        }
    }
    for (target, source) in additions {
        if let Some(target_element) = model.elements.get_mut(&target) {
            target_element.push_association(to_mangled, source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Interner;
    use crate::im::ImElement;
    use crate::metamodel::DomlVersion;
    use indexmap::IndexMap;

    fn model_with(a: (Name, &str), b: (Name, &str)) -> IntermediateModel {
        let mut elements = IndexMap::new();
        elements.insert(a.0, ImElement::new(a.0, a.1));
        elements.insert(b.0, ImElement::new(b.0, b.1));
        IntermediateModel { version: DomlVersion::V1_0, elements, interner: Interner::new() }
    }

    #[test]
    fn reciprocates_missing_direction() {
        let mut interner = Interner::new();
        let vm = interner.intern("vm1");
        let iface = interner.intern("iface1");
        let mut model = model_with(
            (vm, "infrastructure_VirtualMachine"),
            (iface, "infrastructure_NetworkInterface"),
        );
        model
            .elements
            .get_mut(&vm)
            .unwrap()
            .push_association("infrastructure_ComputingNode::ifaces", iface);

        let pairs = vec![(
            "infrastructure_ComputingNode::ifaces".to_string(),
            "infrastructure_NetworkInterface::belongsToNode".to_string(),
        )];
        reciprocate_inverse_associations(&mut model, &pairs);

        let back = model
            .elements
            .get(&iface)
            .unwrap()
            .association("infrastructure_NetworkInterface::belongsToNode");
        assert_eq!(back, &[vm]);
    }

    #[test]
    fn is_idempotent() {
        let mut interner = Interner::new();
        let vm = interner.intern("vm1");
        let iface = interner.intern("iface1");
        let mut model = model_with(
            (vm, "infrastructure_VirtualMachine"),
            (iface, "infrastructure_NetworkInterface"),
        );
        model
            .elements
            .get_mut(&vm)
            .unwrap()
            .push_association("infrastructure_ComputingNode::ifaces", iface);

        let pairs = vec![(
            "infrastructure_ComputingNode::ifaces".to_string(),
            "infrastructure_NetworkInterface::belongsToNode".to_string(),
        )];
        reciprocate_inverse_associations(&mut model, &pairs);
        reciprocate_inverse_associations(&mut model, &pairs);

        let forward = model.elements.get(&vm).unwrap().association("infrastructure_ComputingNode::ifaces");
        assert_eq!(forward, &[iface]);
    }
}
