//! Per-version built-in requirement catalogs.
//!
//! Each [`DomlVersion`] gets exactly the requirements whose classes it
//! declares, rather than back-porting the full catalog across versions.
//! `v1.0`/`v2.0` have no `SecurityGroup`/`IngressRule`/`external`
//! attribute, so `external_saas_requires_https_ingress` is simply absent
//! from their catalog rather than vacuously satisfied or omitted at
//! check time.

use crate::metamodel::DomlVersion;

use super::common;
use super::types::BuiltinRequirement;

pub fn catalog(version: DomlVersion) -> Vec<BuiltinRequirement> {
    let mut reqs = vec![
        BuiltinRequirement {
            id: "builtin.vm_iface",
            description: "every virtual machine has at least one network interface",
            error_template: "virtual machine {vm} has no network interface",
            build: common::vm_iface,
        },
        BuiltinRequirement {
            id: "builtin.iface_uniq",
            description: "no two interfaces on the same network share an endpoint",
            error_template: "interfaces {iface1} and {iface2} share a network and an endpoint",
            build: common::iface_uniq,
        },
        BuiltinRequirement {
            id: "builtin.all_software_components_deployed",
            description: "every software component is the target of some deployment",
            error_template: "software component {component} is never deployed",
            build: common::all_software_components_deployed,
        },
        BuiltinRequirement {
            id: "builtin.all_infrastructure_elements_deployed",
            description: "every infrastructure element hosts some deployment",
            error_template: "infrastructure element {node} hosts no deployment",
            build: common::all_infrastructure_elements_deployed,
        },
        BuiltinRequirement {
            id: "builtin.concrete_maps.virtual_machine",
            description: "every concrete virtual machine maps to an abstract element",
            error_template: "concrete virtual machine {element} does not map to an abstract element",
            build: common::concrete_maps_virtual_machine,
        },
        BuiltinRequirement {
            id: "builtin.concrete_maps.network",
            description: "every concrete network maps to an abstract element",
            error_template: "concrete network {element} does not map to an abstract element",
            build: common::concrete_maps_network,
        },
        BuiltinRequirement {
            id: "builtin.concrete_maps.storage",
            description: "every concrete storage volume maps to an abstract element",
            error_template: "concrete storage volume {element} does not map to an abstract element",
            build: common::concrete_maps_storage,
        },
        BuiltinRequirement {
            id: "builtin.concrete_maps.faas",
            description: "every concrete function-as-a-service maps to an abstract element",
            error_template: "concrete function-as-a-service {element} does not map to an abstract element",
            build: common::concrete_maps_faas,
        },
        BuiltinRequirement {
            id: "builtin.concrete_maps.computing_group",
            description: "every concrete computing group maps to an abstract element",
            error_template: "concrete computing group {element} does not map to an abstract element",
            build: common::concrete_maps_computing_group,
        },
        BuiltinRequirement {
            id: "builtin.software_package_iface_net",
            description: "every consumed interface is reachable from some exposer over a shared network",
            error_template: "interface {consumer_iface} consumed on {consumer_node} has no reachable exposer",
            build: common::software_package_iface_net,
        },
    ];

    if matches!(version, DomlVersion::V2_1 | DomlVersion::V2_1_1) {
        reqs.push(BuiltinRequirement {
            id: "builtin.security_group_has_iface",
            description: "every security group is associated with at least one network interface",
            error_template: "security group {group} is associated with no network interface",
            build: common::security_group_has_iface,
        });
        reqs.push(BuiltinRequirement {
            id: "builtin.external_saas_requires_https_ingress",
            description: "every externally-exposed interface is reachable only through a 443 ingress rule",
            error_template: "externally-exposed interface {iface} is not guarded by a 443 ingress rule",
            build: common::external_saas_requires_https_ingress,
        });
    }

    reqs
}
