//! End-to-end scenarios: build an Intermediate Model by hand, compile a
//! DOMLR source, and run the full verification driver over both. Each
//! scenario is a minimal, literal model chosen to pin down one built-in or
//! DOMLR behavior rather than exercise the whole catalog at once.

use doml_mc::driver::{self, VerificationOptions};
use doml_mc::domlr;
use doml_mc::im::{self, RawAssociation, RawAttribute, RawObject, RawScalar};
use doml_mc::metamodel::{DomlVersion, MetamodelRegistry};
use doml_mc::result::Verdict;

fn registry() -> &'static MetamodelRegistry {
    MetamodelRegistry::global()
}

fn empty_domlr() -> domlr::DomlrSource {
    domlr::compile("").unwrap()
}

/// A VM with no network interface: "vm has interface" is violated and
/// the diagnostic names the offending VM.
#[test]
fn vm_with_no_iface_violates_vm_iface() {
    let reg = registry();
    let objects = vec![RawObject {
        id: "vm-1".to_string(),
        class: "infrastructure_VirtualMachine".to_string(),
        attributes: vec![],
        associations: vec![],
    }];
    let model = im::build(DomlVersion::V1_0, reg, &objects).unwrap();
    let source = empty_domlr();
    let report = driver::run(reg, DomlVersion::V1_0, &model, &source, &VerificationOptions::default()).unwrap();

    assert_eq!(report.overall(), Verdict::Violated);
    let vm_iface = report.outcomes.iter().find(|o| o.id == "builtin.vm_iface").unwrap();
    assert_eq!(vm_iface.verdict, Verdict::Violated);
    assert!(vm_iface.diagnostic.as_ref().unwrap().contains("vm-1"));
}

/// Two interfaces sharing a network and an endpoint: "iface-unique"
/// is violated and the diagnostic names both.
#[test]
fn shared_endpoint_violates_iface_uniq() {
    let reg = registry();
    let objects = vec![
        RawObject {
            id: "net-1".to_string(),
            class: "infrastructure_Network".to_string(),
            attributes: vec![],
            associations: vec![],
        },
        RawObject {
            id: "iface-a".to_string(),
            class: "infrastructure_NetworkInterface".to_string(),
            attributes: vec![RawAttribute { local_name: "endPoint".to_string(), value: RawScalar::Int(167_772_161) }],
            associations: vec![RawAssociation { local_name: "belongsTo".to_string(), target_id: "net-1".to_string() }],
        },
        RawObject {
            id: "iface-b".to_string(),
            class: "infrastructure_NetworkInterface".to_string(),
            attributes: vec![RawAttribute { local_name: "endPoint".to_string(), value: RawScalar::Int(167_772_161) }],
            associations: vec![RawAssociation { local_name: "belongsTo".to_string(), target_id: "net-1".to_string() }],
        },
    ];
    let model = im::build(DomlVersion::V1_0, reg, &objects).unwrap();
    let source = empty_domlr();
    let mut options = VerificationOptions::default();
    options.skip_ids.insert("builtin.vm_iface".to_string());
    let report = driver::run(reg, DomlVersion::V1_0, &model, &source, &options).unwrap();

    let iface_uniq = report.outcomes.iter().find(|o| o.id == "builtin.iface_uniq").unwrap();
    assert_eq!(iface_uniq.verdict, Verdict::Violated);
    let diagnostic = iface_uniq.diagnostic.as_ref().unwrap();
    assert!(diagnostic.contains("iface-a") || diagnostic.contains("iface-b"));
}

/// A SoftwareComponent no Deployment targets: "all components
/// deployed" is violated.
#[test]
fn undeployed_component_violates_all_software_components_deployed() {
    let reg = registry();
    let objects = vec![RawObject {
        id: "sc-1".to_string(),
        class: "application_SoftwareComponent".to_string(),
        attributes: vec![],
        associations: vec![],
    }];
    let model = im::build(DomlVersion::V1_0, reg, &objects).unwrap();
    let source = empty_domlr();
    let report = driver::run(reg, DomlVersion::V1_0, &model, &source, &VerificationOptions::default()).unwrap();

    let outcome = report.outcomes.iter().find(|o| o.id == "builtin.all_software_components_deployed").unwrap();
    assert_eq!(outcome.verdict, Verdict::Violated);
    assert!(outcome.diagnostic.as_ref().unwrap().contains("sc-1"));
}

const UNDERPROVISIONED_DOMLR: &str = r#""Every VM has >=2 cores" { forall v. v is infrastructure.VirtualMachine implies v has infrastructure.ComputingNode::cpu_count >= 2 } error "{v} underprovisioned""#;

fn single_core_vm_model(reg: &MetamodelRegistry) -> im::IntermediateModel {
    let objects = vec![RawObject {
        id: "vm-1".to_string(),
        class: "infrastructure_VirtualMachine".to_string(),
        attributes: vec![RawAttribute { local_name: "cpu_count".to_string(), value: RawScalar::Int(1) }],
        associations: vec![],
    }];
    im::build(DomlVersion::V1_0, reg, &objects).unwrap()
}

/// A user DOMLR requirement over an under-provisioned VM: `Violated`,
/// with the VM's own id substituted into the diagnostic.
#[test]
fn underprovisioned_vm_violates_user_requirement() {
    let reg = registry();
    let model = single_core_vm_model(reg);
    let source = domlr::compile(UNDERPROVISIONED_DOMLR).unwrap();
    let mut options = VerificationOptions::default();
    options.ignore_builtins = true;
    let report = driver::run(reg, DomlVersion::V1_0, &model, &source, &options).unwrap();

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.verdict, Verdict::Violated);
    assert_eq!(outcome.diagnostic.as_deref(), Some("vm-1 underprovisioned"));
}

/// The same body with a leading `-` (flipped): `Satisfied` iff some
/// VM actually has fewer than 2 cores, demonstrating polarity.
#[test]
fn flipped_requirement_is_satisfied_when_violation_exists() {
    let reg = registry();
    let model = single_core_vm_model(reg);
    let flipped_src = format!("- {UNDERPROVISIONED_DOMLR}");
    let source = domlr::compile(&flipped_src).unwrap();
    let mut options = VerificationOptions::default();
    options.ignore_builtins = true;
    let report = driver::run(reg, DomlVersion::V1_0, &model, &source, &options).unwrap();

    assert_eq!(report.outcomes[0].verdict, Verdict::Satisfied);
}

/// An externally-exposed interface consumed behind a security group
/// whose only rule opens port 80, not 443: "external SaaS over HTTPS" is
/// violated. v2.0 lacks the class entirely, so the built-in simply isn't
/// in that version's catalog.
#[test]
fn external_interface_without_https_ingress_is_violated() {
    let reg = registry();
    let objects = vec![
        RawObject {
            id: "node-1".to_string(),
            class: "infrastructure_VirtualMachine".to_string(),
            attributes: vec![],
            associations: vec![],
        },
        RawObject {
            id: "group-1".to_string(),
            class: "infrastructure_SecurityGroup".to_string(),
            attributes: vec![],
            associations: vec![RawAssociation { local_name: "rules".to_string(), target_id: "rule-80".to_string() }],
        },
        RawObject {
            id: "rule-80".to_string(),
            class: "infrastructure_IngressRule".to_string(),
            attributes: vec![RawAttribute { local_name: "port".to_string(), value: RawScalar::Int(80) }],
            associations: vec![],
        },
        RawObject {
            id: "sc-1".to_string(),
            class: "application_SoftwareComponent".to_string(),
            attributes: vec![],
            associations: vec![RawAssociation { local_name: "consumedInterfaces".to_string(), target_id: "iface-1".to_string() }],
        },
        RawObject {
            id: "iface-1".to_string(),
            class: "application_SoftwareInterface".to_string(),
            attributes: vec![
                RawAttribute { local_name: "name".to_string(), value: RawScalar::Str("public-api".to_string()) },
                RawAttribute { local_name: "external".to_string(), value: RawScalar::Bool(true) },
            ],
            associations: vec![],
        },
        RawObject {
            id: "deploy-1".to_string(),
            class: "commons_Deployment".to_string(),
            attributes: vec![],
            associations: vec![
                RawAssociation { local_name: "component".to_string(), target_id: "sc-1".to_string() },
                RawAssociation { local_name: "node".to_string(), target_id: "node-1".to_string() },
            ],
        },
    ];
    let model = im::build(DomlVersion::V2_1_1, reg, &objects).unwrap();
    let source = empty_domlr();
    let mut options = VerificationOptions::default();
    options.skip_ids.insert("builtin.vm_iface".to_string());
    options.skip_ids.insert("builtin.all_software_components_deployed".to_string());
    let report = driver::run(reg, DomlVersion::V2_1_1, &model, &source, &options).unwrap();

    let outcome = report.outcomes.iter().find(|o| o.id == "builtin.external_saas_requires_https_ingress").unwrap();
    assert_eq!(outcome.verdict, Verdict::Violated);

    assert!(doml_mc::builtins::catalog(DomlVersion::V2_0)
        .iter()
        .all(|b| b.id != "builtin.external_saas_requires_https_ingress"));
}

/// Two external interfaces: one consumed by a component deployed on a node
/// whose network interface sits behind a security group with a 443 ingress
/// rule (compliant), the other consumed by a component on an unprotected
/// node. The check must follow each interface's own deployment/node/group
/// chain rather than asking whether *any* 443 rule exists anywhere — so
/// the protected interface must not taint the verdict for the unprotected
/// one, or vice versa.
#[test]
fn https_ingress_check_is_scoped_to_each_interfaces_own_deployment_chain() {
    let reg = registry();
    let objects = vec![
        RawObject {
            id: "node-ok".to_string(),
            class: "infrastructure_VirtualMachine".to_string(),
            attributes: vec![],
            associations: vec![RawAssociation { local_name: "ifaces".to_string(), target_id: "niface-ok".to_string() }],
        },
        RawObject {
            id: "niface-ok".to_string(),
            class: "infrastructure_NetworkInterface".to_string(),
            attributes: vec![],
            associations: vec![],
        },
        RawObject {
            id: "group-ok".to_string(),
            class: "infrastructure_SecurityGroup".to_string(),
            attributes: vec![],
            associations: vec![
                RawAssociation { local_name: "ifaces".to_string(), target_id: "niface-ok".to_string() },
                RawAssociation { local_name: "rules".to_string(), target_id: "rule-443".to_string() },
            ],
        },
        RawObject {
            id: "rule-443".to_string(),
            class: "infrastructure_IngressRule".to_string(),
            attributes: vec![RawAttribute { local_name: "port".to_string(), value: RawScalar::Int(443) }],
            associations: vec![],
        },
        RawObject {
            id: "sc-ok".to_string(),
            class: "application_SoftwareComponent".to_string(),
            attributes: vec![],
            associations: vec![RawAssociation { local_name: "consumedInterfaces".to_string(), target_id: "iface-ok".to_string() }],
        },
        RawObject {
            id: "iface-ok".to_string(),
            class: "application_SoftwareInterface".to_string(),
            attributes: vec![
                RawAttribute { local_name: "name".to_string(), value: RawScalar::Str("ok-api".to_string()) },
                RawAttribute { local_name: "external".to_string(), value: RawScalar::Bool(true) },
            ],
            associations: vec![],
        },
        RawObject {
            id: "deploy-ok".to_string(),
            class: "commons_Deployment".to_string(),
            attributes: vec![],
            associations: vec![
                RawAssociation { local_name: "component".to_string(), target_id: "sc-ok".to_string() },
                RawAssociation { local_name: "node".to_string(), target_id: "node-ok".to_string() },
            ],
        },
        RawObject {
            id: "node-bad".to_string(),
            class: "infrastructure_VirtualMachine".to_string(),
            attributes: vec![],
            associations: vec![],
        },
        RawObject {
            id: "sc-bad".to_string(),
            class: "application_SoftwareComponent".to_string(),
            attributes: vec![],
            associations: vec![RawAssociation { local_name: "consumedInterfaces".to_string(), target_id: "iface-bad".to_string() }],
        },
        RawObject {
            id: "iface-bad".to_string(),
            class: "application_SoftwareInterface".to_string(),
            attributes: vec![
                RawAttribute { local_name: "name".to_string(), value: RawScalar::Str("bad-api".to_string()) },
                RawAttribute { local_name: "external".to_string(), value: RawScalar::Bool(true) },
            ],
            associations: vec![],
        },
        RawObject {
            id: "deploy-bad".to_string(),
            class: "commons_Deployment".to_string(),
            attributes: vec![],
            associations: vec![
                RawAssociation { local_name: "component".to_string(), target_id: "sc-bad".to_string() },
                RawAssociation { local_name: "node".to_string(), target_id: "node-bad".to_string() },
            ],
        },
    ];
    let model = im::build(DomlVersion::V2_1_1, reg, &objects).unwrap();
    let source = empty_domlr();
    let mut options = VerificationOptions::default();
    options.skip_ids.insert("builtin.vm_iface".to_string());
    options.skip_ids.insert("builtin.all_software_components_deployed".to_string());
    options.skip_ids.insert("builtin.security_group_has_iface".to_string());
    let report = driver::run(reg, DomlVersion::V2_1_1, &model, &source, &options).unwrap();

    let outcome = report.outcomes.iter().find(|o| o.id == "builtin.external_saas_requires_https_ingress").unwrap();
    assert_eq!(outcome.verdict, Verdict::Violated);
    let diagnostic = outcome.diagnostic.as_ref().unwrap();
    assert!(diagnostic.contains("iface-bad"));
    assert!(!diagnostic.contains("iface-ok"));
}

/// A `SecurityGroup` with no associated `NetworkInterface` violates
/// "every security group is associated with at least one network interface".
#[test]
fn security_group_with_no_iface_violates_security_group_has_iface() {
    let reg = registry();
    let objects = vec![RawObject {
        id: "group-1".to_string(),
        class: "infrastructure_SecurityGroup".to_string(),
        attributes: vec![],
        associations: vec![],
    }];
    let model = im::build(DomlVersion::V2_1_1, reg, &objects).unwrap();
    let source = empty_domlr();
    let report = driver::run(reg, DomlVersion::V2_1_1, &model, &source, &VerificationOptions::default()).unwrap();

    let outcome = report.outcomes.iter().find(|o| o.id == "builtin.security_group_has_iface").unwrap();
    assert_eq!(outcome.verdict, Verdict::Violated);
    assert!(outcome.diagnostic.as_ref().unwrap().contains("group-1"));
}

/// Property 7 — partitioning invariance: the same requirement list checked
/// with different thread counts produces the same ordered verdict list.
#[test]
fn property_partitioning_invariance() {
    let reg = registry();
    let objects = vec![
        RawObject {
            id: "vm-1".to_string(),
            class: "infrastructure_VirtualMachine".to_string(),
            attributes: vec![],
            associations: vec![],
        },
        RawObject {
            id: "sc-1".to_string(),
            class: "application_SoftwareComponent".to_string(),
            attributes: vec![],
            associations: vec![],
        },
        RawObject {
            id: "node-1".to_string(),
            class: "infrastructure_VirtualMachine".to_string(),
            attributes: vec![RawAttribute { local_name: "cpu_count".to_string(), value: RawScalar::Int(4) }],
            associations: vec![],
        },
    ];
    let model = im::build(DomlVersion::V1_0, reg, &objects).unwrap();
    let source = empty_domlr();

    let mut single = VerificationOptions::default();
    single.threads = std::num::NonZeroUsize::new(1).unwrap();
    let mut many = VerificationOptions::default();
    many.threads = std::num::NonZeroUsize::new(8).unwrap();

    let report_one = driver::run(reg, DomlVersion::V1_0, &model, &source, &single).unwrap();
    let report_many = driver::run(reg, DomlVersion::V1_0, &model, &source, &many).unwrap();

    let ids_one: Vec<_> = report_one.outcomes.iter().map(|o| (o.id.clone(), o.verdict)).collect();
    let ids_many: Vec<_> = report_many.outcomes.iter().map(|o| (o.id.clone(), o.verdict)).collect();
    assert_eq!(ids_one, ids_many);
}

/// Property 8 — aggregation monotonicity: a report whose only violated
/// outcome is added last still aggregates to `Violated`.
#[test]
fn property_aggregation_monotonicity() {
    let reg = registry();
    let objects = vec![RawObject {
        id: "vm-1".to_string(),
        class: "infrastructure_VirtualMachine".to_string(),
        attributes: vec![],
        associations: vec![],
    }];
    let model = im::build(DomlVersion::V1_0, reg, &objects).unwrap();
    let source = empty_domlr();
    let report = driver::run(reg, DomlVersion::V1_0, &model, &source, &VerificationOptions::default()).unwrap();

    assert!(report.outcomes.iter().any(|o| o.verdict == Verdict::Violated));
    assert_eq!(report.overall(), Verdict::Violated);
}
