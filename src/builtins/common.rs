//! The common built-in requirements.
//!
//! Every function here returns the *flipped* formula: `sat` on the
//! returned [`BuiltinOutcome::formula`] means the requirement is
//! violated, so `Verdict::from_z3_result` doesn't need to know which
//! polarity a given requirement uses. The leading run of
//! existentially-quantified "culprit" variables is kept as free constants
//! (`witnesses`) rather than folded into the formula with `exists_const`,
//! so a `sat` model can be queried for them directly when rendering the
//! violation diagnostic.

use z3::ast::{Ast, Bool, Datatype};

use super::types::{
    class_witness, has_any_assoc, has_assoc, is_instance_of, shared_assoc_target, shared_int_attr,
    shared_str_attr, BuiltinCtx, BuiltinOutcome,
};

/// Every `VirtualMachine` has at least one network interface.
pub fn vm_iface<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    let vm = class_witness(bc, "vm");
    let is_vm = is_instance_of(bc, &vm, "infrastructure_VirtualMachine");
    let no_iface = has_any_assoc(bc, &vm, "infrastructure_ComputingNode::ifaces").not();
    let formula = Bool::and(bc.ctx, &[&is_vm, &no_iface]);
    BuiltinOutcome { witnesses: vec![("vm", vm)], formula }
}

/// No two distinct interfaces on the same network share an endpoint.
pub fn iface_uniq<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    let e1 = class_witness(bc, "iface1");
    let e2 = class_witness(bc, "iface2");

    let is1 = is_instance_of(bc, &e1, "infrastructure_NetworkInterface");
    let is2 = is_instance_of(bc, &e2, "infrastructure_NetworkInterface");
    let distinct = e1._eq(&e2).not();
    let same_network = shared_assoc_target(
        bc,
        &e1,
        "infrastructure_NetworkInterface::belongsTo",
        &e2,
        "infrastructure_NetworkInterface::belongsTo",
    );
    let same_endpoint = shared_int_attr(
        bc,
        &e1,
        "infrastructure_NetworkInterface::endPoint",
        &e2,
        "infrastructure_NetworkInterface::endPoint",
    );

    let formula = Bool::and(bc.ctx, &[&is1, &is2, &distinct, &same_network, &same_endpoint]);
    BuiltinOutcome { witnesses: vec![("iface1", e1), ("iface2", e2)], formula }
}

/// Every `SoftwareComponent` is the target of at least one `Deployment`.
pub fn all_software_components_deployed<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    let component = class_witness(bc, "component");
    let is_sc = is_instance_of(bc, &component, "application_SoftwareComponent");
    let no_deployment = has_any_assoc(bc, &component, "commons_Deployment::component").not();
    let formula = Bool::and(bc.ctx, &[&is_sc, &no_deployment]);
    BuiltinOutcome { witnesses: vec![("component", component)], formula }
}

/// Every abstract `ComputingNode` is the target of at least one `Deployment`.
pub fn all_infrastructure_elements_deployed<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    let node = class_witness(bc, "node");
    let is_node = is_instance_of(bc, &node, "infrastructure_ComputingNode");
    let no_deployment = has_any_assoc(bc, &node, "commons_Deployment::node").not();
    let formula = Bool::and(bc.ctx, &[&is_node, &no_deployment]);
    BuiltinOutcome { witnesses: vec![("node", node)], formula }
}

/// Every concrete infrastructure element of the given class maps back to
/// some abstract element. `maps` is declared per concrete class rather
/// than once on a common superclass in our schema (each `concrete_*` leaf
/// owns its own `maps` association), so the catalog builds one entry per
/// mapped class (see [`super::library::catalog`]) rather than a single
/// combined requirement, which also gives each class its own witness.
pub fn concrete_maps_violation<'a, 'ctx>(
    bc: &BuiltinCtx<'a, 'ctx>,
    class: &str,
    assoc: &str,
) -> BuiltinOutcome<'ctx> {
    let element = class_witness(bc, "element");
    let is_class = is_instance_of(bc, &element, class);
    let unmapped = has_any_assoc(bc, &element, assoc).not();
    let formula = Bool::and(bc.ctx, &[&is_class, &unmapped]);
    BuiltinOutcome { witnesses: vec![("element", element)], formula }
}

pub fn concrete_maps_virtual_machine<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    concrete_maps_violation(bc, "concrete_VirtualMachine", "concrete_VirtualMachine::maps")
}

pub fn concrete_maps_network<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    concrete_maps_violation(bc, "concrete_Network", "concrete_Network::maps")
}

pub fn concrete_maps_storage<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    concrete_maps_violation(bc, "concrete_Storage", "concrete_Storage::maps")
}

pub fn concrete_maps_faas<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    concrete_maps_violation(bc, "concrete_FunctionAsAService", "concrete_FunctionAsAService::maps")
}

pub fn concrete_maps_computing_group<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    concrete_maps_violation(bc, "concrete_ComputingGroup", "concrete_ComputingGroup::maps")
}

/// The reachability requirement: every interface a deployed
/// `SoftwareComponent` *consumes* must be exposed by some deployed
/// component reachable over a shared network from the consumer's node.
///
/// A container-hosted-on-VM chain and an `AutoScalingGroup` chain both
/// need to be walked in general; our metamodel folds `Container` directly
/// into `ComputingNode` (it owns its own `ifaces`, see DESIGN.md), so only the
/// `AutoScalingGroup::machineDefinition` one-hop needs special handling
/// here. `consumer_iface` and `consumer_node` are kept as witnesses; the
/// intervening `Deployment`/component elements are existentially bound as
/// usual since a diagnostic names the interface and node, not the
/// deployment record joining them.
pub fn software_package_iface_net<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    let elem_sort = &bc.encoding.sorts.element.datatype.sort;

    let consumer_iface = class_witness(bc, "consumer_iface");
    let consumer_node = class_witness(bc, "consumer_node");
    let consumer_deploy = Datatype::fresh_const(bc.ctx, "d_consumer", elem_sort);
    let consumer_component = Datatype::fresh_const(bc.ctx, "sc_c", elem_sort);

    let is_deploy_c = is_instance_of(bc, &consumer_deploy, "commons_Deployment");
    let has_consumer_node = has_assoc(bc, &consumer_deploy, "commons_Deployment::node", &consumer_node);
    let has_consumer_component =
        has_assoc(bc, &consumer_deploy, "commons_Deployment::component", &consumer_component);
    let consumes = has_assoc(
        bc,
        &consumer_component,
        "application_SoftwareComponent::consumedInterfaces",
        &consumer_iface,
    );

    let exposer_exists = exposer_reachable_from(bc, &consumer_iface, &consumer_node);

    let inner = Bool::and(
        bc.ctx,
        &[&is_deploy_c, &has_consumer_node, &has_consumer_component, &consumes, &exposer_exists.not()],
    );
    let formula = z3::ast::exists_const(bc.ctx, &[&consumer_deploy, &consumer_component], &[], &inner);
    BuiltinOutcome {
        witnesses: vec![("consumer_iface", consumer_iface), ("consumer_node", consumer_node)],
        formula,
    }
}

fn exposer_reachable_from<'a, 'ctx>(
    bc: &BuiltinCtx<'a, 'ctx>,
    consumer_iface: &Datatype<'ctx>,
    consumer_node: &Datatype<'ctx>,
) -> Bool<'ctx> {
    let elem_sort = &bc.encoding.sorts.element.datatype.sort;

    let exposer_deploy = Datatype::fresh_const(bc.ctx, "d_exposer", elem_sort);
    let exposer_iface = Datatype::fresh_const(bc.ctx, "iface_e", elem_sort);
    let exposer_node = Datatype::fresh_const(bc.ctx, "node_e", elem_sort);
    let exposer_component = Datatype::fresh_const(bc.ctx, "sc_e", elem_sort);

    let is_deploy_e = is_instance_of(bc, &exposer_deploy, "commons_Deployment");
    let has_exposer_node = has_assoc(bc, &exposer_deploy, "commons_Deployment::node", &exposer_node);
    let has_exposer_component =
        has_assoc(bc, &exposer_deploy, "commons_Deployment::component", &exposer_component);
    let exposes = has_assoc(
        bc,
        &exposer_component,
        "application_SoftwareComponent::exposedInterfaces",
        &exposer_iface,
    );
    let same_name = shared_str_attr(
        bc,
        consumer_iface,
        "application_SoftwareInterface::name",
        &exposer_iface,
        "application_SoftwareInterface::name",
    );
    let reachable = node_network_reachable(bc, consumer_node, &exposer_node);

    let body = Bool::and(
        bc.ctx,
        &[&is_deploy_e, &has_exposer_node, &has_exposer_component, &exposes, &same_name, &reachable],
    );
    z3::ast::exists_const(bc.ctx, &[&exposer_deploy, &exposer_iface, &exposer_node, &exposer_component], &[], &body)
}

/// Two `ComputingNode`-ish elements are network-reachable if they share a
/// network directly, or (one level of indirection) one of them is an
/// `AutoScalingGroup` whose `machineDefinition` shares a network with the
/// other.
fn node_network_reachable<'a, 'ctx>(
    bc: &BuiltinCtx<'a, 'ctx>,
    a: &Datatype<'ctx>,
    b: &Datatype<'ctx>,
) -> Bool<'ctx> {
    let direct = networks_intersect(bc, a, b);

    let elem_sort = &bc.encoding.sorts.element.datatype.sort;
    let a_def = Datatype::fresh_const(bc.ctx, "a_def", elem_sort);
    let a_is_asg = is_instance_of(bc, a, "infrastructure_AutoScalingGroup");
    let a_has_def = has_assoc(bc, a, "infrastructure_AutoScalingGroup::machineDefinition", &a_def);
    let via_a_asg = Bool::and(bc.ctx, &[&a_is_asg, &a_has_def, &networks_intersect(bc, &a_def, b)]);
    let via_a_asg = z3::ast::exists_const(bc.ctx, &[&a_def], &[], &via_a_asg);

    let b_def = Datatype::fresh_const(bc.ctx, "b_def", elem_sort);
    let b_is_asg = is_instance_of(bc, b, "infrastructure_AutoScalingGroup");
    let b_has_def = has_assoc(bc, b, "infrastructure_AutoScalingGroup::machineDefinition", &b_def);
    let via_b_asg = Bool::and(bc.ctx, &[&b_is_asg, &b_has_def, &networks_intersect(bc, a, &b_def)]);
    let via_b_asg = z3::ast::exists_const(bc.ctx, &[&b_def], &[], &via_b_asg);

    Bool::or(bc.ctx, &[&direct, &via_a_asg, &via_b_asg])
}

/// `exists n1, n2: Element, net: Element. assoc(a, ifaces, n1) & assoc(n1, belongsTo, net)
///    & assoc(b, ifaces, n2) & assoc(n2, belongsTo, net)`.
fn networks_intersect<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>, a: &Datatype<'ctx>, b: &Datatype<'ctx>) -> Bool<'ctx> {
    let elem_sort = &bc.encoding.sorts.element.datatype.sort;
    let n1 = Datatype::fresh_const(bc.ctx, "n1", elem_sort);
    let n2 = Datatype::fresh_const(bc.ctx, "n2", elem_sort);
    let net = Datatype::fresh_const(bc.ctx, "net", elem_sort);

    let a_has_n1 = has_assoc(bc, a, "infrastructure_ComputingNode::ifaces", &n1);
    let n1_on_net = has_assoc(bc, &n1, "infrastructure_NetworkInterface::belongsTo", &net);
    let b_has_n2 = has_assoc(bc, b, "infrastructure_ComputingNode::ifaces", &n2);
    let n2_on_net = has_assoc(bc, &n2, "infrastructure_NetworkInterface::belongsTo", &net);

    let body = Bool::and(bc.ctx, &[&a_has_n1, &n1_on_net, &b_has_n2, &n2_on_net]);
    z3::ast::exists_const(bc.ctx, &[&n1, &n2, &net], &[], &body)
}

/// v2.1+ only: an externally-exposed interface (`external = true`) may
/// only be consumed through a security group that ingresses on port 443.
/// "Consumed through" is walked as an actual association chain — the
/// consuming `SoftwareComponent`'s own `Deployment` names the `ComputingNode`
/// it runs on, that node's `NetworkInterface`s are each protected by
/// whichever `SecurityGroup` lists them under `ifaces`, and that group must
/// carry a port-443 `IngressRule` — rather than asking whether *any*
/// security group anywhere has a 443 rule, which would pass or fail every
/// external interface identically regardless of how it's actually deployed.
pub fn external_saas_requires_https_ingress<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    let iface = class_witness(bc, "iface");
    let is_iface = is_instance_of(bc, &iface, "application_SoftwareInterface");

    let Some(external_attr) =
        bc.encoding.sorts.attribute.constant(&"application_SoftwareInterface::external".to_string())
    else {
        return BuiltinOutcome { witnesses: vec![("iface", iface)], formula: Bool::from_bool(bc.ctx, false) };
    };
    let true_value = bc.encoding.sorts.attr_data.boolean(&z3::ast::Bool::from_bool(bc.ctx, true));
    let is_external = bc.encoding.attr.apply(&[&iface, &external_attr, &true_value]).as_bool().unwrap();

    let protected = https_ingress_protects(bc, &iface);

    let formula = Bool::and(bc.ctx, &[&is_iface, &is_external, &protected.not()]);
    BuiltinOutcome { witnesses: vec![("iface", iface)], formula }
}

/// `exists d, c, n, niface, group, rule.`
/// `  assoc(d, Deployment::component, c) & assoc(d, Deployment::node, n)`
/// `  & assoc(c, SoftwareComponent::consumedInterfaces, iface)`
/// `  & assoc(n, ComputingNode::ifaces, niface) & assoc(group, SecurityGroup::ifaces, niface)`
/// `  & assoc(group, SecurityGroup::rules, rule) & elem_class(rule) = IngressRule & attr(rule, port, 443)`
fn https_ingress_protects<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>, iface: &Datatype<'ctx>) -> Bool<'ctx> {
    let elem_sort = &bc.encoding.sorts.element.datatype.sort;
    let deploy = Datatype::fresh_const(bc.ctx, "d_protect", elem_sort);
    let component = Datatype::fresh_const(bc.ctx, "sc_protect", elem_sort);
    let node = Datatype::fresh_const(bc.ctx, "node_protect", elem_sort);
    let niface = Datatype::fresh_const(bc.ctx, "niface_protect", elem_sort);
    let group = Datatype::fresh_const(bc.ctx, "group_protect", elem_sort);
    let rule = Datatype::fresh_const(bc.ctx, "rule_protect", elem_sort);

    let is_deploy = is_instance_of(bc, &deploy, "commons_Deployment");
    let has_component = has_assoc(bc, &deploy, "commons_Deployment::component", &component);
    let has_node = has_assoc(bc, &deploy, "commons_Deployment::node", &node);
    let consumes = has_assoc(bc, &component, "application_SoftwareComponent::consumedInterfaces", iface);
    let node_has_niface = has_assoc(bc, &node, "infrastructure_ComputingNode::ifaces", &niface);
    let group_has_niface = has_assoc(bc, &group, "infrastructure_SecurityGroup::ifaces", &niface);
    let group_has_rule = has_assoc(bc, &group, "infrastructure_SecurityGroup::rules", &rule);
    let is_rule = is_instance_of(bc, &rule, "infrastructure_IngressRule");

    let Some(port_attr) = bc.encoding.sorts.attribute.constant(&"infrastructure_IngressRule::port".to_string())
    else {
        return Bool::from_bool(bc.ctx, false);
    };
    let port_443 = bc.encoding.sorts.attr_data.int(&z3::ast::Int::from_i64(bc.ctx, 443));
    let is_443 = bc.encoding.attr.apply(&[&rule, &port_attr, &port_443]).as_bool().unwrap();

    let body = Bool::and(
        bc.ctx,
        &[
            &is_deploy,
            &has_component,
            &has_node,
            &consumes,
            &node_has_niface,
            &group_has_niface,
            &group_has_rule,
            &is_rule,
            &is_443,
        ],
    );
    z3::ast::exists_const(bc.ctx, &[&deploy, &component, &node, &niface, &group, &rule], &[], &body)
}

/// Every `SecurityGroup` is associated with at least one `NetworkInterface`.
pub fn security_group_has_iface<'a, 'ctx>(bc: &BuiltinCtx<'a, 'ctx>) -> BuiltinOutcome<'ctx> {
    let group = class_witness(bc, "group");
    let is_group = is_instance_of(bc, &group, "infrastructure_SecurityGroup");
    let no_iface = has_any_assoc(bc, &group, "infrastructure_SecurityGroup::ifaces").not();
    let formula = Bool::and(bc.ctx, &[&is_group, &no_iface]);
    BuiltinOutcome { witnesses: vec![("group", group)], formula }
}
