//! Assembly validation through the public API.

use uuid::Uuid;

use focus_engine::{validate, AssemblyError, Capability, FocusPackage, Node, NodeKey};

fn package(root: Node) -> FocusPackage {
    FocusPackage::new(root, Uuid::new_v4())
}

#[test]
fn test_minimal_valid_focus() {
    let pkg = package(
        Node::new(NodeKey::Root)
            .with_child(Node::new(NodeKey::Touch).with_child(Node::new(NodeKey::Fire))),
    );
    let summary = validate(&pkg, 25).unwrap();
    assert_eq!(summary.complexity, pkg.complexity());
    assert!((summary.vis_cost - pkg.vis_cost()).abs() < 1e-6);
}

#[test]
fn test_deep_chain_accumulates_capabilities() {
    // bolt -> scatter -> projectile -> fire: every requirement is satisfied
    // somewhere up the chain.
    let pkg = package(
        Node::new(NodeKey::Root).with_child(
            Node::new(NodeKey::Bolt).with_child(
                Node::new(NodeKey::Scatter).with_child(
                    Node::new(NodeKey::Projectile).with_child(Node::new(NodeKey::Fire)),
                ),
            ),
        ),
    );
    assert!(validate(&pkg, 100).is_ok());
}

#[test]
fn test_effect_directly_under_root_rejected() {
    let pkg = package(Node::new(NodeKey::Root).with_child(Node::new(NodeKey::Break)));
    assert_eq!(
        validate(&pkg, 100),
        Err(AssemblyError::MissingCapability {
            node: NodeKey::Break,
            missing: Capability::Target,
        })
    );
}

#[test]
fn test_capability_union_spans_mixed_suppliers() {
    // Plan supplies targets only, but the root's trajectory is still in
    // the ancestor union, so scatter under plan is fine.
    let ok = package(
        Node::new(NodeKey::Root).with_child(
            Node::new(NodeKey::Plan).with_child(
                Node::new(NodeKey::Scatter)
                    .with_child(Node::new(NodeKey::Bolt).with_child(Node::new(NodeKey::Frost))),
            ),
        ),
    );
    assert!(validate(&ok, 100).is_ok());

    // An effect with no target-supplier anywhere above it is the shape
    // that fails.
    let bad = package(
        Node::new(NodeKey::Root)
            .with_child(Node::new(NodeKey::Scatter).with_child(Node::new(NodeKey::Heal))),
    );
    assert_eq!(
        validate(&bad, 100),
        Err(AssemblyError::MissingCapability {
            node: NodeKey::Heal,
            missing: Capability::Target,
        })
    );
}

#[test]
fn test_two_plans_rejected() {
    let pkg = package(
        Node::new(NodeKey::Root)
            .with_child(Node::new(NodeKey::Plan).with_child(Node::new(NodeKey::Break)))
            .with_child(Node::new(NodeKey::Plan).with_child(Node::new(NodeKey::Break))),
    );
    assert_eq!(
        validate(&pkg, 1000),
        Err(AssemblyError::ExclusivityViolation {
            key: NodeKey::Plan,
            count: 2,
        })
    );
}

#[test]
fn test_complexity_cap_is_inclusive() {
    // root 0 + bolt 4 + break 4 = 8
    let pkg = package(
        Node::new(NodeKey::Root)
            .with_child(Node::new(NodeKey::Bolt).with_child(Node::new(NodeKey::Break))),
    );
    assert!(validate(&pkg, 8).is_ok());
    assert_eq!(
        validate(&pkg, 7),
        Err(AssemblyError::ComplexityExceeded { total: 8, cap: 7 })
    );
}

#[test]
fn test_rejection_leaves_package_usable() {
    // Validation is read-only: a rejected package can be revalidated with a
    // higher cap and pass.
    let pkg = package(
        Node::new(NodeKey::Root)
            .with_child(Node::new(NodeKey::Bolt).with_child(Node::new(NodeKey::Fire))),
    );
    assert!(validate(&pkg, 1).is_err());
    assert!(validate(&pkg, 25).is_ok());
}

#[test]
fn test_empty_tree_is_valid() {
    // A bare root does nothing, but it assembles.
    let pkg = package(Node::new(NodeKey::Root));
    let summary = validate(&pkg, 0).unwrap();
    assert_eq!(summary.complexity, 0);
    assert_eq!(summary.vis_cost, 0.0);
}
