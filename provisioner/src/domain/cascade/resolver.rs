//! Missing-variable resolution over a fetched user tree.
//!
//! For a node `N` with parent `P`, `N` misses:
//!
//! 1. every entry of `P`'s missing set whose name `N` does not define, then
//! 2. every variable `P` defines itself that `N` does not define, that is not
//!    already in `P`'s missing set, and that is not an exact copy of what `P`
//!    would inherit anyway.
//!
//! The result is collapsed by name, keeping the first-seen entry. Because
//! only the direct parent is consulted, the nearest definition of a name
//! shadows any farther one.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::domain::{NodeId, UserTree, Variable, VariableConflict, dedup_by_name};

/// Name-keyed view of the value a user ends up with once the cascade has
/// been written: its own definitions plus whatever it inherits.
type Effective = HashMap<String, Variable>;

/// Populate the missing-variable sequence of every node in `tree`.
///
/// The root always misses nothing. Nodes are visited breadth-first so a
/// parent is resolved before any of its children. Running this twice on the
/// same snapshot yields the same sequences.
///
/// Returns every same-name disagreement collapsed along the way; each is also
/// logged at `warn`.
pub fn resolve_missing_variables(tree: &mut UserTree) -> Vec<VariableConflict> {
    let order: Vec<NodeId> = tree.breadth_first().collect();
    let mut effective: HashMap<NodeId, Effective> = HashMap::with_capacity(order.len());
    let mut conflicts = Vec::new();

    for id in order {
        let node = tree.node(id);
        let missing = match node.parent() {
            None => Vec::new(),
            Some(parent) => {
                let inherited_by_parent = tree
                    .node(parent)
                    .parent()
                    .and_then(|grandparent| effective.get(&grandparent));
                let (missing, collapsed) = missing_from_parent(tree, id, parent, inherited_by_parent);
                conflicts.extend(collapsed);
                missing
            }
        };

        let mut view: Effective = missing
            .iter()
            .map(|variable| (variable.name.clone(), variable.clone()))
            .collect();
        for variable in tree.node(id).variables() {
            view.insert(variable.name.clone(), variable.clone());
        }
        effective.insert(id, view);
        tree.set_missing_variables(id, missing);
    }

    for conflict in &conflicts {
        warn!(
            user_id = %conflict.user_id,
            name = %conflict.kept.name,
            kept_value = %conflict.kept.value,
            discarded_value = %conflict.discarded.value,
            "conflicting inherited variable collapsed; keeping first-seen value"
        );
    }
    conflicts
}

fn missing_from_parent(
    tree: &UserTree,
    id: NodeId,
    parent: NodeId,
    inherited_by_parent: Option<&Effective>,
) -> (Vec<Variable>, Vec<VariableConflict>) {
    let node = tree.node(id);
    let parent_node = tree.node(parent);

    let owned: HashSet<&str> = node.variables().iter().map(|v| v.name.as_str()).collect();
    let parent_missing: HashSet<&str> = parent_node
        .missing_variables()
        .iter()
        .map(|v| v.name.as_str())
        .collect();

    let carried = parent_node
        .missing_variables()
        .iter()
        .filter(|variable| !owned.contains(variable.name.as_str()));

    let originated = parent_node.variables().iter().filter(|variable| {
        let name = variable.name.as_str();
        let redundant = inherited_by_parent
            .and_then(|view| view.get(name))
            .is_some_and(|inherited| inherited == *variable);
        !owned.contains(name) && !parent_missing.contains(name) && !redundant
    });

    dedup_by_name(node.id(), carried.chain(originated).cloned())
}
