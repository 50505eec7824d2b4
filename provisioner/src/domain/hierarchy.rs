//! Parent/child user tree built from the flat dashboard user list.
//!
//! The tree is an arena: nodes live in one vector in breadth-first order, so
//! a parent always sits at a lower index than any of its children. Children
//! keep the order in which they appeared in the source list.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;

use super::{UserId, UserRecord, Variable};

/// Errors raised while building the hierarchy. All of them are fatal
/// misconfigurations for a cascade run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// No listed user carries the configured root id.
    #[error("root user {root_id} was not found in the user list")]
    RootNotFound {
        /// Configured root user id.
        root_id: UserId,
    },
    /// Two listed users share an id.
    #[error("user id {user_id} appears more than once in the user list")]
    DuplicateUserId {
        /// Repeated id.
        user_id: UserId,
    },
    /// Walking down from the root revisited a user.
    #[error("parent relation loops back to user {user_id}")]
    Cycle {
        /// First user reached twice.
        user_id: UserId,
    },
}

/// Position of a node inside a [`UserTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One user in the hierarchy together with its variable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNode {
    record: UserRecord,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    variables: Vec<Variable>,
    missing_variables: Vec<Variable>,
}

impl UserNode {
    /// Identity fields as listed by the dashboard.
    pub fn record(&self) -> &UserRecord {
        &self.record
    }

    /// Dashboard id.
    pub fn id(&self) -> UserId {
        self.record.id
    }

    /// Login code.
    pub fn usercode(&self) -> &str {
        self.record.usercode.as_str()
    }

    /// Parent node; `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in source-list order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Variables currently defined on this user.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Inherited variables this user lacks, in propagation order.
    pub fn missing_variables(&self) -> &[Variable] {
        &self.missing_variables
    }
}

/// Rooted user hierarchy.
///
/// Only users reachable from the root are kept; everyone else in the source
/// list is outside this cascade.
///
/// # Examples
/// ```
/// use dashboard_provisioner::domain::{UserId, UserRecord, UserTree};
///
/// let tree = UserTree::build(
///     vec![
///         UserRecord::new(1, "ROOT", None),
///         UserRecord::new(2, "CHILD", Some(1)),
///         UserRecord::new(3, "OTHER", Some(99)),
///     ],
///     UserId::new(1),
/// )
/// .expect("tree builds");
///
/// assert_eq!(tree.len(), 2);
/// let root = tree.node(tree.root());
/// assert_eq!(root.children().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTree {
    nodes: Vec<UserNode>,
}

impl UserTree {
    /// Build the tree rooted at `root_id` from a flat user list.
    ///
    /// Children of a user are exactly the listed users whose `parent_id`
    /// equals its id, in list order. Records outside the root's subtree are
    /// ignored, including malformed ones.
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::RootNotFound`] when no record has `root_id`.
    /// - [`HierarchyError::DuplicateUserId`] when the root id is listed twice
    ///   or two records inside the subtree share an id.
    /// - [`HierarchyError::Cycle`] when the parent relation loops back into
    ///   the subtree under construction.
    pub fn build(records: Vec<UserRecord>, root_id: UserId) -> Result<Self, HierarchyError> {
        let mut children_of: HashMap<UserId, Vec<usize>> = HashMap::new();
        let mut root_positions = Vec::new();
        for (position, record) in records.iter().enumerate() {
            if record.id == root_id {
                root_positions.push(position);
            }
            if let Some(parent_id) = record.parent_id {
                children_of.entry(parent_id).or_default().push(position);
            }
        }

        let root_position = match root_positions.as_slice() {
            [] => return Err(HierarchyError::RootNotFound { root_id }),
            [position] => *position,
            [_, _, ..] => return Err(HierarchyError::DuplicateUserId { user_id: root_id }),
        };

        let ids: Vec<UserId> = records.iter().map(|record| record.id).collect();
        let mut slots: Vec<Option<UserRecord>> = records.into_iter().map(Some).collect();
        let mut placed: HashSet<UserId> = HashSet::new();
        let mut nodes: Vec<UserNode> = Vec::new();
        let mut queue: VecDeque<(usize, Option<NodeId>)> = VecDeque::from([(root_position, None)]);

        while let Some((position, parent)) = queue.pop_front() {
            let Some(record) = slots.get_mut(position).and_then(Option::take) else {
                let user_id = ids.get(position).copied().unwrap_or(root_id);
                return Err(HierarchyError::Cycle { user_id });
            };
            if !placed.insert(record.id) {
                return Err(HierarchyError::DuplicateUserId { user_id: record.id });
            }
            let node_id = NodeId(nodes.len());
            if let Some(parent_node) = parent.and_then(|p| nodes.get_mut(p.0)) {
                parent_node.children.push(node_id);
            }
            for &child_position in children_of.get(&record.id).into_iter().flatten() {
                queue.push_back((child_position, Some(node_id)));
            }
            nodes.push(UserNode {
                record,
                parent,
                children: Vec::new(),
                variables: Vec::new(),
                missing_variables: Vec::new(),
            });
        }

        Ok(Self { nodes })
    }

    /// Root node id.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of users in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; a built tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this tree.
    pub fn node(&self, id: NodeId) -> &UserNode {
        &self.nodes[id.0]
    }

    /// Find the node for a dashboard user id.
    pub fn find(&self, user_id: UserId) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.id() == user_id)
            .map(NodeId)
    }

    /// Node ids in breadth-first order; parents precede their children.
    pub fn breadth_first(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Node ids in depth-first pre-order; siblings keep source order.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    pub(crate) fn set_variables(&mut self, id: NodeId, variables: Vec<Variable>) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.variables = variables;
        }
    }

    pub(crate) fn set_missing_variables(&mut self, id: NodeId, missing: Vec<Variable>) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.missing_variables = missing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn usercodes(tree: &UserTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| tree.node(id).usercode().to_owned())
            .collect()
    }

    #[rstest]
    fn children_follow_source_order() {
        let tree = UserTree::build(
            vec![
                UserRecord::new(3, "B", Some(1)),
                UserRecord::new(1, "ROOT", None),
                UserRecord::new(2, "A", Some(1)),
                UserRecord::new(4, "A1", Some(2)),
            ],
            UserId::new(1),
        )
        .expect("tree builds");

        let root = tree.node(tree.root());
        assert_eq!(root.usercode(), "ROOT");
        assert_eq!(usercodes(&tree, root.children()), ["B", "A"]);
        assert_eq!(usercodes(&tree, &tree.depth_first()), ["ROOT", "B", "A", "A1"]);
    }

    #[rstest]
    fn parents_precede_children_in_arena() {
        let tree = UserTree::build(
            vec![
                UserRecord::new(10, "LEAF", Some(5)),
                UserRecord::new(5, "MID", Some(1)),
                UserRecord::new(1, "ROOT", Some(0)),
            ],
            UserId::new(1),
        )
        .expect("tree builds");

        for id in tree.breadth_first() {
            if let Some(parent) = tree.node(id).parent() {
                assert!(parent < id, "parent must be stored before child");
            }
        }
    }

    #[rstest]
    fn root_may_be_a_non_top_level_user() {
        let tree = UserTree::build(
            vec![
                UserRecord::new(1, "ADMIN", None),
                UserRecord::new(2, "TEAM", Some(1)),
                UserRecord::new(3, "MEMBER", Some(2)),
            ],
            UserId::new(2),
        )
        .expect("tree builds");

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.node(tree.root()).usercode(), "TEAM");
        assert_eq!(tree.find(UserId::new(1)), None);
    }

    #[rstest]
    fn missing_root_is_reported() {
        let err = UserTree::build(vec![UserRecord::new(1, "ROOT", None)], UserId::new(7))
            .expect_err("root 7 is absent");
        assert_eq!(
            err,
            HierarchyError::RootNotFound {
                root_id: UserId::new(7)
            }
        );
    }

    #[rstest]
    #[case::root_listed_twice(
        vec![UserRecord::new(1, "ROOT", None), UserRecord::new(1, "AGAIN", None)],
        1
    )]
    #[case::siblings_share_an_id(
        vec![
            UserRecord::new(1, "ROOT", None),
            UserRecord::new(2, "LEFT", Some(1)),
            UserRecord::new(2, "RIGHT", Some(1)),
        ],
        2
    )]
    fn duplicate_ids_inside_the_subtree_are_rejected(
        #[case] records: Vec<UserRecord>,
        #[case] duplicated: i64,
    ) {
        let err = UserTree::build(records, UserId::new(1)).expect_err("duplicate id");
        assert_eq!(
            err,
            HierarchyError::DuplicateUserId {
                user_id: UserId::new(duplicated)
            }
        );
    }

    #[rstest]
    fn duplicate_ids_outside_the_subtree_are_ignored() {
        let tree = UserTree::build(
            vec![
                UserRecord::new(1, "ADMIN", None),
                UserRecord::new(2, "TEAM", Some(1)),
                UserRecord::new(3, "MEMBER", Some(2)),
                UserRecord::new(9, "STRAY", Some(1)),
                UserRecord::new(9, "STRAY-COPY", Some(1)),
            ],
            UserId::new(2),
        )
        .expect("duplicates elsewhere do not matter");

        assert_eq!(usercodes(&tree, &tree.depth_first()), ["TEAM", "MEMBER"]);
    }

    #[rstest]
    #[case::self_parent(vec![UserRecord::new(1, "ROOT", Some(1))])]
    #[case::loop_through_child(vec![
        UserRecord::new(1, "ROOT", Some(2)),
        UserRecord::new(2, "CHILD", Some(1)),
    ])]
    fn cycles_through_the_root_are_rejected(#[case] records: Vec<UserRecord>) {
        let err = UserTree::build(records, UserId::new(1)).expect_err("cycle");
        assert!(matches!(err, HierarchyError::Cycle { .. }));
    }
}
