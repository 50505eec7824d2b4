//! Dashboard variables and name-keyed de-duplication.

use std::collections::HashMap;

use super::UserId;

/// Value assigned to global placeholders created during provisioning.
pub const GLOBAL_PLACEHOLDER_VALUE: &str = "to be defined";

/// A configuration variable attached to one user (or the global scope).
///
/// ## Invariants
/// - `name` is unique within one scope; the dashboard enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Variable value.
    pub value: String,
    /// Whether the dashboard masks the value.
    pub is_secure: bool,
}

impl Variable {
    /// Build a variable.
    ///
    /// # Examples
    /// ```
    /// use dashboard_provisioner::domain::Variable;
    ///
    /// let var = Variable::new("region", "north", false);
    /// assert_eq!(var.name, "region");
    /// ```
    pub fn new(name: impl Into<String>, value: impl Into<String>, is_secure: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_secure,
        }
    }
}

/// Create-variable request for one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariable {
    /// Owning user, or [`UserId::GLOBAL`].
    pub user_id: UserId,
    /// Variable name.
    pub name: String,
    /// Variable value.
    pub value: String,
    /// Secure flag; omitted from the request when `None`.
    pub is_secure: Option<bool>,
}

impl NewVariable {
    /// Request that copies an inherited variable onto `user_id`.
    pub fn inherited(user_id: UserId, variable: &Variable) -> Self {
        Self {
            user_id,
            name: variable.name.clone(),
            value: variable.value.clone(),
            is_secure: Some(variable.is_secure),
        }
    }

    /// Global placeholder for `name`.
    ///
    /// # Examples
    /// ```
    /// use dashboard_provisioner::domain::{NewVariable, UserId};
    ///
    /// let placeholder = NewVariable::global_placeholder("theme");
    /// assert_eq!(placeholder.user_id, UserId::GLOBAL);
    /// assert_eq!(placeholder.value, "to be defined");
    /// ```
    pub fn global_placeholder(name: impl Into<String>) -> Self {
        Self {
            user_id: UserId::GLOBAL,
            name: name.into(),
            value: GLOBAL_PLACEHOLDER_VALUE.to_owned(),
            is_secure: None,
        }
    }
}

/// Two variables sharing a name but disagreeing on value or secure flag.
///
/// De-duplication keeps the first-seen entry; the other is reported here so
/// callers can surface the disagreement instead of dropping it silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableConflict {
    /// User whose missing set collapsed the entries.
    pub user_id: UserId,
    /// Entry that was kept.
    pub kept: Variable,
    /// Entry that was discarded.
    pub discarded: Variable,
}

/// Collapse `candidates` to one entry per name, preserving first-seen order.
///
/// Exact duplicates vanish without comment; same-name entries whose value or
/// secure flag differ produce a [`VariableConflict`].
///
/// # Examples
/// ```
/// use dashboard_provisioner::domain::{UserId, Variable, dedup_by_name};
///
/// let (kept, conflicts) = dedup_by_name(
///     UserId::new(7),
///     [
///         Variable::new("a", "1", false),
///         Variable::new("a", "1", false),
///         Variable::new("a", "2", false),
///     ],
/// );
/// assert_eq!(kept, vec![Variable::new("a", "1", false)]);
/// assert_eq!(conflicts.len(), 1);
/// ```
pub fn dedup_by_name(
    user_id: UserId,
    candidates: impl IntoIterator<Item = Variable>,
) -> (Vec<Variable>, Vec<VariableConflict>) {
    let mut kept: Vec<Variable> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut conflicts = Vec::new();

    for candidate in candidates {
        match positions.get(&candidate.name).and_then(|&index| kept.get(index)) {
            Some(existing) if *existing == candidate => {}
            Some(existing) => conflicts.push(VariableConflict {
                user_id,
                kept: existing.clone(),
                discarded: candidate,
            }),
            None => {
                positions.insert(candidate.name.clone(), kept.len());
                kept.push(candidate);
            }
        }
    }

    (kept, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn keeps_first_seen_order() {
        let (kept, conflicts) = dedup_by_name(
            UserId::new(1),
            [
                Variable::new("b", "2", false),
                Variable::new("a", "1", false),
                Variable::new("b", "2", false),
            ],
        );
        let names: Vec<&str> = kept.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(conflicts.is_empty());
    }

    #[rstest]
    #[case::value(Variable::new("a", "2", false))]
    #[case::secure_flag(Variable::new("a", "1", true))]
    fn flags_disagreeing_duplicates(#[case] rival: Variable) {
        let (kept, conflicts) =
            dedup_by_name(UserId::new(9), [Variable::new("a", "1", false), rival.clone()]);
        assert_eq!(kept, vec![Variable::new("a", "1", false)]);
        assert_eq!(
            conflicts,
            vec![VariableConflict {
                user_id: UserId::new(9),
                kept: Variable::new("a", "1", false),
                discarded: rival,
            }]
        );
    }

    #[rstest]
    fn inherited_request_carries_secure_flag() {
        let request = NewVariable::inherited(UserId::new(3), &Variable::new("key", "v", true));
        assert_eq!(request.user_id, UserId::new(3));
        assert_eq!(request.is_secure, Some(true));
    }
}
