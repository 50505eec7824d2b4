//! Pure transforms from a roster to dashboard requests.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use roster::{Roster, RosterEntry};

use super::password::generate_password;
use crate::domain::ports::{CreatedUser, NewUser};
use crate::domain::{NewVariable, UserId};

/// A roster entry paired with the id the dashboard assigned to it, if any.
#[derive(Debug, Clone, Copy)]
pub struct MatchedEntry<'a> {
    /// Roster username.
    pub username: &'a str,
    /// Roster profile.
    pub entry: &'a RosterEntry,
    /// Assigned id; `None` when creation failed.
    pub user_id: Option<UserId>,
}

/// Restriction whose target still names a connection and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRestriction {
    /// Roster username, for reporting.
    pub username: String,
    /// Restricted user.
    pub user_id: UserId,
    /// `connectionName.columnDisplayName`.
    pub target: String,
    /// Permitted value.
    pub value: String,
}

/// One create-user request per roster entry, in roster order.
pub fn user_requests<R: Rng + ?Sized>(
    roster: &Roster,
    parent_id: UserId,
    rng: &mut R,
) -> Vec<NewUser> {
    roster
        .entries()
        .map(|(username, entry)| NewUser {
            usercode: username.to_owned(),
            email: entry.email.clone(),
            forenames: entry.forenames.clone(),
            surname: entry.surnames.clone(),
            user_type_id: entry.user_type.type_id(),
            parent_id,
            client_password: generate_password(rng),
            lite: false,
        })
        .collect()
}

/// Pair each roster entry with its created user.
///
/// The dashboard may change the case of a usercode, so matching compares
/// upper-cased forms.
pub fn match_created<'a>(roster: &'a Roster, created: &[CreatedUser]) -> Vec<MatchedEntry<'a>> {
    let by_usercode: HashMap<String, UserId> = created
        .iter()
        .map(|user| (user.usercode.to_uppercase(), user.id))
        .collect();
    roster
        .entries()
        .map(|(username, entry)| MatchedEntry {
            username,
            entry,
            user_id: by_usercode.get(&username.to_uppercase()).copied(),
        })
        .collect()
}

/// One global placeholder per distinct variable name across the roster, in
/// first-seen order.
pub fn global_placeholders(roster: &Roster) -> Vec<NewVariable> {
    let mut seen = HashSet::new();
    roster
        .entries()
        .flat_map(|(_, entry)| entry.variables.keys())
        .filter(|name| seen.insert(name.as_str()))
        .map(|name| NewVariable::global_placeholder(name.as_str()))
        .collect()
}

/// Variable requests for one created user.
pub fn user_variables(user_id: UserId, entry: &RosterEntry) -> Vec<NewVariable> {
    entry
        .variables
        .iter()
        .map(|(name, value)| NewVariable {
            user_id,
            name: name.clone(),
            value: value.clone(),
            is_secure: None,
        })
        .collect()
}

/// Unresolved restrictions for one created user.
pub fn pending_restrictions(
    username: &str,
    user_id: UserId,
    entry: &RosterEntry,
) -> Vec<PendingRestriction> {
    entry
        .restrictions
        .iter()
        .map(|(target, value)| PendingRestriction {
            username: username.to_owned(),
            user_id,
            target: target.clone(),
            value: value.clone(),
        })
        .collect()
}
