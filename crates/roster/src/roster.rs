//! Roster types and JSON parsing.
//!
//! A roster maps a username to the profile used to create that user on the
//! dashboard, together with the variables and data restrictions the user
//! should receive once created.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::RosterError;

/// Dashboard user type named in the roster.
///
/// The serialised names match the labels shown in the dashboard UI; the
/// numeric identifier is what the users API expects as `userTypeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum UserType {
    /// Full administrative access.
    Administrator,
    /// Can design charts and dashboards.
    Designer,
    /// Can explore existing charts.
    #[serde(rename = "Chart Explorer")]
    ChartExplorer,
    /// Standard user.
    User,
    /// Read-only chart access.
    #[serde(rename = "Chart Viewer")]
    ChartViewer,
}

impl UserType {
    /// Returns the dashboard `userTypeId` for this user type.
    ///
    /// # Example
    ///
    /// ```
    /// use roster::UserType;
    ///
    /// assert_eq!(UserType::Administrator.type_id(), 0);
    /// assert_eq!(UserType::ChartViewer.type_id(), 4);
    /// ```
    #[must_use]
    pub const fn type_id(self) -> u8 {
        match self {
            Self::Administrator => 0,
            Self::Designer => 1,
            Self::ChartExplorer => 2,
            Self::User => 3,
            Self::ChartViewer => 4,
        }
    }
}

/// Profile of one roster user.
///
/// Variable and restriction values may be any JSON scalar in the file;
/// they are held here in their string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// Contact email address.
    pub email: String,
    /// Given names.
    pub forenames: String,
    /// Family names.
    pub surnames: String,
    /// Dashboard user type.
    pub user_type: UserType,
    /// Variables to assign to the user, keyed by variable name.
    pub variables: BTreeMap<String, String>,
    /// Data restrictions keyed by `dataConnectionName.columnDisplayName`.
    pub restrictions: BTreeMap<String, String>,
}

/// A validated roster of users keyed by username.
///
/// Entries iterate in username order so repeated runs submit requests in a
/// stable sequence.
///
/// # Example
///
/// ```
/// use roster::Roster;
///
/// let json = r#"{
///     "bob": { "email": "bob@example.com", "type": "User" },
///     "alice": { "email": "alice@example.com", "type": "Chart Viewer" }
/// }"#;
///
/// let roster = Roster::from_json(json).expect("valid roster");
/// let names: Vec<&str> = roster.entries().map(|(name, _)| name).collect();
/// assert_eq!(names, ["alice", "bob"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    entries: BTreeMap<String, RosterEntry>,
}

impl Roster {
    /// Parses a roster from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if:
    /// - The JSON is malformed or a user type is unknown
    /// - The roster is empty
    /// - A username is blank
    /// - A variable or restriction value is an object or array
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let raw: BTreeMap<String, RawRosterEntry> =
            serde_json::from_str(json).map_err(|e| RosterError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    /// Loads a roster from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        let contents = fs::read_to_string(path).map_err(|e| RosterError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    fn from_raw(raw: BTreeMap<String, RawRosterEntry>) -> Result<Self, RosterError> {
        if raw.is_empty() {
            return Err(RosterError::EmptyRoster);
        }
        if raw.keys().any(|username| username.trim().is_empty()) {
            return Err(RosterError::BlankUsername);
        }

        let entries = raw
            .into_iter()
            .map(|(username, entry)| {
                let variables = scalar_map(&username, "variables", entry.variables)?;
                let restrictions = scalar_map(&username, "restrictions", entry.restrictions)?;
                let profile = RosterEntry {
                    email: entry.email,
                    forenames: entry.forenames,
                    surnames: entry.surnames,
                    user_type: entry.user_type,
                    variables,
                    restrictions,
                };
                Ok((username, profile))
            })
            .collect::<Result<_, RosterError>>()?;

        Ok(Self { entries })
    }

    /// Iterates `(username, entry)` pairs in username order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RosterEntry)> {
        self.entries
            .iter()
            .map(|(username, entry)| (username.as_str(), entry))
    }

    /// Looks up one user by exact username.
    #[must_use]
    pub fn get(&self, username: &str) -> Option<&RosterEntry> {
        self.entries.get(username)
    }

    /// Returns the number of users in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the roster holds no users.
    ///
    /// Parsed rosters are never empty; this exists for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawRosterEntry {
    email: String,
    #[serde(default)]
    forenames: String,
    #[serde(default)]
    surnames: String,
    #[serde(rename = "type")]
    user_type: UserType,
    #[serde(default)]
    variables: BTreeMap<String, Value>,
    #[serde(default)]
    restrictions: BTreeMap<String, Value>,
}

/// Flattens JSON scalars to the strings the dashboard stores.
///
/// Numbers and booleans keep their JSON spelling and `null` becomes an empty
/// string. Objects and arrays have no string form and are rejected.
fn scalar_map(
    username: &str,
    field: &'static str,
    raw: BTreeMap<String, Value>,
) -> Result<BTreeMap<String, String>, RosterError> {
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(RosterError::NonScalarValue {
                        username: username.to_owned(),
                        field,
                        key,
                    });
                }
            };
            Ok((key, text))
        })
        .collect()
}
