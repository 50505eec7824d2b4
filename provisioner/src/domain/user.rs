//! Dashboard user identity.
//!
//! Users are owned by the remote dashboard; this crate only ever holds the
//! identity fields it needs to build the hierarchy and address API calls.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric dashboard user identifier.
///
/// `UserId::GLOBAL` (0) is the sentinel scope for global variables and is
/// never assigned to a real user.
///
/// # Examples
/// ```
/// use dashboard_provisioner::domain::UserId;
///
/// let id = UserId::new(42);
/// assert_eq!(id.get(), 42);
/// assert!(!id.is_global());
/// assert!(UserId::GLOBAL.is_global());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Scope used for global variables.
    pub const GLOBAL: Self = Self(0);

    /// Wrap a raw identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether this is the global-scope sentinel.
    pub const fn is_global(self) -> bool {
        self.0 == Self::GLOBAL.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat user record as listed by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Dashboard identifier.
    pub id: UserId,
    /// Login code; the dashboard stores these upper-cased.
    pub usercode: String,
    /// Parent user, absent for top-level users.
    pub parent_id: Option<UserId>,
}

impl UserRecord {
    /// Convenience constructor used by adapters and tests.
    pub fn new(id: i64, usercode: impl Into<String>, parent_id: Option<i64>) -> Self {
        Self {
            id: UserId::new(id),
            usercode: usercode.into(),
            parent_id: parent_id.map(UserId::new),
        }
    }
}
