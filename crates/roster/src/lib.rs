//! Input files for dashboard provisioning runs.
//!
//! This crate loads the two JSON documents an operator hands to the
//! provisioning tool: the user roster and the dashboard connection
//! descriptor. It is deliberately independent of the provisioner's domain
//! types so the file formats can evolve without touching workflow code.
//!
//! # Example
//!
//! ```
//! use roster::{Roster, UserType};
//!
//! let json = r#"{
//!     "alice": {
//!         "email": "alice@example.com",
//!         "forenames": "Alice",
//!         "surnames": "Smith",
//!         "type": "Designer",
//!         "variables": { "theme": "dark" }
//!     }
//! }"#;
//!
//! let roster = Roster::from_json(json).expect("valid roster");
//! let alice = roster.get("alice").expect("alice is present");
//!
//! assert_eq!(alice.user_type, UserType::Designer);
//! assert_eq!(alice.variables.get("theme").map(String::as_str), Some("dark"));
//! ```

mod descriptor;
mod error;
mod roster;

pub use descriptor::{DashboardDescriptor, Protocol};
pub use error::RosterError;
pub use roster::{Roster, RosterEntry, UserType};
