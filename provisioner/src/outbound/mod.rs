//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters translate between domain types and wire representations and
//! contain no workflow logic.

pub mod dashboard;
