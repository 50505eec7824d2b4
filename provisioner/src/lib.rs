//! Dashboard administration library.
//!
//! Cascades inherited variables down a dashboard's user hierarchy and
//! provisions users, variables, and data restrictions from a roster.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(test)]
pub(crate) mod test_support;
