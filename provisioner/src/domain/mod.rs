//! Domain model and workflows for dashboard administration.
//!
//! The domain knows nothing about HTTP. Every call to the dashboard goes
//! through the [`ports::DashboardApi`] port, which the outbound adapter
//! implements and tests replace with in-memory doubles.

pub mod auth;
pub mod cascade;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod outcome;
pub mod ports;
pub mod provisioning;
pub mod user;
pub mod variable;

pub use self::auth::{AccessToken, CredentialsValidationError, DashboardCredentials};
pub use self::cascade::{
    CascadeOptions, CascadeOutcome, VariableCascade, resolve_missing_variables,
};
pub use self::error::WorkflowError;
pub use self::export::export_chart;
pub use self::hierarchy::{HierarchyError, NodeId, UserNode, UserTree};
pub use self::outcome::{ItemOutcome, ItemStatus, RunReport, Stage};
pub use self::provisioning::{
    CatalogueConnection, DataCatalogue, ProvisioningAborted, ProvisioningConfig,
    RestrictionLookupError, UserProvisioner,
};
pub use self::user::{UserId, UserRecord};
pub use self::variable::{
    GLOBAL_PLACEHOLDER_VALUE, NewVariable, Variable, VariableConflict, dedup_by_name,
};
