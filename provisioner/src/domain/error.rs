//! Fatal workflow errors.
//!
//! These abort a run. Per-item failures never surface here; they are
//! recorded in the [`RunReport`](super::RunReport) instead.

use thiserror::Error;

use super::UserId;
use super::hierarchy::HierarchyError;
use super::ports::DashboardApiError;
use super::provisioning::RestrictionLookupError;

/// Error that stops a cascade or provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The token endpoint refused or failed.
    #[error("failed to acquire dashboard token: {0}")]
    Authentication(#[source] DashboardApiError),
    /// Listing users failed.
    #[error("failed to list dashboard users: {0}")]
    UserListing(#[source] DashboardApiError),
    /// The user list does not form a usable hierarchy.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    /// Fetching one user's variables failed.
    #[error("failed to fetch variables for user {user_id}: {source}")]
    VariableFetch {
        /// User whose variables could not be read.
        user_id: UserId,
        /// Underlying API error.
        #[source]
        source: DashboardApiError,
    },
    /// Walking the data-connection catalogue failed.
    #[error("failed to fetch data connection catalogue: {0}")]
    CatalogueFetch(#[source] DashboardApiError),
    /// A restriction target did not match the catalogue.
    #[error(transparent)]
    RestrictionLookup(#[from] RestrictionLookupError),
    /// Exporting a chart failed.
    #[error("failed to export chart {chart_id}: {source}")]
    ChartExport {
        /// Requested chart.
        chart_id: u64,
        /// Underlying API error.
        #[source]
        source: DashboardApiError,
    },
}
