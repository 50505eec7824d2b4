//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod dashboard_api;

#[cfg(test)]
pub use dashboard_api::MockDashboardApi;
pub use dashboard_api::{
    Column, CreatedUser, DashboardApi, DashboardApiError, DataConnection, NewRestriction, NewUser,
    Table,
};
