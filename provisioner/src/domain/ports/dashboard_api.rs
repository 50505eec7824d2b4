//! Driven port for the dashboard's REST API.
//!
//! The domain owns the request and response shapes; adapters translate them
//! to the wire format. Every call except token acquisition carries the
//! bearer token explicitly so adapters stay free of session state.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use zeroize::Zeroizing;

use super::define_port_error;
use crate::domain::{AccessToken, NewVariable, UserId, UserRecord, Variable};

/// Create-user request derived from one roster entry.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login code (roster username).
    pub usercode: String,
    /// Contact email.
    pub email: String,
    /// Given names.
    pub forenames: String,
    /// Family names.
    pub surname: String,
    /// Dashboard user type id.
    pub user_type_id: u8,
    /// Parent user for the new account.
    pub parent_id: UserId,
    /// Generated initial password.
    pub client_password: Zeroizing<String>,
    /// Whether the account is a lite user.
    pub lite: bool,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("usercode", &self.usercode)
            .field("email", &self.email)
            .field("user_type_id", &self.user_type_id)
            .field("parent_id", &self.parent_id)
            .field("client_password", &"<redacted>")
            .field("lite", &self.lite)
            .finish_non_exhaustive()
    }
}

/// Identity of a user the dashboard just created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedUser {
    /// Assigned id.
    pub id: UserId,
    /// Usercode as stored by the dashboard.
    pub usercode: String,
}

/// Create-restriction request with a resolved column id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRestriction {
    /// Restricted user.
    pub user_id: UserId,
    /// Numeric column id.
    pub column_id: i64,
    /// Permitted value.
    pub value: String,
}

/// Data connection summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConnection {
    /// Connection id.
    pub id: i64,
    /// Connection name used in roster restriction targets.
    pub name: String,
}

/// Table within a data connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table id.
    pub id: i64,
    /// Table name.
    pub name: String,
}

/// Column within a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column id.
    pub id: i64,
    /// Display name used in roster restriction targets.
    pub display_name: String,
}

define_port_error! {
    /// Errors surfaced while calling the dashboard API.
    pub enum DashboardApiError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "dashboard transport failed: {message}",
        /// The dashboard refused the credentials or token.
        Unauthorized { message: String } =>
            "dashboard rejected credentials: {message}",
        /// The dashboard answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "dashboard rejected request with status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "dashboard response decode failed: {message}",
        /// The adapter could not build the request.
        InvalidRequest { message: String } =>
            "dashboard request invalid: {message}",
    }
}

/// Port for the dashboard administration API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Exchange the configured credentials for a bearer token.
    async fn acquire_token(&self) -> Result<AccessToken, DashboardApiError>;

    /// List every user visible to the token.
    async fn list_users(&self, token: &AccessToken) -> Result<Vec<UserRecord>, DashboardApiError>;

    /// List the variables defined directly on one user.
    async fn list_user_variables(
        &self,
        token: &AccessToken,
        user_id: UserId,
    ) -> Result<Vec<Variable>, DashboardApiError>;

    /// Create a variable on the user named by `variable.user_id`.
    async fn create_user_variable(
        &self,
        token: &AccessToken,
        variable: &NewVariable,
    ) -> Result<(), DashboardApiError>;

    /// Create a global-scope variable.
    async fn create_global_variable(
        &self,
        token: &AccessToken,
        variable: &NewVariable,
    ) -> Result<(), DashboardApiError>;

    /// Create a user.
    async fn create_user(
        &self,
        token: &AccessToken,
        user: &NewUser,
    ) -> Result<CreatedUser, DashboardApiError>;

    /// Create a data restriction for a user.
    async fn create_restriction(
        &self,
        token: &AccessToken,
        restriction: &NewRestriction,
    ) -> Result<(), DashboardApiError>;

    /// List data connections.
    async fn list_data_connections(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<DataConnection>, DashboardApiError>;

    /// List the tables of one data connection.
    async fn list_tables(
        &self,
        token: &AccessToken,
        connection_id: i64,
    ) -> Result<Vec<Table>, DashboardApiError>;

    /// List the columns of one table.
    async fn list_columns(
        &self,
        token: &AccessToken,
        connection_id: i64,
        table_id: i64,
    ) -> Result<Vec<Column>, DashboardApiError>;

    /// Export a chart definition as JSON.
    async fn export_chart(
        &self,
        token: &AccessToken,
        chart_id: u64,
    ) -> Result<Value, DashboardApiError>;
}
