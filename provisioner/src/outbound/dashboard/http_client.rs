//! Reqwest-backed dashboard API adapter.
//!
//! This adapter owns transport details only: header construction, request
//! serialisation, HTTP error mapping, and JSON decoding into domain records.
//! No client timeout is configured.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::dto::{
    ColumnDto, CreatedUserDto, DataConnectionDto, RestrictionRequestDto, TableDto,
    TokenResponseDto, UserDto, UserRequestDto, VariableDto, VariableRequestDto,
};
use crate::config::DashboardConnection;
use crate::domain::ports::{
    Column, CreatedUser, DashboardApi, DashboardApiError, DataConnection, NewRestriction, NewUser,
    Table,
};
use crate::domain::{AccessToken, NewVariable, UserId, UserRecord, Variable};

const JSON: &str = "application/json";

/// Which path prefix a request is issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Administration API, e.g. `/pi/api/v2`.
    Api,
    /// Chart export, e.g. `/pi/export`.
    Export,
}

/// Dashboard adapter issuing JSON requests against one installation.
pub struct DashboardHttpClient {
    client: Client,
    connection: DashboardConnection,
}

impl DashboardHttpClient {
    /// Build an adapter for `connection`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(connection: DashboardConnection) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client, connection })
    }

    /// Issue one request and return the raw response body.
    ///
    /// `endpoint` is appended to the prefix of `surface`. `Accept` and
    /// `Authorization` are always sent; a body adds `Content-Type` and an
    /// explicit `Content-Length`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardApiError`] for transport failures and non-success
    /// statuses.
    pub async fn send(
        &self,
        method: Method,
        surface: Surface,
        endpoint: &str,
        authorization: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, DashboardApiError> {
        let url = self.url(surface, endpoint)?;
        debug!(method = %method, path = url.path(), "dashboard request");

        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, JSON)
            .header(AUTHORIZATION, authorization);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, JSON)
                .header(CONTENT_LENGTH, body.len())
                .body(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    fn url(&self, surface: Surface, endpoint: &str) -> Result<Url, DashboardApiError> {
        let prefix = match surface {
            Surface::Api => self.connection.api_prefix.as_str(),
            Surface::Export => self.connection.export_prefix.as_str(),
        };
        self.connection
            .base_url
            .join(&format!("{prefix}{endpoint}"))
            .map_err(|error| {
                DashboardApiError::invalid_request(format!("invalid endpoint {endpoint}: {error}"))
            })
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        endpoint: &str,
    ) -> Result<Vec<T>, DashboardApiError> {
        let body = self
            .send(Method::GET, Surface::Api, endpoint, &bearer(token), None)
            .await?;
        decode_list(&body)
    }

    async fn post<B: Serialize>(
        &self,
        token: &AccessToken,
        endpoint: &str,
        payload: &B,
    ) -> Result<Vec<u8>, DashboardApiError> {
        let body = serde_json::to_vec(payload).map_err(|error| {
            DashboardApiError::invalid_request(format!("cannot encode request body: {error}"))
        })?;
        self.send(Method::POST, Surface::Api, endpoint, &bearer(token), Some(body))
            .await
    }
}

#[async_trait]
impl DashboardApi for DashboardHttpClient {
    async fn acquire_token(&self) -> Result<AccessToken, DashboardApiError> {
        let credentials = &self.connection.credentials;
        let authorization = format!("Basic {}:{}", credentials.username(), credentials.password());
        let body = self
            .send(Method::POST, Surface::Api, "/tokens", &authorization, None)
            .await?;
        let decoded: TokenResponseDto = decode_object(&body)?;
        decoded
            .token
            .filter(|token| !token.is_empty())
            .map(AccessToken::new)
            .ok_or_else(|| DashboardApiError::decode("token response carried no token"))
    }

    async fn list_users(&self, token: &AccessToken) -> Result<Vec<UserRecord>, DashboardApiError> {
        let users: Vec<UserDto> = self.get_list(token, "/users").await?;
        Ok(users.into_iter().map(UserRecord::from).collect())
    }

    async fn list_user_variables(
        &self,
        token: &AccessToken,
        user_id: UserId,
    ) -> Result<Vec<Variable>, DashboardApiError> {
        let variables: Vec<VariableDto> = self
            .get_list(token, &format!("/users/{user_id}/variables"))
            .await?;
        Ok(variables.into_iter().map(Variable::from).collect())
    }

    async fn create_user_variable(
        &self,
        token: &AccessToken,
        variable: &NewVariable,
    ) -> Result<(), DashboardApiError> {
        self.post(
            token,
            &format!("/users/{}/variables", variable.user_id),
            &VariableRequestDto::from(variable),
        )
        .await?;
        Ok(())
    }

    async fn create_global_variable(
        &self,
        token: &AccessToken,
        variable: &NewVariable,
    ) -> Result<(), DashboardApiError> {
        self.post(token, "/variables", &VariableRequestDto::from(variable))
            .await?;
        Ok(())
    }

    async fn create_user(
        &self,
        token: &AccessToken,
        user: &NewUser,
    ) -> Result<CreatedUser, DashboardApiError> {
        let body = self
            .post(token, "/users", &UserRequestDto::from(user))
            .await?;
        let created: CreatedUserDto = decode_object(&body)?;
        Ok(created.into())
    }

    async fn create_restriction(
        &self,
        token: &AccessToken,
        restriction: &NewRestriction,
    ) -> Result<(), DashboardApiError> {
        self.post(
            token,
            &format!("/users/{}/restrictions", restriction.user_id),
            &RestrictionRequestDto::from(restriction),
        )
        .await?;
        Ok(())
    }

    async fn list_data_connections(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<DataConnection>, DashboardApiError> {
        let connections: Vec<DataConnectionDto> = self.get_list(token, "/dataConnections").await?;
        Ok(connections.into_iter().map(DataConnection::from).collect())
    }

    async fn list_tables(
        &self,
        token: &AccessToken,
        connection_id: i64,
    ) -> Result<Vec<Table>, DashboardApiError> {
        let tables: Vec<TableDto> = self
            .get_list(token, &format!("/dataConnections/{connection_id}/tables"))
            .await?;
        Ok(tables.into_iter().map(Table::from).collect())
    }

    async fn list_columns(
        &self,
        token: &AccessToken,
        connection_id: i64,
        table_id: i64,
    ) -> Result<Vec<Column>, DashboardApiError> {
        let columns: Vec<ColumnDto> = self
            .get_list(
                token,
                &format!("/dataConnections/{connection_id}/tables/{table_id}/columns"),
            )
            .await?;
        Ok(columns.into_iter().map(Column::from).collect())
    }

    async fn export_chart(
        &self,
        token: &AccessToken,
        chart_id: u64,
    ) -> Result<Value, DashboardApiError> {
        let body = self
            .send(
                Method::GET,
                Surface::Export,
                &format!("/json?chartId={chart_id}"),
                &bearer(token),
                None,
            )
            .await?;
        decode_object(&body)
    }
}

fn bearer(token: &AccessToken) -> String {
    format!("Bearer {}", token.expose())
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

fn decode_object<T: DeserializeOwned>(body: &[u8]) -> Result<T, DashboardApiError> {
    let body = if is_blank(body) { b"{}".as_slice() } else { body };
    serde_json::from_slice(body).map_err(|error| {
        DashboardApiError::decode(format!(
            "invalid dashboard JSON payload: {error}; body: {}",
            body_preview(body)
        ))
    })
}

fn decode_list<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, DashboardApiError> {
    if is_blank(body) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(body).map_err(|error| {
        DashboardApiError::decode(format!(
            "invalid dashboard JSON list: {error}; body: {}",
            body_preview(body)
        ))
    })
}

fn map_transport_error(error: reqwest::Error) -> DashboardApiError {
    DashboardApiError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DashboardApiError {
    let mut preview = body_preview(body);
    if preview.is_empty() {
        preview = "empty response body".to_owned();
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DashboardApiError::unauthorized(format!("status {}: {preview}", status.as_u16()))
        }
        _ => DashboardApiError::rejected(status.as_u16(), preview),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
