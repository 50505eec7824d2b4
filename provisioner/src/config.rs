//! Dashboard connection configuration loaded via OrthoConfig.
//!
//! A JSON connection descriptor wins when one is named; otherwise the
//! individual `DASHBOARD_*` values must supply host and credentials.

use std::fmt;
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use roster::{DashboardDescriptor, Protocol, RosterError};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{CredentialsValidationError, DashboardCredentials};

/// Path prefix of the administration API.
pub const DEFAULT_API_PREFIX: &str = "/pi/api/v2";
/// Path prefix of the chart export endpoints.
pub const DEFAULT_EXPORT_PREFIX: &str = "/pi/export";

/// Errors raised while turning settings into a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A value needed without a descriptor was not provided.
    #[error("missing required setting {field}")]
    MissingField {
        /// Environment variable that must be set.
        field: &'static str,
    },
    /// Host, port, or protocol do not form a valid base URL.
    #[error("invalid dashboard URL: {message}")]
    InvalidUrl {
        /// Parser message.
        message: String,
    },
    /// The descriptor file or the values standing in for it are invalid.
    #[error("invalid dashboard descriptor: {0}")]
    Descriptor(#[from] RosterError),
    /// The credentials are unusable.
    #[error("invalid dashboard credentials: {0}")]
    Credentials(#[from] CredentialsValidationError),
}

/// Raw dashboard settings.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DASHBOARD")]
pub struct DashboardSettings {
    /// Dashboard host name.
    pub host: Option<String>,
    /// Optional explicit port.
    pub port: Option<u16>,
    /// `http` or `https`; defaults to `https`.
    pub protocol: Option<String>,
    /// Administrator username.
    pub username: Option<String>,
    /// Administrator password.
    pub password: Option<String>,
    /// Override for the API path prefix.
    pub api_prefix: Option<String>,
    /// Override for the export path prefix.
    pub export_prefix: Option<String>,
    /// JSON connection descriptor to load instead of individual values.
    pub descriptor_path: Option<PathBuf>,
}

impl fmt::Debug for DashboardSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("api_prefix", &self.api_prefix)
            .field("export_prefix", &self.export_prefix)
            .field("descriptor_path", &self.descriptor_path)
            .finish()
    }
}

impl DashboardSettings {
    /// Replace the descriptor path when `path` is given.
    #[must_use]
    pub fn with_descriptor_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.descriptor_path = path;
        }
        self
    }

    /// API path prefix, falling back to [`DEFAULT_API_PREFIX`].
    pub fn api_prefix(&self) -> &str {
        self.api_prefix.as_deref().unwrap_or(DEFAULT_API_PREFIX)
    }

    /// Export path prefix, falling back to [`DEFAULT_EXPORT_PREFIX`].
    pub fn export_prefix(&self) -> &str {
        self.export_prefix.as_deref().unwrap_or(DEFAULT_EXPORT_PREFIX)
    }

    /// Resolve the connection used by the HTTP adapter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the descriptor cannot be loaded, a
    /// required value is missing, or the base URL is invalid.
    pub fn connection(&self) -> Result<DashboardConnection, ConfigError> {
        let descriptor = match self.descriptor_path.as_deref() {
            Some(path) => DashboardDescriptor::from_file(path)?,
            None => self.descriptor_from_values()?,
        };
        DashboardConnection::from_descriptor(&descriptor, self.api_prefix(), self.export_prefix())
    }

    fn descriptor_from_values(&self) -> Result<DashboardDescriptor, ConfigError> {
        let host = required(self.host.as_deref(), "DASHBOARD_HOST")?;
        let username = required(self.username.as_deref(), "DASHBOARD_USERNAME")?;
        let password = required(self.password.as_deref(), "DASHBOARD_PASSWORD")?;
        let protocol = match self.protocol.as_deref() {
            Some(value) => Protocol::parse(value)?,
            None => Protocol::default(),
        };
        Ok(DashboardDescriptor::try_from_parts(
            host, self.port, protocol, username, password,
        )?)
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ConfigError> {
    value.ok_or(ConfigError::MissingField { field })
}

/// Validated connection details for the dashboard API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConnection {
    /// Scheme, host, and port; no path.
    pub base_url: Url,
    /// API path prefix such as `/pi/api/v2`.
    pub api_prefix: String,
    /// Export path prefix such as `/pi/export`.
    pub export_prefix: String,
    /// Administrator credentials.
    pub credentials: DashboardCredentials,
}

impl DashboardConnection {
    /// Build a connection from a descriptor and path prefixes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] when the host cannot form a URL.
    ///
    /// # Examples
    /// ```
    /// use dashboard_provisioner::config::DashboardConnection;
    /// use roster::{DashboardDescriptor, Protocol};
    ///
    /// let descriptor = DashboardDescriptor::try_from_parts(
    ///     "dash.example.com",
    ///     Some(8224),
    ///     Protocol::Http,
    ///     "admin",
    ///     "secret",
    /// )
    /// .expect("valid descriptor");
    /// let connection =
    ///     DashboardConnection::from_descriptor(&descriptor, "/pi/api/v2", "/pi/export")
    ///         .expect("valid connection");
    /// assert_eq!(connection.base_url.as_str(), "http://dash.example.com:8224/");
    /// ```
    pub fn from_descriptor(
        descriptor: &DashboardDescriptor,
        api_prefix: &str,
        export_prefix: &str,
    ) -> Result<Self, ConfigError> {
        let authority = match descriptor.port() {
            Some(port) => format!("{}:{port}", descriptor.host()),
            None => descriptor.host().to_owned(),
        };
        let base_url = Url::parse(&format!(
            "{}://{authority}",
            descriptor.protocol().scheme()
        ))
        .map_err(|error| ConfigError::InvalidUrl {
            message: error.to_string(),
        })?;
        let credentials =
            DashboardCredentials::try_from_parts(descriptor.username(), descriptor.password())?;

        Ok(Self {
            base_url,
            api_prefix: normalise_prefix(api_prefix),
            export_prefix: normalise_prefix(export_prefix),
            credentials,
        })
    }

    /// Load a connection straight from a descriptor file with default
    /// prefixes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable or invalid.
    pub fn from_descriptor_file(path: &Path) -> Result<Self, ConfigError> {
        let descriptor = DashboardDescriptor::from_file(path)?;
        Self::from_descriptor(&descriptor, DEFAULT_API_PREFIX, DEFAULT_EXPORT_PREFIX)
    }
}

fn normalise_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.starts_with('/') || trimmed.is_empty() {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}
