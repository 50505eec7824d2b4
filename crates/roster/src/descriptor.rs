//! Dashboard connection descriptor parsing.
//!
//! The descriptor names the dashboard host and the administrator
//! credentials used to request API tokens.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::RosterError;

/// Transport protocol used to reach the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    #[default]
    Https,
}

impl Protocol {
    /// Parses a protocol name, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnsupportedProtocol`] for anything other than
    /// `http` or `https`.
    ///
    /// # Example
    ///
    /// ```
    /// use roster::Protocol;
    ///
    /// assert_eq!(Protocol::parse(" HTTPS ").expect("valid"), Protocol::Https);
    /// assert!(Protocol::parse("ftp").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, RosterError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            _ => Err(RosterError::UnsupportedProtocol {
                value: raw.to_owned(),
            }),
        }
    }

    /// Returns the URL scheme for this protocol.
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Validated dashboard connection descriptor.
///
/// ## Invariants
/// - `host` and `username` are trimmed and non-empty.
/// - `password` is non-empty; it is never rendered by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct DashboardDescriptor {
    host: String,
    port: Option<u16>,
    protocol: Protocol,
    username: String,
    password: Zeroizing<String>,
}

impl DashboardDescriptor {
    /// Builds a descriptor from already separated values.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::BlankField`] when host, username or password is
    /// blank.
    pub fn try_from_parts(
        host: &str,
        port: Option<u16>,
        protocol: Protocol,
        username: &str,
        password: &str,
    ) -> Result<Self, RosterError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(RosterError::BlankField { field: "host" });
        }
        let username = username.trim();
        if username.is_empty() {
            return Err(RosterError::BlankField { field: "username" });
        }
        if password.is_empty() {
            return Err(RosterError::BlankField { field: "password" });
        }

        Ok(Self {
            host: host.to_owned(),
            port,
            protocol,
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Parses a descriptor from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] when the JSON is malformed, the protocol is
    /// unsupported, or a required field is blank.
    ///
    /// # Example
    ///
    /// ```
    /// use roster::{DashboardDescriptor, Protocol};
    ///
    /// let json = r#"{
    ///     "host": "dashboard.example.com",
    ///     "port": 8224,
    ///     "protocol": "http",
    ///     "username": "admin",
    ///     "password": "secret"
    /// }"#;
    ///
    /// let descriptor = DashboardDescriptor::from_json(json).expect("valid");
    /// assert_eq!(descriptor.protocol(), Protocol::Http);
    /// assert_eq!(descriptor.port(), Some(8224));
    /// assert!(!format!("{descriptor:?}").contains("secret"));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let raw: RawDescriptor =
            serde_json::from_str(json).map_err(|e| RosterError::ParseError {
                message: e.to_string(),
            })?;
        let protocol = match raw.protocol.as_deref() {
            Some(value) => Protocol::parse(value)?,
            None => Protocol::default(),
        };

        Self::try_from_parts(
            &raw.host,
            raw.port,
            protocol,
            &raw.username,
            &raw.password,
        )
    }

    /// Loads a descriptor from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        let contents = fs::read_to_string(path).map_err(|e| RosterError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    /// Dashboard host name.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Optional explicit port.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Transport protocol.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Administrator username used for token requests.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Administrator password used for token requests.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for DashboardDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    host: String,
    port: Option<u16>,
    protocol: Option<String>,
    username: String,
    password: String,
}
