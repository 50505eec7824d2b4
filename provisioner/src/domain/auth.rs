//! Dashboard credentials and bearer tokens.
//!
//! Both wrap their secret in `Zeroizing` and redact it from `Debug` output so
//! tracing fields never leak a password or token.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

/// Rejected credential values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsValidationError {
    /// Username is blank once trimmed.
    #[error("dashboard username must not be blank")]
    BlankUsername,
    /// Password is empty.
    #[error("dashboard password must not be empty")]
    EmptyPassword,
}

/// Administrator credentials exchanged for API tokens.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use dashboard_provisioner::domain::DashboardCredentials;
///
/// let creds = DashboardCredentials::try_from_parts(" admin ", "s3cret")?;
/// assert_eq!(creds.username(), "admin");
/// assert!(!format!("{creds:?}").contains("s3cret"));
/// # Ok::<(), dashboard_provisioner::domain::CredentialsValidationError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct DashboardCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl DashboardCredentials {
    /// Validate a username and password pair.
    ///
    /// # Errors
    ///
    /// Fails when the trimmed username or the password is empty.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let username = username.trim();
        match (username.is_empty(), password.is_empty()) {
            (true, _) => Err(CredentialsValidationError::BlankUsername),
            (false, true) => Err(CredentialsValidationError::EmptyPassword),
            (false, false) => Ok(Self {
                username: username.to_owned(),
                password: Zeroizing::new(password.to_owned()),
            }),
        }
    }

    /// Username sent with token requests.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password sent with token requests.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for DashboardCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token returned by the dashboard's token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}
