//! Driven port for verifying and creating credentials.
//!
//! The exchange is authoritative: the identity it returns is the one the
//! session installs. Calls may suspend on the network and must resolve before
//! the session store is touched.

use std::fmt;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{LoginCredentials, RegistrationRequest, User, UserRole};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential exchange adapters.
    pub enum CredentialExchangeError {
        /// No matching account or the password does not match.
        InvalidCredentials => "invalid email or password",
        /// Registration for an email that already has an account.
        AccountExists { email: String } => "an account for {email} already exists",
        /// Input failed the exchange's own shape checks.
        Rejected { message: String } => "credentials rejected: {message}",
        /// The exchange could not be reached.
        Unavailable { message: String } => "credential exchange unavailable: {message}",
    }
}

/// Bearer token issued alongside an identity.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Raw token value.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Successful exchange result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    /// Identity issued by the exchange.
    pub user: User,
    /// Token for subsequent API calls.
    pub token: AccessToken,
}

/// Port for verifying existing accounts and registering new ones.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    /// Verify `credentials` and return the matching identity.
    ///
    /// `role` is a hint used only when the exchange enrols unknown accounts
    /// on first login; existing accounts keep their stored role.
    async fn login(
        &self,
        credentials: &LoginCredentials,
        role: Option<UserRole>,
    ) -> Result<AuthGrant, CredentialExchangeError>;

    /// Create an account and return its identity.
    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<AuthGrant, CredentialExchangeError>;
}
