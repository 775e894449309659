//! Seeded in-memory credential exchange.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccessToken, AuthGrant, CredentialExchange, CredentialExchangeError, Sleeper,
};
use crate::domain::user::DISPLAY_NAME_MAX;
use crate::domain::{
    DisplayName, Email, LoginCredentials, RegistrationRequest, User, UserId, UserRole,
};

use super::FixtureLatency;

struct Account {
    password: Zeroizing<String>,
    user: User,
}

/// Credential exchange backed by a seeded account table.
///
/// Three accounts exist from the start: `demo@example.com` / `demo123`
/// (participant), `organizer@example.com` / `org123` (organizer), and
/// `admin@example.com` / `admin123` (admin). Registered accounts are kept for
/// the lifetime of the value.
///
/// With open enrolment enabled, a login for an unknown email fabricates a
/// fresh identity named after the email's local part and carrying the
/// requested role. It is off by default: unknown emails are rejected.
pub struct FixtureCredentialExchange {
    accounts: Mutex<HashMap<String, Account>>,
    sleeper: Arc<dyn Sleeper>,
    latency: FixtureLatency,
    open_enrolment: bool,
}

impl FixtureCredentialExchange {
    /// Seeded exchange sleeping through `sleeper`.
    pub fn new(sleeper: Arc<dyn Sleeper>) -> Self {
        let accounts = seed_accounts()
            .into_iter()
            .map(|account| (account.user.email().as_ref().to_owned(), account))
            .collect();
        Self {
            accounts: Mutex::new(accounts),
            sleeper,
            latency: FixtureLatency::default(),
            open_enrolment: false,
        }
    }

    /// Override the simulated latency.
    pub fn with_latency(mut self, latency: FixtureLatency) -> Self {
        self.latency = latency;
        self
    }

    /// Fabricate identities for unknown emails on login.
    pub fn with_open_enrolment(mut self, enabled: bool) -> Self {
        self.open_enrolment = enabled;
        self
    }

    fn lock_accounts(&self) -> MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CredentialExchange for FixtureCredentialExchange {
    async fn login(
        &self,
        credentials: &LoginCredentials,
        role: Option<UserRole>,
    ) -> Result<AuthGrant, CredentialExchangeError> {
        self.sleeper.sleep(self.latency.login).await;
        let email = credentials.email().as_ref();

        let known = self.lock_accounts().get(email).map(|account| {
            (
                account.password.as_str() == credentials.password(),
                account.user.clone(),
            )
        });
        match known {
            Some((true, user)) => Ok(grant(user)),
            Some((false, _)) => {
                debug!("fixture login rejected: password mismatch");
                Err(CredentialExchangeError::invalid_credentials())
            }
            None if self.open_enrolment => {
                let user = enrol(credentials.email(), role.unwrap_or_default())?;
                info!(user_id = %user.id(), role = %user.role(), "fixture enrolled unknown email");
                Ok(grant(user))
            }
            None => {
                debug!("fixture login rejected: unknown email");
                Err(CredentialExchangeError::invalid_credentials())
            }
        }
    }

    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<AuthGrant, CredentialExchangeError> {
        self.sleeper.sleep(self.latency.register).await;
        let email = request.credentials().email();

        let mut accounts = self.lock_accounts();
        if accounts.contains_key(email.as_ref()) {
            return Err(CredentialExchangeError::account_exists(email.as_ref()));
        }
        let user = User::new(
            UserId::random(),
            email.clone(),
            request.name().clone(),
            request.role(),
        );
        accounts.insert(
            email.as_ref().to_owned(),
            Account {
                password: Zeroizing::new(request.credentials().password().to_owned()),
                user: user.clone(),
            },
        );
        info!(user_id = %user.id(), role = %user.role(), "fixture account registered");
        Ok(grant(user))
    }
}

fn grant(user: User) -> AuthGrant {
    let token = AccessToken::new(format!("mock-jwt-{}", user.id()));
    AuthGrant { user, token }
}

fn enrol(email: &Email, role: UserRole) -> Result<User, CredentialExchangeError> {
    let name: String = email.local_part().chars().take(DISPLAY_NAME_MAX).collect();
    let name =
        DisplayName::new(name).map_err(|err| CredentialExchangeError::rejected(err.to_string()))?;
    Ok(User::new(UserId::random(), email.clone(), name, role))
}

fn seed_accounts() -> Vec<Account> {
    [
        (
            "demo-user-1",
            "demo@example.com",
            "demo123",
            "Demo User",
            UserRole::Participant,
            "Data science enthusiast",
        ),
        (
            "org-user-1",
            "organizer@example.com",
            "org123",
            "Organizer",
            UserRole::Organizer,
            "Runs competitions",
        ),
        (
            "admin-user-1",
            "admin@example.com",
            "admin123",
            "Administrator",
            UserRole::Admin,
            "Platform administrator",
        ),
    ]
    .into_iter()
    .filter_map(|(id, email, password, name, role, bio)| {
        let user = User::new(
            UserId::new(id).ok()?,
            Email::new(email).ok()?,
            DisplayName::new(name).ok()?,
            role,
        )
        .with_bio(bio);
        Some(Account {
            password: Zeroizing::new(password.to_owned()),
            user,
        })
    })
    .collect()
}
