//! Login, registration, and logout against the credential exchange.
//!
//! Each mutation follows the same sequence: validate the form inputs, mark
//! the session as busy, await the exchange while watching the caller's
//! cancellation token, and only then commit the identity the exchange
//! returned. A failed, rejected, or abandoned attempt leaves the session
//! exactly as it was.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ports::{AuthGrant, CredentialExchange, CredentialExchangeError};
use super::{
    DomainResult, Error, LoginCredentials, Region, RegistrationRequest, SessionStore, User,
    UserRole,
};

/// Outcome of a committed login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    /// Identity now current in the session.
    pub user: User,
    /// Region the caller should navigate to next.
    pub landing: Region,
}

/// Session mutations backed by a [`CredentialExchange`].
pub struct AuthService<X> {
    exchange: Arc<X>,
    session: Arc<SessionStore>,
}

impl<X> AuthService<X> {
    /// Create a service mutating `session` through `exchange`.
    pub fn new(exchange: Arc<X>, session: Arc<SessionStore>) -> Self {
        Self { exchange, session }
    }

    /// Session this service mutates.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Clear the session. Returns the region to show afterwards.
    pub fn logout(&self) -> Region {
        self.session.logout();
        Region::LANDING
    }
}

impl<X: CredentialExchange> AuthService<X> {
    /// Verify credentials and install the returned identity.
    ///
    /// `role` is forwarded to the exchange as an enrolment hint; it never
    /// overrides the role of an existing account.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Option<UserRole>,
        cancel: &CancellationToken,
    ) -> DomainResult<Authenticated> {
        let credentials = LoginCredentials::try_from_parts(email, password)
            .map_err(|err| Error::validation_failed(err.to_string()))?;
        let _pending = self.session.try_begin().ok_or_else(busy)?;
        if cancel.is_cancelled() {
            return Err(abandoned("login"));
        }

        let grant = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(abandoned("login")),
            result = self.exchange.login(&credentials, role) => result.map_err(map_exchange_error)?,
        };
        let user = commit_checked(grant, cancel, "login")?;
        self.session.login(user.clone());

        let landing = Region::landing_for(user.role());
        Ok(Authenticated { user, landing })
    }

    /// Create an account and install the returned identity.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Option<UserRole>,
        cancel: &CancellationToken,
    ) -> DomainResult<Authenticated> {
        let request = RegistrationRequest::try_new(email, password, name, role)
            .map_err(|err| Error::validation_failed(err.to_string()))?;
        let _pending = self.session.try_begin().ok_or_else(busy)?;
        if cancel.is_cancelled() {
            return Err(abandoned("register"));
        }

        let grant = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(abandoned("register")),
            result = self.exchange.register(&request) => result.map_err(map_exchange_error)?,
        };
        let user = commit_checked(grant, cancel, "register")?;
        self.session.register(user.clone());

        Ok(Authenticated {
            user,
            landing: Region::LANDING,
        })
    }
}

fn commit_checked(grant: AuthGrant, cancel: &CancellationToken, via: &str) -> DomainResult<User> {
    if cancel.is_cancelled() {
        return Err(abandoned(via));
    }
    let AuthGrant { user, token } = grant;
    debug!(user_id = %user.id(), token_len = token.expose().len(), "access token issued");
    Ok(user)
}

fn busy() -> Error {
    debug!("session mutation rejected: another is in flight");
    Error::busy("")
}

fn abandoned(via: &str) -> Error {
    info!(via, "session mutation cancelled before commit");
    Error::cancelled("")
}

fn map_exchange_error(error: CredentialExchangeError) -> Error {
    match &error {
        CredentialExchangeError::InvalidCredentials => {
            Error::invalid_credentials(error.to_string())
        }
        CredentialExchangeError::AccountExists { .. } => Error::account_exists(error.to_string()),
        CredentialExchangeError::Rejected { .. } => Error::validation_failed(error.to_string()),
        CredentialExchangeError::Unavailable { .. } => {
            warn!(%error, "credential exchange unavailable");
            Error::unavailable(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{AccessToken, MockCredentialExchange};
    use crate::domain::{DisplayName, Email, ErrorCode, UserId};
    use async_trait::async_trait;
    use rstest::{fixture, rstest};

    fn identity(id: &str, email: &str, role: UserRole) -> User {
        User::new(
            UserId::new(id).expect("valid id"),
            Email::new(email).expect("valid email"),
            DisplayName::new("Fixture").expect("valid name"),
            role,
        )
    }

    fn grant(user: User) -> AuthGrant {
        let token = AccessToken::new(format!("mock-jwt-{}", user.id()));
        AuthGrant { user, token }
    }

    #[fixture]
    fn session() -> Arc<SessionStore> {
        Arc::new(SessionStore::headless())
    }

    fn service(
        exchange: MockCredentialExchange,
        session: &Arc<SessionStore>,
    ) -> AuthService<MockCredentialExchange> {
        AuthService::new(Arc::new(exchange), session.clone())
    }

    /// Exchange that cancels the caller's token while answering.
    struct CancellingExchange {
        cancel: CancellationToken,
        user: User,
    }

    #[async_trait]
    impl CredentialExchange for CancellingExchange {
        async fn login(
            &self,
            _credentials: &LoginCredentials,
            _role: Option<UserRole>,
        ) -> Result<AuthGrant, CredentialExchangeError> {
            self.cancel.cancel();
            Ok(grant(self.user.clone()))
        }

        async fn register(
            &self,
            _request: &RegistrationRequest,
        ) -> Result<AuthGrant, CredentialExchangeError> {
            self.cancel.cancel();
            Ok(grant(self.user.clone()))
        }
    }

    #[rstest]
    #[case(UserRole::Participant, Region::Competitions)]
    #[case(UserRole::Organizer, Region::Organizer)]
    #[case(UserRole::Admin, Region::Admin)]
    #[tokio::test]
    async fn login_installs_exchange_identity_and_picks_landing(
        session: Arc<SessionStore>,
        #[case] role: UserRole,
        #[case] landing: Region,
    ) {
        let issued = identity("u-1", "user@example.com", role);
        let returned = issued.clone();
        let mut exchange = MockCredentialExchange::new();
        exchange
            .expect_login()
            .times(1)
            .returning(move |_, _| Ok(grant(returned.clone())));

        let outcome = service(exchange, &session)
            .login("user@example.com", "secret1", None, &CancellationToken::new())
            .await
            .expect("login succeeds");

        assert_eq!(outcome.user, issued);
        assert_eq!(outcome.landing, landing);
        assert_eq!(session.current(), Some(issued));
        assert!(!session.is_pending());
    }

    #[rstest]
    #[tokio::test]
    async fn requested_role_is_only_a_hint(session: Arc<SessionStore>) {
        let stored = identity("demo-user-1", "demo@example.com", UserRole::Participant);
        let returned = stored.clone();
        let mut exchange = MockCredentialExchange::new();
        exchange
            .expect_login()
            .returning(move |_, _| Ok(grant(returned.clone())));

        service(exchange, &session)
            .login(
                "demo@example.com",
                "demo123",
                Some(UserRole::Admin),
                &CancellationToken::new(),
            )
            .await
            .expect("login succeeds");

        assert_eq!(session.current_role(), Some(UserRole::Participant));
    }

    #[rstest]
    #[case(CredentialExchangeError::invalid_credentials(), ErrorCode::InvalidCredentials)]
    #[case(CredentialExchangeError::rejected("bad shape"), ErrorCode::ValidationFailed)]
    #[case(CredentialExchangeError::unavailable("timeout"), ErrorCode::Unavailable)]
    #[tokio::test]
    async fn exchange_failures_leave_session_untouched(
        session: Arc<SessionStore>,
        #[case] failure: CredentialExchangeError,
        #[case] expected: ErrorCode,
    ) {
        let existing = identity("org-user-1", "organizer@example.com", UserRole::Organizer);
        session.login(existing.clone());
        let mut exchange = MockCredentialExchange::new();
        exchange
            .expect_login()
            .returning(move |_, _| Err(failure.clone()));

        let err = service(exchange, &session)
            .login("demo@example.com", "wrong-pass", None, &CancellationToken::new())
            .await
            .expect_err("login fails");

        assert_eq!(err.code(), expected);
        assert_eq!(session.current(), Some(existing));
        assert!(!session.is_pending());
    }

    #[rstest]
    #[case("not-an-email", "secret1")]
    #[case("demo@example.com", "12345")]
    #[tokio::test]
    async fn invalid_form_input_never_reaches_the_exchange(
        session: Arc<SessionStore>,
        #[case] email: &str,
        #[case] password: &str,
    ) {
        let mut exchange = MockCredentialExchange::new();
        exchange.expect_login().times(0);

        let err = service(exchange, &session)
            .login(email, password, None, &CancellationToken::new())
            .await
            .expect_err("validation fails");
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[rstest]
    #[tokio::test]
    async fn second_mutation_while_pending_is_busy(session: Arc<SessionStore>) {
        let mut exchange = MockCredentialExchange::new();
        exchange.expect_login().times(0);
        let service = service(exchange, &session);

        let _in_flight = session.try_begin().expect("first mutation begins");
        let err = service
            .login("demo@example.com", "demo123", None, &CancellationToken::new())
            .await
            .expect_err("duplicate rejected");
        assert_eq!(err.code(), ErrorCode::Busy);
    }

    #[rstest]
    #[tokio::test]
    async fn cancelled_before_call_does_not_commit(session: Arc<SessionStore>) {
        let mut exchange = MockCredentialExchange::new();
        exchange.expect_login().times(0);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = service(exchange, &session)
            .login("demo@example.com", "demo123", None, &cancel)
            .await
            .expect_err("cancelled");
        assert_eq!(err.code(), ErrorCode::Cancelled);
        assert!(!session.is_authenticated());
        assert!(!session.is_pending());
    }

    #[rstest]
    #[tokio::test]
    async fn cancellation_during_exchange_discards_the_grant(session: Arc<SessionStore>) {
        let cancel = CancellationToken::new();
        let exchange = CancellingExchange {
            cancel: cancel.clone(),
            user: identity("admin-user-1", "admin@example.com", UserRole::Admin),
        };
        let service = AuthService::new(Arc::new(exchange), session.clone());

        let err = service
            .register("admin@example.com", "admin123", "Admin", None, &cancel)
            .await
            .expect_err("abandoned");
        assert_eq!(err.code(), ErrorCode::Cancelled);
        assert!(!session.is_authenticated());
    }

    #[rstest]
    #[tokio::test]
    async fn register_installs_identity_and_lands_on_competitions(session: Arc<SessionStore>) {
        let created = identity("u-9", "new@example.com", UserRole::Organizer);
        let returned = created.clone();
        let mut exchange = MockCredentialExchange::new();
        exchange
            .expect_register()
            .times(1)
            .returning(move |_| Ok(grant(returned.clone())));

        let outcome = service(exchange, &session)
            .register(
                "new@example.com",
                "secret1",
                "Newcomer",
                Some(UserRole::Organizer),
                &CancellationToken::new(),
            )
            .await
            .expect("registration succeeds");

        assert_eq!(outcome.landing, Region::Competitions);
        assert_eq!(session.current(), Some(created));
    }

    #[rstest]
    #[tokio::test]
    async fn register_existing_email_reports_account_exists(session: Arc<SessionStore>) {
        let mut exchange = MockCredentialExchange::new();
        exchange
            .expect_register()
            .returning(|request| {
                Err(CredentialExchangeError::account_exists(
                    request.credentials().email().as_ref(),
                ))
            });

        let err = service(exchange, &session)
            .register("demo@example.com", "secret1", "Demo", None, &CancellationToken::new())
            .await
            .expect_err("duplicate account");
        assert_eq!(err.code(), ErrorCode::AccountExists);
        assert!(err.message().contains("demo@example.com"));
        assert!(!session.is_authenticated());
    }

    #[rstest]
    fn logout_clears_and_lands_on_competitions(session: Arc<SessionStore>) {
        session.login(identity("u-1", "user@example.com", UserRole::Admin));
        let service = service(MockCredentialExchange::new(), &session);
        assert_eq!(service.logout(), Region::Competitions);
        assert!(!service.session().is_authenticated());
    }
}
