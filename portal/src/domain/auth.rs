//! Authentication primitives such as login credentials.
//!
//! Keep form parsing outside the domain by exposing constructors that
//! validate string inputs before a view talks to the credential exchange.

use std::fmt;

use zeroize::Zeroizing;

use super::{DisplayName, Email, UserRole, UserValidationError};

/// Minimum password length accepted by login and registration forms.
pub const PASSWORD_MIN: usize = 6;
/// Minimum display name length accepted at registration.
pub const REGISTRATION_NAME_MIN: usize = 2;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email failed shape validation.
    Email(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Display name failed validation.
    Name(UserValidationError),
    /// Display name was shorter than [`REGISTRATION_NAME_MIN`].
    NameTooShort { min: usize },
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) | Self::Name(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::NameTooShort { min } => write!(f, "name must be at least {min} characters"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated login credentials passed to the credential exchange.
///
/// ## Invariants
/// - `email` is trimmed and syntactically valid.
/// - `password` has at least [`PASSWORD_MIN`] characters and retains
///   caller-provided whitespace to avoid surprising comparisons.
///
/// # Examples
/// ```
/// use portal::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("demo@example.com", "demo123").unwrap();
/// assert_eq!(creds.email().as_ref(), "demo@example.com");
/// assert_eq!(creds.password(), "demo123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(CredentialsValidationError::Email)?;

        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Login key.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated account registration request.
///
/// The role defaults to [`UserRole::Participant`] when not supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    credentials: LoginCredentials,
    name: DisplayName,
    role: UserRole,
}

impl RegistrationRequest {
    /// Validate raw registration form inputs.
    pub fn try_new(
        email: &str,
        password: &str,
        name: &str,
        role: Option<UserRole>,
    ) -> Result<Self, CredentialsValidationError> {
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        let name = DisplayName::new(name.trim()).map_err(CredentialsValidationError::Name)?;
        if name.char_count() < REGISTRATION_NAME_MIN {
            return Err(CredentialsValidationError::NameTooShort {
                min: REGISTRATION_NAME_MIN,
            });
        }
        Ok(Self {
            credentials,
            name,
            role: role.unwrap_or_default(),
        })
    }

    /// Email and password for the new account.
    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    /// Display name for the new account.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Requested role.
    pub fn role(&self) -> UserRole {
        self.role
    }
}
