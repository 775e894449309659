//! Identity data model.
//!
//! [`User`] is the authenticated principal held by the session store and
//! mirrored into the durable slot. Its serialised shape is the slot wire
//! format: `{ id, email, name, role, avatarUrl?, bio? }`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by identity constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    UnknownRole { value: String },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not contain surrounding whitespace"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like name@domain"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::UnknownRole { value } => write!(
                f,
                "role must be one of participant, organizer, admin (got {value})"
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Opaque, stable user identifier.
///
/// Identifiers issued by the credential exchange are not required to be
/// UUIDs (seeded accounts use ids such as `demo-user-1`); locally generated
/// ones are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^\s@]+@[^\s@]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Login key for an account.
///
/// ## Invariants
/// - Trimmed and non-empty.
/// - Exactly one `@` separating a non-empty local part from a non-empty
///   domain, with no whitespace anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`]; surrounding whitespace is trimmed.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::Email;
    ///
    /// let email = Email::new("  demo@example.com ").expect("valid email");
    /// assert_eq!(email.as_ref(), "demo@example.com");
    /// assert_eq!(email.local_part(), "demo");
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = email.as_ref().trim();
        if normalized.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(normalized) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Portion of the address before `@`.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name, in characters.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Human readable display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(display_name.into())
    }

    fn from_owned(display_name: String) -> Result<Self, UserValidationError> {
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(display_name))
    }

    /// Number of characters in the name.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Role determining which regions a session may enter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Competition participant; the default role.
    #[default]
    Participant,
    /// Runs competitions.
    Organizer,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// Every role, in privilege order.
    pub const ALL: [Self; 3] = [Self::Participant, Self::Organizer, Self::Admin];

    /// Lowercase wire form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Organizer => "organizer",
            Self::Admin => "admin",
        }
    }

    /// Label shown on the profile page.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Participant => "Participant",
            Self::Organizer => "Organizer",
            Self::Admin => "Administrator",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UserValidationError::UnknownRole {
                value: value.to_owned(),
            })
    }
}

/// Field patch applied by profile updates.
///
/// Absent fields leave the current value untouched; there is no way to clear
/// a field through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Replacement display name.
    pub name: Option<DisplayName>,
    /// Replacement avatar URL.
    pub avatar_url: Option<String>,
    /// Replacement biography.
    pub bio: Option<String>,
}

impl ProfileUpdate {
    /// Set the replacement display name.
    pub fn with_name(mut self, name: DisplayName) -> Self {
        self.name = Some(name);
        self
    }

    /// Set the replacement avatar URL; blank input is treated as absent.
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = non_blank(avatar_url.into());
        self
    }

    /// Set the replacement biography.
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar_url.is_none() && self.bio.is_none()
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Authenticated principal.
///
/// ## Invariants
/// - `id` is non-empty and carries no surrounding whitespace.
/// - `email` is a syntactically valid, non-empty address.
/// - `role` is always one of the three [`UserRole`] values.
///
/// # Examples
/// ```
/// use portal::domain::{DisplayName, Email, User, UserId, UserRole};
///
/// let user = User::new(
///     UserId::new("demo-user-1").expect("id"),
///     Email::new("demo@example.com").expect("email"),
///     DisplayName::new("Demo User").expect("name"),
///     UserRole::Participant,
/// );
/// assert_eq!(user.role(), UserRole::Participant);
/// assert!(user.bio().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    email: Email,
    name: DisplayName,
    role: UserRole,
    avatar_url: Option<String>,
    bio: Option<String>,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, email: Email, name: DisplayName, role: UserRole) -> Self {
        Self {
            id,
            email,
            name,
            role,
            avatar_url: None,
            bio: None,
        }
    }

    /// Attach an avatar URL.
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    /// Attach a biography.
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login key.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Display name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Role granting access to regions.
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Avatar URL, if one was set.
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Biography, if one was set.
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    /// First letter of the display name, upper-cased; used as an avatar
    /// placeholder.
    pub fn initial(&self) -> char {
        self.name
            .as_ref()
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('U')
    }

    /// Merge `patch` into a copy of this identity.
    ///
    /// Only the patch's present fields are replaced; `id`, `email`, and
    /// `role` are never altered.
    pub fn patched(&self, patch: &ProfileUpdate) -> Self {
        Self {
            id: self.id.clone(),
            email: self.email.clone(),
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            role: self.role,
            avatar_url: patch.avatar_url.clone().or_else(|| self.avatar_url.clone()),
            bio: patch.bio.clone().or_else(|| self.bio.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
struct UserDto {
    id: String,
    email: String,
    name: String,
    role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            email,
            name,
            role,
            avatar_url,
            bio,
        } = value;
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            role,
            avatar_url,
            bio,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        let UserDto {
            id,
            email,
            name,
            role,
            avatar_url,
            bio,
        } = value;
        Ok(Self {
            id: UserId::new(id)?,
            email: Email::new(email)?,
            name: DisplayName::new(name)?,
            role,
            avatar_url,
            bio,
        })
    }
}

#[cfg(test)]
mod tests;
