//! Domain primitives, services, and ports.
//!
//! Purpose: define strongly typed entities for identities, credentials,
//! competitions, and route requirements, together with the services that
//! mutate the single process-wide session. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - `SessionStore` — sole owner of the current identity.
//! - `AuthService` / `ProfileEditor` — exchange-backed session mutations.
//! - `ParticipationService` — competition browsing and answer submission.
//! - `admission` — route requirement evaluation.

pub mod admission;
pub mod auth;
pub mod auth_service;
pub mod competitions;
pub mod error;
pub mod participation;
pub mod ports;
pub mod profile_editor;
pub mod region;
pub mod session;
pub mod user;

pub use self::admission::{AccessRequirement, Admission, RoleSet};
pub use self::auth::{CredentialsValidationError, LoginCredentials, RegistrationRequest};
pub use self::auth_service::{AuthService, Authenticated};
pub use self::competitions::{
    Answer, CompetitionDetails, CompetitionId, CompetitionStatus, CompetitionSummary,
    CompetitionTask, CompetitionValidationError, Submission, SubmissionStatus, SubmissionType,
    TaskId,
};
pub use self::error::{Error, ErrorCode};
pub use self::participation::ParticipationService;
pub use self::profile_editor::ProfileEditor;
pub use self::region::Region;
pub use self::session::{PendingMutation, SessionStore, SlotBinding, DEFAULT_SLOT_KEY};
pub use self::user::{DisplayName, Email, ProfileUpdate, User, UserId, UserRole, UserValidationError};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use portal::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<u32> {
///     Err(Error::not_found("missing"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
