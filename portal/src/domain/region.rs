//! Navigable regions and the static route table.

use std::fmt;

use super::admission::{AccessRequirement, RoleSet};
use super::{CompetitionId, UserRole};

const STAFF: RoleSet = RoleSet::of(&[UserRole::Organizer, UserRole::Admin]);
const ADMIN_ONLY: RoleSet = RoleSet::of(&[UserRole::Admin]);

/// A navigable region of the portal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Region {
    /// Sign-in form.
    Login,
    /// Registration form.
    Register,
    /// Competition listing; the default landing region.
    Competitions,
    /// One competition's description.
    Competition(CompetitionId),
    /// Answer submission for one competition.
    Participate(CompetitionId),
    /// The current user's profile.
    Profile,
    /// Organizer dashboard.
    Organizer,
    /// Administrator dashboard.
    Admin,
}

impl Region {
    /// Default region for logged-in identities and unknown paths.
    pub const LANDING: Self = Self::Competitions;

    /// Resolve a path against the route table.
    ///
    /// Leading and trailing slashes, query strings, and fragments are
    /// ignored. The empty path and `/auth` are aliases for the competition
    /// listing and the sign-in form. Returns `None` for paths no route
    /// matches.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::{CompetitionId, Region};
    ///
    /// assert_eq!(Region::parse("/"), Some(Region::Competitions));
    /// assert_eq!(
    ///     Region::parse("/competitions/1/participate?tab=2"),
    ///     Some(Region::Participate(CompetitionId::new("1").unwrap()))
    /// );
    /// assert_eq!(Region::parse("/nowhere"), None);
    /// ```
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Self::Competitions),
            ["auth"] | ["auth", "login"] => Some(Self::Login),
            ["auth", "register"] => Some(Self::Register),
            ["competitions"] => Some(Self::Competitions),
            ["competitions", id] => CompetitionId::new(*id).ok().map(Self::Competition),
            ["competitions", id, "participate"] => {
                CompetitionId::new(*id).ok().map(Self::Participate)
            }
            ["profile"] => Some(Self::Profile),
            ["organizer"] => Some(Self::Organizer),
            ["admin"] => Some(Self::Admin),
            _ => None,
        }
    }

    /// Canonical path.
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/auth/login".to_owned(),
            Self::Register => "/auth/register".to_owned(),
            Self::Competitions => "/competitions".to_owned(),
            Self::Competition(id) => format!("/competitions/{id}"),
            Self::Participate(id) => format!("/competitions/{id}/participate"),
            Self::Profile => "/profile".to_owned(),
            Self::Organizer => "/organizer".to_owned(),
            Self::Admin => "/admin".to_owned(),
        }
    }

    /// Document title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in — NADO",
            Self::Register => "Registration — NADO",
            Self::Competitions => "Competitions — NADO",
            Self::Competition(_) => "Competition — NADO",
            Self::Participate(_) => "Participation — NADO",
            Self::Profile => "Profile — NADO",
            Self::Organizer => "Organizer — NADO",
            Self::Admin => "Admin — NADO",
        }
    }

    /// Requirement the session must meet to enter.
    pub fn requirement(&self) -> AccessRequirement {
        match self {
            Self::Login | Self::Register => AccessRequirement::RequiresAnonymous,
            Self::Competitions | Self::Competition(_) => AccessRequirement::Public,
            Self::Participate(_) | Self::Profile => AccessRequirement::RequiresAuth,
            Self::Organizer => AccessRequirement::RequiresRole(STAFF),
            Self::Admin => AccessRequirement::RequiresRole(ADMIN_ONLY),
        }
    }

    /// Where a freshly logged-in identity lands.
    pub fn landing_for(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::Organizer => Self::Organizer,
            UserRole::Participant => Self::Competitions,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
