//! Route admission policy.
//!
//! Every navigable region declares an [`AccessRequirement`]. Admission is a
//! pure function of that requirement and the session's current role, which
//! is `None` exactly when nobody is logged in. Decisions are never cached:
//! callers evaluate on every navigation attempt.

use std::fmt;

use super::{Region, UserRole};

/// Set of roles allowed into a region.
///
/// A small copyable bit set; the empty set is representable and admits
/// nobody.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Set containing exactly `roles`.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::{RoleSet, UserRole};
    ///
    /// let staff = RoleSet::of(&[UserRole::Organizer, UserRole::Admin]);
    /// assert!(staff.contains(UserRole::Admin));
    /// assert!(!staff.contains(UserRole::Participant));
    /// ```
    pub const fn of(roles: &[UserRole]) -> Self {
        let mut bits = 0;
        let mut index = 0;
        while index < roles.len() {
            bits |= Self::bit(roles[index]);
            index += 1;
        }
        Self(bits)
    }

    const fn bit(role: UserRole) -> u8 {
        match role {
            UserRole::Participant => 1,
            UserRole::Organizer => 1 << 1,
            UserRole::Admin => 1 << 2,
        }
    }

    /// Whether `role` is a member.
    pub const fn contains(self, role: UserRole) -> bool {
        self.0 & Self::bit(role) != 0
    }

    /// Whether the set has no members.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in privilege order.
    pub fn iter(self) -> impl Iterator<Item = UserRole> {
        UserRole::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl FromIterator<UserRole> for RoleSet {
    fn from_iter<I: IntoIterator<Item = UserRole>>(iter: I) -> Self {
        Self(iter.into_iter().fold(0, |bits, role| bits | Self::bit(role)))
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Requirement a region places on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessRequirement {
    /// Anyone may enter.
    Public,
    /// Any logged-in identity.
    RequiresAuth,
    /// Only when nobody is logged in (sign-in and registration forms).
    RequiresAnonymous,
    /// A logged-in identity whose role is in the set.
    RequiresRole(RoleSet),
}

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Proceed into the requested region.
    Admit,
    /// Navigate to the given region instead.
    Redirect(Region),
}

impl Admission {
    /// Whether the navigation may proceed.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit)
    }
}

/// Evaluate `requirement` against the session's current role.
///
/// # Examples
/// ```
/// use portal::domain::admission::admit;
/// use portal::domain::{AccessRequirement, Admission, Region, RoleSet, UserRole};
///
/// let admin_only = AccessRequirement::RequiresRole(RoleSet::of(&[UserRole::Admin]));
/// assert_eq!(admit(admin_only, None), Admission::Redirect(Region::Login));
/// assert_eq!(
///     admit(admin_only, Some(UserRole::Participant)),
///     Admission::Redirect(Region::Competitions)
/// );
/// assert_eq!(admit(admin_only, Some(UserRole::Admin)), Admission::Admit);
/// ```
pub fn admit(requirement: AccessRequirement, role: Option<UserRole>) -> Admission {
    match requirement {
        AccessRequirement::Public => Admission::Admit,
        AccessRequirement::RequiresAuth => must_be_authenticated(role),
        AccessRequirement::RequiresAnonymous => must_be_anonymous(role),
        AccessRequirement::RequiresRole(allowed) => must_have_role(role, allowed),
    }
}

/// Admit any logged-in identity; send everyone else to sign in.
pub fn must_be_authenticated(role: Option<UserRole>) -> Admission {
    match role {
        Some(_) => Admission::Admit,
        None => Admission::Redirect(Region::Login),
    }
}

/// Admit only anonymous sessions; send logged-in identities to the landing
/// region.
pub fn must_be_anonymous(role: Option<UserRole>) -> Admission {
    match role {
        Some(_) => Admission::Redirect(Region::LANDING),
        None => Admission::Admit,
    }
}

/// Admit identities whose role is in `allowed`.
///
/// Authentication is checked first: anonymous sessions go to sign in so they
/// have a path to the required role, while logged-in identities lacking it go
/// to the landing region. An empty `allowed` set never admits.
pub fn must_have_role(role: Option<UserRole>, allowed: RoleSet) -> Admission {
    match role {
        None => Admission::Redirect(Region::Login),
        Some(role) if allowed.contains(role) => Admission::Admit,
        Some(_) => Admission::Redirect(Region::LANDING),
    }
}
