//! Navigation driven by the route table and the live session.
//!
//! Admission is evaluated on every attempt; nothing is cached between
//! navigations, so a login or logout takes effect on the very next request.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::admission::admit;
use crate::domain::{Admission, Region, SessionStore, UserRole};

/// Redirects followed before falling back to the landing region.
pub const MAX_REDIRECTS: usize = 4;

/// Header links in display order, before admission filtering.
const HEADER_CANDIDATES: [Region; 6] = [
    Region::Competitions,
    Region::Organizer,
    Region::Admin,
    Region::Profile,
    Region::Login,
    Region::Register,
];

/// Result of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Path as supplied by the caller.
    pub requested: String,
    /// Region finally entered.
    pub landed: Region,
    /// Redirect targets in the order they were followed.
    pub redirects: Vec<Region>,
}

impl NavigationOutcome {
    /// Whether the caller ended up somewhere other than requested.
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Tracks the current region and admits navigation requests.
#[derive(Debug)]
pub struct Navigator {
    session: Arc<SessionStore>,
    current: Region,
}

impl Navigator {
    /// Navigator positioned on the landing region.
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            current: Region::LANDING,
        }
    }

    /// Region most recently entered.
    pub fn current(&self) -> &Region {
        &self.current
    }

    /// Attempt to enter `path`, following redirects until a region admits
    /// the session.
    ///
    /// Unknown paths are redirected to the landing region. The chain is
    /// bounded by [`MAX_REDIRECTS`]; the landing region is public, so every
    /// navigation ends somewhere.
    pub fn navigate(&mut self, path: &str) -> NavigationOutcome {
        let mut redirects = Vec::new();
        let mut target = Region::parse(path).unwrap_or_else(|| {
            debug!(path, "no route matches; redirecting to landing");
            redirects.push(Region::LANDING);
            Region::LANDING
        });

        let landed = loop {
            let role = self.session.current_role();
            match admit(target.requirement(), role) {
                Admission::Admit => {
                    debug!(region = %target, role = ?role, "admitted");
                    break target;
                }
                Admission::Redirect(next) if redirects.len() < MAX_REDIRECTS => {
                    debug!(from = %target, to = %next, role = ?role, "admission redirect");
                    redirects.push(next.clone());
                    target = next;
                }
                Admission::Redirect(_) => {
                    warn!(path, hops = redirects.len(), "redirect limit reached");
                    redirects.push(Region::LANDING);
                    break Region::LANDING;
                }
            }
        };

        self.current = landed.clone();
        NavigationOutcome {
            requested: path.to_owned(),
            landed,
            redirects,
        }
    }
}

/// Header links visible to a session holding `role`.
///
/// A link is shown exactly when its region would admit the session, so the
/// header never offers a destination that would bounce.
pub fn header_links(role: Option<UserRole>) -> Vec<Region> {
    HEADER_CANDIDATES
        .into_iter()
        .filter(|region| admit(region.requirement(), role).is_admitted())
        .collect()
}
