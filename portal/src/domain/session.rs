//! Process-wide session state.
//!
//! [`SessionStore`] is the single owner of the current identity. It is
//! constructed once per application instance and shared by reference (or
//! `Arc`); nothing outside its API can mutate the identity. When bound to a
//! durable slot it mirrors every change there and restores from it at
//! construction; a headless store (non-interactive rendering context) never
//! persists and always starts logged out.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::ports::DurableSlot;
use super::{ProfileUpdate, User, UserId, UserRole};

/// Slot key under which the serialised identity is stored.
pub const DEFAULT_SLOT_KEY: &str = "nado_user";

/// A durable slot together with the key the session occupies in it.
#[derive(Clone)]
pub struct SlotBinding {
    slot: Arc<dyn DurableSlot>,
    key: String,
}

impl SlotBinding {
    /// Bind `slot` under [`DEFAULT_SLOT_KEY`].
    pub fn new(slot: Arc<dyn DurableSlot>) -> Self {
        Self {
            slot,
            key: DEFAULT_SLOT_KEY.to_owned(),
        }
    }

    /// Use `key` instead of the default.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Key the identity is stored under.
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    fn load(&self) -> Option<User> {
        let raw = match self.slot.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(key = %self.key, %error, "session slot unreadable; starting logged out");
                return None;
            }
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(error) => {
                warn!(key = %self.key, %error, "discarding malformed session slot value");
                None
            }
        }
    }

    fn store(&self, identity: &User) {
        let raw = match serde_json::to_string(identity) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(key = %self.key, %error, "failed to serialise session identity");
                return;
            }
        };
        if let Err(error) = self.slot.write(&self.key, &raw) {
            warn!(key = %self.key, %error, "failed to persist session identity");
        }
    }

    fn erase(&self) {
        if let Err(error) = self.slot.remove(&self.key) {
            warn!(key = %self.key, %error, "failed to erase session slot");
        }
    }
}

impl fmt::Debug for SlotBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotBinding").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Owner of the current identity.
///
/// ## Invariants
/// - At most one identity is current.
/// - The durable slot, when bound, is only written through this type and
///   always mirrors the last committed identity (or its absence).
///
/// # Examples
/// ```
/// use portal::domain::{DisplayName, Email, SessionStore, User, UserId, UserRole};
///
/// let session = SessionStore::headless();
/// assert!(!session.is_authenticated());
///
/// session.login(User::new(
///     UserId::new("demo-user-1").unwrap(),
///     Email::new("demo@example.com").unwrap(),
///     DisplayName::new("Demo User").unwrap(),
///     UserRole::Participant,
/// ));
/// assert_eq!(session.current_role(), Some(UserRole::Participant));
///
/// session.logout();
/// assert!(!session.is_authenticated());
/// ```
pub struct SessionStore {
    current: watch::Sender<Option<User>>,
    binding: Option<SlotBinding>,
    pending: AtomicBool,
    commit: Mutex<()>,
}

impl SessionStore {
    /// Store for a non-interactive rendering context: no persistence and no
    /// restoration.
    pub fn headless() -> Self {
        Self::with_state(None, None)
    }

    /// Store bound to a durable slot, restoring any identity it holds.
    ///
    /// Unreadable or malformed slot contents are logged and treated as no
    /// session; construction never fails.
    pub fn restore(binding: SlotBinding) -> Self {
        let restored = binding.load();
        match &restored {
            Some(user) => info!(user_id = %user.id(), role = %user.role(), "session restored"),
            None => debug!(key = %binding.key(), "no session to restore"),
        }
        Self::with_state(Some(binding), restored)
    }

    fn with_state(binding: Option<SlotBinding>, initial: Option<User>) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current,
            binding,
            pending: AtomicBool::new(false),
            commit: Mutex::new(()),
        }
    }

    /// Snapshot of the current identity.
    pub fn current(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    /// True iff an identity is current.
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Role of the current identity.
    pub fn current_role(&self) -> Option<UserRole> {
        self.current.borrow().as_ref().map(User::role)
    }

    /// Observe identity changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }

    /// Whether changes are mirrored to a durable slot.
    pub fn is_persistent(&self) -> bool {
        self.binding.is_some()
    }

    /// Install `identity` after a successful login, replacing any existing
    /// session without merging.
    pub fn login(&self, identity: User) {
        self.install(identity, "login");
    }

    /// Install `identity` after a successful registration.
    pub fn register(&self, identity: User) {
        self.install(identity, "register");
    }

    fn install(&self, identity: User, via: &'static str) {
        let _commit = self.lock_commit();
        info!(user_id = %identity.id(), role = %identity.role(), via, "session installed");
        if let Some(binding) = &self.binding {
            binding.store(&identity);
        }
        self.current.send_replace(Some(identity));
    }

    /// Merge `patch` into the current identity and persist the result.
    ///
    /// Returns `false` without touching any state when no session is
    /// current. `id`, `email`, and `role` are never altered.
    pub fn update_profile(&self, patch: &ProfileUpdate) -> bool {
        self.patch_current(patch, |_| true).is_some()
    }

    /// Merge `patch` only while `owner` is still the current identity and
    /// return the patched identity.
    ///
    /// Returns `None` without touching any state when nobody is logged in
    /// or a different identity has been installed since.
    pub fn update_profile_for(&self, owner: &UserId, patch: &ProfileUpdate) -> Option<User> {
        self.patch_current(patch, |user| user.id() == owner)
    }

    fn patch_current(
        &self,
        patch: &ProfileUpdate,
        owned: impl Fn(&User) -> bool,
    ) -> Option<User> {
        let _commit = self.lock_commit();
        let patched = match self.current.borrow().as_ref() {
            Some(user) if owned(user) => Some(user.patched(patch)),
            Some(user) => {
                debug!(user_id = %user.id(), "profile update ignored: identity changed");
                None
            }
            None => {
                debug!("profile update ignored: no active session");
                None
            }
        };
        let updated = patched?;
        info!(user_id = %updated.id(), empty = patch.is_empty(), "profile patched");
        if let Some(binding) = &self.binding {
            binding.store(&updated);
        }
        self.current.send_replace(Some(updated.clone()));
        Some(updated)
    }

    /// Clear the current identity and erase the durable slot entry.
    ///
    /// Idempotent: logging out with no session is a no-op apart from the
    /// slot erase.
    pub fn logout(&self) {
        let _commit = self.lock_commit();
        if let Some(previous) = self.current.send_replace(None) {
            info!(user_id = %previous.id(), "session cleared");
        }
        if let Some(binding) = &self.binding {
            binding.erase();
        }
    }

    /// Mark a session mutation as in flight.
    ///
    /// Returns `None` when another mutation already holds the marker; the
    /// caller must reject the duplicate submission. The marker clears when
    /// the guard drops.
    pub fn try_begin(&self) -> Option<PendingMutation<'_>> {
        PendingMutation::acquire(&self.pending)
    }

    /// Whether a mutation is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    fn lock_commit(&self) -> MutexGuard<'_, ()> {
        self.commit.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &*self.current.borrow())
            .field("binding", &self.binding)
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// In-flight marker returned by [`SessionStore::try_begin`].
#[derive(Debug)]
#[must_use = "the mutation is only marked in flight while the guard lives"]
pub struct PendingMutation<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PendingMutation<'a> {
    /// Raise `flag`, failing when it is already raised.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for PendingMutation<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
