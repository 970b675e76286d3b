//! The session store: one owned object holding [`SessionState`] for the
//! lifetime of the application.
//!
//! ARCHITECTURE
//! ============
//! `initialize`, `login`, `logout`, `update_user` and the change-notification
//! pump all write the same state. User writes are ordered by tickets drawn
//! from one counter, not by the order their async work happens to finish:
//!
//! - `initialize` draws its ticket when it starts, a login when the source
//!   accepts its credentials, a notification when the listener receives it,
//!   and `logout`/`update_user` when they write.
//! - `applied` is the ticket of the user currently published. A write whose
//!   ticket is not newer is dropped as stale, so a slow role lookup never
//!   overwrites a later login, sign-out or profile edit.
//! - `pending_logins`: while non-zero, notifications are parked in
//!   `deferred` (latest wins) instead of being published, and nothing but a
//!   login clears `is_loading`. The last login to finish publishes the parked
//!   change if its ticket is still newer than what was applied.
//!
//! After [`SessionSubscription::unsubscribe`] the store is torn down and every
//! later write, including writes from suspended calls, is discarded.
//!
//! ERROR HANDLING
//! ==============
//! Nothing leaves this module as an error. Collaborator failures become state
//! transitions (anonymous, metadata role) or a `false` login result, and are
//! logged.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::StreamExt;
use futures::channel::mpsc;
use futures::future::{Either, FutureExt, LocalBoxFuture};

use crate::cache::{SessionCache, decode_user, encode_user};
use crate::error::SessionError;
use crate::source::{AuthChange, ListenerId, RoleResolver, SessionSource, Sleeper};
use crate::state::{SessionPhase, SessionState};
use crate::user::{Principal, RoleLookup, SessionUser, SessionUserPatch};

/// Default bound on a role lookup before falling back to the metadata role.
pub const DEFAULT_ROLE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Store settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Route returned by [`SessionStore::logout`].
    pub sign_in_path: String,
    /// Limit for role lookups; only enforced when a [`Sleeper`] is set.
    pub role_lookup_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { sign_in_path: "/login".to_owned(), role_lookup_timeout: Some(DEFAULT_ROLE_LOOKUP_TIMEOUT) }
    }
}

type Sink = Rc<dyn Fn(&SessionState)>;

#[derive(Default)]
struct Inner {
    state: SessionState,
    started: bool,
    initializing: bool,
    pending_logins: u32,
    /// Last ticket handed out.
    seq: u64,
    /// Ticket of the write reflected in `state.user`.
    applied: u64,
    deferred: Option<Deferred>,
    torn_down: bool,
}

impl Inner {
    fn next_ticket(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Publish `user` unless a newer write has already been applied.
    fn apply_user(&mut self, ticket: u64, user: Option<SessionUser>) -> bool {
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        self.state.user = user;
        true
    }
}

/// A notification received while a login was in flight.
struct Deferred {
    ticket: u64,
    user: Option<SessionUser>,
}

struct Shared {
    source: Rc<dyn SessionSource>,
    resolver: Option<Rc<dyn RoleResolver>>,
    cache: Rc<dyn SessionCache>,
    sleeper: Option<Rc<dyn Sleeper>>,
    config: SessionConfig,
    sink: Option<Sink>,
    inner: RefCell<Inner>,
}

/// Builder for [`SessionStore`].
pub struct SessionStoreBuilder {
    source: Rc<dyn SessionSource>,
    cache: Rc<dyn SessionCache>,
    resolver: Option<Rc<dyn RoleResolver>>,
    sleeper: Option<Rc<dyn Sleeper>>,
    config: SessionConfig,
    sink: Option<Sink>,
}

impl SessionStoreBuilder {
    /// Resolve roles through a secondary lookup instead of principal metadata.
    #[must_use]
    pub fn role_resolver(mut self, resolver: Rc<dyn RoleResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Timer used to bound role lookups.
    #[must_use]
    pub fn sleeper(mut self, sleeper: Rc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Callback invoked with every published state.
    #[must_use]
    pub fn on_publish(mut self, sink: impl Fn(&SessionState) + 'static) -> Self {
        self.sink = Some(Rc::new(sink));
        self
    }

    #[must_use]
    pub fn build(self) -> SessionStore {
        SessionStore {
            shared: Rc::new(Shared {
                source: self.source,
                resolver: self.resolver,
                cache: self.cache,
                sleeper: self.sleeper,
                config: self.config,
                sink: self.sink,
                inner: RefCell::new(Inner::default()),
            }),
        }
    }
}

/// Process-wide session store. Clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    shared: Rc<Shared>,
}

impl SessionStore {
    pub fn builder(source: Rc<dyn SessionSource>, cache: Rc<dyn SessionCache>) -> SessionStoreBuilder {
        SessionStoreBuilder {
            source,
            cache,
            resolver: None,
            sleeper: None,
            config: SessionConfig::default(),
            sink: None,
        }
    }

    /// Snapshot of the published state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.inner.borrow().state.clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        let inner = self.shared.inner.borrow();
        if inner.pending_logins > 0 {
            SessionPhase::LoginPending
        } else if !inner.started {
            SessionPhase::Uninitialized
        } else if inner.state.is_loading {
            SessionPhase::Loading
        } else if inner.state.user.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    /// Whether any `login()` call has not finished yet.
    #[must_use]
    pub fn is_login_in_flight(&self) -> bool {
        self.shared.inner.borrow().pending_logins > 0
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.shared.inner.borrow().torn_down
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Resolve the session at mount.
    ///
    /// Publishes any cached user first, then asks the remote source and
    /// publishes the merged result. `is_loading` stays set until that
    /// resolution finishes.
    pub async fn initialize(&self) {
        let ticket = {
            let mut inner = self.shared.inner.borrow_mut();
            inner.started = true;
            inner.initializing = true;
            inner.next_ticket()
        };

        let cached = self.read_cached_user();
        self.write(|inner| {
            inner.state.is_loading = true;
            if cached.is_some() {
                inner.state.user = cached;
            }
            true
        });

        let resolved = match self.shared.source.current_principal().await {
            Ok(Some(principal)) => Some(self.merge(&principal).await),
            Ok(None) => None,
            Err(e) => {
                log::warn!("session check failed, continuing anonymous: {e}");
                None
            }
        };

        let mut applied = false;
        let published = self.write(|inner| {
            inner.initializing = false;
            applied = inner.apply_user(ticket, resolved.clone());
            if !applied {
                log::debug!("initial session resolution overtaken by a newer write");
            }
            if inner.pending_logins == 0 {
                inner.state.is_loading = false;
            }
            true
        });
        if published && applied {
            self.persist(resolved.as_ref());
        }
        log::info!(
            "session initialized: {}",
            resolved.as_ref().map_or("anonymous", |u| u.role.as_str())
        );
    }

    /// Register for change notifications from the remote source.
    ///
    /// Returns the deregistration handle and a pump future that handles
    /// notifications in delivery order. The caller spawns the pump on its
    /// local executor; it completes after [`SessionSubscription::unsubscribe`].
    pub fn subscribe(&self) -> (SessionSubscription, LocalBoxFuture<'static, ()>) {
        let (tx, mut rx) = mpsc::unbounded::<(u64, AuthChange)>();
        let shared = Rc::downgrade(&self.shared);
        let id = self.shared.source.add_listener(Rc::new(move |change| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let ticket = shared.inner.borrow_mut().next_ticket();
            if tx.unbounded_send((ticket, change)).is_err() {
                log::debug!("auth change dropped: pump already finished");
            }
        }));

        let store = self.clone();
        let pump = async move {
            while let Some((ticket, change)) = rx.next().await {
                if store.is_torn_down() {
                    break;
                }
                store.handle_change(ticket, change).await;
            }
        }
        .boxed_local();

        (SessionSubscription { store: Some(self.clone()), id }, pump)
    }

    /// Sign in with email and password.
    ///
    /// Returns `true` when the credentials were accepted. Navigation is the
    /// caller's job. Never fails past this boundary.
    ///
    /// Concurrent logins publish in the order the source accepted them. The
    /// last one to finish also applies any notification parked meanwhile.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.shared.inner.borrow_mut().pending_logins += 1;

        let accepted = match self.shared.source.sign_in(email, password).await {
            Ok(principal) => {
                let ticket = self.shared.inner.borrow_mut().next_ticket();
                Some((ticket, self.merge(&principal).await))
            }
            Err(SessionError::InvalidCredentials) => {
                log::info!("login rejected for {email}");
                None
            }
            Err(e) => {
                log::warn!("login failed: {e}");
                None
            }
        };

        self.shared.inner.borrow_mut().pending_logins -= 1;

        let mut written = None;
        let published = self.write(|inner| {
            if let Some((ticket, user)) = &accepted {
                if inner.apply_user(*ticket, Some(user.clone())) {
                    written = Some(Some(user.clone()));
                } else {
                    log::debug!("login for {email} overtaken by a newer session change");
                }
            }
            if inner.pending_logins == 0 {
                if let Some(deferred) = inner.deferred.take() {
                    if inner.apply_user(deferred.ticket, deferred.user.clone()) {
                        written = Some(deferred.user);
                    }
                }
                if !inner.initializing {
                    inner.state.is_loading = false;
                }
            }
            true
        });
        if published {
            if let Some(user) = written {
                self.persist(user.as_ref());
            }
        }
        accepted.is_some()
    }

    /// End the session and return the sign-in route to navigate to.
    ///
    /// Calling it while already signed out, with no login in flight, only
    /// returns the route.
    pub async fn logout(&self) -> String {
        let already_out = {
            let inner = self.shared.inner.borrow();
            inner.state.user.is_none() && !inner.state.is_loading && inner.pending_logins == 0
        };
        if already_out {
            return self.shared.config.sign_in_path.clone();
        }

        if let Err(e) = self.shared.source.sign_out().await {
            log::warn!("remote sign-out failed, clearing local session anyway: {e}");
        }
        let published = self.write(|inner| {
            let ticket = inner.next_ticket();
            inner.apply_user(ticket, None);
            inner.state.is_loading = false;
            true
        });
        if published {
            self.persist(None);
        }
        self.shared.config.sign_in_path.clone()
    }

    /// Overwrite fields of the published user without asking the remote
    /// source. Returns `false` when nobody is signed in.
    pub fn update_user(&self, patch: SessionUserPatch) -> bool {
        let mut updated = None;
        let published = self.write(|inner| {
            let Some(user) = inner.state.user.as_mut() else {
                return false;
            };
            user.apply(patch);
            updated = Some(user.clone());
            inner.applied = inner.next_ticket();
            true
        });
        if published {
            self.persist(updated.as_ref());
        }
        published
    }

    async fn handle_change(&self, ticket: u64, change: AuthChange) {
        let user = match &change.principal {
            Some(principal) => Some(self.merge(principal).await),
            None => None,
        };

        let published = self.write(|inner| {
            if ticket <= inner.applied {
                log::debug!("{:?} dropped as stale", change.event);
                return false;
            }
            if inner.pending_logins > 0 {
                if inner.deferred.as_ref().is_none_or(|d| d.ticket < ticket) {
                    inner.deferred = Some(Deferred { ticket, user: user.clone() });
                }
                log::debug!("{:?} deferred until the in-flight login finishes", change.event);
                return false;
            }
            inner.apply_user(ticket, user.clone());
            inner.state.is_loading = false;
            true
        });
        if published {
            self.persist(user.as_ref());
        }
    }

    async fn merge(&self, principal: &Principal) -> SessionUser {
        let lookup = match &self.shared.resolver {
            Some(resolver) => match self.lookup_role(resolver.as_ref(), &principal.id).await {
                Ok(found) => found,
                Err(e) => {
                    log::warn!("role lookup for {} failed, using metadata role: {e}", principal.id);
                    None
                }
            },
            None => None,
        };
        SessionUser::from_principal(principal, lookup.as_ref())
    }

    async fn lookup_role(&self, resolver: &dyn RoleResolver, id: &str) -> Result<Option<RoleLookup>, SessionError> {
        let lookup = resolver.lookup(id);
        match (&self.shared.sleeper, self.shared.config.role_lookup_timeout) {
            (Some(sleeper), Some(limit)) => match futures::future::select(lookup, sleeper.sleep(limit)).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => Err(SessionError::Timeout(limit)),
            },
            _ => lookup.await,
        }
    }

    /// Apply `mutate` and publish the new state unless the store is torn down
    /// or `mutate` reports no change. Returns whether a publish happened.
    fn write(&self, mutate: impl FnOnce(&mut Inner) -> bool) -> bool {
        let snapshot = {
            let mut inner = self.shared.inner.borrow_mut();
            if inner.torn_down {
                log::debug!("session store torn down, write discarded");
                return false;
            }
            if !mutate(&mut inner) {
                return false;
            }
            inner.state.clone()
        };
        if let Some(sink) = &self.shared.sink {
            sink(&snapshot);
        }
        true
    }

    fn read_cached_user(&self) -> Option<SessionUser> {
        let raw = match self.shared.cache.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("session cache unreadable: {e}");
                return None;
            }
        };
        match decode_user(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("discarding malformed cached session: {e}");
                if let Err(e) = self.shared.cache.clear() {
                    log::warn!("failed to clear session cache: {e}");
                }
                None
            }
        }
    }

    fn persist(&self, user: Option<&SessionUser>) {
        let result = match user {
            Some(user) => encode_user(user).and_then(|raw| self.shared.cache.store(&raw)),
            None => self.shared.cache.clear(),
        };
        if let Err(e) = result {
            log::warn!("failed to update session cache: {e}");
        }
    }
}

/// Deregistration handle returned by [`SessionStore::subscribe`].
///
/// Unsubscribing (or dropping the handle) removes the listener from the
/// remote source and tears the store down. It runs at most once.
pub struct SessionSubscription {
    store: Option<SessionStore>,
    id: ListenerId,
}

impl SessionSubscription {
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(store) = self.store.take() {
            store.shared.source.remove_listener(self.id);
            store.shared.inner.borrow_mut().torn_down = true;
            log::debug!("session subscription released");
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.release();
    }
}
