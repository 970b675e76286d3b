//! Collaborator seams: remote session source, role resolver and timer.
//!
//! ARCHITECTURE
//! ============
//! The client runs on a single-threaded event loop, so these traits are
//! `?Send` and listeners are plain `Rc` closures. Adapters for the REST
//! backend and the hosted auth service live in the client crate.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::error::SessionError;
use crate::user::{Principal, RoleLookup};

/// Kind of change reported by the remote session source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// A change notification: the event plus the principal now in effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub principal: Option<Principal>,
}

/// Callback registered with [`SessionSource::add_listener`].
pub type AuthListener = Rc<dyn Fn(AuthChange)>;

/// Handle identifying a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The remote authority for "who is signed in".
#[async_trait::async_trait(?Send)]
pub trait SessionSource {
    /// Current principal, or `None` when nobody is signed in.
    async fn current_principal(&self) -> Result<Option<Principal>, SessionError>;

    /// Check credentials and start a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, SessionError>;

    /// End the remote session.
    async fn sign_out(&self) -> Result<(), SessionError>;

    /// Register for change notifications. Delivery may be synchronous.
    fn add_listener(&self, listener: AuthListener) -> ListenerId;

    /// Deregister a listener; unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

/// Secondary lookup mapping a principal id to its role.
#[async_trait::async_trait(?Send)]
pub trait RoleResolver {
    /// `Ok(None)` means the resolver has no record for this principal.
    async fn lookup(&self, principal_id: &str) -> Result<Option<RoleLookup>, SessionError>;
}

/// Timer used to bound role lookups.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Listener registry for [`SessionSource`] implementations.
#[derive(Default)]
pub struct Listeners {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(ListenerId, AuthListener)>>,
}

impl Listeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: AuthListener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    pub fn remove(&self, id: ListenerId) {
        self.entries.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Deliver `change` to every listener registered at call time.
    ///
    /// The registry is not borrowed while callbacks run, so a callback may
    /// add or remove listeners.
    pub fn emit(&self, change: &AuthChange) {
        let snapshot: Vec<AuthListener> = self.entries.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in snapshot {
            listener(change.clone());
        }
    }
}
