use super::*;
use crate::cache::MemoryCache;
use crate::guard::{self, GuardOutcome, Requirement};
use crate::role::Role;
use crate::source::{AuthEvent, AuthListener, Listeners};
use crate::user::PrincipalMetadata;

use std::cell::Cell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::executor::{LocalPool, block_on};
use futures::task::LocalSpawnExt;

// =============================================================
// Fakes
// =============================================================

/// Completes on the second poll, letting other local tasks run in between.
#[derive(Default)]
struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[derive(Default)]
struct FakeSource {
    principal: RefCell<Option<Principal>>,
    accounts: RefCell<Vec<(String, String, Principal)>>,
    offline: Cell<bool>,
    notify_on_sign_in: Cell<bool>,
    principal_gate: RefCell<Option<oneshot::Receiver<()>>>,
    sign_in_gate: RefCell<Option<oneshot::Receiver<()>>>,
    sign_outs: Cell<u32>,
    listeners: Listeners,
}

impl FakeSource {
    fn with_account(email: &str, password: &str, principal: Principal) -> Self {
        let source = Self::default();
        source.add_account(email, password, principal);
        source
    }

    fn add_account(&self, email: &str, password: &str, principal: Principal) {
        self.accounts
            .borrow_mut()
            .push((email.to_owned(), password.to_owned(), principal));
    }

    fn emit(&self, event: AuthEvent, principal: Option<Principal>) {
        *self.principal.borrow_mut() = principal.clone();
        self.listeners.emit(&AuthChange { event, principal });
    }
}

#[async_trait::async_trait(?Send)]
impl SessionSource for FakeSource {
    async fn current_principal(&self) -> Result<Option<Principal>, SessionError> {
        let gate = self.principal_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.offline.get() {
            return Err(SessionError::Transport("offline".to_owned()));
        }
        Ok(self.principal.borrow().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, SessionError> {
        let gate = self.sign_in_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.offline.get() {
            return Err(SessionError::Transport("offline".to_owned()));
        }
        let found = self
            .accounts
            .borrow()
            .iter()
            .find(|(e, p, _)| e == email && p == password)
            .map(|(_, _, principal)| principal.clone());
        let Some(principal) = found else {
            return Err(SessionError::InvalidCredentials);
        };
        *self.principal.borrow_mut() = Some(principal.clone());
        if self.notify_on_sign_in.get() {
            self.listeners.emit(&AuthChange { event: AuthEvent::SignedIn, principal: Some(principal.clone()) });
        }
        Ok(principal)
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        self.sign_outs.set(self.sign_outs.get() + 1);
        self.principal.borrow_mut().take();
        Ok(())
    }

    fn add_listener(&self, listener: AuthListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}


type Answer = Result<Option<RoleLookup>, SessionError>;

/// Scripted role lookups. Call `n` takes the `n`-th scripted entry, waiting on
/// its gate first when one is set; once the script runs out `otherwise` is
/// returned.
struct FakeResolver {
    script: RefCell<VecDeque<(Option<oneshot::Receiver<()>>, Answer)>>,
    otherwise: Answer,
    yields: bool,
    hangs: bool,
    calls: Cell<u32>,
}

impl FakeResolver {
    fn answering(role: Role) -> Self {
        Self {
            script: RefCell::new(VecDeque::new()),
            otherwise: Ok(Some(RoleLookup { role, full_name: None })),
            yields: false,
            hangs: false,
            calls: Cell::new(0),
        }
    }

    fn unreachable() -> Self {
        Self { otherwise: Err(SessionError::Transport("connection refused".to_owned())), ..Self::answering(Role::User) }
    }

    fn hanging() -> Self {
        Self { hangs: true, ..Self::answering(Role::Admin) }
    }

    fn yielding(mut self) -> Self {
        self.yields = true;
        self
    }

    fn then(self, answer: Answer) -> Self {
        self.script.borrow_mut().push_back((None, answer));
        self
    }

    /// Script an answer that is held back until the returned sender fires.
    fn then_gated(self, answer: Answer) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.script.borrow_mut().push_back((Some(rx), answer));
        (self, tx)
    }
}

#[async_trait::async_trait(?Send)]
impl RoleResolver for FakeResolver {
    async fn lookup(&self, _principal_id: &str) -> Answer {
        self.calls.set(self.calls.get() + 1);
        if self.hangs {
            futures::future::pending::<()>().await;
        }
        if self.yields {
            YieldNow::default().await;
        }
        let scripted = self.script.borrow_mut().pop_front();
        match scripted {
            Some((gate, answer)) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                answer
            }
            None => self.otherwise.clone(),
        }
    }
}

struct ImmediateSleeper;

impl Sleeper for ImmediateSleeper {
    fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
        futures::future::ready(()).boxed_local()
    }
}

// =============================================================
// Helpers
// =============================================================

fn principal(id: &str, role: Option<&str>) -> Principal {
    Principal {
        id: id.to_owned(),
        email: format!("{id}@sage.org"),
        metadata: PrincipalMetadata { username: Some(id.to_owned()), role: role.map(str::to_owned), full_name: None },
    }
}

type Published = Rc<RefCell<Vec<SessionState>>>;

fn build(source: &Rc<FakeSource>, resolver: Option<Rc<FakeResolver>>, cache: &Rc<MemoryCache>) -> (SessionStore, Published) {
    let published: Published = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&published);
    let mut builder = SessionStore::builder(source.clone(), cache.clone())
        .on_publish(move |state| sink.borrow_mut().push(state.clone()));
    if let Some(resolver) = resolver {
        builder = builder.role_resolver(resolver);
    }
    (builder.build(), published)
}

fn last(published: &Published) -> SessionState {
    published.borrow().last().cloned().expect("at least one publish")
}

// =============================================================
// initialize
// =============================================================

#[test]
fn starts_uninitialized_and_loading() {
    let source = Rc::new(FakeSource::default());
    let cache = Rc::new(MemoryCache::new());
    let (store, published) = build(&source, None, &cache);
    assert_eq!(store.phase(), SessionPhase::Uninitialized);
    assert_eq!(store.state(), SessionState { user: None, is_loading: true });
    assert!(published.borrow().is_empty());
}

#[test]
fn initialize_without_principal_is_anonymous_and_clears_cache() {
    let source = Rc::new(FakeSource::default());
    let cached = SessionUser::from_principal(&principal("old", Some("admin")), None);
    let cache = Rc::new(MemoryCache::with_raw(encode_user(&cached).expect("encode")));
    let (store, published) = build(&source, None, &cache);

    block_on(store.initialize());

    // Cached user is shown optimistically first, then replaced.
    let states = published.borrow().clone();
    assert_eq!(states.first().and_then(|s| s.user.clone()), Some(cached));
    assert!(states.first().is_some_and(|s| s.is_loading));
    assert_eq!(last(&published), SessionState { user: None, is_loading: false });
    assert_eq!(cache.raw(), None);
    assert_eq!(store.phase(), SessionPhase::Anonymous);
}

#[test]
fn initialize_with_principal_uses_resolver_role() {
    let source = Rc::new(FakeSource::default());
    *source.principal.borrow_mut() = Some(principal("u1", Some("user")));
    let cache = Rc::new(MemoryCache::new());
    let (store, published) = build(&source, Some(Rc::new(FakeResolver::answering(Role::Officer))), &cache);

    block_on(store.initialize());

    let state = last(&published);
    assert!(!state.is_loading);
    assert_eq!(state.role(), Some(Role::Officer));
    assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some("u1"));
    assert_eq!(store.phase(), SessionPhase::Authenticated);
}

#[test]
fn loading_stays_set_until_resolution_finishes() {
    let source = Rc::new(FakeSource::default());
    *source.principal.borrow_mut() = Some(principal("u1", None));
    let (gate_tx, gate_rx) = oneshot::channel();
    *source.principal_gate.borrow_mut() = Some(gate_rx);
    let cache = Rc::new(MemoryCache::new());
    let (store, _published) = build(&source, None, &cache);

    let mut pool = LocalPool::new();
    let task_store = store.clone();
    pool.spawner()
        .spawn_local(async move { task_store.initialize().await })
        .expect("spawn");
    pool.run_until_stalled();
    assert!(store.state().is_loading);
    assert_eq!(store.phase(), SessionPhase::Loading);

    gate_tx.send(()).expect("open gate");
    pool.run_until_stalled();
    assert!(!store.state().is_loading);
    assert_eq!(store.phase(), SessionPhase::Authenticated);
}

#[test]
fn principal_fetch_failure_is_anonymous_not_error() {
    let source = Rc::new(FakeSource::default());
    source.offline.set(true);
    let cache = Rc::new(MemoryCache::new());
    let (store, published) = build(&source, None, &cache);

    block_on(store.initialize());

    assert_eq!(last(&published), SessionState { user: None, is_loading: false });
}

#[test]
fn malformed_cache_is_discarded_and_anonymous() {
    let source = Rc::new(FakeSource::default());
    let cache = Rc::new(MemoryCache::with_raw("{\"id\": 12, oops"));
    let (store, published) = build(&source, None, &cache);

    block_on(store.initialize());

    assert!(published.borrow().iter().all(|s| s.user.is_none()));
    assert_eq!(store.state(), SessionState { user: None, is_loading: false });
    assert_eq!(cache.raw(), None);
}

#[test]
fn metadata_admin_with_unreachable_resolver_passes_admin_guard() {
    let source = Rc::new(FakeSource::default());
    *source.principal.borrow_mut() = Some(principal("boss", Some("Admin")));
    let cache = Rc::new(MemoryCache::new());
    let resolver = Rc::new(FakeResolver::unreachable());
    let (store, _published) = build(&source, Some(resolver.clone()), &cache);

    block_on(store.initialize());

    assert_eq!(resolver.calls.get(), 1);
    assert_eq!(store.state().role(), Some(Role::Admin));
    assert_eq!(
        guard::evaluate(&store.state(), Requirement::AnyOf(guard::ADMIN_ONLY)),
        GuardOutcome::Allowed
    );
}

#[test]
fn hanging_resolver_times_out_to_metadata_role() {
    let source = Rc::new(FakeSource::default());
    *source.principal.borrow_mut() = Some(principal("slow", Some("officer")));
    let cache = Rc::new(MemoryCache::new());
    let store = SessionStore::builder(source.clone(), cache.clone())
        .role_resolver(Rc::new(FakeResolver::hanging()))
        .sleeper(Rc::new(ImmediateSleeper))
        .build();

    block_on(store.initialize());

    let state = store.state();
    assert!(!state.is_loading);
    assert_eq!(state.role(), Some(Role::Officer));
}

#[test]
fn resolver_without_record_falls_back_to_metadata() {
    let source = Rc::new(FakeSource::default());
    *source.principal.borrow_mut() = Some(principal("u2", Some("officer")));
    let cache = Rc::new(MemoryCache::new());
    let resolver = FakeResolver::answering(Role::Admin).then(Ok(None));
    let (store, _published) = build(&source, Some(Rc::new(resolver)), &cache);

    block_on(store.initialize());

    assert_eq!(store.state().role(), Some(Role::Officer));
}

// =============================================================
// login
// =============================================================

#[test]
fn login_success_publishes_user_and_writes_cache() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", Some("user"))));
    let cache = Rc::new(MemoryCache::new());
    let (store, published) = build(&source, Some(Rc::new(FakeResolver::answering(Role::Admin))), &cache);
    block_on(store.initialize());

    assert!(block_on(store.login("a@x.com", "pw")));

    let state = last(&published);
    assert_eq!(state.role(), Some(Role::Admin));
    assert!(!state.is_loading);
    let cached = decode_user(&cache.raw().expect("cache written")).expect("decode");
    assert_eq!(Some(cached), state.user);
    assert!(!store.is_login_in_flight());
}

#[test]
fn login_rejected_returns_false_and_stays_anonymous() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", None)));
    let cache = Rc::new(MemoryCache::new());
    let (store, _published) = build(&source, None, &cache);
    block_on(store.initialize());

    assert!(!block_on(store.login("a@x.com", "wrong")));
    assert_eq!(store.state(), SessionState { user: None, is_loading: false });
    assert_eq!(store.phase(), SessionPhase::Anonymous);
    assert!(!store.is_login_in_flight());
}

#[test]
fn login_transport_failure_returns_false() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", None)));
    source.offline.set(true);
    let cache = Rc::new(MemoryCache::new());
    let (store, _published) = build(&source, None, &cache);

    assert!(!block_on(store.login("a@x.com", "pw")));
    assert!(!store.is_login_in_flight());
    assert_eq!(cache.raw(), None);
}

#[test]
fn phase_reports_login_pending_while_in_flight() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", None)));
    let cache = Rc::new(MemoryCache::new());
    let (resolver, release) = FakeResolver::answering(Role::User).then_gated(Ok(None));
    let (store, _published) = build(&source, Some(Rc::new(resolver)), &cache);
    block_on(store.initialize());

    let mut pool = LocalPool::new();
    let task_store = store.clone();
    pool.spawner()
        .spawn_local(async move {
            task_store.login("a@x.com", "pw").await;
        })
        .expect("spawn");
    pool.run_until_stalled();
    assert_eq!(store.phase(), SessionPhase::LoginPending);
    assert!(store.is_login_in_flight());

    release.send(()).expect("release lookup");
    pool.run_until_stalled();
    assert_eq!(store.phase(), SessionPhase::Authenticated);
}

#[test]
fn notification_during_login_cannot_downgrade_role() {
    // The login's lookup answers Admin but is held back; the notification's
    // lookup fails and would carry the metadata role if it were published.
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", Some("user"))));
    source.notify_on_sign_in.set(true);
    let cache = Rc::new(MemoryCache::new());
    let (resolver, release) =
        FakeResolver::unreachable().then_gated(Ok(Some(RoleLookup { role: Role::Admin, full_name: None })));
    let resolver = Rc::new(resolver);
    let (store, published) = build(&source, Some(resolver.clone()), &cache);
    block_on(store.initialize());
    let before = published.borrow().len();

    let (subscription, pump) = store.subscribe();
    let mut pool = LocalPool::new();
    pool.spawner().spawn_local(pump).expect("spawn pump");
    let login_store = store.clone();
    let outcome = Rc::new(Cell::new(None));
    let login_outcome = Rc::clone(&outcome);
    pool.spawner()
        .spawn_local(async move {
            login_outcome.set(Some(login_store.login("a@x.com", "pw").await));
        })
        .expect("spawn login");

    pool.run_until_stalled();
    // Both lookups ran; only the login's is still outstanding.
    assert_eq!(resolver.calls.get(), 2);
    assert_eq!(published.borrow().len(), before);
    assert!(store.is_login_in_flight());

    release.send(()).expect("release lookup");
    pool.run_until_stalled();

    assert_eq!(outcome.get(), Some(true));
    let state = last(&published);
    assert_eq!(state.role(), Some(Role::Admin));
    assert!(!state.is_loading);
    assert!(!store.is_login_in_flight());
    assert_eq!(decode_user(&cache.raw().expect("cache")).expect("decode").role, Role::Admin);
    subscription.unsubscribe();
}

#[test]
fn notification_handled_mid_login_does_not_clear_loading() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", Some("user"))));
    source.notify_on_sign_in.set(true);
    let cache = Rc::new(MemoryCache::new());
    let (resolver, release) =
        FakeResolver::answering(Role::User).then_gated(Ok(Some(RoleLookup { role: Role::Officer, full_name: None })));
    let (store, published) = build(&source, Some(Rc::new(resolver)), &cache);

    // Login before initialization: loading is still set from mount.
    let (subscription, pump) = store.subscribe();
    let mut pool = LocalPool::new();
    pool.spawner().spawn_local(pump).expect("spawn pump");
    let login_store = store.clone();
    pool.spawner()
        .spawn_local(async move {
            login_store.login("a@x.com", "pw").await;
        })
        .expect("spawn login");

    pool.run_until_stalled();
    assert!(store.is_login_in_flight());
    assert!(published.borrow().is_empty());
    assert!(store.state().is_loading);

    release.send(()).expect("release lookup");
    pool.run_until_stalled();

    assert!(!store.is_login_in_flight());
    let state = store.state();
    assert!(!state.is_loading);
    assert_eq!(state.role(), Some(Role::Officer));
    subscription.unsubscribe();
}

#[test]
fn rapid_logins_keep_accepted_credentials_and_clear_flag() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "p2", principal("a", Some("officer"))));
    let cache = Rc::new(MemoryCache::new());
    let resolver = Rc::new(FakeResolver::unreachable().yielding());
    let (store, _published) = build(&source, Some(resolver), &cache);
    block_on(store.initialize());

    let (first, second) = block_on(async { futures::join!(store.login("a@x.com", "p1"), store.login("a@x.com", "p2")) });

    assert!(!first);
    assert!(second);
    assert!(!store.is_login_in_flight());
    let state = store.state();
    assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some("a"));
    assert_eq!(state.role(), Some(Role::Officer));
    assert!(!state.is_loading);
}

#[test]
fn rapid_logins_last_accepted_wins() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pa", principal("a", None)));
    source.add_account("b@x.com", "pb", principal("b", None));
    let cache = Rc::new(MemoryCache::new());
    let (store, _published) = build(&source, None, &cache);
    block_on(store.initialize());

    let (a, b) = block_on(async { futures::join!(store.login("a@x.com", "pa"), store.login("b@x.com", "pb")) });

    assert!(a && b);
    assert_eq!(store.state().user.map(|u| u.id), Some("b".to_owned()));
    assert!(!store.is_login_in_flight());
}

#[test]
fn slow_role_lookup_does_not_overtake_later_login() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pa", principal("a", None)));
    source.add_account("b@x.com", "pb", principal("b", None));
    let cache = Rc::new(MemoryCache::new());
    let (resolver, release) =
        FakeResolver::answering(Role::User).then_gated(Ok(Some(RoleLookup { role: Role::Admin, full_name: None })));
    let (store, _published) = build(&source, Some(Rc::new(resolver)), &cache);
    block_on(store.initialize());

    let mut pool = LocalPool::new();
    let first_store = store.clone();
    let first = Rc::new(Cell::new(None));
    let first_outcome = Rc::clone(&first);
    pool.spawner()
        .spawn_local(async move {
            first_outcome.set(Some(first_store.login("a@x.com", "pa").await));
        })
        .expect("spawn login");
    pool.run_until_stalled();
    // "a" is accepted but its lookup is parked.
    assert!(store.is_login_in_flight());

    assert!(pool.run_until(store.login("b@x.com", "pb")));
    assert_eq!(store.state().user.map(|u| u.id), Some("b".to_owned()));

    release.send(()).expect("release lookup");
    pool.run_until_stalled();

    assert_eq!(first.get(), Some(true));
    let state = store.state();
    assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some("b"));
    assert_eq!(state.role(), Some(Role::User));
    assert!(!state.is_loading);
    assert_eq!(decode_user(&cache.raw().expect("cache")).expect("decode").id, "b");
}

#[test]
fn sign_out_during_rejected_login_is_applied() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", None)));
    let cache = Rc::new(MemoryCache::new());
    let (store, published) = build(&source, None, &cache);
    block_on(store.initialize());
    assert!(block_on(store.login("a@x.com", "pw")));

    let (subscription, pump) = store.subscribe();
    let (gate_tx, gate_rx) = oneshot::channel();
    *source.sign_in_gate.borrow_mut() = Some(gate_rx);
    let mut pool = LocalPool::new();
    pool.spawner().spawn_local(pump).expect("spawn pump");
    let login_store = store.clone();
    let outcome = Rc::new(Cell::new(None));
    let login_outcome = Rc::clone(&outcome);
    pool.spawner()
        .spawn_local(async move {
            login_outcome.set(Some(login_store.login("a@x.com", "wrong").await));
        })
        .expect("spawn login");
    pool.run_until_stalled();
    assert!(store.is_login_in_flight());

    source.emit(AuthEvent::SignedOut, None);
    pool.run_until_stalled();
    // Held back while the login is outstanding.
    assert_eq!(store.state().user.map(|u| u.id), Some("a".to_owned()));

    gate_tx.send(()).expect("release sign-in");
    pool.run_until_stalled();

    assert_eq!(outcome.get(), Some(false));
    assert_eq!(last(&published), SessionState { user: None, is_loading: false });
    assert_eq!(store.phase(), SessionPhase::Anonymous);
    assert_eq!(cache.raw(), None);
    subscription.unsubscribe();
}

#[test]
fn sign_out_after_login_accepted_wins() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", None)));
    let cache = Rc::new(MemoryCache::new());
    let (resolver, release) =
        FakeResolver::answering(Role::User).then_gated(Ok(Some(RoleLookup { role: Role::Officer, full_name: None })));
    let (store, _published) = build(&source, Some(Rc::new(resolver)), &cache);
    block_on(store.initialize());

    let (subscription, pump) = store.subscribe();
    let mut pool = LocalPool::new();
    pool.spawner().spawn_local(pump).expect("spawn pump");
    let login_store = store.clone();
    pool.spawner()
        .spawn_local(async move {
            login_store.login("a@x.com", "pw").await;
        })
        .expect("spawn login");
    pool.run_until_stalled();

    // Remote sign-out lands after the credentials were accepted.
    source.emit(AuthEvent::SignedOut, None);
    pool.run_until_stalled();
    release.send(()).expect("release lookup");
    pool.run_until_stalled();

    assert!(!store.is_login_in_flight());
    assert_eq!(store.state(), SessionState { user: None, is_loading: false });
    assert_eq!(cache.raw(), None);
    subscription.unsubscribe();
}

// =============================================================
// subscribe
// =============================================================

#[test]
fn remote_sign_in_and_sign_out_are_mirrored() {
    let source = Rc::new(FakeSource::default());
    let cache = Rc::new(MemoryCache::new());
    let (store, published) = build(&source, Some(Rc::new(FakeResolver::answering(Role::Officer))), &cache);
    block_on(store.initialize());
    let (subscription, pump) = store.subscribe();
    let mut pool = LocalPool::new();
    pool.spawner().spawn_local(pump).expect("spawn pump");

    source.emit(AuthEvent::SignedIn, Some(principal("elsewhere", None)));
    pool.run_until_stalled();
    assert_eq!(last(&published).role(), Some(Role::Officer));
    assert!(cache.raw().is_some());

    source.emit(AuthEvent::SignedOut, None);
    pool.run_until_stalled();
    assert_eq!(last(&published), SessionState { user: None, is_loading: false });
    assert_eq!(cache.raw(), None);

    subscription.unsubscribe();
}

#[test]
fn new_principal_event_re_resolves_role() {
    let source = Rc::new(FakeSource::default());
    *source.principal.borrow_mut() = Some(principal("first", None));
    let cache = Rc::new(MemoryCache::new());
    let resolver = FakeResolver::answering(Role::Admin).then(Ok(Some(RoleLookup { role: Role::User, full_name: None })));
    let resolver = Rc::new(resolver);
    let (store, _published) = build(&source, Some(resolver.clone()), &cache);
    block_on(store.initialize());
    assert_eq!(store.state().role(), Some(Role::User));

    let (subscription, pump) = store.subscribe();
    let mut pool = LocalPool::new();
    pool.spawner().spawn_local(pump).expect("spawn pump");
    source.emit(AuthEvent::TokenRefreshed, Some(principal("second", None)));
    pool.run_until_stalled();

    let state = store.state();
    assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some("second"));
    assert_eq!(state.role(), Some(Role::Admin));
    assert_eq!(resolver.calls.get(), 2);
    drop(subscription);
}

#[test]
fn unsubscribe_removes_listener_and_stops_writes() {
    let source = Rc::new(FakeSource::default());
    let cache = Rc::new(MemoryCache::new());
    let (store, published) = build(&source, None, &cache);
    block_on(store.initialize());
    let count = published.borrow().len();

    let (subscription, pump) = store.subscribe();
    assert_eq!(source.listeners.len(), 1);
    subscription.unsubscribe();
    assert!(source.listeners.is_empty());
    assert!(store.is_torn_down());

    // The pump ends once the listener (and its sender) is gone.
    block_on(pump);
    source.emit(AuthEvent::SignedIn, Some(principal("late", None)));
    assert!(!store.update_user(SessionUserPatch::default()));
    assert_eq!(published.borrow().len(), count);
}

#[test]
fn teardown_during_initialize_discards_resolution() {
    let source = Rc::new(FakeSource::default());
    *source.principal.borrow_mut() = Some(principal("u", None));
    let (gate_tx, gate_rx) = oneshot::channel();
    *source.principal_gate.borrow_mut() = Some(gate_rx);
    let cache = Rc::new(MemoryCache::new());
    let (store, published) = build(&source, None, &cache);
    let (subscription, _pump) = store.subscribe();

    let mut pool = LocalPool::new();
    let task_store = store.clone();
    pool.spawner()
        .spawn_local(async move { task_store.initialize().await })
        .expect("spawn");
    pool.run_until_stalled();
    let count = published.borrow().len();

    subscription.unsubscribe();
    gate_tx.send(()).expect("open gate");
    pool.run_until_stalled();

    assert_eq!(published.borrow().len(), count);
    assert_eq!(cache.raw(), None);
}

// =============================================================
// logout / update_user
// =============================================================

#[test]
fn logout_then_recheck_is_anonymous() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", Some("admin"))));
    let cache = Rc::new(MemoryCache::new());
    let (store, _published) = build(&source, None, &cache);
    block_on(store.initialize());
    assert!(block_on(store.login("a@x.com", "pw")));

    let route = block_on(store.logout());
    assert_eq!(route, "/login");
    assert_eq!(cache.raw(), None);

    block_on(store.initialize());
    assert_eq!(store.state(), SessionState { user: None, is_loading: false });
}

#[test]
fn logout_when_signed_out_only_returns_route() {
    let source = Rc::new(FakeSource::default());
    let cache = Rc::new(MemoryCache::new());
    let (store, published) = build(&source, None, &cache);
    block_on(store.initialize());
    let count = published.borrow().len();

    assert_eq!(block_on(store.logout()), "/login");
    assert_eq!(block_on(store.logout()), "/login");
    assert_eq!(source.sign_outs.get(), 0);
    assert_eq!(published.borrow().len(), count);
}

#[test]
fn logout_during_pending_login_signs_out_remotely() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", None)));
    let (gate_tx, gate_rx) = oneshot::channel();
    *source.sign_in_gate.borrow_mut() = Some(gate_rx);
    let cache = Rc::new(MemoryCache::new());
    let (store, _published) = build(&source, None, &cache);
    block_on(store.initialize());

    let mut pool = LocalPool::new();
    let login_store = store.clone();
    pool.spawner()
        .spawn_local(async move {
            login_store.login("a@x.com", "pw").await;
        })
        .expect("spawn login");
    pool.run_until_stalled();
    assert_eq!(store.state(), SessionState { user: None, is_loading: false });
    assert!(store.is_login_in_flight());

    assert_eq!(pool.run_until(store.logout()), "/login");
    assert_eq!(source.sign_outs.get(), 1);

    gate_tx.send(()).expect("release sign-in");
    pool.run_until_stalled();
    assert!(!store.is_login_in_flight());
}

#[test]
fn update_user_overwrites_locally_and_caches() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", None)));
    let cache = Rc::new(MemoryCache::new());
    let (store, published) = build(&source, None, &cache);
    block_on(store.initialize());
    assert!(block_on(store.login("a@x.com", "pw")));

    let patch = SessionUserPatch { username: Some("renamed".to_owned()), ..SessionUserPatch::default() };
    assert!(store.update_user(patch));

    let state = last(&published);
    assert_eq!(state.user.as_ref().map(|u| u.username.as_str()), Some("renamed"));
    assert_eq!(decode_user(&cache.raw().expect("cache")).expect("decode"), state.user.expect("user"));
}

#[test]
fn update_user_without_session_is_noop() {
    let source = Rc::new(FakeSource::default());
    let cache = Rc::new(MemoryCache::new());
    let (store, _published) = build(&source, None, &cache);
    block_on(store.initialize());

    assert!(!store.update_user(SessionUserPatch { role: Some(Role::Admin), ..SessionUserPatch::default() }));
    assert_eq!(cache.raw(), None);
}

#[test]
fn login_during_initialize_is_not_overwritten() {
    let source = Rc::new(FakeSource::with_account("a@x.com", "pw", principal("a", None)));
    let (gate_tx, gate_rx) = oneshot::channel();
    *source.principal_gate.borrow_mut() = Some(gate_rx);
    let cache = Rc::new(MemoryCache::new());
    let (store, _published) = build(&source, None, &cache);

    let mut pool = LocalPool::new();
    let init_store = store.clone();
    pool.spawner()
        .spawn_local(async move { init_store.initialize().await })
        .expect("spawn");
    pool.run_until_stalled();

    assert!(pool.run_until(store.login("a@x.com", "pw")));
    // Initialization is still suspended, so loading has not been cleared.
    assert!(store.state().is_loading);

    // Source now reports nobody (e.g. the check raced the cookie).
    source.principal.borrow_mut().take();
    gate_tx.send(()).expect("open gate");
    pool.run_until_stalled();

    let state = store.state();
    assert!(!state.is_loading);
    assert_eq!(state.user.map(|u| u.id), Some("a".to_owned()));
}
