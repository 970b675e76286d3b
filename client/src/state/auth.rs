//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The `App` root provides an `RwSignal<SessionState>` and calls [`install`].
//! In the browser that builds the [`SessionStore`] for the configured backend
//! and points its publish sink at the signal, so every page re-renders on
//! session changes. The store itself is `Rc`-based and lives in a
//! thread-local; Leptos contexts must be `Send + Sync`.
//!
//! On the server nothing is installed: the signal keeps its mount-time value
//! (loading, no user) and pages render their loading state.

use leptos::prelude::*;
use session::{SessionState, SessionUserPatch};
#[cfg(feature = "hydrate")]
use session::{SessionStore, SessionSubscription};

/// Context type read by pages and components.
pub type AuthSignal = RwSignal<SessionState>;

#[cfg(feature = "hydrate")]
struct Installed {
    store: SessionStore,
    subscription: Option<SessionSubscription>,
}

#[cfg(feature = "hydrate")]
thread_local! {
    static INSTALLED: std::cell::RefCell<Option<Installed>> = const { std::cell::RefCell::new(None) };
}

#[cfg(feature = "hydrate")]
fn store() -> Option<SessionStore> {
    INSTALLED.with(|slot| slot.borrow().as_ref().map(|i| i.store.clone()))
}

/// Build the session store, mirror it into `auth`, and start resolution.
pub fn install(auth: AuthSignal) {
    #[cfg(feature = "hydrate")]
    {
        use std::rc::Rc;

        use session::{DEFAULT_CACHE_KEY, SessionCache};

        use crate::config::{AuthBackend, ClientConfig};
        use crate::net::hosted_session::{HostedClient, HostedSessionSource, ProfileRoleResolver};
        use crate::net::rest_session::ApiSessionSource;
        use crate::util::sleep::GlooSleeper;
        use crate::util::storage::LocalStorageCache;

        if store().is_some() {
            return;
        }

        let config = ClientConfig::from_build_env();
        let cache: Rc<dyn SessionCache> = Rc::new(LocalStorageCache::new(DEFAULT_CACHE_KEY));
        let builder = match &config.auth {
            AuthBackend::Rest => SessionStore::builder(Rc::new(ApiSessionSource::new(&config.api_base)), cache),
            AuthBackend::Hosted { url, anon_key } => {
                let client = HostedClient::new(url, anon_key);
                SessionStore::builder(Rc::new(HostedSessionSource::new(client.clone())), cache)
                    .role_resolver(Rc::new(ProfileRoleResolver::new(client)))
            }
        };
        let store = builder
            .sleeper(Rc::new(GlooSleeper))
            .on_publish(move |state| auth.set(state.clone()))
            .build();
        let backend = if matches!(config.auth, AuthBackend::Rest) { "rest" } else { "hosted" };
        log::debug!("session store installed ({backend} backend)");

        let (subscription, pump) = store.subscribe();
        INSTALLED.with(|slot| {
            *slot.borrow_mut() = Some(Installed { store: store.clone(), subscription: Some(subscription) });
        });
        leptos::task::spawn_local(pump);
        leptos::task::spawn_local(async move { store.initialize().await });
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = auth;
    }
}

/// Deregister from the remote source and stop publishing.
pub fn teardown() {
    #[cfg(feature = "hydrate")]
    {
        let subscription = INSTALLED.with(|slot| slot.borrow_mut().as_mut().and_then(|i| i.subscription.take()));
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
    }
}

/// Sign in; `true` when the credentials were accepted.
pub async fn login(email: &str, password: &str) -> bool {
    #[cfg(feature = "hydrate")]
    {
        match store() {
            Some(store) => store.login(email, password).await,
            None => false,
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (email, password);
        false
    }
}

/// Sign out and return the route to navigate to.
pub async fn logout() -> String {
    #[cfg(feature = "hydrate")]
    {
        if let Some(store) = store() {
            return store.logout().await;
        }
    }
    session::SessionConfig::default().sign_in_path
}

/// Overwrite fields of the signed-in user locally.
pub fn update_user(patch: SessionUserPatch) -> bool {
    #[cfg(feature = "hydrate")]
    {
        store().is_some_and(|store| store.update_user(patch))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = patch;
        false
    }
}
