//! Session source for the request-response auth endpoints.
//!
//! The backend keeps the session in a cookie and never pushes changes, so
//! this adapter emits `SignedIn`/`SignedOut` notifications itself after the
//! corresponding calls succeed.

#![cfg(feature = "hydrate")]

use gloo_net::http::{Request, Response};
use session::{AuthChange, AuthEvent, AuthListener, ListenerId, Listeners, Principal, SessionError, SessionSource};
use web_sys::RequestCredentials;

use super::api::endpoint;
use super::types::ApiUser;

pub struct ApiSessionSource {
    base: String,
    listeners: Listeners,
}

impl ApiSessionSource {
    pub fn new(base: &str) -> Self {
        Self { base: base.to_owned(), listeners: Listeners::new() }
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base, path)
    }
}

async fn read_principal(resp: Response) -> Result<Principal, SessionError> {
    resp.json::<ApiUser>()
        .await
        .map(ApiUser::into_principal)
        .map_err(|e| SessionError::Decode(e.to_string()))
}

#[async_trait::async_trait(?Send)]
impl SessionSource for ApiSessionSource {
    async fn current_principal(&self) -> Result<Option<Principal>, SessionError> {
        let resp = Request::get(&self.url("/api/auth/me"))
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        match resp.status() {
            401 | 403 => Ok(None),
            _ if resp.ok() => read_principal(resp).await.map(Some),
            status => Err(SessionError::Transport(format!("session check failed: {status}"))),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, SessionError> {
        let payload = serde_json::json!({ "email": email, "password": password });
        let resp = Request::post(&self.url("/api/auth/login"))
            .credentials(RequestCredentials::Include)
            .json(&payload)
            .map_err(|e| SessionError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        match resp.status() {
            400 | 401 | 403 => Err(SessionError::InvalidCredentials),
            _ if resp.ok() => {
                let principal = read_principal(resp).await?;
                self.listeners
                    .emit(&AuthChange { event: AuthEvent::SignedIn, principal: Some(principal.clone()) });
                Ok(principal)
            }
            status => Err(SessionError::Transport(format!("login failed: {status}"))),
        }
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        let resp = Request::post(&self.url("/api/auth/logout"))
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        if !resp.ok() {
            return Err(SessionError::Transport(format!("logout failed: {}", resp.status())));
        }
        self.listeners.emit(&AuthChange { event: AuthEvent::SignedOut, principal: None });
        Ok(())
    }

    fn add_listener(&self, listener: AuthListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}
