//! Session source and role resolver for the hosted auth service.
//!
//! ARCHITECTURE
//! ============
//! The service speaks a GoTrue-style REST dialect: a password grant returns an
//! access token plus the user, later calls send that token as a bearer. The
//! token is kept in `localStorage` so a reload stays signed in. Roles live in
//! a `profiles` table queried through the service's REST gateway.
//!
//! Only the pure URL builders compile outside the browser.

#[cfg(test)]
#[path = "hosted_session_test.rs"]
mod hosted_session_test;

/// `localStorage` key for the hosted access token.
pub const TOKEN_KEY: &str = "sage_auth_token";

#[cfg(any(test, feature = "hydrate"))]
fn token_url(base: &str) -> String {
    format!("{}/auth/v1/token?grant_type=password", base.trim_end_matches('/'))
}

#[cfg(any(test, feature = "hydrate"))]
fn user_url(base: &str) -> String {
    format!("{}/auth/v1/user", base.trim_end_matches('/'))
}

#[cfg(any(test, feature = "hydrate"))]
fn logout_url(base: &str) -> String {
    format!("{}/auth/v1/logout", base.trim_end_matches('/'))
}

#[cfg(any(test, feature = "hydrate"))]
fn profile_role_url(base: &str, principal_id: &str) -> String {
    let id: String = principal_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    format!("{}/rest/v1/profiles?id=eq.{id}&select=role,full_name", base.trim_end_matches('/'))
}

#[cfg(feature = "hydrate")]
pub use browser::{HostedClient, HostedSessionSource, ProfileRoleResolver};

#[cfg(feature = "hydrate")]
mod browser {
    use gloo_net::http::{Request, RequestBuilder};
    use session::{
        AuthChange, AuthEvent, AuthListener, ListenerId, Listeners, Principal, RoleLookup, RoleResolver,
        SessionError, SessionSource,
    };

    use super::{TOKEN_KEY, logout_url, profile_role_url, token_url, user_url};
    use crate::net::types::{HostedUser, ProfileRoleRow, TokenResponse, role_lookup_from_rows};
    use crate::util::storage;

    /// Connection details shared by the source and the resolver.
    #[derive(Clone, Debug)]
    pub struct HostedClient {
        url: String,
        anon_key: String,
    }

    impl HostedClient {
        pub fn new(url: &str, anon_key: &str) -> Self {
            Self { url: url.to_owned(), anon_key: anon_key.to_owned() }
        }

        fn token() -> Option<String> {
            match storage::load_raw(TOKEN_KEY) {
                Ok(token) => token.filter(|t| !t.is_empty()),
                Err(e) => {
                    log::warn!("access token unreadable: {e}");
                    None
                }
            }
        }

        fn store_token(token: &str) {
            if let Err(e) = storage::save_raw(TOKEN_KEY, token) {
                log::warn!("failed to store access token: {e}");
            }
        }

        fn forget_token() {
            if let Err(e) = storage::remove(TOKEN_KEY) {
                log::warn!("failed to clear access token: {e}");
            }
        }

        /// Attach the anon key and, when present, the bearer token.
        fn authorize(&self, builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
            let bearer = format!("Bearer {}", token.unwrap_or(&self.anon_key));
            builder.header("apikey", &self.anon_key).header("Authorization", &bearer)
        }
    }

    fn transport(e: impl std::fmt::Display) -> SessionError {
        SessionError::Transport(e.to_string())
    }

    pub struct HostedSessionSource {
        client: HostedClient,
        listeners: Listeners,
    }

    impl HostedSessionSource {
        pub fn new(client: HostedClient) -> Self {
            Self { client, listeners: Listeners::new() }
        }
    }

    #[async_trait::async_trait(?Send)]
    impl SessionSource for HostedSessionSource {
        async fn current_principal(&self) -> Result<Option<Principal>, SessionError> {
            let Some(token) = HostedClient::token() else {
                return Ok(None);
            };
            let resp = self
                .client
                .authorize(Request::get(&user_url(&self.client.url)), Some(&token))
                .send()
                .await
                .map_err(transport)?;
            match resp.status() {
                401 | 403 => {
                    // Expired or revoked; drop it so the next check skips the request.
                    HostedClient::forget_token();
                    Ok(None)
                }
                _ if resp.ok() => {
                    let user = resp.json::<HostedUser>().await.map_err(|e| SessionError::Decode(e.to_string()))?;
                    Ok(Some(user.into_principal()))
                }
                status => Err(SessionError::Transport(format!("session check failed: {status}"))),
            }
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, SessionError> {
            let payload = serde_json::json!({ "email": email, "password": password });
            let resp = self
                .client
                .authorize(Request::post(&token_url(&self.client.url)), None)
                .json(&payload)
                .map_err(transport)?
                .send()
                .await
                .map_err(transport)?;
            match resp.status() {
                400 | 401 | 403 => Err(SessionError::InvalidCredentials),
                _ if resp.ok() => {
                    let body = resp.json::<TokenResponse>().await.map_err(|e| SessionError::Decode(e.to_string()))?;
                    HostedClient::store_token(&body.access_token);
                    let principal = body.user.into_principal();
                    self.listeners
                        .emit(&AuthChange { event: AuthEvent::SignedIn, principal: Some(principal.clone()) });
                    Ok(principal)
                }
                status => Err(SessionError::Transport(format!("sign-in failed: {status}"))),
            }
        }

        async fn sign_out(&self) -> Result<(), SessionError> {
            let token = HostedClient::token();
            HostedClient::forget_token();
            let result = match token {
                Some(token) => {
                    let resp = self
                        .client
                        .authorize(Request::post(&logout_url(&self.client.url)), Some(&token))
                        .send()
                        .await
                        .map_err(transport)?;
                    if resp.ok() || resp.status() == 401 {
                        Ok(())
                    } else {
                        Err(SessionError::Transport(format!("sign-out failed: {}", resp.status())))
                    }
                }
                None => Ok(()),
            };
            self.listeners.emit(&AuthChange { event: AuthEvent::SignedOut, principal: None });
            result
        }

        fn add_listener(&self, listener: AuthListener) -> ListenerId {
            self.listeners.add(listener)
        }

        fn remove_listener(&self, id: ListenerId) {
            self.listeners.remove(id);
        }
    }

    /// Reads `role` and `full_name` from the `profiles` table.
    pub struct ProfileRoleResolver {
        client: HostedClient,
    }

    impl ProfileRoleResolver {
        pub fn new(client: HostedClient) -> Self {
            Self { client }
        }
    }

    #[async_trait::async_trait(?Send)]
    impl RoleResolver for ProfileRoleResolver {
        async fn lookup(&self, principal_id: &str) -> Result<Option<RoleLookup>, SessionError> {
            let token = HostedClient::token();
            let resp = self
                .client
                .authorize(Request::get(&profile_role_url(&self.client.url, principal_id)), token.as_deref())
                .send()
                .await
                .map_err(transport)?;
            if !resp.ok() {
                return Err(SessionError::Transport(format!("profile lookup failed: {}", resp.status())));
            }
            let rows = resp
                .json::<Vec<ProfileRoleRow>>()
                .await
                .map_err(|e| SessionError::Decode(e.to_string()))?;
            Ok(role_lookup_from_rows(rows))
        }
    }
}
