//! Content API helpers: articles, profiles, account changes.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, always with
//! credentials so the backend session cookie travels along.
//! Server-side (SSR): stubs returning an error since these endpoints are only
//! meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Helpers return `Result<_, String>`. A non-2xx response yields the server's
//! response text when it sent one, so pages can show it inline.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use session::Role;

use super::types::{AccountUpdate, Article, ArticleStatus, NewArticle, Profile, RegisterRequest};
#[cfg(feature = "hydrate")]
use super::types::{RoleUpdate, StatusUpdate};

#[cfg(not(feature = "hydrate"))]
const SERVER_UNAVAILABLE: &str = "not available on server";

/// Join the API base and an absolute path.
#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

#[cfg(any(test, feature = "hydrate"))]
fn article_path(id: i64) -> String {
    format!("/api/articles/{id}")
}

#[cfg(any(test, feature = "hydrate"))]
fn article_status_path(id: i64) -> String {
    format!("/api/articles/{id}/status")
}

#[cfg(any(test, feature = "hydrate"))]
fn profile_path(id: &str) -> String {
    format!("/api/profiles/{id}")
}

/// Message for a failed request: the server's text if any, else a generic
/// `"{action} failed: {status}"`.
#[cfg(any(test, feature = "hydrate"))]
fn failure_message(action: &str, status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() { format!("{action} failed: {status}") } else { body.to_owned() }
}

#[cfg(feature = "hydrate")]
mod http {
    use gloo_net::http::{Request, RequestBuilder, Response};
    use web_sys::RequestCredentials;

    use super::{endpoint, failure_message};

    fn url(path: &str) -> String {
        endpoint(&crate::config::api_base(), path)
    }

    pub fn get(path: &str) -> RequestBuilder {
        Request::get(&url(path)).credentials(RequestCredentials::Include)
    }

    pub fn post(path: &str) -> RequestBuilder {
        Request::post(&url(path)).credentials(RequestCredentials::Include)
    }

    pub fn patch(path: &str) -> RequestBuilder {
        Request::patch(&url(path)).credentials(RequestCredentials::Include)
    }

    pub fn delete(path: &str) -> RequestBuilder {
        Request::delete(&url(path)).credentials(RequestCredentials::Include)
    }

    pub async fn send(builder: RequestBuilder, action: &str) -> Result<Response, String> {
        let resp = builder.send().await.map_err(|e| e.to_string())?;
        check(resp, action).await
    }

    pub async fn send_json<T: serde::Serialize>(builder: RequestBuilder, body: &T, action: &str) -> Result<Response, String> {
        let resp = builder
            .json(body)
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        check(resp, action).await
    }

    async fn check(resp: Response, action: &str) -> Result<Response, String> {
        if resp.ok() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        log::warn!("{action} failed with status {status}");
        Err(failure_message(action, status, &body))
    }
}

/// Fetch every article via `GET /api/articles`.
///
/// # Errors
///
/// Returns an error string if the request fails or the body is malformed.
pub async fn fetch_articles() -> Result<Vec<Article>, String> {
    #[cfg(feature = "hydrate")]
    {
        let resp = http::send(http::get("/api/articles"), "fetch articles").await?;
        resp.json::<Vec<Article>>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err(SERVER_UNAVAILABLE.to_owned())
    }
}

/// Fetch one article via `GET /api/articles/{id}`. `Ok(None)` on 404.
///
/// # Errors
///
/// Returns an error string for transport failures and non-404 errors.
pub async fn fetch_article(id: i64) -> Result<Option<Article>, String> {
    #[cfg(feature = "hydrate")]
    {
        let resp = http::get(&article_path(id)).send().await.map_err(|e| e.to_string())?;
        if resp.status() == 404 {
            return Ok(None);
        }
        if !resp.ok() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(failure_message("fetch article", status, &body));
        }
        resp.json::<Article>().await.map(Some).map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = id;
        Err(SERVER_UNAVAILABLE.to_owned())
    }
}

/// Fetch the caller's own submissions via `GET /api/articles/my`.
///
/// # Errors
///
/// Returns an error string if the request fails or the caller is signed out.
pub async fn fetch_my_articles() -> Result<Vec<Article>, String> {
    #[cfg(feature = "hydrate")]
    {
        let resp = http::send(http::get("/api/articles/my"), "fetch your articles").await?;
        resp.json::<Vec<Article>>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err(SERVER_UNAVAILABLE.to_owned())
    }
}

/// Submit a draft via `POST /api/articles`.
///
/// # Errors
///
/// Returns the server's response text (or a status message) on failure.
pub async fn create_article(article: &NewArticle) -> Result<Article, String> {
    #[cfg(feature = "hydrate")]
    {
        let resp = http::send_json(http::post("/api/articles"), article, "publish").await?;
        resp.json::<Article>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = article;
        Err(SERVER_UNAVAILABLE.to_owned())
    }
}

/// Change moderation status via `PATCH /api/articles/{id}/status`.
///
/// # Errors
///
/// Returns an error string if the update is rejected.
pub async fn update_article_status(id: i64, status: ArticleStatus) -> Result<(), String> {
    #[cfg(feature = "hydrate")]
    {
        http::send_json(http::patch(&article_status_path(id)), &StatusUpdate { status }, "update status").await?;
        Ok(())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (id, status);
        Err(SERVER_UNAVAILABLE.to_owned())
    }
}

/// Delete an article via `DELETE /api/articles/{id}`.
///
/// # Errors
///
/// Returns an error string if the delete is rejected.
pub async fn delete_article(id: i64) -> Result<(), String> {
    #[cfg(feature = "hydrate")]
    {
        http::send(http::delete(&article_path(id)), "delete article").await?;
        Ok(())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = id;
        Err(SERVER_UNAVAILABLE.to_owned())
    }
}

/// Create an account via `POST /api/auth/register`.
///
/// # Errors
///
/// Returns the server's response text (or a status message) on failure.
pub async fn register_user(request: &RegisterRequest) -> Result<(), String> {
    #[cfg(feature = "hydrate")]
    {
        http::send_json(http::post("/api/auth/register"), request, "create user").await?;
        Ok(())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = request;
        Err(SERVER_UNAVAILABLE.to_owned())
    }
}

/// List profiles via `GET /api/profiles`, newest first.
///
/// # Errors
///
/// Returns an error string if the request fails or the body is malformed.
pub async fn fetch_profiles() -> Result<Vec<Profile>, String> {
    #[cfg(feature = "hydrate")]
    {
        let resp = http::send(http::get("/api/profiles"), "fetch users").await?;
        let mut profiles = resp.json::<Vec<Profile>>().await.map_err(|e| e.to_string())?;
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err(SERVER_UNAVAILABLE.to_owned())
    }
}

/// Change a user's role via `PATCH /api/profiles/{id}`.
///
/// # Errors
///
/// Returns an error string if the update is rejected.
pub async fn update_profile_role(id: &str, role: Role) -> Result<(), String> {
    #[cfg(feature = "hydrate")]
    {
        http::send_json(http::patch(&profile_path(id)), &RoleUpdate { role }, "update role").await?;
        Ok(())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (id, role);
        Err(SERVER_UNAVAILABLE.to_owned())
    }
}

/// Save account changes via `PATCH /api/auth/me`.
///
/// # Errors
///
/// Returns the server's response text (or a status message) on failure.
pub async fn update_account(update: &AccountUpdate) -> Result<(), String> {
    #[cfg(feature = "hydrate")]
    {
        http::send_json(http::patch("/api/auth/me"), update, "save account").await?;
        Ok(())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = update;
        Err(SERVER_UNAVAILABLE.to_owned())
    }
}
