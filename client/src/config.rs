//! Build-time client configuration.
//!
//! The WASM bundle has no process environment, so backend selection is baked
//! in at compile time through `option_env!`. Parsing lives in pure functions
//! so the defaults and fallbacks are testable on the host.
//!
//! Variables:
//! - `SAGE_AUTH_BACKEND`: `rest` (default) or `hosted`
//! - `SAGE_API_BASE`: content + REST auth base URL, default `http://localhost:8080`
//! - `SAGE_HOSTED_URL`, `SAGE_HOSTED_ANON_KEY`: required for `hosted`

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Which remote authority backs the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthBackend {
    /// Request-response auth endpoints under the API base.
    Rest,
    /// Hosted auth service with a profile table for roles.
    Hosted { url: String, anon_key: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub auth: AuthBackend,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_base: DEFAULT_API_BASE.to_owned(), auth: AuthBackend::Rest }
    }
}

impl ClientConfig {
    /// Configuration compiled into this build.
    ///
    /// An unusable backend selection falls back to [`AuthBackend::Rest`].
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("SAGE_AUTH_BACKEND"),
            option_env!("SAGE_API_BASE"),
            option_env!("SAGE_HOSTED_URL"),
            option_env!("SAGE_HOSTED_ANON_KEY"),
        )
        .unwrap_or_else(|e| {
            #[cfg(feature = "hydrate")]
            log::warn!("{e}; using the REST auth backend");
            #[cfg(not(feature = "hydrate"))]
            let _ = e;
            Self::default()
        })
    }

    /// Build a configuration from raw variable values.
    ///
    /// # Errors
    ///
    /// Returns a message for an unknown backend name or a hosted backend
    /// without its URL or key.
    pub fn from_values(
        backend: Option<&str>,
        api_base: Option<&str>,
        hosted_url: Option<&str>,
        hosted_anon_key: Option<&str>,
    ) -> Result<Self, String> {
        Ok(Self {
            api_base: parse_base_url(api_base).unwrap_or_else(|| DEFAULT_API_BASE.to_owned()),
            auth: parse_auth_backend(backend, hosted_url, hosted_anon_key)?,
        })
    }
}

/// Trim whitespace and trailing slashes; blank values count as unset.
fn parse_base_url(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim().trim_end_matches('/');
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn parse_auth_backend(raw: Option<&str>, url: Option<&str>, anon_key: Option<&str>) -> Result<AuthBackend, String> {
    match raw.map(str::trim).unwrap_or("rest").to_ascii_lowercase().as_str() {
        "" | "rest" => Ok(AuthBackend::Rest),
        "hosted" => {
            let url = parse_base_url(url).ok_or("SAGE_HOSTED_URL is required for the hosted backend")?;
            let anon_key = anon_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .ok_or("SAGE_HOSTED_ANON_KEY is required for the hosted backend")?;
            Ok(AuthBackend::Hosted { url, anon_key: anon_key.to_owned() })
        }
        other => Err(format!("unknown SAGE_AUTH_BACKEND '{other}'")),
    }
}

/// Base URL for content and REST auth requests.
pub fn api_base() -> String {
    ClientConfig::from_build_env().api_base
}
