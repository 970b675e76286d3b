//! Host configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid SAGE_ADDR {value:?}: expected host:port")]
    InvalidAddr { value: String },
    #[error("invalid PORT {value:?}")]
    InvalidPort { value: String },
    #[error("leptos configuration: {0}")]
    Leptos(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub addr: SocketAddr,
    /// Overrides the Leptos `site-root` (where `/pkg` is served from).
    pub site_root: Option<PathBuf>,
}

impl HostConfig {
    /// Build typed host config from environment variables.
    ///
    /// Optional:
    /// - `SAGE_ADDR`: full listen address, wins over `PORT`
    /// - `PORT`: port on `0.0.0.0`, default 3000
    /// - `SAGE_SITE_ROOT`: directory holding the built `pkg/` assets
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            std::env::var("SAGE_ADDR").ok().as_deref(),
            std::env::var("PORT").ok().as_deref(),
            std::env::var("SAGE_SITE_ROOT").ok().as_deref(),
        )
    }

    pub fn from_values(addr: Option<&str>, port: Option<&str>, site_root: Option<&str>) -> Result<Self, ConfigError> {
        let addr = match non_blank(addr) {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|_| ConfigError::InvalidAddr { value: raw.to_owned() })?,
            None => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), parse_port(port)?),
        };
        Ok(Self { addr, site_root: non_blank(site_root).map(PathBuf::from) })
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match non_blank(raw) {
        None => Ok(DEFAULT_PORT),
        Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort { value: raw.to_owned() }),
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
