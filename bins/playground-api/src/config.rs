// Server settings read from the environment

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_RELAY_CONFIG: &str = "config/relay.json";

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    pub relay_config_path: PathBuf,
    /// Empty means any origin is accepted
    pub cors_origins: Vec<HeaderValue>,
}

impl ServerSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("Invalid BIND_ADDR '{}'", bind_addr))?;

        let relay_config_path = lookup("RELAY_CONFIG")
            .unwrap_or_else(|| DEFAULT_RELAY_CONFIG.to_string())
            .into();

        let cors_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(list) => parse_origins(&list)?,
            None => Vec::new(),
        };

        Ok(Self {
            bind_addr,
            relay_config_path,
            cors_origins,
        })
    }
}

fn parse_origins(list: &str) -> Result<Vec<HeaderValue>> {
    list.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect()
}
