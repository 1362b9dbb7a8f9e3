//! Server settings read from the environment at startup.

use std::env;

use crate::error::AppError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Reject websocket upgrades that carry no `X-Public-Key`.
    pub require_public_key: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            require_public_key: false,
        }
    }
}

impl ServerConfig {
    /// Reads `BACKEND_HOST`, `BACKEND_PORT` and `SHED_REQUIRE_PUBLIC_KEY`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("BACKEND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("BACKEND_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AppError::config(format!("BACKEND_PORT must be a valid port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let require_public_key = match lookup("SHED_REQUIRE_PUBLIC_KEY") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::config(format!(
                    "SHED_REQUIRE_PUBLIC_KEY must be true or false, got '{raw}'"
                ))
            })?,
            None => false,
        };

        Ok(Self {
            host,
            port,
            require_public_key,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
