use std::{env, net::SocketAddr};

use clap::Args;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api/";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://trips.db?mode=rwc".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        Ok(Self {
            database_url,
            listen_addr,
        })
    }
}

/// Where the `trip-date` CLI finds the trip API.
#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Base URL of the trip API
    #[arg(long, env = "TRIP_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// Bearer token forwarded with every request
    #[arg(long, env = "TRIP_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}
