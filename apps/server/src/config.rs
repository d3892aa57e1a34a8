use std::{collections::HashMap, net::SocketAddr, time::Duration};

use ambitions_core::sources::{GOALS_SOURCE_VAR, USERS_SOURCE_VAR};
use anyhow::Context;

pub const VENDOR_URL_VAR: &str = "AMB_VENDOR_URL";
pub const VENDOR_TOKEN_VAR: &str = "AMB_VENDOR_TOKEN";

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Raw data source selections keyed by their variable name.
    pub sources: HashMap<String, String>,
    pub vendor_url: Option<String>,
    pub vendor_token: Option<String>,
    pub jwt_secret: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("AMB_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid AMB_LISTEN_ADDR")?;
        let db_path = std::env::var("AMB_DB_PATH").unwrap_or_else(|_| "./db/app.db".into());
        let cors_allow = std::env::var("AMB_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("AMB_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let sources = [GOALS_SOURCE_VAR, USERS_SOURCE_VAR]
            .into_iter()
            .filter_map(|var| non_empty_var(var).map(|value| (var.to_string(), value)))
            .collect();

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            sources,
            vendor_url: non_empty_var(VENDOR_URL_VAR),
            vendor_token: non_empty_var(VENDOR_TOKEN_VAR),
            jwt_secret: non_empty_var("AMB_JWT_SECRET"),
        })
    }

    pub fn source(&self, variable: &str) -> Option<String> {
        self.sources.get(variable).cloned()
    }
}
