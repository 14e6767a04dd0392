//! Connection configuration loaded from the environment (spec §6
//! Configuration).

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv();
});

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let min_connections = env::var("DATABASE_MIN_CONNECTIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(2);
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(16);
        Self { url, min_connections, max_connections }
    }
}

/// Forces `.env` to load early, for callers outside `from_env`.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
