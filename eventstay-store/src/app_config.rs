use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 { 5 }

fn default_acquire_timeout() -> u64 { 3 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Layers `default`, `{RUN_MODE}` and `local` files from `dir`, then `EVENTSTAY_*` env vars.
    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::from(dir.join("default")))
            .add_source(config::File::from(dir.join(&run_mode)).required(false))
            // Not checked in
            .add_source(config::File::from(dir.join("local")).required(false))
            // Eg. `EVENTSTAY_AUTH__JWT_SECRET=...` overrides `auth.jwt_secret`
            .add_source(
                config::Environment::with_prefix("EVENTSTAY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }
}
