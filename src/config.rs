use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    /// Base URL shown to external viewers, e.g. `https://rms.example.com`.
    /// Share links are `{app_base_url}/s/{token}`.
    pub app_base_url: String,
    pub uploads_dir: String,
    /// HMAC key for signed file URLs served by this backend.
    pub file_url_secret: String,
    pub api_rps: u32,
    pub public_rps: u32,
    /// First-run bootstrap account, created only when no users exist yet.
    pub seed_admin_username: String,
    pub seed_admin_password: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            app_base_url: get_env("APP_BASE_URL")?,
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()),
            file_url_secret: get_env("FILE_URL_SECRET")?,
            api_rps: get_env_parse("API_RPS")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            seed_admin_username: env::var("SEED_ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            seed_admin_password: env::var("SEED_ADMIN_PASSWORD").ok(),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
