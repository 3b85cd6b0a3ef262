use crate::error::Error;
use log::info;
use std::fmt::Display;
use std::str::FromStr;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const JWT_SECRET: &str = "JWT_SECRET";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub token_ttl_days: i64,
}

impl Config {
    /// Reads the process environment, after `.env` has been applied.
    pub fn load() -> Result<Self, Error> {
        Ok(Self {
            database_url: dotenv::var(DATABASE_URL)?,
            jwt_secret: dotenv::var(JWT_SECRET)?,
            bind_addr: try_load("BIND_ADDR", "0.0.0.0:8000")?,
            db_max_connections: try_load("DB_MAX_CONNECTIONS", "5")?,
            token_ttl_days: try_load("TOKEN_TTL_DAYS", "30")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, Error>
where
    T::Err: Display,
{
    let value = dotenv::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_owned()
    });
    value.parse().map_err(|e| Error::ServerError(format!("invalid {} value {:?}: {}", key, value, e)))
}
