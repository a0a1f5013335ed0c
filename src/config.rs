use anyhow::{bail, Context};
use simplelog::LevelFilter;
use std::{env, net::SocketAddr, str::FromStr};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_ACCESS_TOKEN_DURATION: i64 = 15 * 60;
const DEFAULT_REFRESH_TOKEN_DURATION: i64 = 30 * 24 * 3_600;
const DEFAULT_BCRYPT_COST: u32 = 10;

/// Settings read from the environment (and `.env`, if present) at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub jwt_secret: String,
    // None runs the server on the in-memory store
    pub database_url: Option<String>,
    pub bind_address: SocketAddr,
    pub access_token_duration: i64,
    pub refresh_token_duration: i64,
    pub bcrypt_cost: u32,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").context("$JWT_SECRET is not set")?;
        if jwt_secret.is_empty() {
            bail!("$JWT_SECRET is empty");
        }

        let config = Config {
            jwt_secret,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            bind_address: parse_or(&lookup, "BIND_ADDRESS", DEFAULT_BIND_ADDRESS.parse()?)?,
            access_token_duration: parse_or(&lookup, "ACCESS_TOKEN_DURATION", DEFAULT_ACCESS_TOKEN_DURATION)?,
            refresh_token_duration: parse_or(&lookup, "REFRESH_TOKEN_DURATION", DEFAULT_REFRESH_TOKEN_DURATION)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?,
            log_level: parse_or(&lookup, "LOG_LEVEL", LevelFilter::Info)?,
        };

        if config.access_token_duration <= 0 || config.refresh_token_duration <= 0 {
            bail!("token durations must be positive");
        }
        if !(4..=31).contains(&config.bcrypt_cost) {
            bail!("$BCRYPT_COST must be between 4 and 31");
        }
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("${key} is invalid ({raw}): {err}")),
        None => Ok(default),
    }
}
