use std::{env, str::FromStr};

use anyhow::{Context, anyhow};

/// What checkout does when a cart line asks for more units than are in stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// Fail the checkout and write nothing.
    #[default]
    Reject,
    /// Sell anyway and floor the stock at zero.
    Clamp,
}

impl FromStr for StockPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(StockPolicy::Reject),
            "clamp" => Ok(StockPolicy::Clamp),
            other => Err(anyhow!(
                "unknown CHECKOUT_STOCK_POLICY {other:?}, expected \"reject\" or \"clamp\""
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub stock_policy: StockPolicy,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("APP_PORT") {
            Ok(p) => p
                .parse::<u16>()
                .with_context(|| format!("invalid APP_PORT {p:?}"))?,
            Err(_) => 3000,
        };
        let stock_policy = match env::var("CHECKOUT_STOCK_POLICY") {
            Ok(p) => p.parse()?,
            Err(_) => StockPolicy::default(),
        };
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(10);
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            stock_policy,
            db_max_connections,
        })
    }
}
