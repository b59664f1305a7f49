use std::time::Duration;

use anyhow::{Context, Result};
use resolver::WikipediaConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub wikipedia: WikipediaConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = WikipediaConfig::default();

        let timeout = match std::env::var("LOOKUP_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(
                secs.parse()
                    .context("LOOKUP_TIMEOUT_SECS must be a number of seconds")?,
            ),
            Err(_) => defaults.timeout,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            wikipedia: WikipediaConfig {
                api_url: std::env::var("WIKIPEDIA_API_URL").unwrap_or(defaults.api_url),
                article_base_url: std::env::var("WIKIPEDIA_ARTICLE_URL")
                    .unwrap_or(defaults.article_base_url),
                timeout,
                user_agent: defaults.user_agent,
            },
        })
    }
}
