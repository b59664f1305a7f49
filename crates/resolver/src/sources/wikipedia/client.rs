use std::time::Duration;

use super::models::{Article, ContentResponse, SearchResponse};
use crate::error::SourceError;

type Result<T> = std::result::Result<T, SourceError>;

#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    /// MediaWiki action API endpoint
    pub api_url: String,
    /// Prefix that turns an article title into a browsable URL
    pub article_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            article_base_url: "https://en.wikipedia.org/wiki/".to_string(),
            timeout: Duration::from_secs(10),
            user_agent: concat!(
                "DeathpoolApp/",
                env!("CARGO_PKG_VERSION"),
                " (Educational project; Rust/reqwest)"
            )
            .to_string(),
        }
    }
}

pub struct WikipediaClient {
    config: WikipediaConfig,
    client: reqwest::Client,
}

impl WikipediaClient {
    pub fn new(config: WikipediaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    /// Title of the best full-text search hit, if any
    pub async fn search_top_title(&self, query: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("srlimit", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Transient(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let data = response.json::<SearchResponse>().await?;
        let hits = data.query.map(|q| q.search).unwrap_or_default();
        tracing::debug!("Search for '{}' returned {} hit(s)", query, hits.len());

        Ok(hits.into_iter().next().map(|hit| hit.title))
    }

    /// Latest revision wikitext and short description of an article
    pub async fn fetch_article(&self, title: &str) -> Result<Option<Article>> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("action", "query"),
                ("prop", "revisions|description"),
                ("titles", title),
                ("rvprop", "content"),
                ("rvslots", "main"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Transient(format!(
                "content request returned status {}",
                response.status()
            )));
        }

        let data = response.json::<ContentResponse>().await?;
        let article = data
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|page| page.into_article(title));

        Ok(article)
    }

    pub fn article_url(&self, title: &str) -> String {
        format!(
            "{}{}",
            self.config.article_base_url,
            title.replace(' ', "_")
        )
    }
}
