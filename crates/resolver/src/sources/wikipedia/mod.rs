mod client;
mod models;
pub mod templates;

pub use client::{WikipediaClient, WikipediaConfig};
pub use models::Article;

use crate::error::SourceError;
use crate::traits::{KnowledgeSource, SubjectFacts};
use tracing::{info, warn};

/// Resolves subjects against Wikipedia: top search hit, then infobox dates
/// from the article's wikitext.
pub struct WikipediaSource {
    client: WikipediaClient,
}

impl WikipediaSource {
    pub fn new(config: WikipediaConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: WikipediaClient::new(config)?,
        })
    }
}

#[async_trait::async_trait]
impl KnowledgeSource for WikipediaSource {
    async fn resolve_subject(&self, name: &str) -> Result<SubjectFacts, SourceError> {
        info!("Looking up: {}", name);

        let title = self
            .client
            .search_top_title(name)
            .await?
            .ok_or_else(|| SourceError::NotFound(name.to_string()))?;
        info!("Found page: {}", title);

        let article = self
            .client
            .fetch_article(&title)
            .await?
            .ok_or_else(|| SourceError::NotFound(name.to_string()))?;

        let Some(birth_date) = templates::extract_birth_date(&article.content) else {
            warn!("Could not find birth date in article '{}' for {}", article.title, name);
            return Err(SourceError::NotFound(name.to_string()));
        };
        let death_date = templates::extract_death_date(&article.content);

        match death_date {
            Some(death) => info!("{}: born {}, deceased on {}", name, birth_date, death),
            None => info!("{}: born {}, living", name, birth_date),
        }

        Ok(SubjectFacts {
            birth_date,
            death_date,
            source_url: self.client.article_url(&article.title),
            short_description: article.description,
        })
    }

    fn name(&self) -> &'static str {
        "Wikipedia"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::{Matcher, Mock, ServerGuard};
    use serde_json::json;
    use std::time::Duration;

    fn source_for(server: &ServerGuard) -> WikipediaSource {
        WikipediaSource::new(WikipediaConfig {
            api_url: format!("{}/w/api.php", server.url()),
            article_base_url: "https://en.wikipedia.org/wiki/".to_string(),
            timeout: Duration::from_secs(5),
            user_agent: "deathpool-tests".to_string(),
        })
        .unwrap()
    }

    async fn mock_search(server: &mut ServerGuard, hits: serde_json::Value) -> Mock {
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("list".into(), "search".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "query": { "search": hits } }).to_string())
            .create_async()
            .await
    }

    async fn mock_content(server: &mut ServerGuard, title: &str, wikitext: &str) -> Mock {
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("prop".into(), "revisions|description".into()),
                Matcher::UrlEncoded("titles".into(), title.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "query": { "pages": { "42": {
                        "pageid": 42,
                        "title": title,
                        "description": "American singer-songwriter",
                        "revisions": [ { "slots": { "main": { "*": wikitext } } } ]
                    } } }
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_resolves_living_subject() {
        let mut server = mockito::Server::new_async().await;
        let search = mock_search(&mut server, json!([{ "title": "Willie Nelson", "pageid": 42 }])).await;
        let content = mock_content(
            &mut server,
            "Willie Nelson",
            "| birth_date = {{birth date and age|1933|4|29}}",
        )
        .await;

        let facts = source_for(&server).resolve_subject("willie nelson").await.unwrap();
        assert_eq!(facts.birth_date, NaiveDate::from_ymd_opt(1933, 4, 29).unwrap());
        assert_eq!(facts.death_date, None);
        assert_eq!(facts.source_url, "https://en.wikipedia.org/wiki/Willie_Nelson");
        assert_eq!(facts.short_description, "American singer-songwriter");

        search.assert_async().await;
        content.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolves_deceased_subject() {
        let mut server = mockito::Server::new_async().await;
        mock_search(&mut server, json!([{ "title": "Gene Hackman" }])).await;
        mock_content(
            &mut server,
            "Gene Hackman",
            "| birth_date = {{birth date|1930|1|30}}\n| death_date = {{circa|{{death date and age|2025|2|18|1930|1|30}}}}",
        )
        .await;

        let facts = source_for(&server).resolve_subject("Gene Hackman").await.unwrap();
        assert_eq!(facts.death_date, NaiveDate::from_ymd_opt(2025, 2, 18));
    }

    #[tokio::test]
    async fn test_no_search_hits_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        mock_search(&mut server, json!([])).await;

        let err = source_for(&server).resolve_subject("Nobody Atall").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_birth_date_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        mock_search(&mut server, json!([{ "title": "Drake" }])).await;
        mock_content(&mut server, "Drake", "| death_date = {{death date|2020|1|1}}").await;

        let err = source_for(&server).resolve_subject("Drake").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = source_for(&server).resolve_subject("Anyone").await.unwrap_err();
        assert!(matches!(err, SourceError::Transient(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_transient() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = source_for(&server).resolve_subject("Anyone").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
