use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentResponse {
    #[serde(default)]
    pub query: Option<ContentQuery>,
}

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    /// Keyed by page id, or "-1" for a missing page
    #[serde(default)]
    pub pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
pub struct Revision {
    pub slots: Slots,
}

#[derive(Debug, Deserialize)]
pub struct Slots {
    pub main: Slot,
}

#[derive(Debug, Deserialize)]
pub struct Slot {
    #[serde(rename = "*")]
    pub content: String,
}

/// Latest wikitext of an article plus its short description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub description: String,
}

impl Page {
    pub fn into_article(self, fallback_title: &str) -> Option<Article> {
        let revision = self.revisions.into_iter().next()?;
        Some(Article {
            title: self.title.unwrap_or_else(|| fallback_title.to_string()),
            content: revision.slots.main.content,
            description: self.description.unwrap_or_default(),
        })
    }
}
