use std::collections::HashSet;

use super::types::RawArticle;

/// Accumulates articles across regions, keeping the first occurrence of each link.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen_links: HashSet<String>,
    articles: Vec<RawArticle>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `article` unless its link was already seen. Returns whether it was added.
    pub fn push(&mut self, article: RawArticle) -> bool {
        if !self.seen_links.insert(article.link.clone()) {
            return false;
        }
        self.articles.push(article);
        true
    }

    /// Adds every article in order and returns how many were new.
    pub fn extend(&mut self, articles: impl IntoIterator<Item = RawArticle>) -> usize {
        articles
            .into_iter()
            .map(|article| self.push(article))
            .filter(|added| *added)
            .count()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn into_articles(self) -> Vec<RawArticle> {
        self.articles
    }
}
