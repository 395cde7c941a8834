use serde::{Deserialize, Serialize};

use crate::rss::{RawArticle, Region};

/// An article as published in the processed snapshot. `link` becomes `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteredArticle {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published: String,
    pub region: Region,
    pub cluster: usize,
}

impl ClusteredArticle {
    pub fn from_raw(article: &RawArticle, cluster: usize) -> Self {
        Self {
            title: article.title.clone(),
            url: article.link.clone(),
            source: article.source.clone(),
            published: article.published.clone(),
            region: article.region,
            cluster,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterGroup {
    pub group_id: usize,
    pub articles: Vec<ClusteredArticle>,
}

/// The clustered view of one raw snapshot, replacing any previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSnapshot {
    #[serde(rename = "generated_at_utc")]
    pub generated_at: String,
    pub total_articles: usize,
    pub clusters: Vec<ClusterGroup>,
}

impl ProcessedSnapshot {
    pub fn article_count(&self) -> usize {
        self.clusters.iter().map(|group| group.articles.len()).sum()
    }

    pub fn populated_groups(&self) -> usize {
        self.clusters
            .iter()
            .filter(|group| !group.articles.is_empty())
            .count()
    }
}
