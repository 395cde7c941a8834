use anyhow::{anyhow, Result};

use super::types::{ClusterGroup, ClusteredArticle, ProcessedSnapshot};
use crate::rss::RawArticle;

/// Group `articles` by the parallel `labels`, emitting exactly `k` groups.
///
/// Articles keep their input order within each group.
pub fn build_snapshot(articles: &[RawArticle], labels: &[usize], k: usize) -> Result<ProcessedSnapshot> {
    if articles.len() != labels.len() {
        return Err(anyhow!(
            "{} articles but {} cluster labels",
            articles.len(),
            labels.len()
        ));
    }

    let mut clusters: Vec<ClusterGroup> = (0..k)
        .map(|group_id| ClusterGroup {
            group_id,
            articles: Vec::new(),
        })
        .collect();

    for (article, &label) in articles.iter().zip(labels) {
        let group = clusters
            .get_mut(label)
            .ok_or_else(|| anyhow!("cluster label {} out of range for k={}", label, k))?;
        group.articles.push(ClusteredArticle::from_raw(article, label));
    }

    Ok(ProcessedSnapshot {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_articles: articles.len(),
        clusters,
    })
}
