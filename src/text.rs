//! Plain-text preparation of articles for the encoder.

use scraper::Html;

use crate::rss::RawArticle;

/// Strip markup from `summary`, joining the remaining text runs with single spaces.
pub fn normalize(summary: &str) -> String {
    if summary.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(summary);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text handed to the encoder: the raw title, a space, then the normalized summary.
pub fn embedding_text(article: &RawArticle) -> String {
    format!("{} {}", article.title, normalize(&article.summary))
}

pub fn embedding_texts(articles: &[RawArticle]) -> Vec<String> {
    articles.iter().map(embedding_text).collect()
}
