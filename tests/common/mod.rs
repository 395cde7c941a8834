#![allow(dead_code)]

use anyhow::{anyhow, Result};
use std::path::Path;

use newsroom::rss::{RawArticle, RawFeedSnapshot, Region};
use newsroom::snapshot::write_json_atomic;
use newsroom::vector::Encoder;
use newsroom::PipelineConfig;

pub const STUB_DIMENSIONS: usize = 16;

/// Bag-of-words hashing encoder: same text, same vector.
pub struct StubEncoder;

impl Encoder for StubEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| hash_embed(text)).collect())
    }

    fn dimensions(&self) -> usize {
        STUB_DIMENSIONS
    }
}

fn hash_embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; STUB_DIMENSIONS];
    for word in text.split_whitespace() {
        let bucket = word
            .to_lowercase()
            .bytes()
            .fold(7u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        vector[(bucket % STUB_DIMENSIONS as u64) as usize] += 1.0;
    }
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
    vector.iter().map(|x| x / norm).collect()
}

/// Returns one vector too few.
pub struct ShortEncoder;

impl Encoder for ShortEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .skip(1)
            .map(|_| vec![0.0; STUB_DIMENSIONS])
            .collect())
    }

    fn dimensions(&self) -> usize {
        STUB_DIMENSIONS
    }
}

/// Fails outright, like a model that could not run.
pub struct BrokenEncoder;

impl Encoder for BrokenEncoder {
    fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(anyhow!("inference backend unavailable"))
    }

    fn dimensions(&self) -> usize {
        STUB_DIMENSIONS
    }
}

pub fn article(link: &str, title: &str, summary: &str, region: Region) -> RawArticle {
    RawArticle {
        title: title.to_string(),
        link: link.to_string(),
        published: "Mon, 6 May 2024 10:00:00 +0000".to_string(),
        summary: summary.to_string(),
        source: "Test Wire".to_string(),
        region,
    }
}

pub fn sample_articles() -> Vec<RawArticle> {
    let topics = [
        ("election vote ballot parliament", Region::India),
        ("football match goal league", Region::Europe),
        ("stocks market shares index", Region::Us),
        ("storm rain flood weather", Region::Asia),
    ];
    let mut articles = Vec::new();
    for round in 0..5 {
        for (index, (words, region)) in topics.iter().enumerate() {
            articles.push(article(
                &format!("https://news.example.com/{}/{}", index, round),
                &format!("{} update {}", words, round),
                &format!("<p>More on <b>{}</b></p>", words),
                *region,
            ));
        }
    }
    articles
}

pub fn config_in(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.raw_snapshot_path = dir.join("data/news_raw.json");
    config.processed_snapshot_path = dir.join("data/processed_news.json");
    config
}

pub fn write_raw(config: &PipelineConfig, articles: Vec<RawArticle>) {
    write_json_atomic(&config.raw_snapshot_path, &RawFeedSnapshot::new(articles)).unwrap();
}
