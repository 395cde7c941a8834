mod common;

use std::fs;

use newsroom::pipeline;
use newsroom::rss::Region;
use newsroom::snapshot::ProcessedSnapshot;
use newsroom::PipelineError;

use common::{
    article, config_in, sample_articles, write_raw, BrokenEncoder, ShortEncoder, StubEncoder,
};

fn pipeline_error(err: &anyhow::Error) -> &PipelineError {
    err.downcast_ref::<PipelineError>()
        .expect("error should carry a PipelineError")
}

#[test]
fn test_counts_and_completeness() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let articles = sample_articles();
    write_raw(&config, articles.clone());

    let snapshot = pipeline::process(&config, &StubEncoder).unwrap();

    assert_eq!(snapshot.total_articles, articles.len());
    assert_eq!(snapshot.article_count(), articles.len());
    let ids: Vec<_> = snapshot.clusters.iter().map(|g| g.group_id).collect();
    assert_eq!(ids, (0..6).collect::<Vec<_>>());

    let stored: ProcessedSnapshot =
        serde_json::from_str(&fs::read_to_string(&config.processed_snapshot_path).unwrap())
            .unwrap();
    assert_eq!(stored, snapshot);
}

#[test]
fn test_link_becomes_url_and_cluster_matches_group() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let articles = sample_articles();
    write_raw(&config, articles.clone());

    let snapshot = pipeline::process(&config, &StubEncoder).unwrap();

    let mut urls = Vec::new();
    for group in &snapshot.clusters {
        for stored in &group.articles {
            assert_eq!(stored.cluster, group.group_id);
            urls.push(stored.url.clone());
        }
    }
    urls.sort();
    let mut links: Vec<_> = articles.iter().map(|a| a.link.clone()).collect();
    links.sort();
    assert_eq!(urls, links);
}

#[test]
fn test_grouping_preserves_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let articles = sample_articles();
    write_raw(&config, articles.clone());

    let snapshot = pipeline::process(&config, &StubEncoder).unwrap();

    let position = |url: &str| articles.iter().position(|a| a.link == url).unwrap();
    for group in &snapshot.clusters {
        let positions: Vec<_> = group.articles.iter().map(|a| position(&a.url)).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }
}

#[test]
fn test_fixed_seed_gives_identical_assignments() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_raw(&config, sample_articles());

    let assignments = |snapshot: &ProcessedSnapshot| -> Vec<(String, usize)> {
        let mut pairs: Vec<_> = snapshot
            .clusters
            .iter()
            .flat_map(|g| g.articles.iter().map(|a| (a.url.clone(), a.cluster)))
            .collect();
        pairs.sort();
        pairs
    };

    let first = pipeline::process(&config, &StubEncoder).unwrap();
    let second = pipeline::process(&config, &StubEncoder).unwrap();
    assert_eq!(assignments(&first), assignments(&second));
}

#[test]
fn test_empty_corpus_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_raw(&config, Vec::new());

    let err = pipeline::process(&config, &StubEncoder).unwrap_err();
    assert!(matches!(pipeline_error(&err), PipelineError::EmptyCorpus));
    assert!(!config.processed_snapshot_path.exists());
}

#[test]
fn test_empty_corpus_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_raw(&config, sample_articles());
    pipeline::process(&config, &StubEncoder).unwrap();
    let before = fs::read_to_string(&config.processed_snapshot_path).unwrap();

    write_raw(&config, Vec::new());
    assert!(pipeline::process(&config, &StubEncoder).is_err());

    let after = fs::read_to_string(&config.processed_snapshot_path).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_single_article_fills_one_of_six_groups() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_raw(
        &config,
        vec![article("https://example.com/only", "Only story", "", Region::Global)],
    );

    let snapshot = pipeline::process(&config, &StubEncoder).unwrap();

    assert_eq!(snapshot.clusters.len(), 6);
    assert_eq!(snapshot.total_articles, 1);
    assert_eq!(snapshot.populated_groups(), 1);
    let holder = snapshot
        .clusters
        .iter()
        .find(|g| !g.articles.is_empty())
        .unwrap();
    assert_eq!(holder.articles[0].url, "https://example.com/only");
}

#[test]
fn test_missing_raw_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let err = pipeline::process(&config, &StubEncoder).unwrap_err();
    assert!(matches!(pipeline_error(&err), PipelineError::MissingInput { .. }));
    assert!(!config.processed_snapshot_path.exists());
}

#[test]
fn test_encoder_failures_abort_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_raw(&config, sample_articles());

    let err = pipeline::process(&config, &ShortEncoder).unwrap_err();
    assert!(matches!(pipeline_error(&err), PipelineError::EncoderFailure(_)));

    let err = pipeline::process(&config, &BrokenEncoder).unwrap_err();
    assert!(matches!(pipeline_error(&err), PipelineError::EncoderFailure(_)));

    assert!(!config.processed_snapshot_path.exists());
}

#[test]
fn test_unwritable_destination_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    write_raw(&config, sample_articles());

    // The parent "directory" is a regular file
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "x").unwrap();
    config.processed_snapshot_path = blocker.join("processed_news.json");

    assert!(pipeline::process(&config, &StubEncoder).is_err());
}

#[test]
fn test_corpus_is_checked_without_an_encoder() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let err = pipeline::load_corpus(&config).unwrap_err();
    assert!(matches!(pipeline_error(&err), PipelineError::MissingInput { .. }));

    write_raw(&config, Vec::new());
    let err = pipeline::load_corpus(&config).unwrap_err();
    assert!(matches!(pipeline_error(&err), PipelineError::EmptyCorpus));
}

#[test]
fn test_loaded_corpus_clusters_like_process() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_raw(&config, sample_articles());

    let raw = pipeline::load_corpus(&config).unwrap();
    let split = pipeline::cluster_corpus(&config, &raw, &StubEncoder).unwrap();
    let whole = pipeline::process(&config, &StubEncoder).unwrap();
    assert_eq!(split.clusters, whole.clusters);
}
