use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::rss::RawFeedSnapshot;
use crate::{PipelineError, TARGET_SNAPSHOT};

/// Serialize `value` as pretty JSON and move it over `path` in one rename.
///
/// The draft lives next to the destination so the rename stays on one
/// filesystem. If anything fails, the existing file at `path` is untouched.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let draft = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create draft file in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(draft.as_file());
        serde_json::to_writer_pretty(&mut writer, value)
            .with_context(|| format!("Failed to serialize snapshot for {}", path.display()))?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    draft.as_file().sync_all()?;
    debug!(target: TARGET_SNAPSHOT, "Draft {} written", draft.path().display());

    draft
        .persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    info!(target: TARGET_SNAPSHOT, "Wrote {}", path.display());
    Ok(())
}

/// Load the raw snapshot that feeds the clustering stage.
pub fn load_raw_snapshot(path: &Path) -> Result<RawFeedSnapshot, PipelineError> {
    let missing = |reason: String| PipelineError::MissingInput {
        path: path.to_path_buf(),
        reason,
    };

    let raw = fs::read_to_string(path).map_err(|e| missing(e.to_string()))?;
    let snapshot: RawFeedSnapshot =
        serde_json::from_str(&raw).map_err(|e| missing(format!("invalid JSON: {}", e)))?;
    debug!(
        target: TARGET_SNAPSHOT,
        "Loaded {} articles from {} (generated {})",
        snapshot.articles.len(),
        path.display(),
        snapshot.generated_at
    );
    Ok(snapshot)
}
