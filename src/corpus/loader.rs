//! Log directory ingestion.
//!
//! Walks the log root recursively, parsing each file as newline-delimited
//! JSON. Malformed lines are skipped with a line-number diagnostic; they do
//! not abort the file or the batch.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{CorpusError, RunCorpus};
use crate::models::{LogLine, Run};

/// Ingest every file under `root` into a corpus keyed by the file's
/// `/`-joined path relative to `root`.
pub fn load_directory(root: &Path) -> Result<RunCorpus, CorpusError> {
    if !root.is_dir() {
        return Err(CorpusError::MissingDirectory(root.to_path_buf()));
    }

    let mut corpus = RunCorpus::new();
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    for path in files {
        let key = batch_key(root, &path);
        let runs = load_file(&path)?;
        debug!("loaded {} runs from {:?}", runs.len(), path);
        corpus.insert_batch(key, runs);
    }

    Ok(corpus)
}

/// Parse one log file, skipping malformed lines.
pub fn load_file(path: &Path) -> Result<Vec<Run>, CorpusError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut runs = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<LogLine>(&line) {
            Ok(parsed) => runs.push(parsed.into_run()),
            Err(e) => {
                warn!("line {} in {:?} is not valid JSON, skipped: {}", index + 1, path, e);
            }
        }
    }

    Ok(runs)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CorpusError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn batch_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
