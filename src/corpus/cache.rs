//! Binary corpus cache.
//!
//! Persists the full path -> runs mapping so repeated invocations skip the
//! directory walk and line-by-line parse. A reloaded cache must equal what
//! direct ingestion would produce.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::info;

use super::{CorpusError, RunCorpus};

/// Serialize the corpus to `path`, creating parent directories as needed.
pub fn save_cache(path: &Path, corpus: &RunCorpus) -> Result<(), CorpusError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, corpus)?;

    info!("cached {} runs to {:?}", corpus.total_runs(), path);
    Ok(())
}

/// Deserialize a corpus previously written by [`save_cache`].
pub fn load_cache(path: &Path) -> Result<RunCorpus, CorpusError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let corpus: RunCorpus = bincode::deserialize_from(reader)?;

    info!("loaded {} runs from cache {:?}", corpus.total_runs(), path);
    Ok(corpus)
}
