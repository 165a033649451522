use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::DictyError;
use crate::merge::{SourceSet, merge_tags};
use crate::record::MutantRecord;
use crate::source::{Source, SourceClient};
use crate::store::MutantStore;

pub const SNAPSHOT_VERSION: u32 = 1;
const SNAPSHOT_FILE: &str = "mutants.json";

/// Persisted snapshot envelope. The version is checked before the record
/// payload is touched; an unrecognized version is never best-effort read.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    version: u32,
    fetched_at: String,
    records: Vec<MutantRecord>,
}

#[derive(Debug, Deserialize)]
struct SnapshotHeader {
    version: u32,
}

/// Resolves the on-disk snapshot and runs the refresh pipeline when there is
/// nothing usable to load.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    cache_root: Utf8PathBuf,
}

impl SnapshotCache {
    pub fn new() -> Result<Self, DictyError> {
        let cache_root = BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.home_dir().join(".cache").join("dicty-mutants"))
                    .ok()
            })
            .ok_or_else(|| {
                DictyError::Filesystem("unable to resolve cache directory".to_string())
            })?;
        Ok(Self { cache_root })
    }

    pub fn new_with_root(cache_root: Utf8PathBuf) -> Self {
        Self { cache_root }
    }

    pub fn cache_root(&self) -> &Utf8Path {
        &self.cache_root
    }

    pub fn snapshot_path(&self) -> Utf8PathBuf {
        self.cache_root.join(SNAPSHOT_FILE)
    }

    pub fn source_path(&self, source: Source) -> Utf8PathBuf {
        self.cache_root.join("sources").join(source.file_name())
    }

    /// Returns the cached store, refreshing first when the snapshot is
    /// missing, unreadable or carries an unsupported schema version. A stale
    /// snapshot is only replaced once a refresh has fully succeeded.
    pub fn load_snapshot(&self, client: &dyn SourceClient) -> Result<MutantStore, DictyError> {
        let path = self.snapshot_path();
        if path.as_std_path().exists() {
            match fs::read(path.as_std_path()) {
                Ok(bytes) => match decode_snapshot(&bytes) {
                    Ok(store) => {
                        debug!(path = %path, mutants = store.len(), "loaded cached snapshot");
                        return Ok(store);
                    }
                    Err(err) => {
                        warn!(path = %path, error = %err, "cached snapshot unusable, refreshing");
                    }
                },
                Err(err) => {
                    warn!(path = %path, error = %err, "cached snapshot unreadable, refreshing");
                }
            }
        }

        let (store, bytes) = self.rebuild(client)?;
        write_bytes_atomic(&path, &bytes)?;
        Ok(store)
    }

    /// Forces the full fetch+merge+build pipeline and returns the serialized
    /// snapshot for the caller to persist. The cache is untouched on failure:
    /// all six fetches complete before anything is written.
    pub fn refresh(&self, client: &dyn SourceClient) -> Result<Vec<u8>, DictyError> {
        let (_, bytes) = self.rebuild(client)?;
        Ok(bytes)
    }

    /// Atomically installs serialized snapshot bytes as the cached snapshot.
    pub fn persist_snapshot(&self, bytes: &[u8]) -> Result<(), DictyError> {
        write_bytes_atomic(&self.snapshot_path(), bytes)
    }

    fn rebuild(&self, client: &dyn SourceClient) -> Result<(MutantStore, Vec<u8>), DictyError> {
        info!("refreshing mutant snapshot from dictyBase");
        let sources = SourceSet::fetch_all(client)?;

        write_bytes_atomic(&self.source_path(Source::All), sources.all.as_bytes())?;
        for (category, text) in &sources.categories {
            write_bytes_atomic(
                &self.source_path(Source::Category(*category)),
                text.as_bytes(),
            )?;
        }

        let records = merge_tags(&sources)?;
        let store = MutantStore::from_records(records);
        info!(mutants = store.len(), "built mutant snapshot");
        let bytes = encode_snapshot(&store)?;
        Ok((store, bytes))
    }
}

pub fn encode_snapshot(store: &MutantStore) -> Result<Vec<u8>, DictyError> {
    let envelope = SnapshotEnvelope {
        version: SNAPSHOT_VERSION,
        fetched_at: chrono::Utc::now().to_rfc3339(),
        records: store.records().to_vec(),
    };
    serde_json::to_vec_pretty(&envelope).map_err(|err| DictyError::SnapshotEncode(err.to_string()))
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<MutantStore, DictyError> {
    let header: SnapshotHeader =
        serde_json::from_slice(bytes).map_err(|err| DictyError::SnapshotDecode(err.to_string()))?;
    if header.version != SNAPSHOT_VERSION {
        return Err(DictyError::SnapshotVersionMismatch {
            found: header.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    let envelope: SnapshotEnvelope =
        serde_json::from_slice(bytes).map_err(|err| DictyError::SnapshotDecode(err.to_string()))?;
    Ok(MutantStore::from_records(envelope.records))
}

fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), DictyError> {
    let parent = path
        .parent()
        .ok_or_else(|| DictyError::Filesystem("invalid cache path".to_string()))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| DictyError::Filesystem(err.to_string()))?;
    let temp = tempfile::Builder::new()
        .prefix(".dicty-mutants")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| DictyError::Filesystem(err.to_string()))?;
    fs::write(temp.path(), content).map_err(|err| DictyError::Filesystem(err.to_string()))?;
    if path.as_std_path().exists() {
        fs::remove_file(path.as_std_path())
            .map_err(|err| DictyError::Filesystem(err.to_string()))?;
    }
    temp.persist(path.as_std_path())
        .map_err(|err| DictyError::Filesystem(err.to_string()))?;
    Ok(())
}
