//! Directory-backed snapshot store.
//!
//! ```text
//! <root>/grid.meta.json                     schema version, snapshot count
//! <root>/snapshots/000001.snapshot.cbor.zst CBOR snapshot, zstd level 3
//! <root>/integrity/manifest.json            sha256 of every file, chained
//! ```
//!
//! Every read is checked against the manifest first. A broken chain, a
//! changed file or an unknown schema version is an error, never a repair.

use crate::snapshot::{GridSnapshot, SnapshotError};
use lifegrid_kernel::{GridGeometry, GridSimulation};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const SCHEMA_VERSION: u32 = 1;
const ZSTD_LEVEL: i32 = 3;
const META_FILE: &str = "grid.meta.json";
const MANIFEST_FILE: &str = "manifest.json";
const SNAPSHOT_DIR: &str = "snapshots";
const INTEGRITY_DIR: &str = "integrity";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot encoding failed: {0}")]
    Encode(String),
    #[error("snapshot decoding failed: {0}")]
    Decode(String),
    #[error("store uses schema v{found}, this build reads v{expected}")]
    SchemaMismatch { found: u32, expected: u32 },
    #[error("{filename} does not match its manifest hash")]
    HashMismatch { filename: String },
    #[error("{filename} is not listed in the manifest")]
    Unlisted { filename: String },
    #[error("manifest chain broken at entry {position}")]
    ChainBroken { position: usize },
    #[error("snapshot {0} not found")]
    MissingSnapshot(u32),
    #[error("store holds no snapshots")]
    NoSnapshots,
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Contents of `grid.meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub schema_version: u32,
    pub snapshot_count: u32,
}

/// One hashed file. `prev_hash` links it to the entry before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub sha256: String,
    pub prev_hash: Option<String>,
}

/// Append-only hash chain over the snapshot files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityManifest {
    pub entries: Vec<ManifestEntry>,
}

impl IntegrityManifest {
    fn append(&mut self, filename: String, bytes: &[u8]) {
        let prev_hash = self.entries.last().map(|e| e.sha256.clone());
        self.entries.push(ManifestEntry {
            filename,
            sha256: sha256_hex(bytes),
            prev_hash,
        });
    }

    fn check_file(&self, filename: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.filename == filename)
            .ok_or_else(|| StoreError::Unlisted {
                filename: filename.to_string(),
            })?;
        if entry.sha256 == sha256_hex(bytes) {
            Ok(())
        } else {
            Err(StoreError::HashMismatch {
                filename: filename.to_string(),
            })
        }
    }

    /// Each entry must point at its predecessor's hash.
    fn check_links(&self) -> Result<(), StoreError> {
        let mut expected: Option<&str> = None;
        for (position, entry) in self.entries.iter().enumerate() {
            if entry.prev_hash.as_deref() != expected {
                return Err(StoreError::ChainBroken { position });
            }
            expected = Some(entry.sha256.as_str());
        }
        Ok(())
    }
}

/// Snapshot history of one grid, kept on disk.
pub struct GridStore {
    root: PathBuf,
    meta: StoreMeta,
    manifest: IntegrityManifest,
}

impl GridStore {
    /// Open the store at `path`, creating an empty one if nothing is there.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join(SNAPSHOT_DIR))?;
        std::fs::create_dir_all(root.join(INTEGRITY_DIR))?;

        let store = if root.join(META_FILE).exists() {
            let meta: StoreMeta = read_json(&root.join(META_FILE))?;
            if meta.schema_version != SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    found: meta.schema_version,
                    expected: SCHEMA_VERSION,
                });
            }
            let manifest_path = root.join(INTEGRITY_DIR).join(MANIFEST_FILE);
            let manifest = if manifest_path.exists() {
                read_json(&manifest_path)?
            } else {
                IntegrityManifest::default()
            };
            Self {
                root,
                meta,
                manifest,
            }
        } else {
            let store = Self {
                root,
                meta: StoreMeta {
                    schema_version: SCHEMA_VERSION,
                    snapshot_count: 0,
                },
                manifest: IntegrityManifest::default(),
            };
            store.flush()?;
            store
        };

        tracing::debug!(
            root = %store.root.display(),
            snapshots = store.meta.snapshot_count,
            "grid store opened"
        );
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    pub fn manifest(&self) -> &IntegrityManifest {
        &self.manifest
    }

    /// Capture the simulation and append it. Returns the 1-based index.
    pub fn save_snapshot(&mut self, sim: &GridSimulation) -> Result<u32, StoreError> {
        let snapshot = GridSnapshot::capture(sim);
        let bytes = encode(&snapshot)?;
        let index = self.meta.snapshot_count + 1;
        let filename = snapshot_filename(index);

        std::fs::write(self.root.join(SNAPSHOT_DIR).join(&filename), &bytes)?;
        self.manifest.append(filename, &bytes);
        self.meta.snapshot_count = index;
        self.flush()?;

        tracing::info!(
            index,
            generation = snapshot.generation,
            population = snapshot.population(),
            bytes = bytes.len(),
            "snapshot saved"
        );
        Ok(index)
    }

    /// Read one snapshot, checking its file hash and content hash.
    pub fn load_snapshot(&self, index: u32) -> Result<GridSnapshot, StoreError> {
        if index == 0 || index > self.meta.snapshot_count {
            return Err(StoreError::MissingSnapshot(index));
        }
        let filename = snapshot_filename(index);
        let bytes = std::fs::read(self.root.join(SNAPSHOT_DIR).join(&filename))?;
        self.manifest.check_file(&filename, &bytes)?;

        let snapshot = decode(&bytes)?;
        if !snapshot.verify() {
            return Err(SnapshotError::HashMismatch.into());
        }
        Ok(snapshot)
    }

    pub fn load_latest(&self) -> Result<GridSnapshot, StoreError> {
        match self.meta.snapshot_count {
            0 => Err(StoreError::NoSnapshots),
            latest => self.load_snapshot(latest),
        }
    }

    /// Rebuild the most recent generation on `geometry`.
    pub fn restore_latest(&self, geometry: GridGeometry) -> Result<GridSimulation, StoreError> {
        Ok(self.load_latest()?.restore(geometry)?)
    }

    /// Walk the whole manifest: links first, then every file on disk.
    pub fn verify_integrity(&self) -> Result<(), StoreError> {
        self.manifest.check_links()?;
        for entry in &self.manifest.entries {
            let bytes = std::fs::read(self.root.join(SNAPSHOT_DIR).join(&entry.filename))?;
            self.manifest.check_file(&entry.filename, &bytes)?;
        }
        let entries = self.manifest.entries.len();
        tracing::debug!(entries, "store integrity verified");
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        write_json(&self.root.join(META_FILE), &self.meta)?;
        write_json(
            &self.root.join(INTEGRITY_DIR).join(MANIFEST_FILE),
            &self.manifest,
        )
    }
}

fn snapshot_filename(index: u32) -> String {
    format!("{index:06}.snapshot.cbor.zst")
}

/// CBOR streamed straight into a zstd encoder.
fn encode(snapshot: &GridSnapshot) -> Result<Vec<u8>, StoreError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), ZSTD_LEVEL)?;
    ciborium::into_writer(snapshot, &mut encoder).map_err(|e| StoreError::Encode(e.to_string()))?;
    Ok(encoder.finish()?)
}

fn decode(bytes: &[u8]) -> Result<GridSnapshot, StoreError> {
    let decoder = zstd::Decoder::new(bytes)?;
    ciborium::from_reader(decoder).map_err(|e| StoreError::Decode(e.to_string()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    Ok(serde_json::from_slice(&std::fs::read(path)?)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    std::fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
