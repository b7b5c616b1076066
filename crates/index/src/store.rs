//! On-disk index artifact.
//!
//! Layout: `MEDIDX` magic, schema version (`u16` LE), codec byte, then the
//! bincode-encoded snapshot, Zstd-compressed unless the codec byte is zero.

use std::fs;
use std::io::Write;
use std::path::Path;

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use zstd::{decode_all, encode_all};

use crate::flat::{FlatIndex, IndexEntry};
use crate::{IndexError, INDEX_SCHEMA_VERSION};

pub const INDEX_MAGIC: &[u8; 6] = b"MEDIDX";

const HEADER_LEN: usize = INDEX_MAGIC.len() + 2 + 1;

/// Compression codec options for index artifacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompressionCodec {
    /// No compression (useful for debugging).
    None,
    #[default]
    Zstd,
}

impl CompressionCodec {
    fn tag(self) -> u8 {
        match self {
            CompressionCodec::None => 0,
            CompressionCodec::Zstd => 1,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(CompressionCodec::None),
            1 => Some(CompressionCodec::Zstd),
            _ => None,
        }
    }
}

/// Compression behavior configuration.
#[derive(Clone, Debug)]
pub struct CompressionConfig {
    pub codec: CompressionCodec,
    /// Zstd level (1-22, higher = smaller but slower).
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            level: 3,
        }
    }
}

impl CompressionConfig {
    pub fn new(codec: CompressionCodec, level: i32) -> Self {
        Self { codec, level }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, IndexError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => Ok(encode_all(data, self.level)?),
        }
    }
}

fn decompress(codec: CompressionCodec, data: &[u8]) -> Result<Vec<u8>, IndexError> {
    match codec {
        CompressionCodec::None => Ok(data.to_vec()),
        CompressionCodec::Zstd => Ok(decode_all(data)?),
    }
}

#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    model_name: String,
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl FlatIndex {
    /// Serializes the index to bytes in the artifact format.
    pub fn to_bytes(&self, compression: &CompressionConfig) -> Result<Vec<u8>, IndexError> {
        let snapshot = IndexSnapshot {
            model_name: self.model_name.clone(),
            dimension: self.dimension,
            entries: self.entries.clone(),
        };
        let encoded = encode_to_vec(&snapshot, standard())?;
        let body = compression.compress(&encoded)?;

        let mut out = Vec::with_capacity(HEADER_LEN + body.len());
        out.extend_from_slice(INDEX_MAGIC);
        out.extend_from_slice(&INDEX_SCHEMA_VERSION.to_le_bytes());
        out.push(compression.codec.tag());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Parses an artifact. Every failure is reported as [`IndexError::Unavailable`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexError> {
        if bytes.len() < HEADER_LEN || &bytes[..INDEX_MAGIC.len()] != INDEX_MAGIC {
            return Err(IndexError::unavailable("not a medchat index artifact"));
        }
        let version = u16::from_le_bytes([bytes[6], bytes[7]]);
        if version != INDEX_SCHEMA_VERSION {
            return Err(IndexError::Unavailable(format!(
                "unsupported index schema version {version} (expected {INDEX_SCHEMA_VERSION})"
            )));
        }
        let codec = CompressionCodec::from_tag(bytes[8])
            .ok_or_else(|| IndexError::Unavailable(format!("unknown codec tag {}", bytes[8])))?;

        let raw = decompress(codec, &bytes[HEADER_LEN..]).map_err(IndexError::unavailable)?;
        let (snapshot, _): (IndexSnapshot, usize) =
            decode_from_slice(&raw, standard()).map_err(IndexError::unavailable)?;

        if snapshot.dimension == 0 {
            return Err(IndexError::unavailable("index dimension is zero"));
        }
        FlatIndex::from_entries(snapshot.model_name, snapshot.dimension, snapshot.entries)
            .map_err(IndexError::unavailable)
    }

    /// Writes the artifact to `path`, replacing any previous file atomically.
    pub fn save(&self, path: &Path, compression: &CompressionConfig) -> Result<(), IndexError> {
        let bytes = self.to_bytes(compression)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;
        log::info!(
            "saved index with {} documents ({} bytes) to {}",
            self.entries.len(),
            bytes.len(),
            path.display()
        );
        Ok(())
    }

    /// Loads a read-only index from `path`.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let bytes = fs::read(path)
            .map_err(|e| IndexError::Unavailable(format!("cannot read {}: {e}", path.display())))?;
        let index = Self::from_bytes(&bytes)?;
        log::info!(
            "loaded index with {} documents (dim {}, model {}) from {}",
            index.entries.len(),
            index.dimension,
            index.model_name,
            path.display()
        );
        Ok(index)
    }
}
