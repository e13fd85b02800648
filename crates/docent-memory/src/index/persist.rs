use std::io::ErrorKind;
use std::path::Path;

use crate::document::ChunkMetadata;

use super::IndexError;
use super::flat::FlatIndex;

pub const INDEX_FILE: &str = "index.bin";
pub const DOCUMENTS_FILE: &str = "documents.json";
pub const METADATA_FILE: &str = "metadata.json";

pub const ARTIFACTS: [&str; 3] = [INDEX_FILE, DOCUMENTS_FILE, METADATA_FILE];

#[derive(Debug)]
pub struct Snapshot {
    pub flat: FlatIndex,
    pub contents: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
}

/// Load the three artifacts from `dir`.
///
/// Returns `Ok(None)` when any artifact is missing.
///
/// # Errors
///
/// Returns an error when an artifact cannot be read or parsed, or when the
/// artifacts disagree on the number of rows.
pub async fn load(dir: &Path) -> Result<Option<Snapshot>, IndexError> {
    for name in ARTIFACTS {
        if !tokio::fs::try_exists(dir.join(name)).await? {
            return Ok(None);
        }
    }

    let flat = FlatIndex::from_bytes(&tokio::fs::read(dir.join(INDEX_FILE)).await?)?;
    let contents: Vec<String> =
        serde_json::from_slice(&tokio::fs::read(dir.join(DOCUMENTS_FILE)).await?)?;
    let metadata: Vec<ChunkMetadata> =
        serde_json::from_slice(&tokio::fs::read(dir.join(METADATA_FILE)).await?)?;

    if flat.len() != contents.len() || contents.len() != metadata.len() {
        return Err(IndexError::Corrupt(format!(
            "row counts disagree: {} vectors, {} documents, {} metadata",
            flat.len(),
            contents.len(),
            metadata.len()
        )));
    }

    Ok(Some(Snapshot {
        flat,
        contents,
        metadata,
    }))
}

/// Write all three artifacts, each through a temporary file and rename.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem operation fails.
pub async fn save(
    dir: &Path,
    flat: &FlatIndex,
    contents: &[String],
    metadata: &[ChunkMetadata],
) -> Result<(), IndexError> {
    write_replace(dir, INDEX_FILE, &flat.to_bytes()).await?;
    write_replace(dir, DOCUMENTS_FILE, &serde_json::to_vec(contents)?).await?;
    write_replace(dir, METADATA_FILE, &serde_json::to_vec_pretty(metadata)?).await?;
    Ok(())
}

/// Delete every artifact. Missing files are not an error.
///
/// # Errors
///
/// Returns an error if an existing artifact cannot be removed.
pub async fn remove_all(dir: &Path) -> Result<(), IndexError> {
    for name in ARTIFACTS {
        match tokio::fs::remove_file(dir.join(name)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn write_replace(dir: &Path, name: &str, bytes: &[u8]) -> Result<(), IndexError> {
    let tmp = dir.join(format!("{name}.tmp"));
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, dir.join(name)).await?;
    Ok(())
}
