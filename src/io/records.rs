use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{DatasetError, Result};
use crate::models::{RecordName, RecordNaming};

/// Encode a record and write it, replacing any previous file
pub fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let bytes = bincode::serde::encode_to_vec(record, bincode::config::standard()).map_err(
        |source| DatasetError::Encode {
            path: path.to_path_buf(),
            source,
        },
    )?;
    std::fs::write(path, bytes).map_err(|e| DatasetError::io("writing record", path, e))
}

pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|e| DatasetError::io("reading record", path, e))?;
    let (record, _) = bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
        .map_err(|source| DatasetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(record)
}

/// Files in `dir` with the given extension, sorted by path
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| DatasetError::io("listing", dir, e))?;

    let mut files = Vec::new();
    for entry in read_dir {
        let path = entry.map_err(|e| DatasetError::io("listing", dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Record files of a split directory grouped by clip stem
pub type RecordIndex = HashMap<String, Vec<(PathBuf, RecordName)>>;

/// Index every record file of `dir` by the clip stem parsed from its name
///
/// Files that do not follow the naming template are skipped with a warning.
pub fn index_records(dir: &Path, naming: &RecordNaming) -> Result<RecordIndex> {
    let mut index: RecordIndex = HashMap::new();

    for path in list_files_with_extension(dir, crate::models::RECORD_EXTENSION)? {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match naming.parse(&file_name) {
            Ok(name) => index.entry(name.clip_stem()).or_default().push((path, name)),
            Err(e) => warn!("Skipping {:?}: {}", path, e),
        }
    }

    Ok(index)
}
