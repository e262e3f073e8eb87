//! Cheap metadata views of a dictionary.

use std::path::Path;

use log::warn;

use crate::engine::dictionary::Dictionary;
use crate::engine::index::Index;

/// Per-index metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexInfo {
    pub short_name: String,
    pub long_name: String,
    pub main_token_count: u32,
    pub num_index_entries: u32,
}

/// Dictionary metadata without the entry payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryInfo {
    pub filename: String,
    pub file_bytes: u64,
    pub creation_millis: i64,
    pub dict_info: String,
    pub index_infos: Vec<IndexInfo>,
}

impl Index {
    pub fn index_info(&self) -> IndexInfo {
        IndexInfo {
            short_name: self.short_name.clone(),
            long_name: self.long_name.clone(),
            main_token_count: self.main_token_count,
            num_index_entries: self.sorted_entries().len() as u32,
        }
    }
}

impl DictionaryInfo {
    /// Fast-path metadata read.
    ///
    /// Never propagates errors: on any failure the returned record carries
    /// only the filename and file length.
    pub fn read<P: AsRef<Path>>(path: P) -> DictionaryInfo {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        match Dictionary::open(path) {
            Ok(dict) => {
                let mut result = dict.dictionary_info();
                dict.close();
                result.filename = filename;
                result.file_bytes = file_bytes;
                result
            }
            Err(err) => {
                warn!(
                    "could not read dictionary info from {}: {}",
                    path.display(),
                    err
                );
                DictionaryInfo {
                    filename,
                    file_bytes,
                    ..DictionaryInfo::default()
                }
            }
        }
    }
}
