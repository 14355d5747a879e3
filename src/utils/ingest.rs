//! Turns files, folders and zip archives into `(path, filename, text)`
//! documents for the extraction core.

use std::fs::{self, File};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use crate::config::BatchConfig;
use crate::error::IngestError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Location on disk, or `archive.zip/entry/path.xml` for archive entries.
    pub path: String,
    pub filename: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(path: impl Into<String>, filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self { path: path.into(), filename: filename.into(), text: text.into() }
    }
}

/// UTF-8 with an optional BOM; invalid sequences are replaced, not rejected.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("zip"))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load every document reachable from `path`: a single XML file, a folder
/// (walked recursively in name order) or a zip archive.
pub fn load_path(path: &Path, config: &BatchConfig) -> Result<Vec<SourceDocument>, IngestError> {
    if path.is_dir() {
        let mut docs = Vec::new();
        walk_dir(path, config, &mut docs)?;
        Ok(docs)
    } else if is_zip(path) {
        let file = File::open(path).map_err(|source| IngestError::Io { path: path.to_path_buf(), source })?;
        read_archive(file, path, config)
    } else if config.accepts(path) {
        Ok(vec![read_file(path, config)?])
    } else {
        Err(IngestError::UnsupportedFormat(path.to_path_buf()))
    }
}

pub fn read_file(path: &Path, config: &BatchConfig) -> Result<SourceDocument, IngestError> {
    let io_err = |source| IngestError::Io { path: path.to_path_buf(), source };
    let size = fs::metadata(path).map_err(io_err)?.len();

    let text = if size >= config.mmap_threshold_bytes {
        debug!("mapping {} ({} bytes)", path.display(), size);
        let file = File::open(path).map_err(io_err)?;
        // Read-only and dropped before returning; a file truncated underneath
        // the map by another process is not supported.
        let map = unsafe { Mmap::map(&file) }.map_err(io_err)?;
        decode_text(&map)
    } else {
        decode_text(&fs::read(path).map_err(io_err)?)
    };

    Ok(SourceDocument::new(path.display().to_string(), file_name_of(path), text))
}

fn walk_dir(dir: &Path, config: &BatchConfig, out: &mut Vec<SourceDocument>) -> Result<(), IngestError> {
    let io_err = |source| IngestError::Io { path: dir.to_path_buf(), source };
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            walk_dir(&entry, config, out)?;
        } else if is_zip(&entry) {
            // A damaged archive only costs its own documents.
            let loaded = File::open(&entry)
                .map_err(|source| IngestError::Io { path: entry.clone(), source })
                .and_then(|file| read_archive(file, &entry, config));
            match loaded {
                Ok(mut docs) => out.append(&mut docs),
                Err(e) => warn!("skipping archive {}: {}", entry.display(), e),
            }
        } else if config.accepts(&entry) {
            match read_file(&entry, config) {
                Ok(doc) => out.push(doc),
                Err(e) => warn!("skipping {}: {}", entry.display(), e),
            }
        } else {
            debug!("ignoring {}", entry.display());
        }
    }
    Ok(())
}

/// Read the XML entries of a zip archive in archive order.
pub fn read_archive<R: Read + Seek>(
    reader: R,
    archive_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<SourceDocument>, IngestError> {
    let mut archive = ZipArchive::new(reader).map_err(|source| IngestError::Archive {
        path: archive_path.to_path_buf(),
        source,
    })?;

    let mut docs = Vec::new();
    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("{}: unreadable entry #{}: {}", archive_path.display(), i, e);
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let entry_path = Path::new(&name);
        if !config.accepts(entry_path) {
            debug!("{}: ignoring entry {}", archive_path.display(), name);
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        if let Err(e) = entry.read_to_end(&mut bytes) {
            warn!("{}: failed to read {}: {}", archive_path.display(), name, e);
            continue;
        }
        docs.push(SourceDocument::new(
            format!("{}/{}", archive_path.display(), name),
            file_name_of(entry_path),
            decode_text(&bytes),
        ));
    }
    Ok(docs)
}
