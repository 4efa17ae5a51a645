use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use log::{debug, info, warn};
use serde::Deserialize;
use tar::Archive;

use super::errors::{ArchiveError, ConvertResult};
use super::hierarchy::TocEntry;

/// Fixed metadata file name searched for at the top of the container.
pub const METADATA_FILE: &str = "meta.json";

/// Export metadata: JSON with the table of contents embedded as a YAML
/// string.
#[derive(Debug, Deserialize)]
struct Metadata {
    toc: String,
}

/// Per-document payload shape. `body` is preferred, `body_asl` is the
/// fallback HTML source.
#[derive(Debug, Deserialize)]
struct DocPayload {
    doc: DocBody,
}

#[derive(Debug, Default, Deserialize)]
struct DocBody {
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    body_asl: Option<String>,
}

/// An unpacked knowledge-base export container: the root entry directory,
/// the decoded table of contents, and every file keyed by its
/// archive-relative path.
#[derive(Debug)]
pub struct KbArchive {
    pub root: String,
    pub toc: Vec<TocEntry>,
    files: HashMap<String, Vec<u8>>,
}

impl KbArchive {
    /// Unpacks a gzip-compressed tar container and decodes its metadata.
    ///
    /// The root entry directory is the first top-level directory in archive
    /// order that carries the metadata file. Fatal conditions: no metadata
    /// entry, undecodable metadata, empty table of contents.
    pub fn open(path: &Path) -> ConvertResult<Self> {
        info!("Opening export container: {}", path.display());
        let file = File::open(path).map_err(ArchiveError::ReadFailed)?;
        let mut archive = Archive::new(GzDecoder::new(file));

        let mut files = HashMap::new();
        let mut root: Option<String> = None;
        for entry in archive.entries().map_err(ArchiveError::ReadFailed)? {
            let mut entry = entry.map_err(ArchiveError::ReadFailed)?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .map_err(ArchiveError::ReadFailed)?
                .to_string_lossy()
                .replace('\\', "/");
            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(ArchiveError::ReadFailed)?;

            if root.is_none() {
                if let Some(dir) = rel.strip_suffix(&format!("/{}", METADATA_FILE)) {
                    if !dir.is_empty() && !dir.contains('/') {
                        root = Some(dir.to_string());
                    }
                }
            }
            files.insert(rel, content);
        }
        debug!("Unpacked {} file(s) from container", files.len());

        let root = root.ok_or_else(|| ArchiveError::MissingMetadata(METADATA_FILE.to_string()))?;
        info!("Resolved root entry directory: {}", root);

        let meta_path = format!("{}/{}", root, METADATA_FILE);
        let meta_bytes = files
            .get(&meta_path)
            .ok_or_else(|| ArchiveError::MissingMetadata(meta_path.clone()))?;
        let metadata: Metadata = serde_json::from_slice(meta_bytes)?;
        let toc: Vec<TocEntry> = serde_yaml::from_str(&metadata.toc)?;
        if toc.is_empty() {
            return Err(ArchiveError::EmptyToc.into());
        }
        info!("Decoded table of contents with {} entry(ies)", toc.len());

        Ok(KbArchive { root, toc, files })
    }

    /// Looks up the raw HTML of one document by the TOC entry's url stem.
    pub fn document_html(&self, url: &str) -> ConvertResult<String> {
        let payload_path = format!("{}/{}.json", self.root, url);
        let bytes = self
            .files
            .get(&payload_path)
            .ok_or_else(|| ArchiveError::MissingDocument(payload_path.clone()))?;
        let payload: DocPayload = serde_json::from_slice(bytes)
            .map_err(|e| ArchiveError::MetadataParse(format!("{}: {}", payload_path, e)))?;
        let html = payload
            .doc
            .body
            .or(payload.doc.body_asl)
            .unwrap_or_default();
        if html.is_empty() {
            warn!("Document payload has no body: {}", payload_path);
        }
        Ok(html)
    }
}
