use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::{debug, info};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::errors::ConvertResult;

/// One file to place in the result archive: UTF-8 Markdown or a binary
/// attachment, both plain byte entries.
#[derive(Debug, Clone)]
pub struct OutputEntry {
    pub path: String,
    pub content: Vec<u8>,
}

impl OutputEntry {
    pub fn text(path: String, content: String) -> Self {
        OutputEntry {
            path,
            content: content.into_bytes(),
        }
    }

    pub fn binary(path: String, content: Vec<u8>) -> Self {
        OutputEntry { path, content }
    }
}

/// Writes all collected entries into a single ZIP archive at `output`.
pub fn write_zip(output: &Path, entries: &[OutputEntry]) -> ConvertResult<()> {
    info!(
        "Writing {} entry(ies) to archive: {}",
        entries.len(),
        output.display()
    );
    let file = File::create(output)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for entry in entries {
        debug!("Adding archive entry: {} ({} bytes)", entry.path, entry.content.len());
        zip.start_file(entry.path.as_str(), options)?;
        zip.write_all(&entry.content)?;
    }
    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_write_zip_round_trip() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("result.zip");
        let entries = vec![
            OutputEntry::text("Guide/Intro.md".to_string(), "# Intro\n".to_string()),
            OutputEntry::binary(
                "Guide/attachments/Intro_001.png".to_string(),
                vec![0x89, 0x50, 0x4e, 0x47],
            ),
        ];

        write_zip(&output, &entries).unwrap();

        let file = File::open(&output).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 2);

        let mut markdown = String::new();
        archive
            .by_name("Guide/Intro.md")
            .unwrap()
            .read_to_string(&mut markdown)
            .unwrap();
        assert_eq!(markdown, "# Intro\n");

        let mut bytes = Vec::new();
        archive
            .by_name("Guide/attachments/Intro_001.png")
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[test]
    fn test_write_empty_archive() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("empty.zip");
        write_zip(&output, &[]).unwrap();
        let file = File::open(&output).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
