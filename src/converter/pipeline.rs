use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::config::AppConfig;

use super::archive_reader::KbArchive;
use super::archive_writer::{write_zip, OutputEntry};
use super::errors::{ConvertError, ConvertResult};
use super::hierarchy::PathAssigner;
use super::html_parser::parse;
use super::images::rehome_images;
use super::markdown::render;
use super::normalize::normalize_markdown;
use super::page_fetcher::fetch_document;
use super::sanitize::sanitize_name;
use super::stats::ConversionStats;

/// Converts an exported knowledge-base container into a ZIP of Markdown
/// files mirroring the table-of-contents hierarchy.
///
/// The path assigner state and used-name set live for exactly one run;
/// nothing survives across conversions.
pub async fn convert_archive(
    input: &Path,
    output: &Path,
    fetch_images: bool,
    config: &AppConfig,
) -> ConvertResult<ConversionStats> {
    if !input.exists() {
        return Err(ConvertError::Input(format!(
            "input archive not found: {}",
            input.display()
        )));
    }

    let archive = KbArchive::open(input)?;
    let client = build_client(config)?;
    let mut assigner = PathAssigner::new();
    let mut stats = ConversionStats::new();
    let mut entries: Vec<OutputEntry> = Vec::new();

    for toc_entry in &archive.toc {
        let Some(assigned) = assigner.assign(toc_entry) else {
            continue;
        };
        let Some(url) = toc_entry.url.as_deref() else {
            warn!("DOC entry '{}' has no payload url, skipping", toc_entry.title);
            stats.documents_skipped += 1;
            continue;
        };
        let html = match archive.document_html(url) {
            Ok(html) => html,
            Err(e) => {
                warn!("Skipping '{}': {}", toc_entry.title, e);
                stats.documents_skipped += 1;
                continue;
            }
        };

        let html = if fetch_images {
            let base = assigned.file_name.trim_end_matches(".md").to_string();
            let outcome = rehome_images(&client, &html, &base).await;
            stats.image_fetch_failures += outcome.failed_fetches;
            for attachment in outcome.attachments {
                entries.push(OutputEntry::binary(
                    join_path(&assigned.dir, &attachment.path),
                    attachment.content,
                ));
                stats.attachments_saved += 1;
            }
            outcome.html
        } else {
            html
        };

        let markdown = normalize_markdown(&render(&parse(&html)));
        debug!(
            "Converted '{}' -> {} ({} bytes)",
            toc_entry.title,
            assigned.document_path(),
            markdown.len()
        );
        entries.push(OutputEntry::text(assigned.document_path(), markdown));
        stats.documents_converted += 1;
    }

    write_zip(output, &entries)?;
    stats.log_summary();
    Ok(stats)
}

/// Secondary mode: fetch one publicly reachable page, convert it, and
/// deliver a single-document archive.
pub async fn convert_url(
    page_url: &str,
    output: &Path,
    fetch_images: bool,
    config: &AppConfig,
) -> ConvertResult<ConversionStats> {
    let client = build_client(config)?;
    let document = fetch_document(&client, page_url).await?;
    info!("Converting fetched page: {}", document.title);

    let mut stats = ConversionStats::new();
    let mut entries: Vec<OutputEntry> = Vec::new();
    let base = sanitize_name(&document.title);

    let html = if fetch_images {
        let outcome = rehome_images(&client, &document.html, &base).await;
        stats.image_fetch_failures += outcome.failed_fetches;
        for attachment in outcome.attachments {
            entries.push(OutputEntry::binary(attachment.path, attachment.content));
            stats.attachments_saved += 1;
        }
        outcome.html
    } else {
        document.html
    };

    let markdown = normalize_markdown(&render(&parse(&html)));
    entries.push(OutputEntry::text(format!("{}.md", base), markdown));
    stats.documents_converted += 1;

    write_zip(output, &entries)?;
    stats.log_summary();
    Ok(stats)
}

fn build_client(config: &AppConfig) -> ConvertResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent())
        .timeout(Duration::from_secs(config.request_timeout_secs()))
        .build()?;
    Ok(client)
}

fn join_path(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a.md"), "a.md");
        assert_eq!(join_path("Guides", "a.md"), "Guides/a.md");
        assert_eq!(join_path("Guides/Setup", "attachments/a_001.png"),
            "Guides/Setup/attachments/a_001.png");
    }

    #[tokio::test]
    async fn test_absent_input_is_a_distinct_error() {
        let config = AppConfig::default();
        let err = convert_archive(
            Path::new("/nonexistent/export.tar.gz"),
            Path::new("/tmp/out.zip"),
            false,
            &config,
        )
        .await
        .unwrap_err();
        match err {
            ConvertError::Input(msg) => assert!(msg.contains("not found")),
            other => panic!("expected Input error, got {:?}", other),
        }
    }
}
