use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use kb2md::config::config::AppConfig;
use kb2md::converter::html_parser::parse;
use kb2md::converter::markdown::render;
use kb2md::converter::normalize::normalize_markdown;
use kb2md::converter::pipeline::convert_archive;

/// Builds a gzip-compressed tar container with the given entries.
fn build_container(dir: &Path, entries: &[(&str, String)]) -> PathBuf {
    let path = dir.join("export.tar.gz");
    let file = File::create(&path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
    path
}

fn doc_payload(html: &str) -> String {
    serde_json::json!({ "doc": { "body": html } }).to_string()
}

fn read_zip_entry(zip_path: &Path, name: &str) -> String {
    let file = File::open(zip_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

fn zip_names(zip_path: &Path) -> Vec<String> {
    let file = File::open(zip_path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// End-to-end: container in, hierarchical Markdown ZIP out.
#[tokio::test]
async fn test_archive_conversion_end_to_end() {
    let _ = env_logger::try_init();
    let temp = TempDir::new().unwrap();

    let toc = "\
- type: title
  title: Guides
  level: 0
- type: doc
  url: pages/intro
  title: Intro
  level: 1
- type: doc
  url: pages/setup
  title: Setup
  level: 1
- type: doc
  url: pages/faq
  title: FAQ
  level: 0
";
    let meta = serde_json::json!({ "toc": toc }).to_string();
    let container = build_container(
        temp.path(),
        &[
            ("wiki/meta.json", meta),
            (
                "wiki/pages/intro.json",
                doc_payload("<h1>Intro</h1><p>Welcome to the <strong>wiki</strong>.</p>"),
            ),
            (
                "wiki/pages/setup.json",
                doc_payload("<h2>Setup</h2><ul><li>step one</li><li>step two</li></ul>"),
            ),
            ("wiki/pages/faq.json", doc_payload("<p>Q &amp; A</p>")),
        ],
    );
    let output = temp.path().join("result.zip");

    let stats = convert_archive(&container, &output, false, &AppConfig::default())
        .await
        .unwrap();
    assert_eq!(stats.documents_converted, 3);
    assert_eq!(stats.documents_skipped, 0);

    let mut names = zip_names(&output);
    names.sort();
    assert_eq!(names, vec!["FAQ.md", "Guides/Intro.md", "Guides/Setup.md"]);

    let intro = read_zip_entry(&output, "Guides/Intro.md");
    assert!(intro.contains("# Intro"));
    assert!(intro.contains("Welcome to the **wiki**."));

    let setup = read_zip_entry(&output, "Guides/Setup.md");
    assert!(setup.contains("## Setup"));
    assert!(setup.contains("- step one"));
    assert!(setup.contains("- step two"));

    let faq = read_zip_entry(&output, "FAQ.md");
    assert!(faq.contains("Q & A"));
}

/// Duplicate titles anywhere in the export get distinct file names.
#[tokio::test]
async fn test_duplicate_titles_get_distinct_files() {
    let temp = TempDir::new().unwrap();
    let toc = "\
- type: doc
  url: a
  title: Overview
  level: 0
- type: doc
  url: b
  title: Overview
  level: 0
";
    let meta = serde_json::json!({ "toc": toc }).to_string();
    let container = build_container(
        temp.path(),
        &[
            ("kb/meta.json", meta),
            ("kb/a.json", doc_payload("<p>first</p>")),
            ("kb/b.json", doc_payload("<p>second</p>")),
        ],
    );
    let output = temp.path().join("result.zip");

    convert_archive(&container, &output, false, &AppConfig::default())
        .await
        .unwrap();

    let mut names = zip_names(&output);
    names.sort();
    assert_eq!(names, vec!["Overview.md", "Overview1.md"]);
    assert!(read_zip_entry(&output, "Overview.md").contains("first"));
    assert!(read_zip_entry(&output, "Overview1.md").contains("second"));
}

/// A missing document payload is skipped, not fatal.
#[tokio::test]
async fn test_missing_payload_is_skipped() {
    let temp = TempDir::new().unwrap();
    let toc = "\
- type: doc
  url: present
  title: Present
  level: 0
- type: doc
  url: absent
  title: Absent
  level: 0
";
    let meta = serde_json::json!({ "toc": toc }).to_string();
    let container = build_container(
        temp.path(),
        &[
            ("kb/meta.json", meta),
            ("kb/present.json", doc_payload("<p>here</p>")),
        ],
    );
    let output = temp.path().join("result.zip");

    let stats = convert_archive(&container, &output, false, &AppConfig::default())
        .await
        .unwrap();
    assert_eq!(stats.documents_converted, 1);
    assert_eq!(stats.documents_skipped, 1);
    assert_eq!(zip_names(&output), vec!["Present.md"]);
}

/// An archive without a metadata file aborts the whole conversion.
#[tokio::test]
async fn test_archive_without_metadata_fails() {
    let temp = TempDir::new().unwrap();
    let container = build_container(
        temp.path(),
        &[("kb/page.json", doc_payload("<p>orphan</p>"))],
    );
    let output = temp.path().join("result.zip");

    let err = convert_archive(&container, &output, false, &AppConfig::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("meta.json"));
    assert!(!output.exists());
}

/// Conversion quality over a realistic document, through the whole
/// parse → render → normalize chain.
#[test]
fn test_html_markdown_conversion_quality() {
    let html = r#"
    <!DOCTYPE html>
    <html lang="en">
    <head>
        <title>Test Document</title>
        <style>body { color: blue; }</style>
        <script>console.log('test');</script>
    </head>
    <body>
        <h1>Main Title</h1>
        <h2>Subtitle with <strong>bold</strong> text</h2>
        <p>This is a paragraph with <em>italic text</em> and <strong>bold text</strong>.</p>
        <p>Another paragraph with a <a href="https://example.com">link to example</a>.</p>
        <ul>
            <li>First unordered item</li>
            <li>Second item with <strong>formatting</strong></li>
        </ul>
        <blockquote>This is an important quote.</blockquote>
        <p>Image example: <img src="/images/test.jpg" alt="Test Image"></p>
        <pre data-language="rust">fn main() {}</pre>
        <table>
            <tr><th>Name</th><th>Value</th></tr>
            <tr><td>alpha</td><td>1</td></tr>
        </table>
        <!-- This comment should be ignored -->
        <div>Content in div should be preserved</div>
    </body>
    </html>
    "#;

    let markdown = normalize_markdown(&render(&parse(html)));

    assert!(markdown.contains("# Main Title"));
    assert!(markdown.contains("## Subtitle with **bold** text"));
    assert!(markdown.contains("*italic text*"));
    assert!(markdown.contains("[link to example](https://example.com)"));
    assert!(markdown.contains("- First unordered item"));
    assert!(markdown.contains("- Second item with **formatting**"));
    assert!(markdown.contains("> This is an important quote."));
    assert!(markdown.contains("![Test Image](/images/test.jpg)"));
    assert!(markdown.contains("```rust\nfn main() {}\n```"));
    assert!(markdown.contains("| Name | Value |"));
    assert!(markdown.contains("| --- | --- |"));
    assert!(markdown.contains("| alpha | 1 |"));
    assert!(markdown.contains("Content in div should be preserved"));
    assert!(!markdown.contains("console.log"));
    assert!(!markdown.contains("color: blue"));
    assert!(!markdown.contains("This comment should be ignored"));
    assert!(!markdown.contains("\n\n\n"));

    // Normalization is idempotent on the pipeline output.
    assert_eq!(normalize_markdown(&markdown), markdown);
}

/// Writing the config file next to the fixture exercises the YAML loader
/// shape end users actually provide.
#[test]
fn test_config_yaml_shape() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("kb2md.yaml");
    let mut file = File::create(&path).unwrap();
    file.write_all(b"user_agent: docs-mirror/2.0\nrequest_timeout_secs: 5\nfetch_images: true\n")
        .unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let cfg: AppConfig = serde_yaml::from_str(&raw).unwrap();
    assert_eq!(cfg.user_agent(), "docs-mirror/2.0");
    assert_eq!(cfg.request_timeout_secs(), 5);
    assert_eq!(cfg.fetch_images, Some(true));
}
