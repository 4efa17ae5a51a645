use log::{debug, info, warn};

/// Content-type to file extension table; unrecognized types fall back to
/// `.png`.
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tiff"),
    ("image/x-icon", "ico"),
];

const FALLBACK_EXTENSION: &str = "png";

/// A binary payload to write alongside the referencing document, at a
/// path relative to the document's directory.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub path: String,
    pub content: Vec<u8>,
}

/// Result of rehoming the images of one document.
#[derive(Debug)]
pub struct RehomeOutcome {
    pub html: String,
    pub attachments: Vec<Attachment>,
    pub failed_fetches: usize,
}

/// Fetches every `<img src="...">` of the document and rewrites the HTML
/// to point at local `./attachments/` copies.
///
/// Fetches run one at a time, in document order, each awaited to
/// completion before the next. A failed fetch is logged and leaves that
/// image's original src in place; it never aborts the document.
pub async fn rehome_images(
    client: &reqwest::Client,
    html: &str,
    base_name: &str,
) -> RehomeOutcome {
    let sources = extract_image_sources(html);
    if sources.is_empty() {
        return RehomeOutcome {
            html: html.to_string(),
            attachments: Vec::new(),
            failed_fetches: 0,
        };
    }
    info!("Rehoming {} image(s) for {}", sources.len(), base_name);

    let mut rewritten = html.to_string();
    let mut attachments = Vec::new();
    let mut failed_fetches = 0;
    let mut sequence = 0usize;

    for src in sources {
        match fetch_image(client, &src).await {
            Ok((content_type, bytes)) => {
                sequence += 1;
                let ext = extension_for_mime(&content_type);
                let file_name = format!("{}_{:03}.{}", base_name, sequence, ext);
                let local_src = format!("./attachments/{}", file_name);
                debug!("Rehomed {} -> {} ({} bytes)", src, local_src, bytes.len());
                rewritten = rewritten.replacen(
                    &format!("src=\"{}\"", src),
                    &format!("src=\"{}\"", local_src),
                    1,
                );
                attachments.push(Attachment {
                    path: format!("attachments/{}", file_name),
                    content: bytes,
                });
            }
            Err(reason) => {
                warn!("Image fetch failed, keeping original src {}: {}", src, reason);
                failed_fetches += 1;
            }
        }
    }

    RehomeOutcome {
        html: rewritten,
        attachments,
        failed_fetches,
    }
}

async fn fetch_image(client: &reqwest::Client, src: &str) -> Result<(String, Vec<u8>), String> {
    let response = client
        .get(src)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("status {}", response.status()));
    }
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    Ok((content_type, bytes.to_vec()))
}

/// Single linear scan over the HTML collecting every `<img ... src="...">`
/// value, in document order.
pub fn extract_image_sources(html: &str) -> Vec<String> {
    let mut sources = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find("<img") {
        let tag_rest = &rest[start..];
        let tag_end = tag_rest.find('>').map(|i| i + 1).unwrap_or(tag_rest.len());
        let tag = &tag_rest[..tag_end];
        if let Some(src_pos) = tag.find("src=\"") {
            let value_start = src_pos + 5;
            if let Some(value_len) = tag[value_start..].find('"') {
                let src = &tag[value_start..value_start + value_len];
                if !src.is_empty() {
                    sources.push(src.to_string());
                }
            }
        }
        rest = &tag_rest[tag_end..];
    }
    sources
}

/// Maps a declared content type (possibly with parameters) to a file
/// extension.
pub fn extension_for_mime(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    MIME_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
        .unwrap_or(FALLBACK_EXTENSION)
}
