use std::sync::OnceLock;

use log::{debug, info, warn};
use regex::Regex;
use url::Url;

use super::errors::{ConvertResult, FetchError};

/// A document pulled from a publicly reachable page.
#[derive(Debug)]
pub struct FetchedDocument {
    pub title: String,
    pub html: String,
}

/// Fetches a hosted knowledge-base page and extracts its document HTML.
///
/// Pages embed their document state as a JSON blob in an inline script;
/// when the blob is found the document body comes out of it, otherwise the
/// fetched page itself is used as the HTML source.
pub async fn fetch_document(client: &reqwest::Client, page_url: &str) -> ConvertResult<FetchedDocument> {
    let parsed = Url::parse(page_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    info!("Fetching page: {}", page_url);

    let response = client.get(parsed.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::BadStatus(page_url.to_string(), status.as_u16()).into());
    }
    let page = response.text().await?;
    debug!("Fetched {} bytes from {}", page.len(), page_url);

    let fallback_title = title_from_url(&parsed);
    match extract_embedded_state(&page) {
        Some(state) => {
            let html = state
                .pointer("/doc/body")
                .or_else(|| state.pointer("/doc/body_asl"))
                .and_then(|v| v.as_str())
                .map(str::to_string);
            match html {
                Some(html) => {
                    let title = state
                        .pointer("/doc/title")
                        .and_then(|v| v.as_str())
                        .map(str::to_string)
                        .unwrap_or(fallback_title);
                    Ok(FetchedDocument { title, html })
                }
                None => {
                    warn!("Embedded state has no document body, converting page as-is");
                    Ok(FetchedDocument {
                        title: fallback_title,
                        html: page,
                    })
                }
            }
        }
        None => {
            debug!("No embedded document state found, converting page as-is");
            Ok(FetchedDocument {
                title: fallback_title,
                html: page,
            })
        }
    }
}

/// Pulls the embedded JSON state blob out of the page markup, if present.
pub fn extract_embedded_state(page: &str) -> Option<serde_json::Value> {
    static STATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = STATE_RE.get_or_init(|| {
        Regex::new(r"(?s)window\.__DATA__\s*=\s*(\{.*?\});").expect("valid regex")
    });
    let captures = re.captures(page)?;
    serde_json::from_str(&captures[1]).ok()
}

/// Last non-empty path segment of the URL, or the host, or a constant.
fn title_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "page".to_string())
}
