use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;

#[async_trait::async_trait]
pub trait FeedTransport: Send + Sync {
    /// Body of a successful (2xx) GET. Non-success statuses are errors.
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// Plain `reqwest` GET with the client's default timeouts.
#[derive(Debug, Clone, Default)]
pub struct HttpFeedTransport {
    http: reqwest::Client,
}

impl HttpFeedTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FeedTransport for HttpFeedTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .context("feed request failed")?;

        let status = res.status();
        if !status.is_success() {
            anyhow::bail!("feed HTTP {status}");
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = res.bytes().await.context("failed to read feed body")?;

        Ok(decode_body(&bytes, content_type.as_deref()))
    }
}

/// Decodes a feed body: `Content-Type` charset first, then the XML declaration, then UTF-8.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .or_else(|| charset_from_xml_declaration(bytes))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    // BOM sniffing wins over the declared label.
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn charset_from_xml_declaration(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(200)];
    let head = String::from_utf8_lossy(head);
    let decl = head.trim_start_matches('\u{feff}').trim_start();
    let decl = decl.strip_prefix("<?xml")?;
    let decl = &decl[..decl.find("?>")?];

    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    Some(rest[..rest.find(quote)?].to_string())
}
