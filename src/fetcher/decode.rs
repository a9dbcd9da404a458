use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::{StatusCode, header::HeaderMap};
use std::sync::LazyLock;
use url::Url;

use crate::fetcher::{
    errors::FetchError,
    types::{Charset, PageResponse},
};

/// How far into the body we look for an in-document charset declaration.
const SNIFF_WINDOW: usize = 4096;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>;]+)"#).unwrap());

pub fn decode_page(
    url_final: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    content_type: &str,
) -> Result<PageResponse, FetchError> {
    let charset = detect_charset(content_type, &body);
    let body_utf8 = decode_to_utf8(&body, &charset)?;

    Ok(PageResponse {
        url_final,
        status,
        headers,
        content_type: content_type.to_string(),
        body_utf8,
        charset,
        fetched_at: Utc::now(),
    })
}

fn charset_from_label(haystack: &str, pattern: &Regex) -> Option<Charset> {
    let label = pattern.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes()).map(Charset::from_encoding)
}

/// Header declaration, then `<meta charset>` / `http-equiv` in the first few
/// KB, then a statistical guess.
fn detect_charset(content_type: &str, body: &[u8]) -> Charset {
    if let Some(charset) = charset_from_label(content_type, &HEADER_CHARSET) {
        return charset;
    }

    let window = &body[..body.len().min(SNIFF_WINDOW)];
    let head = String::from_utf8_lossy(window);
    if let Some(charset) = charset_from_label(&head, &META_CHARSET) {
        return charset;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(window, false);
    Charset::from_encoding(detector.guess(None, true))
}

fn decode_to_utf8(body: &[u8], charset: &Charset) -> Result<String, FetchError> {
    let encoding = charset.encoding();
    let (decoded, _, had_errors) = encoding.decode(body);

    if had_errors {
        return Err(FetchError::Charset(format!(
            "failed to decode body as {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}
