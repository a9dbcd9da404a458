use crate::fetcher::{
    decode::decode_page,
    errors::FetchError,
    types::{BinaryResponse, PageResponse},
};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, Response, header};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const MAX_PAGE_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const MAX_BINARY_SIZE: u64 = 64 * 1024 * 1024; // 64MB
const USER_AGENT: &str = concat!("page-digest/", env!("CARGO_PKG_VERSION"));

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .unwrap_or_else(|_| Client::new())
});

fn content_type_of(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map(str::to_string)
}

async fn send_checked(url: Url, accept: &str) -> Result<Response, FetchError> {
    let response = HTTP_CLIENT
        .get(url)
        .header(header::ACCEPT, accept)
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http {
            status,
            retriable: status.is_server_error(),
        });
    }

    Ok(response)
}

fn check_length(response: &Response, limit: u64) -> Result<(), FetchError> {
    match response.content_length() {
        Some(content_length) if content_length > limit => {
            Err(FetchError::BodyTooLarge(content_length))
        }
        _ => Ok(()),
    }
}

async fn read_body(response: Response, limit: u64) -> Result<bytes::Bytes, FetchError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::Io(e.to_string()))?;

    // Content-Length may have been missing
    if body.len() as u64 > limit {
        return Err(FetchError::BodyTooLarge(body.len() as u64));
    }
    Ok(body)
}

/// Fetch an HTML page and decode it to UTF-8.
///
/// Non-HTML responses fail with `UnsupportedContentType` carrying the
/// declared type, which callers use to recognise PDFs served directly.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch(url: &str) -> Result<PageResponse, FetchError> {
    let parsed_url = Url::parse(url)?;

    let response = send_checked(
        parsed_url,
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    )
    .await?;

    let final_url = response.url().clone();
    let status = response.status();
    let headers = response.headers().clone();
    let content_type = content_type_of(&response).unwrap_or_else(|| "text/html".to_string());

    if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
        return Err(FetchError::UnsupportedContentType(content_type));
    }

    // the page cap only applies once we know this is a page
    check_length(&response, MAX_PAGE_SIZE)?;
    let body = read_body(response, MAX_PAGE_SIZE).await?;
    debug!(bytes = body.len(), "page downloaded");

    decode_page(final_url, status, headers, body, &content_type)
}

/// Fetch a resource as raw bytes, whatever its content type.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_bytes(url: &Url) -> Result<BinaryResponse, FetchError> {
    let response = send_checked(url.clone(), "*/*").await?;
    check_length(&response, MAX_BINARY_SIZE)?;

    let url_final = response.url().clone();
    let content_type = content_type_of(&response);
    let body = read_body(response, MAX_BINARY_SIZE).await?;
    debug!(bytes = body.len(), "resource downloaded");

    Ok(BinaryResponse {
        url_final,
        content_type,
        body,
    })
}
