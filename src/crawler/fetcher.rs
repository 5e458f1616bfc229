//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the crawl:
//! - Building the HTTP client with the archiver's user agent
//! - GET requests for HTML listings
//! - GET requests for files, honouring the size limit before the body is read
//! - Error classification

use crate::config::UserAgentConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// A listing page was fetched
    Listing {
        /// Final URL after redirects
        final_url: Url,
        /// Page body
        body: String,
    },

    /// A file was fetched
    File {
        /// Final URL after redirects
        final_url: Url,
        /// Content-Length header, when the server sent one
        content_length: Option<u64>,
        /// Raw bytes; left empty when the announced size is over the limit
        body: Vec<u8>,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::HttpError { .. } | Self::NetworkError { .. })
    }
}

/// Builds an HTTP client with the archiver's user agent
///
/// # Example
///
/// ```no_run
/// use defcon_archiver::config::UserAgentConfig;
/// use defcon_archiver::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(300))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a listing page as text
pub async fn fetch_listing(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.as_str()).send().await {
        Ok(r) => r,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return http_error(status);
    }

    let final_url = response.url().clone();
    match response.text().await {
        Ok(body) => FetchResult::Listing { final_url, body },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Fetches a file as bytes
///
/// When the response announces a Content-Length above `max_file_size`, the
/// body is not read; the caller's admission check rejects it from the header.
pub async fn fetch_file(client: &Client, url: &Url, max_file_size: u64) -> FetchResult {
    let response = match client.get(url.as_str()).send().await {
        Ok(r) => r,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return http_error(status);
    }

    let final_url = response.url().clone();
    let content_length = response.content_length();

    if content_length.is_some_and(|len| len > max_file_size) {
        return FetchResult::File {
            final_url,
            content_length,
            body: Vec::new(),
        };
    }

    match response.bytes().await {
        Ok(bytes) => FetchResult::File {
            final_url,
            content_length,
            body: bytes.to_vec(),
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

fn http_error(status: StatusCode) -> FetchResult {
    FetchResult::HttpError {
        status_code: status.as_u16(),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}
