//! Blocking HTTP plumbing shared by the change gate and the page pipeline.

use std::time::Duration;

use anyhow::Context as _;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use url::Url;

use crate::errors::FetchError;

/// Browser-like user agent; the wiki throttles obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn client() -> anyhow::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .context("build http client")
}

/// GET a page and decode the body as UTF-8 regardless of the declared
/// charset; the wiki serves UTF-8 but does not always say so.
pub fn fetch_html(client: &Client, url: &Url) -> Result<String, FetchError> {
    tracing::debug!(url = %url, "fetch page");

    let response = client
        .get(url.clone())
        .send()
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let bytes = response.bytes().map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
