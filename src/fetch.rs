use crate::config::{EndpointConfig, EndpointMode, FetchConfig};
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

/// One fetched calendar page, already decoded to text.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub source: String,
    pub body: String,
}

pub fn build_client(fetch: &FetchConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    for (k, v) in &fetch.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name {k}"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }
    headers.insert(USER_AGENT, HeaderValue::from_str(&fetch.user_agent)?);

    Client::builder()
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .default_headers(headers)
        .build()
        .context("failed to build reqwest client")
}

/// Fetch a single endpoint. Any error here is endpoint-level: the caller
/// logs it and falls through to the next endpoint, never aborts the cycle.
pub fn fetch_endpoint(
    client: &Client,
    endpoint: &EndpointConfig,
    fetch: &FetchConfig,
) -> Result<FetchedDocument> {
    match endpoint.mode {
        EndpointMode::Http => fetch_http(client, endpoint, fetch),
        EndpointMode::File => fetch_file(endpoint),
    }
}

fn fetch_http(
    client: &Client,
    endpoint: &EndpointConfig,
    fetch: &FetchConfig,
) -> Result<FetchedDocument> {
    let url = endpoint.url.as_deref().context("endpoint.url missing")?;
    let bytes = fetch_with_retries(client, url, fetch.retry_attempts, fetch.retry_backoff_ms)?;

    let body = String::from_utf8(bytes)
        .with_context(|| format!("response body from {url} is not valid utf-8"))?;

    debug!(%url, bytes = body.len(), "fetched endpoint");
    Ok(FetchedDocument {
        source: url.to_string(),
        body,
    })
}

fn fetch_with_retries(
    client: &Client,
    url: &str,
    retry_attempts: u8,
    retry_backoff_ms: u64,
) -> Result<Vec<u8>> {
    let attempts = retry_attempts.max(1);

    for attempt in 1..=attempts {
        match client.get(url).send() {
            Ok(resp) => {
                if !resp.status().is_success() {
                    let status = resp.status();
                    if attempt == attempts {
                        bail!("request to {url} failed with status {status}");
                    }
                    warn!(%url, %status, attempt, "request failed; retrying");
                } else {
                    return Ok(resp.bytes()?.to_vec());
                }
            }
            Err(err) => {
                if attempt == attempts {
                    return Err(err).with_context(|| format!("request to {url} failed"));
                }
                warn!(%url, attempt, error = %err, "request errored; retrying");
            }
        }

        std::thread::sleep(Duration::from_millis(retry_backoff_ms));
    }

    bail!("request to {url} failed after retries")
}

fn fetch_file(endpoint: &EndpointConfig) -> Result<FetchedDocument> {
    let path = endpoint
        .path
        .as_ref()
        .context("endpoint.path missing for file mode")?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read file endpoint {}", path.display()))?;
    let body = String::from_utf8(bytes)
        .with_context(|| format!("file endpoint {} is not valid utf-8", path.display()))?;

    debug!(file = %path.display(), bytes = body.len(), "loaded file endpoint");
    Ok(FetchedDocument {
        source: format!("file://{}", path.display()),
        body,
    })
}
