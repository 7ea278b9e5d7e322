//! HTTP poll transport.
//!
//! Each round is a single `GET` carrying this endpoint's flags in the query
//! string. The response body is the JSON link-state document.
//!
//! # Example
//!
//! ```ignore
//! use ait_link_client::transport::HttpTransport;
//!
//! let transport = HttpTransport::new("http://10.0.0.2", "/link_map/link.json", timeout)?;
//! let snapshot = transport.poll(&params).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::Transport;
use crate::error::{LinkError, Result};
use crate::protocol::{LinkSnapshot, OutboundParams};

/// Default server base URL.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1";

/// Default link-state document path.
pub const DEFAULT_PATH: &str = "/link_map/link.json";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Polls a link server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: Url,
}

impl HttpTransport {
    /// Create a transport for `endpoint` + `path`.
    pub fn new(endpoint: &str, path: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(endpoint)
            .and_then(|base| base.join(path))
            .map_err(|e| {
                LinkError::ConfigurationOutOfRange(format!(
                    "bad poll URL {}{}: {}",
                    endpoint, path, e
                ))
            })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    /// The URL polled each round, without query.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn poll(&self, params: &OutboundParams) -> Result<LinkSnapshot> {
        let body = self
            .client
            .get(self.url.clone())
            .query(&params.query_pairs())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        LinkSnapshot::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let transport =
            HttpTransport::new("http://10.0.0.2:8080", DEFAULT_PATH, DEFAULT_REQUEST_TIMEOUT)
                .unwrap();
        assert_eq!(
            transport.url().as_str(),
            "http://10.0.0.2:8080/link_map/link.json"
        );
    }

    #[test]
    fn test_bad_endpoint() {
        let result = HttpTransport::new("not a url", DEFAULT_PATH, DEFAULT_REQUEST_TIMEOUT);
        assert!(matches!(
            result,
            Err(LinkError::ConfigurationOutOfRange(_))
        ));
    }
}
