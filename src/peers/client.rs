use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use super::protocol::{HOPS_HEADER, MAX_HOPS, PeerRequest, PeerResponse, decode_response, request_path};
use super::PeerGetter;

/// Fetches values from one remote peer over HTTP.
pub struct HttpGetter {
    /// Peer address plus base path, e.g. `http://localhost:8002/_gencache/`.
    base_url: String,
    http_client: reqwest::Client,
    timeout: Duration,
    attempts: usize,
}

impl HttpGetter {
    pub fn new(base_url: String, http_client: reqwest::Client, timeout: Duration, attempts: usize) -> Self {
        Self {
            base_url,
            http_client,
            timeout,
            attempts: attempts.max(1),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut delay_ms = 150u64;

        for attempt in 0..self.attempts {
            let response = self
                .http_client
                .get(url)
                .header(HOPS_HEADER, MAX_HOPS.to_string())
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == self.attempts {
                        return Err(anyhow::anyhow!(e));
                    }
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }

        Err(anyhow::anyhow!("Retry attempts exhausted"))
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, request: &PeerRequest) -> Result<PeerResponse> {
        let url = format!("{}{}", self.base_url, request_path(request));

        let response = self.get_with_retry(&url).await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("server returned: {}", response.status()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| anyhow::anyhow!("reading response body: {}", e))?;

        Ok(decode_response(&body)?)
    }

    fn addr(&self) -> &str {
        &self.base_url
    }
}
