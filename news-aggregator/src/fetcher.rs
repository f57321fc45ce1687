use crate::types::{AggregatorError, FetchConfig, Result};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Shared HTTP client for every source adapter.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self.send(url, query).await?;
        let content = response.text().await?;
        info!("Fetched {} ({} bytes)", url, content.len());
        Ok(content)
    }

    async fn send(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let start_time = Instant::now();
        let url = url::Url::parse(url)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        debug!(
            "GET {} -> {} in {}ms",
            url,
            status,
            start_time.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(AggregatorError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.config.max_response_size_mb {
                return Err(AggregatorError::ResponseTooLarge { size_mb });
            }
        }

        Ok(response)
    }
}
