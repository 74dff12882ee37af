use crate::config::RemoteConfig;
use crate::error::QuoterError;
use backon::{ExponentialBuilder, Retryable};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// One element of the remote JSON array. `title` carries the author name.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteQuote {
    #[serde(deserialize_with = "plain_or_rendered")]
    pub title: String,
    #[serde(deserialize_with = "plain_or_rendered")]
    pub content: String,
}

/// WordPress APIs return either `"title": "..."` or `"title": {"rendered": "..."}`.
fn plain_or_rendered<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        Plain(String),
        Rendered { rendered: String },
    }

    Ok(match Field::deserialize(deserializer)? {
        Field::Plain(s) => s,
        Field::Rendered { rendered } => rendered,
    })
}

/// Client for the remote quote endpoint.
#[derive(Clone)]
pub struct QuoteApi {
    client: reqwest::Client,
    url: Url,
    retry_policy: ExponentialBuilder,
}

impl QuoteApi {
    pub fn new(cfg: &RemoteConfig) -> Result<Self, QuoterError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("quoter/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)));
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        let client = builder.build()?;

        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(cfg.retries)
            .with_jitter();

        Ok(Self {
            client,
            url: cfg.url.clone(),
            retry_policy,
        })
    }

    /// Fetch the first quote of the remote response, retrying transient failures.
    pub async fn fetch(&self) -> Result<RemoteQuote, QuoterError> {
        (|| async { self.fetch_once().await })
            .retry(self.retry_policy)
            .when(|e: &QuoterError| e.is_retryable())
            .notify(|err, dur: Duration| {
                warn!(url = %self.url, error = %err, "remote quote fetch retrying after {:?}", dur);
            })
            .await
    }

    async fn fetch_once(&self) -> Result<RemoteQuote, QuoterError> {
        let resp = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(QuoterError::UpstreamStatus(status));
        }

        let body = resp.bytes().await?;
        debug!(url = %self.url, bytes = body.len(), "remote quote response received");
        parse_first(&body)
    }
}

/// Parse a JSON array of quotes and keep the first one.
pub fn parse_first(body: &[u8]) -> Result<RemoteQuote, QuoterError> {
    let quotes: Vec<RemoteQuote> = serde_json::from_slice(body)?;
    quotes
        .into_iter()
        .next()
        .ok_or(QuoterError::EmptyRemoteResponse)
}
