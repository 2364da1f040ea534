use crate::config::{DownstreamConfig, ValidationError};
use crate::errors::OutboundError;
use crate::http::send_checked;
use async_trait::async_trait;
use url::Url;

/// Kicks off the downstream regeneration job once a record is stored.
#[async_trait]
pub trait DownstreamTrigger: Send + Sync {
    async fn trigger(&self) -> Result<(), OutboundError>;
}

/// `GET <url>?code=<key>` against the regeneration endpoint.
pub struct HttpDownstreamTrigger {
    client: reqwest::Client,
    url: Url,
    key: String,
}

impl HttpDownstreamTrigger {
    pub fn new(config: &DownstreamConfig, client: reqwest::Client) -> Result<Self, ValidationError> {
        Ok(HttpDownstreamTrigger {
            client,
            url: config.url()?,
            key: config.key.clone(),
        })
    }
}

#[async_trait]
impl DownstreamTrigger for HttpDownstreamTrigger {
    async fn trigger(&self) -> Result<(), OutboundError> {
        let request = self
            .client
            .get(self.url.clone())
            .query(&[("code", self.key.as_str())]);

        send_checked(request).await?;
        tracing::debug!(url = %self.url, "Downstream regeneration triggered");
        Ok(())
    }
}
