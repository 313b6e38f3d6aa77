// src/supply/remote.rs

use std::time::Duration;

use async_trait::async_trait;

use super::{QuestionSource, RawQuestion, SourceError};

/// Remote question API: a GET endpoint returning an array of
/// letter-keyed records. Primary source when configured.
pub struct RemoteSource {
    client: reqwest::Client,
    url: String,
}

impl RemoteSource {
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client for question source");
        Self { client, url }
    }
}

#[async_trait]
impl QuestionSource for RemoteSource {
    fn name(&self) -> &str {
        "remote api"
    }

    async fn fetch(&self) -> Result<Vec<RawQuestion>, SourceError> {
        let records = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RawQuestion>>()
            .await?;
        Ok(records)
    }
}
