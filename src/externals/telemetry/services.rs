use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::{config::TelemetryConfig, models::sensor_data::SampleRecord};

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Failed to post telemetry: {0}")]
    Request(#[from] reqwest::Error),
}

/// Posts each sample as JSON to the remote collector. One attempt per
/// sample; a failure is reported and the sample is dropped.
pub struct TelemetryPublisher {
    client: Client,
    url: String,
}

impl TelemetryPublisher {
    pub fn new(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(TelemetryError::Client)?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub async fn publish(&self, record: &SampleRecord) -> Result<(), TelemetryError> {
        self.client
            .post(&self.url)
            .json(record)
            .send()
            .await?
            .error_for_status()?;
        debug!("Telemetry posted to {}", self.url);
        Ok(())
    }
}
