//! HTTP cooperative shutdown client.
//!
//! `POST`s an empty JSON request to the child's shutdown endpoint. Only a
//! `200 OK` counts as acceptance.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::ControllerConfig;
use crate::error::{NegotiationFailure, Result};
use crate::ports::ShutdownNotifier;

/// Notifier for a child listening on a loopback HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpShutdownNotifier {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpShutdownNotifier {
    /// Create a notifier for `url` whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        // The endpoint is always local; a system proxy would only get in the way
        let client = Client::builder().timeout(timeout).no_proxy().build()?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &ControllerConfig) -> Result<Self> {
        Self::new(config.shutdown_url(), config.shutdown_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ShutdownNotifier for HttpShutdownNotifier {
    async fn notify(&self) -> std::result::Result<(), NegotiationFailure> {
        debug!(url = %self.url, "Requesting cooperative shutdown");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NegotiationFailure::Timeout {
                        timeout: self.timeout,
                    }
                } else {
                    NegotiationFailure::Unreachable {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        debug!(url = %self.url, status = status.as_u16(), "Shutdown endpoint answered");

        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(NegotiationFailure::Endpoint {
                status: status.as_u16(),
            })
        }
    }
}
