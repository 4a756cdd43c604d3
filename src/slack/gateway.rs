//! Delivery of wizard messages through Slack `response_url`s.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::{oneshot, Mutex};

use super::message::SlackMessage;
use crate::deliver::ports::ChatGateway;

/// Gateway for one inbound Slack request.
///
/// `ack` releases the waiting HTTP handler so it can answer Slack with an
/// empty 200; `respond` posts to the request's `response_url`.
pub struct ResponseUrlGateway {
    client: Client,
    response_url: String,
    ack: Mutex<Option<oneshot::Sender<()>>>,
}

impl ResponseUrlGateway {
    /// Returns the gateway and the receiver the handler waits on
    pub fn new(client: Client, response_url: impl Into<String>) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let gateway = Self {
            client,
            response_url: response_url.into(),
            ack: Mutex::new(Some(tx)),
        };
        (gateway, rx)
    }
}

#[async_trait]
impl ChatGateway for ResponseUrlGateway {
    async fn ack(&self) -> Result<()> {
        let Some(tx) = self.ack.lock().await.take() else {
            bail!("event already acknowledged");
        };
        if tx.send(()).is_err() {
            bail!("request handler stopped waiting for the acknowledgement");
        }
        Ok(())
    }

    async fn respond(&self, message: &SlackMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.response_url)
            .json(message)
            .send()
            .await
            .context("Failed to reach Slack response_url")?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = %status, "Response delivered");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            bail!("Slack rejected response ({}): {}", status, body)
        }
    }
}
