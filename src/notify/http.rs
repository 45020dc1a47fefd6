// src/notify/http.rs
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Transport;
use crate::config::Endpoint;
use crate::event::Event;
use crate::urgency::UrgencyLevel;

/// Posts alerts as JSON to `http://{host}:{port}/messages`.
/// No retries: a failed POST is reported to the delivery worker and dropped.
#[derive(Clone)]
pub struct HttpTransport {
    url: String,
    app_token: String,
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: &Endpoint, app_token: String) -> Result<Self> {
        if app_token.trim().is_empty() {
            return Err(anyhow!("ALERTS_APP_TOKEN is required for the http sink"));
        }
        let url = endpoint
            .base_url()?
            .join("messages")
            .context("building alert url")?;
        Ok(Self {
            url: url.to_string(),
            app_token,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        })
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Serialize)]
struct MessagePayload<'a> {
    title: &'a str,
    body: &'a str,
    urgency: UrgencyLevel,
    sent_at: DateTime<Utc>,
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn deliver(&self, event: &Event) -> Result<()> {
        let payload = MessagePayload {
            title: &event.title,
            body: &event.body,
            urgency: event.urgency,
            sent_at: Utc::now(),
        };

        self.client
            .post(&self.url)
            .bearer_auth(&self.app_token)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .context("alert post")?
            .error_for_status()
            .context("alert endpoint non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, ENV_ENDPOINT_HOST};

    #[test]
    fn url_is_built_from_endpoint() {
        let ep = Endpoint {
            hostname: "collector.local".into(),
            port: 7002,
        };
        let t = HttpTransport::new(&ep, "tok".into()).unwrap();
        assert_eq!(t.url(), "http://collector.local:7002/messages");
    }

    #[test]
    fn empty_token_is_rejected() {
        let ep = Endpoint {
            hostname: "collector.local".into(),
            port: 7002,
        };
        assert!(HttpTransport::new(&ep, "  ".into()).is_err());
    }

    #[test]
    fn malformed_host_is_rejected() {
        let ep = Endpoint {
            hostname: "not a host/??".into(),
            port: 7002,
        };
        let err = HttpTransport::new(&ep, "tok".into()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Invalid {
                var: ENV_ENDPOINT_HOST,
                ..
            })
        ));
    }
}
