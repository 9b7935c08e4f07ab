//! HTTP webhook notifier.
//!
//! Fires one request per alert at a notification endpoint (for example an
//! FWAlert trigger URL). Delivery is best-effort: each event is attempted
//! once, and failures are logged and dropped.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::port::outbound::notifier::{Event, Notifier};

/// Where and how to deliver webhook notifications.
#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub url: Url,
    pub method: Method,
    pub timeout: Duration,
    /// Append `symbol`, `tier`, `price` and `remaining` as query parameters.
    /// Off by default, which keeps the request a bare trigger.
    pub include_details: bool,
}

impl WebhookSettings {
    /// A bare `GET` trigger with a 5 second timeout.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
            timeout: Duration::from_secs(5),
            include_details: false,
        }
    }

    /// Build the HTTP client used for delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn client(&self) -> Result<Client> {
        Ok(Client::builder().timeout(self.timeout).build()?)
    }

    /// The URL requested for `event`.
    #[must_use]
    pub fn request_url(&self, event: &Event) -> Url {
        let mut url = self.url.clone();
        if self.include_details {
            if let Event::TierAlert(alert) = event {
                url.query_pairs_mut()
                    .append_pair("symbol", &alert.symbol)
                    .append_pair("tier", &alert.tier)
                    .append_pair("price", &alert.price.to_string())
                    .append_pair("remaining", &alert.remaining.to_string());
            }
        }
        url
    }

    /// Host part of the URL, safe to log. The path often carries a secret.
    fn host(&self) -> &str {
        self.url.host_str().unwrap_or("<no host>")
    }
}

/// Send `event` once and wait for the response status.
///
/// # Errors
///
/// Returns [`Error::Http`] on transport failure and [`Error::Connection`]
/// when the endpoint answers with a non-success status.
pub async fn deliver(client: &Client, settings: &WebhookSettings, event: &Event) -> Result<StatusCode> {
    let url = settings.request_url(event);
    let response = client.request(settings.method.clone(), url).send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(status)
    } else {
        Err(Error::Connection(format!("webhook returned {status}")))
    }
}

/// Webhook notifier backed by a background delivery task.
pub struct WebhookNotifier {
    sender: mpsc::UnboundedSender<Event>,
}

impl WebhookNotifier {
    /// Create the notifier and spawn its delivery worker.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: WebhookSettings) -> Result<Self> {
        let client = settings.client()?;
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(webhook_worker(client, settings, receiver));
        Ok(Self { sender })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, event: Event) {
        if self.sender.send(event).is_err() {
            warn!("Webhook notifier channel closed");
        }
    }
}

async fn webhook_worker(
    client: Client,
    settings: WebhookSettings,
    mut receiver: mpsc::UnboundedReceiver<Event>,
) {
    info!(
        host = settings.host(),
        method = %settings.method,
        details = settings.include_details,
        "Webhook notifier started"
    );

    while let Some(event) = receiver.recv().await {
        match deliver(&client, &settings, &event).await {
            Ok(status) => info!(status = %status, "Webhook notification sent"),
            Err(e) => error!(error = %e, host = settings.host(), "Webhook notification failed"),
        }
    }

    debug!("Webhook notifier worker shutting down");
}
