use crate::config::NotifierConfig;
use crate::errors::OutboundError;
use crate::http::send_checked;
use crate::metrics_defs::NOTIFICATIONS_FAILED;
use async_trait::async_trait;
use shared::counter;
use std::fmt;
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Success,
    Error,
}

impl Category {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Success => "Success",
            Category::Error => "Error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one pipeline run, sent once to the operator and then dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationEvent {
    pub category: Category,
    pub message: String,
}

impl NotificationEvent {
    pub fn success(message: impl Into<String>) -> Self {
        NotificationEvent {
            category: Category::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        NotificationEvent {
            category: Category::Error,
            message: message.into(),
        }
    }

    pub fn title(&self) -> String {
        format!("Timestamp {}", self.category)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, event: &NotificationEvent) -> Result<(), OutboundError>;
}

/// Sends the event and swallows any failure after logging it.
///
/// The response to the caller never depends on the notification channel.
pub async fn dispatch_best_effort(notifier: &dyn Notifier, event: &NotificationEvent) {
    if let Err(e) = notifier.send(event).await {
        tracing::error!(
            category = event.category.as_str(),
            error = %e,
            "Could not send notification"
        );
        counter!(NOTIFICATIONS_FAILED, "category" => event.category.as_str()).increment(1);
    }
}

/// Push notifications through a WirePusher-style `GET` endpoint.
pub struct WirePusherNotifier {
    client: reqwest::Client,
    url: Url,
    device_id: String,
}

impl WirePusherNotifier {
    pub fn new(config: &NotifierConfig, client: reqwest::Client) -> Self {
        WirePusherNotifier {
            client,
            url: config.url.clone(),
            device_id: config.device_id.clone(),
        }
    }
}

#[async_trait]
impl Notifier for WirePusherNotifier {
    async fn send(&self, event: &NotificationEvent) -> Result<(), OutboundError> {
        let title = event.title();
        let request = self.client.get(self.url.clone()).query(&[
            ("id", self.device_id.as_str()),
            ("title", title.as_str()),
            ("message", event.message.as_str()),
            ("type", event.category.as_str()),
        ]);

        send_checked(request).await?;
        Ok(())
    }
}
