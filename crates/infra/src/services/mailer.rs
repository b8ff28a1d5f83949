use pitchin_domain::{NotificationKind, ReminderDigest};
use serde::Serialize;
use std::sync::Mutex;
use tracing::info;

/// Outbound email delivery. The reminder engine only decides whether
/// and with what payload to call this, rendering is the mail
/// provider's problem.
#[async_trait::async_trait]
pub trait IMailerService: Send + Sync {
    async fn send_reminder(&self, to: &str, digest: &ReminderDigest) -> anyhow::Result<()>;
    async fn send_overdue(&self, to: &str, digest: &ReminderDigest) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEmail {
    pub to: String,
    pub template: NotificationKind,
    pub payload: ReminderDigest,
}

/// Sends emails through a transactional mail HTTP API
pub struct HttpMailerService {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpMailerService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    async fn send(&self, email: &OutboundEmail) -> anyhow::Result<()> {
        let res = self
            .client
            .post(&format!("{}/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .json(email)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(anyhow::anyhow!(
                "Mail API responded with status code: {}",
                res.status()
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl IMailerService for HttpMailerService {
    async fn send_reminder(&self, to: &str, digest: &ReminderDigest) -> anyhow::Result<()> {
        self.send(&OutboundEmail {
            to: to.to_string(),
            template: NotificationKind::ContributionReminder,
            payload: digest.clone(),
        })
        .await
    }

    async fn send_overdue(&self, to: &str, digest: &ReminderDigest) -> anyhow::Result<()> {
        self.send(&OutboundEmail {
            to: to.to_string(),
            template: NotificationKind::OverdueEscalation,
            payload: digest.clone(),
        })
        .await
    }
}

/// Captures outbound emails instead of delivering them. Used in tests
/// and when no mail API is configured.
pub struct InMemoryMailerService {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl InMemoryMailerService {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(vec![]),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Default for InMemoryMailerService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IMailerService for InMemoryMailerService {
    async fn send_reminder(&self, to: &str, digest: &ReminderDigest) -> anyhow::Result<()> {
        info!("Captured reminder email to: {}", to);
        self.sent.lock().unwrap().push(OutboundEmail {
            to: to.to_string(),
            template: NotificationKind::ContributionReminder,
            payload: digest.clone(),
        });
        Ok(())
    }

    async fn send_overdue(&self, to: &str, digest: &ReminderDigest) -> anyhow::Result<()> {
        info!("Captured overdue email to: {}", to);
        self.sent.lock().unwrap().push(OutboundEmail {
            to: to.to_string(),
            template: NotificationKind::OverdueEscalation,
            payload: digest.clone(),
        });
        Ok(())
    }
}
