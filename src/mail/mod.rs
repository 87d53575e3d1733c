/// Mail provider seam. The scan pipeline only sees this trait; the
/// production implementation lives in gmail.rs and the tests swap in a fake.
use async_trait::async_trait;
use thiserror::Error;

pub mod gmail;

#[derive(Debug, Error)]
pub enum MailError {
    /// The provider rejected the credential (HTTP 401/403).
    #[error("mail provider rejected the credential")]
    Unauthorized,
    /// Any other transport or decode failure.
    #[error(transparent)]
    Request(#[from] anyhow::Error),
}

/// A fetched message reduced to what classification needs.
#[derive(Debug, Clone)]
pub struct FetchedMessage {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub body: String,
    pub timestamp: i64,
}

#[async_trait]
pub trait MailProvider: Send + Sync {
    /// One bounded listing call. `query` is provider search syntax; the
    /// returned ids keep the provider's listing order.
    async fn list_message_ids(
        &self,
        access_token: &str,
        query: &str,
        max: u32,
    ) -> Result<Vec<String>, MailError>;

    /// Full fetch of a single listed message.
    async fn get_message(&self, access_token: &str, id: &str) -> Result<FetchedMessage, MailError>;
}
