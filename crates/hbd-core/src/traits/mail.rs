//! Mail transport trait — the outbound email boundary.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::OutgoingMail;

/// Sends one email. Implementations must report failures as
/// `HbdError::Delivery` and must not retry.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Transport name (e.g., "smtp").
    fn name(&self) -> &str;

    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}
