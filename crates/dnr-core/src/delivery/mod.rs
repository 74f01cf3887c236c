pub mod telegram;

pub use telegram::{TelegramDispatcher, TelegramSettings};

use crate::error::Result;
use async_trait::async_trait;
use log::{error, info};

/// Delivers a finished brief to its destination.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Destination name for logging
    fn name(&self) -> &'static str;

    /// One delivery attempt. `Err` carries the service's own description when it gave one.
    async fn deliver(&self, text: &str) -> Result<()>;
}

/// Deliver `text` and report the outcome as a flag. Failures are logged here
/// and never propagated.
pub async fn dispatch(dispatcher: &dyn Dispatcher, text: &str) -> bool {
    match dispatcher.deliver(text).await {
        Ok(()) => {
            info!("✅ Message sent to {} successfully!", dispatcher.name());
            true
        }
        Err(e) => {
            error!("❌ {} delivery error: {}", dispatcher.name(), e);
            false
        }
    }
}
