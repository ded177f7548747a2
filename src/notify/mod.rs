//! Message delivery

pub mod telegram;

use async_trait::async_trait;

use crate::Result;

pub use telegram::TelegramNotifier;

/// Delivers pre-formatted text (Telegram-style HTML) to a destination
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    async fn send(&self, text: &str) -> Result<()> {
        (**self).send(text).await
    }
}
