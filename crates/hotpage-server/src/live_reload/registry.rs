//! Holder for the single active live reload connection.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use super::channel::NotificationChannel;

/// Shared slot for at most one [`NotificationChannel`].
///
/// Cloning yields another handle to the same slot. Replacement and reads by
/// the reload pipeline go through the same mutex, so a reload that has locked
/// the slot keeps writing to the channel it saw until it releases the lock.
#[derive(Clone, Debug, Default)]
pub struct ConnectionRegistry {
    active: Arc<Mutex<Option<NotificationChannel>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active connection.
    ///
    /// The previous channel is dropped without being closed explicitly; its
    /// socket task exits once it notices.
    pub async fn set_connection(&self, channel: NotificationChannel) {
        let mut active = self.active.lock().await;
        let replaced = active.replace(channel).is_some();
        tracing::info!(replaced, "Live reload connection registered");
    }

    /// Lock the slot for the duration of a reload.
    pub async fn lock(&self) -> MutexGuard<'_, Option<NotificationChannel>> {
        self.active.lock().await
    }
}
