use std::sync::Arc;

use smarthome_api::models::{WindowContactStatus, WindowStatus};
use tokio::sync::Mutex;

use crate::services::Notifier;

pub struct WindowContact {
    window_contact_id: String,
    room_id: String,
    mode: Mutex<WindowStatus>,
    notifier: Arc<dyn Notifier>,
}

impl WindowContact {
    pub fn new(
        window_contact_id: impl Into<String>,
        room_id: impl Into<String>,
        mode: WindowStatus,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            window_contact_id: window_contact_id.into(),
            room_id: room_id.into(),
            mode: Mutex::new(mode),
            notifier,
        }
    }

    pub fn window_contact_id(&self) -> &str {
        &self.window_contact_id
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub async fn status(&self) -> WindowContactStatus {
        WindowContactStatus {
            window_contact_id: self.window_contact_id.clone(),
            room_id: self.room_id.clone(),
            mode: *self.mode.lock().await,
        }
    }

    pub async fn set(&self, mode: WindowStatus) -> WindowStatus {
        self.update(|_| mode).await
    }

    pub async fn toggle(&self) -> WindowStatus {
        self.update(WindowStatus::toggled).await
    }

    /// The lock is held while notifying so thermostats receive changes in order.
    /// The resulting mode is pushed even when unchanged, which resyncs
    /// thermostats that restarted in the meantime.
    async fn update<F>(&self, f: F) -> WindowStatus
    where
        F: FnOnce(WindowStatus) -> WindowStatus,
    {
        let mut mode = self.mode.lock().await;
        let previous = *mode;
        *mode = f(previous);

        if previous != *mode {
            tracing::info!(
                "window contact {} (room: {}) is now {}",
                self.window_contact_id,
                self.room_id,
                *mode
            );
        }

        let notified = self.notifier.notify(*mode).await;
        tracing::debug!("{} thermostats notified", notified);

        *mode
    }
}
