use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::app::create_app;
use crate::configs::Settings;
use crate::errors::NotifyError;
use crate::services::{HttpNotifier, WindowContact};

pub mod app;
pub mod configs;
pub mod errors;
pub mod handles;
pub mod services;

pub fn create_window_contact(settings: &Settings) -> Result<Arc<WindowContact>, NotifyError> {
    let notifier = HttpNotifier::new(
        &settings.device.room_id,
        settings.notify.thermostat_urls.clone(),
        settings.notify.registry_url.as_deref(),
        settings.notify.timeout(),
    )?;

    Ok(Arc::new(WindowContact::new(
        settings.device.id.clone(),
        settings.device.room_id.clone(),
        settings.window.default_mode,
        Arc::new(notifier),
    )))
}

pub async fn run(settings: &Arc<Settings>) {
    let window = create_window_contact(settings).expect("Failed to create thermostat notifier.");

    let app = create_app(window.clone());

    let ip_addr = settings.server.host.parse::<IpAddr>().unwrap();

    let address = SocketAddr::from((ip_addr, settings.server.port));

    let listener = TcpListener::bind(&address).await.unwrap();

    tracing::info!(
        "window contact {} (room: {}) listening on {:?}",
        window.window_contact_id(),
        window.room_id(),
        address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .unwrap();
}
