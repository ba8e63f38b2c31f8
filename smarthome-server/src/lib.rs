use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::app::create_app;
use crate::configs::{LauncherMode, SchemaManager, Settings, Storage};
use crate::repositories::{DeviceRepository, RoomRepository};
use crate::services::{DeviceClient, DeviceLauncher, ExternalLauncher, ProcessLauncher, RegistryService};

pub mod app;
pub mod configs;
pub mod errors;
pub mod handles;
pub mod models;
pub mod repositories;
pub mod services;

pub fn create_registry(settings: &Settings, storage: Arc<Storage>) -> Arc<RegistryService> {
    let launcher: Arc<dyn DeviceLauncher> = match settings.launcher.mode {
        LauncherMode::Process => Arc::new(ProcessLauncher::new(
            settings.launcher.clone(),
            settings.rooms,
        )),
        LauncherMode::External => Arc::new(ExternalLauncher::new(settings.launcher.clone())),
    };

    Arc::new(RegistryService::new(
        Arc::new(DeviceRepository::new(storage.clone())),
        Arc::new(RoomRepository::new(storage)),
        launcher,
        settings.rooms,
    ))
}

pub async fn run(settings: &Arc<Settings>) {
    let storage = Arc::new(
        Storage::new(settings.database.clone(), SchemaManager::default())
            .await
            .expect("Failed to open database."),
    );

    let registry = create_registry(settings, storage);

    match registry.launch_all().await {
        Ok(launched) => tracing::info!("launched {} registered devices", launched),
        Err(e) => tracing::error!("failed to launch registered devices: {}", e),
    }

    match registry.bootstrap(&settings.bootstrap.devices).await {
        Ok(registered) if registered > 0 => tracing::info!("bootstrapped {} devices", registered),
        Ok(_) => {}
        Err(e) => tracing::error!("failed to bootstrap devices: {}", e),
    }

    let client = DeviceClient::new(settings.launcher.request_timeout())
        .expect("Failed to create device client.");

    let app = create_app(registry.clone(), client);

    let ip_addr = settings.server.host.parse::<IpAddr>().unwrap();

    let address = SocketAddr::from((ip_addr, settings.server.port));

    let listener = TcpListener::bind(&address).await.unwrap();

    tracing::info!("listening on {:?}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    if let Err(e) = registry.stop_all().await {
        tracing::error!("failed to stop devices: {}", e);
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown requested");
    }
}
