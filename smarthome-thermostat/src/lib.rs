use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::app::create_app;
use crate::configs::Settings;
use crate::services::{HttpRoomStore, InstanceState, MemoryRoomStore, ObserverRegistry, RoomSetpoints, RoomStore, Thermostat};

pub mod app;
pub mod configs;
pub mod errors;
pub mod handles;
pub mod services;

pub fn create_thermostat(settings: &Settings) -> Result<Arc<Thermostat>, errors::StoreError> {
    let simulation = &settings.simulation;
    let room_id = settings.device.room_id.as_str();

    let store: Arc<dyn RoomStore> = match &settings.store.url {
        Some(url) => Arc::new(HttpRoomStore::new(
            url,
            std::time::Duration::from_millis(settings.store.timeout_ms),
        )?),
        None => {
            tracing::warn!("no room store configured, simulating against an in-process store");
            Arc::new(MemoryRoomStore::new().with_room(
                room_id,
                RoomSetpoints {
                    normal_temperature: simulation.room_temperature,
                    reduced_temperature: simulation.reduced_temperature,
                    current_temperature: simulation.default_temperature,
                },
            ))
        }
    };

    Ok(Arc::new(Thermostat::new(
        settings.device.id.clone(),
        room_id,
        InstanceState::new(
            simulation.default_temperature,
            simulation.room_temperature,
            simulation.reduced_temperature,
        ),
        simulation.control_params(),
        store,
        Arc::new(ObserverRegistry::new(settings.observers.capacity)),
    )))
}

pub async fn run(settings: &Arc<Settings>) {
    let thermostat = create_thermostat(settings).expect("Failed to create room store client.");

    let token = CancellationToken::new();
    let control_loop = thermostat
        .clone()
        .spawn(settings.simulation.tick_interval(), token.clone());

    let app = create_app(thermostat.clone());

    let ip_addr = settings.server.host.parse::<IpAddr>().unwrap();

    let address = SocketAddr::from((ip_addr, settings.server.port));

    let listener = TcpListener::bind(&address).await.unwrap();

    tracing::info!(
        "thermostat {} (room: {}) listening on {:?}",
        thermostat.thermostat_id(),
        thermostat.room_id(),
        address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(token.clone()))
        .await
        .unwrap();

    token.cancel();
    let _ = control_loop.await;
}

async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("shutdown requested"),
        _ = token.cancelled() => {},
    }

    // Ends the control loop, which in turn closes open event streams.
    token.cancel();
}
