use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::{Json, Router};
use smarthome_api::models::{DeviceResponse, DeviceType, WindowStatus};
use smarthome_thermostat::services::{
    ControlParams, InstanceState, MemoryRoomStore, ObserverRegistry, RoomSetpoints, Thermostat,
};
use smarthome_window::app::create_app;
use smarthome_window::services::{HttpNotifier, WindowContact};
use tokio::net::TcpListener;

pub const ROOM: &str = "Wohnzimmer";

/// A window contact wired to a live thermostat instance of the same room.
pub struct MockApp {
    pub thermostat: Arc<Thermostat>,
    pub window: Arc<WindowContact>,
    pub router: Router,
}

impl MockApp {
    /// `discover` makes the window find the thermostat through a registry
    /// instead of a configured url.
    pub async fn new(discover: bool) -> Self {
        let store = Arc::new(MemoryRoomStore::new().with_room(
            ROOM,
            RoomSetpoints {
                normal_temperature: 22.0,
                reduced_temperature: 18.0,
                current_temperature: 22.0,
            },
        ));

        let thermostat = Arc::new(Thermostat::new(
            "1",
            ROOM,
            InstanceState::new(22.0, 22.0, 18.0),
            ControlParams::default(),
            store,
            Arc::new(ObserverRegistry::new(8)),
        ));
        let thermostat_url = serve(smarthome_thermostat::app::create_app(thermostat.clone())).await;

        let notifier = if discover {
            let device = DeviceResponse {
                id: 1,
                device_id: 1,
                device_type: DeviceType::Thermostat,
                room_id: Some(ROOM.to_string()),
                address: thermostat_url,
            };
            let registry = Router::new().route(
                "/api/rooms/:room_id/devices",
                get(move || {
                    let device = device.clone();
                    async move { Json(vec![device]) }
                }),
            );
            let registry_url = serve(registry).await;

            HttpNotifier::new(ROOM, Vec::new(), Some(&registry_url), Duration::from_secs(2)).unwrap()
        } else {
            HttpNotifier::new(ROOM, vec![thermostat_url], None, Duration::from_secs(2)).unwrap()
        };

        let window = Arc::new(WindowContact::new(
            "1",
            ROOM,
            WindowStatus::Closed,
            Arc::new(notifier),
        ));
        let router = create_app(window.clone());

        Self {
            thermostat,
            window,
            router,
        }
    }
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{address}")
}
