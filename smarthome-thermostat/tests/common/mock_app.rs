use std::sync::Arc;

use axum::Router;
use smarthome_thermostat::app::create_app;
use smarthome_thermostat::services::{
    ControlParams, InstanceState, MemoryRoomStore, ObserverRegistry, RoomSetpoints, Thermostat,
};

pub const ROOM: &str = "Wohnzimmer";

pub struct MockApp {
    pub store: Arc<MemoryRoomStore>,
    pub thermostat: Arc<Thermostat>,
    pub router: Router,
}

impl MockApp {
    pub fn new() -> Self {
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
            store.clone(),
            Arc::new(ObserverRegistry::new(8)),
        ));

        let router = create_app(thermostat.clone());

        Self {
            store,
            thermostat,
            router,
        }
    }
}
