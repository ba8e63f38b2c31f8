use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::routing::{get, post};
use axum::{Json, Router};
use smarthome_api::models::*;
use smarthome_server::app::create_app;
use smarthome_server::configs::{Database, RoomDefaults, SchemaManager, Storage};
use smarthome_server::repositories::{DeviceRepository, RoomRepository};
use smarthome_server::services::{DeviceClient, DeviceLauncher, DeviceSpec, RegistryService};
use tokio::net::TcpListener;

/// Nothing listens here, so forwarded calls fail.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Records launcher calls and hands out configurable device addresses.
pub struct MockLauncher {
    pub thermostat_address: Mutex<String>,
    pub window_contact_address: Mutex<String>,
    pub launched: Mutex<Vec<DeviceSpec>>,
    pub stopped: Mutex<Vec<(DeviceType, Id)>>,
    pub fail: AtomicBool,
}

impl Default for MockLauncher {
    fn default() -> Self {
        Self {
            thermostat_address: Mutex::new(UNREACHABLE.to_string()),
            window_contact_address: Mutex::new(UNREACHABLE.to_string()),
            launched: Mutex::new(Vec::new()),
            stopped: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl DeviceLauncher for MockLauncher {
    fn address(&self, device_type: DeviceType, _device_id: Id) -> String {
        match device_type {
            DeviceType::Thermostat => self.thermostat_address.lock().unwrap().clone(),
            DeviceType::WindowContact => self.window_contact_address.lock().unwrap().clone(),
        }
    }

    async fn launch(&self, spec: &DeviceSpec) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("launch disabled");
        }
        self.launched.lock().unwrap().push(spec.clone());
        Ok(())
    }

    async fn stop(&self, device_type: DeviceType, device_id: Id) -> Result<bool> {
        self.stopped.lock().unwrap().push((device_type, device_id));
        Ok(true)
    }
}

pub struct MockApp {
    pub storage: Arc<Storage>,
    pub launcher: Arc<MockLauncher>,
    pub registry: Arc<RegistryService>,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        let storage = Arc::new(
            Storage::new(
                Database {
                    migration_path: None,
                    clean_start: true,
                    url: String::from("sqlite::memory:"),
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        );

        let launcher = Arc::new(MockLauncher::default());

        let registry = Arc::new(RegistryService::new(
            Arc::new(DeviceRepository::new(storage.clone())),
            Arc::new(RoomRepository::new(storage.clone())),
            launcher.clone(),
            RoomDefaults::default(),
        ));

        let client = DeviceClient::new(Duration::from_secs(1)).unwrap();
        let router = create_app(registry.clone(), client);

        Self {
            storage,
            launcher,
            registry,
            router,
        }
    }

    pub async fn register(&self, device_id: Id, device_type: DeviceType, room_id: &str) {
        self.registry
            .register(&RegisterDeviceRequest {
                device_id,
                device_type,
                room_id: Some(room_id.to_string()),
            })
            .await
            .unwrap();
    }

    /// Serves a canned thermostat instance and points the launcher at it.
    pub async fn with_fake_thermostat(self) -> Self {
        let router = Router::new()
            .route("/status", get(|| async { Json(fake_snapshot(WindowStatus::Closed)) }))
            .route(
                "/update",
                post(|Json(body): Json<ThermostatUpdateRequest>| async move {
                    let window = match body.window.as_deref() {
                        Some("open") => WindowStatus::Open,
                        _ => WindowStatus::Closed,
                    };

                    Json(ThermostatUpdateResponse {
                        snapshot: fake_snapshot(window),
                        message: "Thermostat updated".to_string(),
                    })
                }),
            );

        *self.launcher.thermostat_address.lock().unwrap() = serve(router).await;
        self
    }

    /// Serves a canned window contact instance and points the launcher at it.
    pub async fn with_fake_window_contact(self) -> Self {
        let command = |mode: WindowStatus| {
            post(move || async move {
                Json(WindowCommandResponse {
                    message: format!("Window {mode}"),
                    mode,
                })
            })
        };

        let router = Router::new()
            .route(
                "/status",
                get(|| async {
                    Json(WindowContactStatus {
                        window_contact_id: "1".to_string(),
                        room_id: "Wohnzimmer".to_string(),
                        mode: WindowStatus::Closed,
                    })
                }),
            )
            .route("/open", command(WindowStatus::Open))
            .route("/close", command(WindowStatus::Closed))
            .route("/toggle", command(WindowStatus::Open));

        *self.launcher.window_contact_address.lock().unwrap() = serve(router).await;
        self
    }
}

fn fake_snapshot(window_status: WindowStatus) -> ThermostatSnapshot {
    ThermostatSnapshot {
        thermostat_id: "1".to_string(),
        room_id: "Wohnzimmer".to_string(),
        current_temperature: 21.5,
        room_temperature: 22.0,
        reduced_temperature: 18.0,
        heating_mode: 4,
        window_status,
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

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap()
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    serde_json::from_slice(&body).unwrap()
}
