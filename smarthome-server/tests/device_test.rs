use std::sync::atomic::Ordering;

use axum::http::{Method, StatusCode};
use serde_json::json;
use smarthome_api::models::DeviceType;
use tower::ServiceExt;

mod common;
use common::mock_app::{MockApp, empty_request, json_request, read_json};

#[tokio::test]
async fn test_register_device() {
    let app = MockApp::new().await;

    let request = json_request(
        Method::POST,
        "/api/devices",
        json!({ "deviceId": 1, "type": "thermostat", "roomId": "Wohnzimmer" }),
    );

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let device = read_json(response).await;
    assert_eq!(device["deviceId"], json!(1));
    assert_eq!(device["type"], json!("thermostat"));
    assert_eq!(device["roomId"], json!("Wohnzimmer"));

    let launched = app.launcher.launched.lock().unwrap().clone();
    assert_eq!(launched.len(), 1);
    assert_eq!(launched[0].device_type, DeviceType::Thermostat);
    assert_eq!(launched[0].room_id.as_deref(), Some("Wohnzimmer"));

    // The room is created with default setpoints.
    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/rooms/Wohnzimmer"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let room = read_json(response).await;
    assert_eq!(room["normalTemperature"], json!(22.0));
    assert_eq!(room["reducedTemperature"], json!(18.0));
    assert_eq!(room["currentTemperature"], json!(20.0));
}

#[tokio::test]
async fn test_register_duplicate_device() {
    let app = MockApp::new().await;
    app.register(1, DeviceType::Thermostat, "Wohnzimmer").await;

    let request = json_request(
        Method::POST,
        "/api/devices",
        json!({ "deviceId": 1, "type": "thermostat", "roomId": "Kitchen" }),
    );

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], json!(409));

    // Same id under another type is a different device.
    let request = json_request(
        Method::POST,
        "/api/devices",
        json!({ "deviceId": 1, "type": "fensterkontakt", "roomId": "Wohnzimmer" }),
    );

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_invalid_device() {
    let app = MockApp::new().await;

    for body in [
        json!({ "deviceId": 1, "type": "heater", "roomId": "Wohnzimmer" }),
        json!({ "type": "thermostat" }),
        json!({ "deviceId": 0, "type": "thermostat" }),
        json!({ "deviceId": 2, "type": "thermostat", "roomId": "  " }),
    ] {
        let response = app
            .router
            .clone()
            .oneshot(json_request(Method::POST, "/api/devices", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert!(app.launcher.launched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_launch_failure_rolls_back() {
    let app = MockApp::new().await;
    app.launcher.fail.store(true, Ordering::SeqCst);

    let request = json_request(
        Method::POST,
        "/api/devices",
        json!({ "deviceId": 5, "type": "thermostat", "roomId": "Bad" }),
    );

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let devices = app.registry.device_repository().find_all().await.unwrap();
    assert!(devices.is_empty());
    assert!(
        app.registry
            .room_repository()
            .find_by_room_id("Bad")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_get_and_delete_device() {
    let app = MockApp::new().await;
    app.register(2, DeviceType::WindowContact, "Wohnzimmer").await;

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/devices"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/devices/window_contact/2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["type"], json!("window_contact"));

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::DELETE, "/api/devices/window_contact/2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        app.launcher.stopped.lock().unwrap().as_slice(),
        &[(DeviceType::WindowContact, 2)]
    );

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::DELETE, "/api/devices/window_contact/2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/devices/boiler/2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_window_contact_learns_room_thermostats() {
    let app = MockApp::new().await;
    app.register(1, DeviceType::Thermostat, "Wohnzimmer").await;
    app.register(2, DeviceType::Thermostat, "Kitchen").await;
    app.register(1, DeviceType::WindowContact, "Wohnzimmer").await;

    let launched = app.launcher.launched.lock().unwrap().clone();
    let window = launched
        .iter()
        .find(|spec| spec.device_type == DeviceType::WindowContact)
        .unwrap();

    assert_eq!(window.thermostat_urls, vec![common::mock_app::UNREACHABLE.to_string()]);
}

#[tokio::test]
async fn test_bootstrap_and_relaunch() {
    let app = MockApp::new().await;
    let seeds = vec![
        smarthome_server::configs::BootstrapDevice {
            device_id: 1,
            device_type: DeviceType::Thermostat,
            room_id: Some("Wohnzimmer".to_string()),
        },
        smarthome_server::configs::BootstrapDevice {
            device_id: 1,
            device_type: DeviceType::WindowContact,
            room_id: Some("Wohnzimmer".to_string()),
        },
    ];

    assert_eq!(app.registry.bootstrap(&seeds).await.unwrap(), 2);
    assert_eq!(app.registry.bootstrap(&seeds).await.unwrap(), 0);
    assert_eq!(app.registry.launch_all().await.unwrap(), 2);
    assert_eq!(app.launcher.launched.lock().unwrap().len(), 4);

    app.registry.stop_all().await.unwrap();
    assert_eq!(app.launcher.stopped.lock().unwrap().len(), 2);
}
