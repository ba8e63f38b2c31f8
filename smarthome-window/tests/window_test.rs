use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use smarthome_api::models::WindowStatus;
use tower::ServiceExt;

mod common;
use common::mock_app::{MockApp, ROOM};

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    serde_json::from_slice(&body).unwrap()
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_get_status() {
    let app = MockApp::new(false).await;

    let response = app.router.clone().oneshot(request(Method::GET, "/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let status = read_json(response).await;
    assert_eq!(status["windowContactId"], json!("1"));
    assert_eq!(status["roomId"], json!(ROOM));
    assert_eq!(status["mode"], json!("closed"));
}

#[tokio::test]
async fn test_open_notifies_thermostat() {
    let app = MockApp::new(false).await;

    let response = app.router.clone().oneshot(request(Method::POST, "/open")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["mode"], json!("open"));
    assert_eq!(body["message"], json!("Window opened"));

    let snapshot = app.thermostat.snapshot().await;
    assert_eq!(snapshot.window_status, WindowStatus::Open);
    assert!((snapshot.current_temperature - 21.92).abs() < 1e-9);
}

#[tokio::test]
async fn test_toggle_round_trip() {
    let app = MockApp::new(false).await;

    let response = app.router.clone().oneshot(request(Method::POST, "/toggle")).await.unwrap();
    assert_eq!(read_json(response).await["mode"], json!("open"));
    assert_eq!(app.thermostat.snapshot().await.window_status, WindowStatus::Open);

    let response = app.router.clone().oneshot(request(Method::POST, "/close")).await.unwrap();
    assert_eq!(read_json(response).await["message"], json!("Window closed"));
    assert_eq!(app.thermostat.snapshot().await.window_status, WindowStatus::Closed);
    assert_eq!(app.window.status().await.mode, WindowStatus::Closed);
}

#[tokio::test]
async fn test_thermostats_discovered_through_registry() {
    let app = MockApp::new(true).await;

    let response = app.router.clone().oneshot(request(Method::POST, "/open")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(app.thermostat.snapshot().await.window_status, WindowStatus::Open);
}
