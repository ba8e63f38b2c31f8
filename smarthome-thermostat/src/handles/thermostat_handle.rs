use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::Value;
use smarthome_api::models::{ThermostatSnapshot, ThermostatUpdateRequest, ThermostatUpdateResponse};

use crate::services::Thermostat;

#[derive(Clone)]
pub struct ThermostatState {
    pub thermostat: Arc<Thermostat>,
}

pub async fn get_status(State(state): State<ThermostatState>) -> Json<ThermostatSnapshot> {
    Json(state.thermostat.snapshot().await)
}

pub async fn update_thermostat(
    State(state): State<ThermostatState>,
    body: Bytes,
) -> Json<ThermostatUpdateResponse> {
    let outcome = state.thermostat.apply_override(parse_update(&body)).await;

    let message = if outcome.recognized {
        "Thermostat updated"
    } else {
        "No recognized fields, thermostat recomputed"
    };

    Json(ThermostatUpdateResponse {
        snapshot: outcome.snapshot,
        message: message.to_string(),
    })
}

/// Reads the override fields one at a time. A missing body, a body that is
/// not a JSON object or a field of the wrong type contributes nothing.
fn parse_update(body: &[u8]) -> ThermostatUpdateRequest {
    let fields = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => return ThermostatUpdateRequest::default(),
        Err(e) => {
            if !body.is_empty() {
                tracing::debug!("ignoring malformed override body: {e}");
            }
            return ThermostatUpdateRequest::default();
        }
    };

    let number = |name: &str| fields.get(name).and_then(Value::as_f64);

    ThermostatUpdateRequest {
        current_temp: number("currentTemp"),
        room_temp: number("roomTemp"),
        reduced_temp: number("reducedTemp"),
        window: fields
            .get("window")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> ThermostatUpdateRequest {
        parse_update(&serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn test_parse_update_keeps_well_typed_fields() {
        let request = parse(json!({ "currentTemp": "21.5", "roomTemp": 23.0, "window": 1 }));

        assert_eq!(request.current_temp, None);
        assert_eq!(request.room_temp, Some(23.0));
        assert_eq!(request.window, None);
    }

    #[test]
    fn test_parse_update_ignores_non_objects() {
        assert_eq!(parse_update(b""), ThermostatUpdateRequest::default());
        assert_eq!(parse_update(b"{not json"), ThermostatUpdateRequest::default());
        assert_eq!(parse(json!([1, 2])), ThermostatUpdateRequest::default());
        assert_eq!(parse(json!(null)), ThermostatUpdateRequest::default());
    }
}
