use std::sync::Arc;
use std::time::Duration;

use smarthome_api::models::{ThermostatSnapshot, ThermostatUpdateRequest, WindowStatus};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::services::control::{self, ControlInput, ControlParams};
use crate::services::observer_service::ObserverRegistry;
use crate::services::room_store::{RoomSetpoints, RoomStore};

/// Mutable part of a thermostat, refreshed every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceState {
    pub current_temperature: f64,
    pub room_temperature: f64,
    pub reduced_temperature: f64,
    pub window_status: WindowStatus,
    pub heating_mode: u8,
    pub previous_error: f64,
}

impl InstanceState {
    pub fn new(current_temperature: f64, room_temperature: f64, reduced_temperature: f64) -> Self {
        Self {
            current_temperature,
            room_temperature,
            reduced_temperature,
            window_status: WindowStatus::Closed,
            heating_mode: 0,
            previous_error: 0.0,
        }
    }

    fn apply_setpoints(&mut self, setpoints: RoomSetpoints) {
        self.current_temperature = setpoints.current_temperature;
        self.room_temperature = setpoints.normal_temperature;
        self.reduced_temperature = setpoints.reduced_temperature;
    }

    fn control_input(&self) -> ControlInput {
        ControlInput {
            current_temperature: self.current_temperature,
            room_temperature: self.room_temperature,
            reduced_temperature: self.reduced_temperature,
            window_status: self.window_status,
            previous_error: self.previous_error,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverrideOutcome {
    pub snapshot: ThermostatSnapshot,
    /// False when the request carried no usable field
    pub recognized: bool,
}

pub struct Thermostat {
    thermostat_id: String,
    room_id: String,
    params: ControlParams,
    state: Mutex<InstanceState>,
    store: Arc<dyn RoomStore>,
    observers: Arc<ObserverRegistry>,
}

impl Thermostat {
    pub fn new(
        thermostat_id: impl Into<String>,
        room_id: impl Into<String>,
        initial: InstanceState,
        params: ControlParams,
        store: Arc<dyn RoomStore>,
        observers: Arc<ObserverRegistry>,
    ) -> Self {
        Self {
            thermostat_id: thermostat_id.into(),
            room_id: room_id.into(),
            params,
            state: Mutex::new(initial),
            store,
            observers,
        }
    }

    pub fn thermostat_id(&self) -> &str {
        &self.thermostat_id
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn observers(&self) -> &Arc<ObserverRegistry> {
        &self.observers
    }

    pub async fn state(&self) -> InstanceState {
        *self.state.lock().await
    }

    pub async fn snapshot(&self) -> ThermostatSnapshot {
        let state = self.state.lock().await;
        self.to_snapshot(&state)
    }

    /// One scheduled control step: refresh setpoints from the store, advance
    /// the simulation, publish and persist.
    pub async fn tick(&self) -> ThermostatSnapshot {
        match self.store.fetch_setpoints(&self.room_id).await {
            Ok(setpoints) => self.state.lock().await.apply_setpoints(setpoints),
            Err(e) => {
                tracing::warn!(room_id = %self.room_id, "fetch setpoints failed, using last known values: {e}")
            }
        }

        let snapshot = self.advance().await;
        self.publish(&snapshot).await;

        snapshot
    }

    /// Applies a manual override and immediately runs one out-of-cycle
    /// control step on the in-memory values.
    pub async fn apply_override(&self, request: ThermostatUpdateRequest) -> OverrideOutcome {
        let mut recognized = false;
        let mut setpoints_changed = false;

        {
            let mut state = self.state.lock().await;

            if let Some(value) = request.current_temp {
                state.current_temperature = value;
                recognized = true;
            }
            if let Some(value) = request.room_temp {
                state.room_temperature = value;
                recognized = true;
                setpoints_changed = true;
            }
            if let Some(value) = request.reduced_temp {
                state.reduced_temperature = value;
                recognized = true;
                setpoints_changed = true;
            }
            if let Some(window) = request.window.as_deref() {
                match window.parse::<WindowStatus>() {
                    Ok(status) => {
                        if state.window_status != status {
                            tracing::info!(room_id = %self.room_id, "window is now {status}");
                        }
                        state.window_status = status;
                        recognized = true;
                    }
                    Err(e) => tracing::warn!("ignoring window override: {e}"),
                }
            }
        }

        if !recognized {
            tracing::debug!("override carried no recognized fields");
        }

        let snapshot = self.advance().await;
        self.publish(&snapshot).await;

        if setpoints_changed {
            if let Err(e) = self
                .store
                .write_setpoints(&self.room_id, snapshot.room_temperature, snapshot.reduced_temperature)
                .await
            {
                tracing::warn!(room_id = %self.room_id, "persist setpoints failed: {e}");
            }
        }

        OverrideOutcome { snapshot, recognized }
    }

    /// Starts the periodic control loop on its own task. The loop stops when
    /// the token is cancelled.
    pub fn spawn(self: Arc<Self>, period: Duration, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(
                thermostat_id = %self.thermostat_id,
                room_id = %self.room_id,
                "control loop started, period {:?}",
                period
            );

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let snapshot = self.tick().await;
                        tracing::trace!(
                            current_temperature = snapshot.current_temperature,
                            heating_mode = snapshot.heating_mode,
                            "tick"
                        );
                    }
                }
            }

            self.observers.close_all();
            tracing::info!(thermostat_id = %self.thermostat_id, "control loop stopped");
        })
    }

    async fn advance(&self) -> ThermostatSnapshot {
        let mut state = self.state.lock().await;

        let output = control::step(state.control_input(), &self.params);
        state.current_temperature = output.current_temperature;
        state.heating_mode = output.heating_mode;
        state.previous_error = output.previous_error;

        self.to_snapshot(&state)
    }

    async fn publish(&self, snapshot: &ThermostatSnapshot) {
        self.observers.publish(snapshot);

        if let Err(e) = self
            .store
            .write_current_temperature(&self.room_id, snapshot.current_temperature)
            .await
        {
            tracing::warn!(room_id = %self.room_id, "persist temperature failed: {e}");
        }
    }

    fn to_snapshot(&self, state: &InstanceState) -> ThermostatSnapshot {
        ThermostatSnapshot {
            thermostat_id: self.thermostat_id.clone(),
            room_id: self.room_id.clone(),
            current_temperature: state.current_temperature,
            room_temperature: state.room_temperature,
            reduced_temperature: state.reduced_temperature,
            heating_mode: state.heating_mode,
            window_status: state.window_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_stream::StreamExt;

    use super::*;
    use crate::services::room_store::MemoryRoomStore;

    const ROOM: &str = "Wohnzimmer";

    fn setpoints(current_temperature: f64) -> RoomSetpoints {
        RoomSetpoints {
            normal_temperature: 22.0,
            reduced_temperature: 18.0,
            current_temperature,
        }
    }

    fn thermostat(store: Arc<MemoryRoomStore>, initial: InstanceState) -> Thermostat {
        Thermostat::new(
            "1",
            ROOM,
            initial,
            ControlParams::default(),
            store,
            Arc::new(ObserverRegistry::new(8)),
        )
    }

    #[tokio::test]
    async fn test_tick_refreshes_and_persists() {
        let store = Arc::new(MemoryRoomStore::new().with_room(ROOM, setpoints(20.0)));
        let thermostat = thermostat(store.clone(), InstanceState::new(0.0, 0.0, 0.0));

        let snapshot = thermostat.tick().await;

        assert_eq!(snapshot.room_temperature, 22.0);
        assert_eq!(snapshot.reduced_temperature, 18.0);
        assert_eq!(snapshot.heating_mode, 5);
        assert!((snapshot.current_temperature - 20.49).abs() < 1e-12);
        assert_eq!(
            store.get(ROOM).unwrap().current_temperature,
            snapshot.current_temperature
        );
    }

    #[tokio::test]
    async fn test_tick_survives_store_outage() {
        let store = Arc::new(MemoryRoomStore::new().with_room(ROOM, setpoints(20.0)));
        let thermostat = thermostat(store.clone(), InstanceState::new(21.0, 22.0, 18.0));
        store.set_offline(true);

        let first = thermostat.tick().await;
        let second = thermostat.tick().await;

        // Still simulating on the seeded values.
        assert!(first.current_temperature > 21.0);
        assert!(second.current_temperature > first.current_temperature);
        assert_eq!(store.get(ROOM).unwrap().current_temperature, 20.0);

        store.set_offline(false);
        let third = thermostat.tick().await;
        assert_eq!(store.get(ROOM).unwrap().current_temperature, third.current_temperature);
    }

    #[tokio::test]
    async fn test_window_override_switches_target_and_cooling() {
        let store = Arc::new(MemoryRoomStore::new().with_room(ROOM, setpoints(22.0)));
        let thermostat = thermostat(store.clone(), InstanceState::new(22.0, 22.0, 18.0));

        let outcome = thermostat
            .apply_override(ThermostatUpdateRequest::window(WindowStatus::Open))
            .await;

        assert!(outcome.recognized);
        assert_eq!(outcome.snapshot.window_status, WindowStatus::Open);
        assert_eq!(outcome.snapshot.heating_mode, 0);
        // Open window: target is the reduced temperature and the larger loss applies.
        assert!((outcome.snapshot.current_temperature - 21.92).abs() < 1e-12);
        assert_eq!(store.get(ROOM).unwrap().current_temperature, outcome.snapshot.current_temperature);

        let before = thermostat.state().await.current_temperature;
        let after = thermostat.tick().await.current_temperature;
        assert!((before - after - ControlParams::default().open_cooling_rate).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_empty_override_matches_plain_step() {
        let store = Arc::new(MemoryRoomStore::new().with_room(ROOM, setpoints(19.5)));
        let initial = InstanceState {
            previous_error: 0.75,
            ..InstanceState::new(19.5, 21.0, 17.0)
        };
        let thermostat = thermostat(store, initial);

        let outcome = thermostat
            .apply_override(ThermostatUpdateRequest {
                window: Some("sideways".to_string()),
                ..Default::default()
            })
            .await;
        let expected = control::step(initial.control_input(), &ControlParams::default());

        assert!(!outcome.recognized);
        assert_eq!(outcome.snapshot.window_status, WindowStatus::Closed);
        assert_eq!(outcome.snapshot.room_temperature, 21.0);
        assert_eq!(outcome.snapshot.heating_mode, expected.heating_mode);
        assert_eq!(
            outcome.snapshot.current_temperature.to_bits(),
            expected.current_temperature.to_bits()
        );
    }

    #[tokio::test]
    async fn test_setpoint_override_is_persisted() {
        let store = Arc::new(MemoryRoomStore::new().with_room(ROOM, setpoints(20.0)));
        let thermostat = thermostat(store.clone(), InstanceState::new(20.0, 22.0, 18.0));

        thermostat
            .apply_override(ThermostatUpdateRequest {
                room_temp: Some(24.0),
                ..Default::default()
            })
            .await;

        let room = store.get(ROOM).unwrap();
        assert_eq!(room.normal_temperature, 24.0);
        assert_eq!(room.reduced_temperature, 18.0);

        // The next refresh keeps the overridden setpoint.
        assert_eq!(thermostat.tick().await.room_temperature, 24.0);
    }

    #[tokio::test]
    async fn test_tick_publishes_to_observers() {
        let store = Arc::new(MemoryRoomStore::new().with_room(ROOM, setpoints(20.0)));
        let thermostat = thermostat(store, InstanceState::new(20.0, 22.0, 18.0));

        let mut subscription = thermostat.observers().subscribe();
        let closed = thermostat.observers().subscribe();
        drop(closed);

        let snapshot = thermostat.tick().await;
        assert_eq!(subscription.next().await.unwrap(), snapshot);
        assert_eq!(thermostat.observers().len(), 1);
    }

    #[tokio::test]
    async fn test_spawned_loop_stops_on_cancel() {
        let store = Arc::new(MemoryRoomStore::new().with_room(ROOM, setpoints(20.0)));
        let thermostat = Arc::new(thermostat(store.clone(), InstanceState::new(20.0, 22.0, 18.0)));
        let token = CancellationToken::new();

        let mut subscription = thermostat.observers().subscribe();

        let handle = thermostat.clone().spawn(Duration::from_millis(10), token.clone());
        time::sleep(Duration::from_millis(50)).await;
        token.cancel();
        handle.await.unwrap();

        assert!(thermostat.observers().is_empty());
        // Open streams end once the loop is gone.
        while subscription.next().await.is_some() {}
        assert!(store.get(ROOM).unwrap().current_temperature > 20.0);
    }
}
