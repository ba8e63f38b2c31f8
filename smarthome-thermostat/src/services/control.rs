use smarthome_api::models::WindowStatus;

/// Upper bounds (inclusive) of heating modes 0 through 4. Anything above the
/// last bound is mode 5.
pub const MODE_THRESHOLDS: [f64; 5] = [0.0, 0.01, 0.3, 0.6, 1.0];

/// Temperature gained per tick for each heating mode before scaling.
pub const MODE_INCREMENTS: [f64; 6] = [0.0, 0.01, 0.05, 0.1, 0.15, 0.5];

pub const MAX_HEATING_MODE: u8 = 5;

/// Lower bound of the heating efficiency factor.
const MIN_EFFICIENCY: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParams {
    /// Temperature lost per tick while the window is closed
    pub closed_cooling_rate: f64,
    /// Temperature lost per tick while the window is open
    pub open_cooling_rate: f64,
    /// Derivative gain
    pub derivative_gain: f64,
    /// Distance above the normal temperature at which heating reaches its
    /// lowest efficiency
    pub max_delta: f64,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            closed_cooling_rate: 0.01,
            open_cooling_rate: 0.08,
            derivative_gain: 0.5,
            max_delta: 10.0,
        }
    }
}

impl ControlParams {
    pub fn cooling_rate(&self, window_status: WindowStatus) -> f64 {
        match window_status {
            WindowStatus::Open => self.open_cooling_rate,
            WindowStatus::Closed => self.closed_cooling_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    pub current_temperature: f64,
    pub room_temperature: f64,
    pub reduced_temperature: f64,
    pub window_status: WindowStatus,
    pub previous_error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutput {
    pub target: f64,
    /// Temperature after passive cooling, before heating
    pub cooled_temperature: f64,
    pub control_signal: f64,
    pub heating_mode: u8,
    /// Temperature after cooling and heating
    pub current_temperature: f64,
    /// Error to carry into the next step
    pub previous_error: f64,
}

/// Advances the simulation by one step.
///
/// Pure in its inputs: identical input and params always produce identical
/// output.
pub fn step(input: ControlInput, params: &ControlParams) -> ControlOutput {
    let target = match input.window_status {
        WindowStatus::Open => input.reduced_temperature,
        WindowStatus::Closed => input.room_temperature,
    };

    let cooled_temperature = input.current_temperature - params.cooling_rate(input.window_status);

    let error = target - cooled_temperature;
    let derivative = error - input.previous_error;
    let control_signal = error + params.derivative_gain * derivative;

    let heating_mode = classify(control_signal);
    let increment = heating_increment(
        heating_mode,
        cooled_temperature,
        input.room_temperature,
        params.max_delta,
    );

    ControlOutput {
        target,
        cooled_temperature,
        control_signal,
        heating_mode,
        current_temperature: cooled_temperature + increment,
        previous_error: error,
    }
}

/// Maps a control signal onto a heating mode. A NaN signal means no heating.
pub fn classify(control_signal: f64) -> u8 {
    if control_signal.is_nan() {
        return 0;
    }

    MODE_THRESHOLDS
        .iter()
        .position(|&bound| control_signal <= bound)
        .unwrap_or(MODE_THRESHOLDS.len()) as u8
}

/// Heating gained in one step. Heating loses efficiency as the room
/// approaches or overshoots its normal temperature.
pub fn heating_increment(
    heating_mode: u8,
    current_temperature: f64,
    room_temperature: f64,
    max_delta: f64,
) -> f64 {
    let base = MODE_INCREMENTS[heating_mode.min(MAX_HEATING_MODE) as usize];

    if base == 0.0 || max_delta <= 0.0 {
        return base;
    }

    let efficiency = 1.0 - (current_temperature - room_temperature) / max_delta;
    if efficiency.is_nan() {
        return base * MIN_EFFICIENCY;
    }

    base * efficiency.clamp(MIN_EFFICIENCY, 1.0)
}
