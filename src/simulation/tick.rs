//! The thermal and economic model for a single tick.
//!
//! The room exchanges heat with the outside at a rate which depends on whether the door is open,
//! and the compressor (if running) pulls it towards the setpoint. Power is paid for at the current
//! tick's price and food loss is a function of the new temperature.
use super::{MonthHistory, RoomState};
use crate::model::RoomParameters;

/// The temperature at the end of a tick
pub fn next_temperature(
    room: &RoomParameters,
    last_temperature: f64,
    door_open: bool,
    compressor_on: bool,
) -> f64 {
    let leak_rate = if door_open {
        room.leak_rate_door_open
    } else {
        room.leak_rate_door_closed
    };
    let cooling_rate = if compressor_on { room.cooling_rate } else { 0.0 };

    let rate = leak_rate * (room.ambient_temperature - last_temperature)
        + cooling_rate * (room.setpoint_temperature - last_temperature);
    last_temperature + room.time_step * rate
}

/// The cost of food lost during a tick spent at `temperature`.
///
/// This is zero within the safe band, rising exponentially as the temperature moves away from it
/// in either direction.
pub fn food_loss_cost(room: &RoomParameters, temperature: f64) -> f64 {
    if temperature < room.safe_band_lower {
        room.cold_loss_coefficient * (-room.cold_loss_exponent * temperature).exp()
    } else if temperature < room.safe_band_upper {
        0.0
    } else {
        room.warm_loss_coefficient * (room.warm_loss_exponent * temperature).exp()
    }
}

/// Simulate the room's current tick, recording the outcome in `history`.
///
/// Afterwards, `state` holds the new temperature and points to the next tick.
pub fn simulate_tick(
    room: &RoomParameters,
    state: &mut RoomState,
    door_open: bool,
    compressor_on: bool,
    history: &mut MonthHistory,
) {
    let tick = state.tick;
    let temperature = next_temperature(room, state.temperature, door_open, compressor_on);
    let power_cost = if compressor_on {
        state.current_price()
    } else {
        0.0
    };

    history.door_open[tick] = door_open;
    history.compressor_on[tick] = compressor_on;
    history.temperature[tick] = temperature;
    history.food_loss_cost[tick] = food_loss_cost(room, temperature);
    history.power_cost[tick] = power_cost;

    state.temperature = temperature;
    state.tick += 1;
}
