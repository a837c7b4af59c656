//! Flat state vectors for external filters and estimators.
//!
//! # Layout
//!
//! ```text
//! [status, position, velocity, occupancy] × buses     (measurement part)
//! [arrival_rate, departure_rate]          × stops
//! [traffic_speed]
//! ```
//!
//! Status is the numeric [`BusStatus`] code.  [`Model::restore_state`] is the
//! inverse of [`Model::state_vector`]: status and occupancy are truncated to
//! integers, occupancy is clamped to the bus capacity and the stop boundary
//! rules are re-applied.

use bs_agent::BusStatus;
use bs_core::StopId;

use crate::{Model, SimError, SimResult};

/// Entries per bus.
pub const BUS_FIELDS: usize = 4;
/// Entries per stop.
pub const STOP_FIELDS: usize = 2;

impl Model {
    /// Length of [`state_vector`](Self::state_vector).
    #[inline]
    pub fn state_len(&self) -> usize {
        self.measurement_len() + STOP_FIELDS * self.corridor.len() + 1
    }

    /// Length of [`measurement_vector`](Self::measurement_vector).
    #[inline]
    pub fn measurement_len(&self) -> usize {
        BUS_FIELDS * self.buses.len()
    }

    /// Bus states only, in id order.
    pub fn measurement_vector(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.measurement_len());
        self.push_bus_states(&mut v);
        v
    }

    /// Full state: buses, then stop rates, then traffic speed.
    pub fn state_vector(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.state_len());
        self.push_bus_states(&mut v);
        for stop in self.corridor.stops() {
            v.push(stop.arrival_rate);
            v.push(stop.departure_rate);
        }
        v.push(self.environment.traffic_speed);
        v
    }

    fn push_bus_states(&self, v: &mut Vec<f64>) {
        for bus in &self.buses {
            v.extend_from_slice(&[
                f64::from(bus.status.code()),
                bus.position,
                bus.velocity,
                f64::from(bus.occupancy),
            ]);
        }
    }

    /// Overwrite the model state from a vector laid out like
    /// [`state_vector`](Self::state_vector).
    ///
    /// The whole vector is checked before anything is written, so on error
    /// the model is unchanged.  Histories (trajectories, ground truth, stop
    /// visits) and the clock are left as they are.
    pub fn restore_state(&mut self, state: &[f64]) -> SimResult<()> {
        let expected = self.state_len();
        if state.len() != expected {
            return Err(SimError::StateLength { expected, got: state.len() });
        }

        let (bus_part, rest) = state.split_at(self.measurement_len());
        let (stop_part, speed) = rest.split_at(STOP_FIELDS * self.corridor.len());

        let statuses = bus_part
            .chunks_exact(BUS_FIELDS)
            .enumerate()
            .map(|(i, chunk)| {
                let raw = chunk[0];
                decode_status(raw).ok_or(SimError::InvalidStatus { index: i * BUS_FIELDS, value: raw })
            })
            .collect::<SimResult<Vec<BusStatus>>>()?;

        for ((bus, chunk), status) in self.buses.iter_mut().zip(bus_part.chunks_exact(BUS_FIELDS)).zip(statuses) {
            bus.status = status;
            bus.position = chunk[1];
            bus.velocity = chunk[2];
            bus.occupancy = (chunk[3].trunc().max(0.0) as u32).min(bus.capacity);
            if status != BusStatus::Dwelling {
                bus.leave_stop_time = None;
            }
        }

        for (i, rates) in stop_part.chunks_exact(STOP_FIELDS).enumerate() {
            self.corridor.set_rates(StopId(i as u32), rates[0], rates[1])?;
        }
        for (env_rate, stop) in self.environment.arrival_rates.iter_mut().zip(self.corridor.stops()) {
            *env_rate = stop.arrival_rate;
        }
        self.environment.traffic_speed = speed[0];
        Ok(())
    }
}

/// Truncate and map a status entry; `None` for anything that is not one of
/// the four codes.
fn decode_status(raw: f64) -> Option<BusStatus> {
    if !raw.is_finite() {
        return None;
    }
    let code = raw.trunc();
    if !(0.0..=f64::from(u8::MAX)).contains(&code) {
        return None;
    }
    BusStatus::from_code(code as u8)
}
