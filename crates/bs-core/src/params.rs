//! Static model parameters and initial conditions.
//!
//! Both structs are plain data with named fields.  Call
//! [`ModelParams::validate`] / [`InitialConditions::validate`] (the model
//! builder does this for you) before constructing a model so malformed
//! configuration is rejected up front instead of surfacing mid-run.

use crate::{BsError, BsResult, SimRng};

/// Static corridor, fleet, dwell and demand parameters.
///
/// Units: seconds, metres, passengers.  Demand bounds are in passengers per
/// minute and are converted to per-second rates by the environment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModelParams {
    /// Seconds per tick.
    pub dt: f64,
    /// Number of stops along the corridor.
    pub stop_count: usize,
    /// Distance between consecutive stops (m).
    pub stop_spacing: f64,
    /// Simulation horizon (s).
    pub end_time: f64,
    /// Dispatch headway between consecutive buses (s).
    pub headway: f64,
    /// Seconds per boarding passenger.
    pub board_time: f64,
    /// Seconds per alighting passenger.
    pub alight_time: f64,
    /// Fixed overhead of any stop with passenger activity (s).
    pub stopping_time: f64,
    /// Speed gained per tick while accelerating (m/s).  The per-bus
    /// acceleration is `bus_acceleration / dt` m/s².
    pub bus_acceleration: f64,
    /// Passenger capacity of every bus.
    pub bus_capacity: u32,
    /// Percentage rate at which congestion and demand grow over the horizon.
    /// 0 disables the trend.
    pub increase_rate: f64,
    /// Lower demand bound (passengers per minute).
    pub min_demand: f64,
    /// Upper demand bound (passengers per minute).
    pub max_demand: f64,
    /// Seconds subtracted from every stop's activation time.
    pub activation_lead: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            dt:               10.0,
            stop_count:       20,
            stop_spacing:     2_000.0,
            end_time:         6_000.0,
            headway:          5.0 * 60.0,
            board_time:       3.0,
            alight_time:      1.0,
            stopping_time:    3.0,
            bus_acceleration: 3.0,
            bus_capacity:     100,
            increase_rate:    1.0,
            min_demand:       0.5,
            max_demand:       1.0,
            activation_lead:  60.0,
        }
    }
}

fn require_positive(name: &str, v: f64) -> BsResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(BsError::Config(format!("{name} must be positive and finite, got {v}")))
    }
}

fn require_non_negative(name: &str, v: f64) -> BsResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(BsError::Config(format!("{name} must be non-negative and finite, got {v}")))
    }
}

impl ModelParams {
    /// Reject parameter sets the engine cannot run.
    pub fn validate(&self) -> BsResult<()> {
        require_positive("dt", self.dt)?;
        require_positive("end_time", self.end_time)?;
        require_positive("headway", self.headway)?;
        require_positive("stop_spacing", self.stop_spacing)?;
        if self.stop_count < 1 {
            return Err(BsError::Config("stop_count must be at least 1".into()));
        }
        if self.bus_capacity == 0 {
            return Err(BsError::Config("bus_capacity must be at least 1".into()));
        }
        require_non_negative("board_time", self.board_time)?;
        require_non_negative("alight_time", self.alight_time)?;
        require_non_negative("stopping_time", self.stopping_time)?;
        require_non_negative("bus_acceleration", self.bus_acceleration)?;
        require_non_negative("increase_rate", self.increase_rate)?;
        require_non_negative("min_demand", self.min_demand)?;
        require_non_negative("max_demand", self.max_demand)?;
        require_non_negative("activation_lead", self.activation_lead)?;
        if self.min_demand > self.max_demand {
            return Err(BsError::Config(format!(
                "min_demand ({}) exceeds max_demand ({})",
                self.min_demand, self.max_demand
            )));
        }
        Ok(())
    }

    /// Distance past which a moving bus is finished: `stop_count * stop_spacing`.
    #[inline]
    pub fn corridor_length(&self) -> f64 {
        self.stop_count as f64 * self.stop_spacing
    }

    /// Number of buses dispatched over the horizon: `trunc(end_time / headway)`.
    #[inline]
    pub fn fleet_size(&self) -> usize {
        (self.end_time / self.headway) as usize
    }

    /// Per-bus acceleration in m/s².
    #[inline]
    pub fn acceleration(&self) -> f64 {
        self.bus_acceleration / self.dt
    }

    /// Radius around a stop within which a bus counts as arrived.
    #[inline]
    pub fn geofence(&self, initial_traffic_speed: f64) -> f64 {
        self.dt * initial_traffic_speed + 5.0
    }

    /// Time scale of the congestion/demand trend: at `t = horizon` the trend
    /// factor reaches 1.  `None` when `increase_rate` is 0 (no trend).
    pub fn trend_horizon(&self) -> Option<f64> {
        (self.increase_rate > 0.0).then(|| (100.0 / self.increase_rate) * self.end_time)
    }

    /// Total ticks needed for the clock to reach `end_time`.
    #[inline]
    pub fn total_ticks(&self) -> u64 {
        (self.end_time / self.dt).ceil() as u64
    }
}

// ── InitialConditions ─────────────────────────────────────────────────────────

/// Initial traffic speed and per-stop demand vectors.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialConditions {
    /// Corridor-wide free-flow speed at t = 0 (m/s).
    pub traffic_speed: f64,
    /// Boarding demand per stop (passengers per second).
    pub arrival_rates: Vec<f64>,
    /// Alighting fraction per stop.
    pub departure_rates: Vec<f64>,
}

impl InitialConditions {
    /// Same arrival and departure rate at every stop.  The boundary overrides
    /// are applied later by the corridor.
    pub fn uniform(stop_count: usize, traffic_speed: f64, arrival_rate: f64, departure_rate: f64) -> Self {
        Self {
            traffic_speed,
            arrival_rates:   vec![arrival_rate; stop_count],
            departure_rates: vec![departure_rate; stop_count],
        }
    }

    /// Reference initial conditions drawn from `rng`.
    ///
    /// Arrival rates are uniform within the demand bounds (converted to
    /// per-second).  Departure rates are uniform in `[0.05, 0.5]` and sorted
    /// ascending, so the share of passengers alighting grows toward the
    /// terminal.
    pub fn sampled(params: &ModelParams, traffic_speed: f64, rng: &mut SimRng) -> Self {
        let n = params.stop_count;
        let (low, high) = (params.min_demand / 60.0, params.max_demand / 60.0);
        let arrival_rates = (0..n).map(|_| rng.uniform(low, high)).collect();
        let mut departure_rates: Vec<f64> = (0..n).map(|_| rng.uniform(0.05, 0.5)).collect();
        departure_rates.sort_by(f64::total_cmp);
        Self { traffic_speed, arrival_rates, departure_rates }
    }

    /// Check vector lengths against `params.stop_count` and rate ranges.
    pub fn validate(&self, params: &ModelParams) -> BsResult<()> {
        require_positive("traffic_speed", self.traffic_speed)?;
        for (what, v) in [("arrival_rates", &self.arrival_rates), ("departure_rates", &self.departure_rates)] {
            if v.len() != params.stop_count {
                return Err(BsError::Config(format!(
                    "{what} has {} entries but stop_count is {}",
                    v.len(),
                    params.stop_count
                )));
            }
            if let Some(bad) = v.iter().find(|r| !r.is_finite()) {
                return Err(BsError::Config(format!("{what} contains non-finite value {bad}")));
            }
        }
        Ok(())
    }
}
