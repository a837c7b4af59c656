//! Corridor-wide, time-varying conditions.

use bs_core::{InitialConditions, ModelParams, SimRng};

/// Traffic speed and per-stop boarding demand, recomputed once per tick.
///
/// Both follow the same linear trend factor
///
///   f(t) = t / ((100 / increase_rate) * end_time)
///
/// so speed falls to `initial * (1 - increase_rate / 100)` and demand bounds
/// rise by `increase_rate` percent at the horizon.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Free-flow speed at t = 0 (m/s).
    pub initial_traffic_speed: f64,
    /// Current corridor speed cap (m/s).
    pub traffic_speed: f64,
    /// Latest per-stop arrival-rate draw (passengers per second).
    pub arrival_rates: Vec<f64>,

    /// Demand bounds in passengers per minute.
    min_demand: f64,
    max_demand: f64,
    /// `None` disables the trend.
    trend_horizon: Option<f64>,
}

impl Environment {
    pub fn new(params: &ModelParams, initial: &InitialConditions) -> Self {
        Self {
            initial_traffic_speed: initial.traffic_speed,
            traffic_speed:         initial.traffic_speed,
            arrival_rates:         initial.arrival_rates.clone(),
            min_demand:            params.min_demand,
            max_demand:            params.max_demand,
            trend_horizon:         params.trend_horizon(),
        }
    }

    /// Trend factor at time `now` (0 at t = 0).
    #[inline]
    pub fn trend_factor(&self, now: f64) -> f64 {
        self.trend_horizon.map_or(0.0, |h| now / h)
    }

    /// Current per-second boarding-rate bounds at time `now`.
    pub fn demand_bounds(&self, now: f64) -> (f64, f64) {
        let growth = 1.0 + self.trend_factor(now);
        (self.min_demand * growth / 60.0, self.max_demand * growth / 60.0)
    }

    /// Recompute speed and redraw every stop's arrival rate for time `now`.
    ///
    /// Speed never drops below zero, even when the trend overshoots.
    pub fn update(&mut self, now: f64, rng: &mut SimRng) {
        let f = self.trend_factor(now);
        self.traffic_speed = (self.initial_traffic_speed * (1.0 - f)).max(0.0);

        let (low, high) = self.demand_bounds(now);
        for rate in &mut self.arrival_rates {
            *rate = rng.uniform(low, high);
        }
    }
}
