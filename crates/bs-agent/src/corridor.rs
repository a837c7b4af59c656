//! The ordered list of stops along the corridor.
//!
//! # Boundary rules
//!
//! | Stop            | arrival_rate | departure_rate |
//! |-----------------|--------------|----------------|
//! | first (0)       | 0            | 0              |
//! | second (1)      | as given     | 0              |
//! | last (N-1)      | 0            | 1              |
//!
//! Nobody boards at the origin or terminal, nobody alights at the first two
//! stops, and everyone alights at the terminal.  Every setter re-applies
//! these rules, so they hold after construction, after each environment
//! redraw, and after a state restore.  With a single stop the terminal rule
//! wins: departure rate 1.

use bs_core::{BsError, BsResult, InitialConditions, ModelParams, StopId};

use crate::BusStop;

/// Stops in ascending position order; `stops[i].id == StopId(i)`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Corridor {
    stops:   Vec<BusStop>,
    /// A moving bus past this distance is finished.
    length:  f64,
}

impl Corridor {
    /// Lay out `params.stop_count` stops `stop_spacing` apart, starting at 0.
    ///
    /// Stop `i` activates at `i * trunc(spacing / initial_speed) - lead`, so
    /// demand switches on progressively down the corridor at roughly the pace
    /// of the first bus.
    pub fn new(params: &ModelParams, initial: &InitialConditions) -> Self {
        let travel_per_stop = (params.stop_spacing / initial.traffic_speed).trunc();
        let stops = (0..params.stop_count)
            .map(|i| {
                BusStop::new(
                    StopId(i as u32),
                    i as f64 * params.stop_spacing,
                    initial.arrival_rates[i],
                    initial.departure_rates[i],
                    i as f64 * travel_per_stop - params.activation_lead,
                )
            })
            .collect();

        let mut corridor = Self {
            stops,
            length: params.corridor_length(),
        };
        corridor.apply_boundary_rules();
        corridor
    }

    fn apply_boundary_rules(&mut self) {
        let n = self.stops.len();
        if n == 0 {
            return;
        }
        self.stops[0].arrival_rate = 0.0;
        self.stops[n - 1].arrival_rate = 0.0;
        for stop in self.stops.iter_mut().take(2) {
            stop.departure_rate = 0.0;
        }
        self.stops[n - 1].departure_rate = 1.0;
    }

    #[inline]
    pub fn stops(&self) -> &[BusStop] {
        &self.stops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Distance past which a moving bus is finished.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn stop(&self, id: StopId) -> BsResult<&BusStop> {
        self.stops.get(id.index()).ok_or(BsError::StopNotFound(id))
    }

    /// The stop closest to `position` and its absolute distance.
    ///
    /// Ties go to the lowest id.  `None` only for an empty corridor.
    pub fn nearest_stop(&self, position: f64) -> Option<(StopId, f64)> {
        let mut best: Option<(StopId, f64)> = None;
        for stop in &self.stops {
            let d = (stop.position - position).abs();
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((stop.id, d)),
            }
        }
        best
    }

    /// The nearest stop if it lies within `geofence` of `position`.
    pub fn stop_within(&self, position: f64, geofence: f64) -> Option<StopId> {
        self.nearest_stop(position)
            .filter(|&(_, d)| d <= geofence)
            .map(|(id, _)| id)
    }

    /// Overwrite every stop's arrival rate from `rates` (indexed by stop),
    /// then re-apply the boundary rules.  Extra or missing entries are ignored.
    pub fn set_arrival_rates(&mut self, rates: &[f64]) {
        for (stop, &rate) in self.stops.iter_mut().zip(rates) {
            stop.arrival_rate = rate;
        }
        self.apply_boundary_rules();
    }

    /// Overwrite one stop's rates, then re-apply the boundary rules.
    pub fn set_rates(&mut self, id: StopId, arrival_rate: f64, departure_rate: f64) -> BsResult<()> {
        let stop = self.stops.get_mut(id.index()).ok_or(BsError::StopNotFound(id))?;
        stop.arrival_rate = arrival_rate;
        stop.departure_rate = departure_rate;
        self.apply_boundary_rules();
        Ok(())
    }

    /// Record a bus visit at stop `id` at time `now`.
    pub fn record_visit(&mut self, id: StopId, now: f64) -> BsResult<()> {
        let stop = self.stops.get_mut(id.index()).ok_or(BsError::StopNotFound(id))?;
        stop.record_visit(now);
        Ok(())
    }
}
