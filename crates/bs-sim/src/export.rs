//! Dense matrices built from the recorded bus histories.
//!
//! Rows are ticks (1..=ticks simulated), columns are buses in id order.
//! Negative entries (buses still waiting behind the first stop) are clamped
//! to 0 so the matrices read as "distance covered so far".

use crate::Model;

impl Model {
    /// Position of every bus at every recorded tick: `ticks × buses`.
    pub fn gps_matrix(&self) -> Vec<Vec<f64>> {
        let ticks = self.recorded_ticks();
        (0..ticks)
            .map(|t| {
                self.buses
                    .iter()
                    .map(|bus| bus.trajectory[t].max(0.0))
                    .collect()
            })
            .collect()
    }

    /// Full ground truth at every recorded tick: `ticks × 4·buses`, with
    /// each bus contributing `[status, position, velocity, occupancy]`.
    pub fn ground_truth_matrix(&self) -> Vec<Vec<f64>> {
        let ticks = self.recorded_ticks();
        (0..ticks)
            .map(|t| {
                self.buses
                    .iter()
                    .flat_map(|bus| {
                        let g = bus.ground_truth[t];
                        [
                            f64::from(g.status.code()),
                            g.position.max(0.0),
                            g.velocity.max(0.0),
                            f64::from(g.occupancy),
                        ]
                    })
                    .collect()
            })
            .collect()
    }

    /// Visit times at every stop, in stop order.
    pub fn stop_arrivals(&self) -> Vec<Vec<f64>> {
        self.corridor
            .stops()
            .iter()
            .map(|stop| stop.arrival_times.clone())
            .collect()
    }

    /// Headways at every stop, in stop order.
    pub fn stop_headways(&self) -> Vec<Vec<f64>> {
        self.corridor
            .stops()
            .iter()
            .map(|stop| stop.headways.clone())
            .collect()
    }

    /// Every bus records once per tick, so all histories share one length.
    fn recorded_ticks(&self) -> usize {
        self.buses
            .iter()
            .map(|bus| bus.ticks_recorded())
            .min()
            .unwrap_or(0)
    }
}
