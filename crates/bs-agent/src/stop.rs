//! A single stop on the corridor.

use bs_core::StopId;

/// Passive record of a stop's location, demand rates and visit history.
///
/// Only the model mutates a stop, and only through [`record_visit`] and the
/// rate setters on [`Corridor`][crate::Corridor] (which enforce the boundary
/// rules).
///
/// [`record_visit`]: BusStop::record_visit
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusStop {
    pub id: StopId,

    /// Distance from the origin (m).
    pub position: f64,

    /// Passengers per second wishing to board.
    pub arrival_rate: f64,

    /// Fraction of onboard passengers who alight here.
    pub departure_rate: f64,

    /// Earliest time a first visit may pick up passengers (s).
    pub activation_time: f64,

    /// Times at which any bus was serviced here, in visit order.
    pub arrival_times: Vec<f64>,

    /// Gaps between consecutive entries of `arrival_times`.
    pub headways: Vec<f64>,
}

impl BusStop {
    pub fn new(
        id:              StopId,
        position:        f64,
        arrival_rate:    f64,
        departure_rate:  f64,
        activation_time: f64,
    ) -> Self {
        Self {
            id,
            position,
            arrival_rate,
            departure_rate,
            activation_time,
            arrival_times: Vec::new(),
            headways:      Vec::new(),
        }
    }

    /// Append a visit at `time`; also append the headway to the previous
    /// visit if there is one.
    pub fn record_visit(&mut self, time: f64) {
        if let Some(&previous) = self.arrival_times.last() {
            self.headways.push(time - previous);
        }
        self.arrival_times.push(time);
    }

    /// Time of the most recent visit, `None` before the first.
    #[inline]
    pub fn last_arrival(&self) -> Option<f64> {
        self.arrival_times.last().copied()
    }

    #[inline]
    pub fn visit_count(&self) -> usize {
        self.arrival_times.len()
    }

    /// `true` once demand may be realised on a first visit.
    #[inline]
    pub fn is_active(&self, now: f64) -> bool {
        self.activation_time <= now
    }
}
