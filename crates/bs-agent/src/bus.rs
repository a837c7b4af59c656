//! Bus kinematics, lifecycle status and per-tick history.

use std::fmt;

use bs_core::{BusId, StopId};

/// Lifecycle of a bus.
///
/// ```text
/// Inactive ──dispatch──▶ Moving ◀──leave──▶ Dwelling
///                          │
///                          └──past corridor end──▶ Finished
/// ```
///
/// The discriminants are the numeric codes used in state vectors and output
/// tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BusStatus {
    #[default]
    Inactive = 0,
    Moving   = 1,
    Dwelling = 2,
    Finished = 3,
}

impl BusStatus {
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Inactive),
            1 => Some(Self::Moving),
            2 => Some(Self::Dwelling),
            3 => Some(Self::Finished),
            _ => None,
        }
    }

    /// Dispatched and not yet finished.
    #[inline]
    pub fn on_road(self) -> bool {
        matches!(self, Self::Moving | Self::Dwelling)
    }
}

impl fmt::Display for BusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Inactive => "inactive",
            Self::Moving   => "moving",
            Self::Dwelling => "dwelling",
            Self::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// One tick of observable bus state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroundTruth {
    pub status:    BusStatus,
    pub position:  f64,
    pub velocity:  f64,
    pub occupancy: u32,
}

/// A bus on the corridor.
///
/// `trajectory` and `ground_truth` get exactly one entry per tick from
/// [`record_tick`](Bus::record_tick), including ticks before dispatch and
/// after finishing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bus {
    pub id: BusId,
    pub status: BusStatus,

    /// Distance from the origin (m).  Negative before dispatch.
    pub position: f64,
    /// Current speed (m/s), never above the traffic speed it was capped by.
    pub velocity: f64,
    /// Constant acceleration (m/s²).
    pub acceleration: f64,

    pub occupancy: u32,
    pub capacity:  u32,

    /// Scheduled dispatch time (s).
    pub dispatch_time: f64,
    /// End of the current dwell (s).  `Some` only while dwelling.
    pub leave_stop_time: Option<f64>,
    /// Most recently serviced stop; suppresses re-servicing it while the bus
    /// is still inside its geofence.
    pub last_visited_stop: Option<StopId>,

    pub trajectory:   Vec<f64>,
    pub ground_truth: Vec<GroundTruth>,
}

impl Bus {
    pub fn new(
        id:            BusId,
        dispatch_time: f64,
        position:      f64,
        acceleration:  f64,
        capacity:      u32,
    ) -> Self {
        Self {
            id,
            status: BusStatus::Inactive,
            position,
            velocity: 0.0,
            acceleration,
            occupancy: 0,
            capacity,
            dispatch_time,
            leave_stop_time: None,
            last_visited_stop: None,
            trajectory: Vec::new(),
            ground_truth: Vec::new(),
        }
    }

    /// Raise velocity by one acceleration step, capped at `speed_cap`.
    #[inline]
    pub fn accelerate(&mut self, dt: f64, speed_cap: f64) {
        self.velocity = speed_cap.min(self.velocity + self.acceleration * dt);
    }

    /// Accelerate, then move `velocity * dt` along the corridor.
    #[inline]
    pub fn advance_motion(&mut self, dt: f64, speed_cap: f64) {
        self.accelerate(dt, speed_cap);
        self.position += self.velocity * dt;
    }

    /// Seats left.
    #[inline]
    pub fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }

    /// Current observable state.
    #[inline]
    pub fn state(&self) -> GroundTruth {
        GroundTruth {
            status:    self.status,
            position:  self.position,
            velocity:  self.velocity,
            occupancy: self.occupancy,
        }
    }

    /// Append the current state to `ground_truth` and the position to
    /// `trajectory`.  Call exactly once per tick.
    pub fn record_tick(&mut self) {
        self.ground_truth.push(self.state());
        self.trajectory.push(self.position);
    }

    /// Reserve room for `ticks` more history rows.
    pub fn reserve_history(&mut self, ticks: usize) {
        self.trajectory.reserve(ticks);
        self.ground_truth.reserve(ticks);
    }

    /// Number of ticks recorded so far.
    #[inline]
    pub fn ticks_recorded(&self) -> usize {
        self.trajectory.len()
    }
}
