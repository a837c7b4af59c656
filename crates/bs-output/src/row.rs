//! Plain data row types written by output backends.

/// One bus's ground truth at a given tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusSnapshotRow {
    pub bus_id:    u32,
    pub tick:      u64,
    pub time_secs: f64,
    /// Numeric `BusStatus` code (0 inactive, 1 moving, 2 dwelling, 3 finished).
    pub status:    u8,
    pub position:  f64,
    pub velocity:  f64,
    pub occupancy: u32,
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:          u64,
    pub time_secs:     f64,
    pub traffic_speed: f64,
    pub inactive:      u32,
    pub moving:        u32,
    pub dwelling:      u32,
    pub finished:      u32,
    pub boardings:     u64,
    pub alightings:    u64,
    pub stop_visits:   u32,
}

/// One bus visit at a stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopVisitRow {
    pub stop_id:      u32,
    /// 0-based visit index at this stop.
    pub visit:        u32,
    pub time_secs:    f64,
    /// Gap to the previous visit; `None` for the first.
    pub headway_secs: Option<f64>,
}
