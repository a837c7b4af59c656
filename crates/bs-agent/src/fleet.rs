//! Fluent builder for the bus fleet and its per-bus RNGs.
//!
//! # Usage
//!
//! ```rust
//! use bs_agent::{BusStatus, FleetBuilder};
//!
//! let (buses, rngs) = FleetBuilder::new(4, /*seed=*/ 42)
//!     .headway(300.0)
//!     .start_position(-140.0)
//!     .build();
//!
//! assert_eq!(buses.len(), 4);
//! assert_eq!(rngs.len(),  4);
//! assert_eq!(buses[3].dispatch_time, 900.0);
//! assert!(buses.iter().all(|b| b.status == BusStatus::Inactive));
//! ```

use bs_core::{BusId, BusRng, InitialConditions, ModelParams};

use crate::Bus;

// ── BusRngs ───────────────────────────────────────────────────────────────────

/// Per-bus deterministic RNG state, kept apart from the `Bus` structs so the
/// model can hold `&mut BusRngs` and `&mut [Bus]` at the same time.
pub struct BusRngs {
    pub inner: Vec<BusRng>,
}

impl BusRngs {
    /// Allocate and seed `count` per-bus RNGs from `global_seed`.
    pub(crate) fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|i| BusRng::new(global_seed, BusId(i)))
            .collect();
        Self { inner }
    }

    /// Mutable reference to one bus's RNG.
    #[inline]
    pub fn get_mut(&mut self, bus: BusId) -> &mut BusRng {
        &mut self.inner[bus.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── FleetBuilder ──────────────────────────────────────────────────────────────

/// Fluent builder for a staggered fleet.
///
/// Bus `i` is dispatched at `i * headway`.  Every bus starts inactive at
/// `start_position` with zero velocity and occupancy.
pub struct FleetBuilder {
    count:          usize,
    seed:           u64,
    headway:        f64,
    start_position: f64,
    acceleration:   f64,
    capacity:       u32,
}

impl FleetBuilder {
    /// Create a builder for `count` buses using `seed` as the global RNG seed.
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            count,
            seed,
            headway:        0.0,
            start_position: 0.0,
            acceleration:   0.0,
            capacity:       100,
        }
    }

    /// Builder pre-filled from model parameters: `fleet_size()` buses,
    /// starting one tick of free-flow travel behind the first stop.
    pub fn from_params(params: &ModelParams, initial: &InitialConditions, seed: u64) -> Self {
        Self::new(params.fleet_size(), seed)
            .headway(params.headway)
            .start_position(-initial.traffic_speed * params.dt)
            .acceleration(params.acceleration())
            .capacity(params.bus_capacity)
    }

    pub fn headway(mut self, headway: f64) -> Self {
        self.headway = headway;
        self
    }

    pub fn start_position(mut self, position: f64) -> Self {
        self.start_position = position;
        self
    }

    pub fn acceleration(mut self, acceleration: f64) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Construct the buses (in id order) and their RNGs.
    pub fn build(self) -> (Vec<Bus>, BusRngs) {
        let buses = (0..self.count)
            .map(|i| {
                Bus::new(
                    BusId(i as u32),
                    i as f64 * self.headway,
                    self.start_position,
                    self.acceleration,
                    self.capacity,
                )
            })
            .collect();
        let rngs = BusRngs::new(self.count, self.seed);
        (buses, rngs)
    }
}
