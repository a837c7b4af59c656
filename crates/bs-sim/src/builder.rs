//! Fluent builder for constructing a [`Model`].

use bs_agent::{Corridor, FleetBuilder};
use bs_core::{InitialConditions, ModelParams, SimClock, SimConfig, SimRng};

use crate::{Environment, Model, SimResult};

/// Fluent builder for [`Model`].
///
/// # Required inputs
///
/// - [`ModelParams`] — corridor, fleet, dwell and demand parameters
/// - [`InitialConditions`] — initial traffic speed and per-stop rates
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                     |
/// |-----------------------|-----------------------------|
/// | `.config(c)`          | `SimConfig::default()`      |
/// | `.seed(s)`            | 42                          |
/// | `.output_interval(n)` | 1 (snapshot every tick)     |
///
/// # Example
///
/// ```rust,ignore
/// let mut model = ModelBuilder::new(ModelParams::default(), initial)
///     .seed(7)
///     .output_interval(6)
///     .build()?;
/// model.run(&mut NoopObserver);
/// ```
pub struct ModelBuilder {
    params:  ModelParams,
    initial: InitialConditions,
    config:  SimConfig,
}

impl ModelBuilder {
    pub fn new(params: ModelParams, initial: InitialConditions) -> Self {
        Self {
            params,
            initial,
            config: SimConfig::default(),
        }
    }

    /// Replace the whole run configuration.
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Snapshot every `ticks` ticks; 0 disables snapshots.
    pub fn output_interval(mut self, ticks: u64) -> Self {
        self.config.output_interval_ticks = ticks;
        self
    }

    /// Validate inputs, lay out the corridor and fleet, and return a
    /// ready-to-run [`Model`] at tick 0.
    pub fn build(self) -> SimResult<Model> {
        let Self { params, initial, config } = self;

        // ── Validate ──────────────────────────────────────────────────────
        params.validate()?;
        initial.validate(&params)?;

        // ── Build components ──────────────────────────────────────────────
        let corridor = Corridor::new(&params, &initial);
        let (mut buses, rngs) = FleetBuilder::from_params(&params, &initial, config.seed).build();
        let horizon = params.total_ticks() as usize;
        for bus in &mut buses {
            bus.reserve_history(horizon);
        }
        let environment = Environment::new(&params, &initial);

        // Bus 0's RNG is seeded with the bare global seed, so the
        // environment stream is derived one level down.
        let env_rng = SimRng::new(config.seed).child(0);

        Ok(Model {
            clock:    SimClock::new(params.dt),
            geofence: params.geofence(initial.traffic_speed),
            params,
            config,
            environment,
            corridor,
            buses,
            rngs,
            env_rng,
        })
    }
}
