//! The `Model` struct and its tick loop.

use log::{debug, info, trace, warn};

use bs_agent::{Bus, BusRngs, BusStatus, Corridor};
use bs_core::{BsError, BusId, BusRng, ModelParams, SimClock, SimConfig, SimRng, StopId, Tick};

use crate::{Environment, ModelObserver, SimError, SimResult, Snapshot};

// ── TickSummary ───────────────────────────────────────────────────────────────

/// Aggregate outcome of one tick, handed to
/// [`ModelObserver::on_tick_end`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickSummary {
    /// The tick that was just produced (1 for the first step).
    pub tick:          Tick,
    /// Clock time after the advance.
    pub time_secs:     f64,
    /// Speed cap in force during the tick.
    pub traffic_speed: f64,

    /// Bus counts by status at the end of the tick.
    pub inactive: usize,
    pub moving:   usize,
    pub dwelling: usize,
    pub finished: usize,

    pub boardings:   u64,
    pub alightings:  u64,
    /// Stop services performed, whether or not anyone boarded or alighted.
    pub stop_visits: usize,
}

impl TickSummary {
    fn new(tick: Tick, time_secs: f64, traffic_speed: f64) -> Self {
        Self { tick, time_secs, traffic_speed, ..Self::default() }
    }

    fn count(&mut self, status: BusStatus) {
        match status {
            BusStatus::Inactive => self.inactive += 1,
            BusStatus::Moving   => self.moving += 1,
            BusStatus::Dwelling => self.dwelling += 1,
            BusStatus::Finished => self.finished += 1,
        }
    }

    /// Buses dispatched and not yet finished.
    #[inline]
    pub fn on_road(&self) -> usize {
        self.moving + self.dwelling
    }
}

// ── Per-tick inputs shared by every bus ──────────────────────────────────────

struct TickContext<'a> {
    params:    &'a ModelParams,
    now:       f64,
    speed_cap: f64,
    geofence:  f64,
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// The corridor simulation.
///
/// Holds all mutable state and drives the tick loop described in the crate
/// docs.  Create via [`ModelBuilder`][crate::ModelBuilder].
pub struct Model {
    /// Static parameters the model was built from.
    pub params: ModelParams,

    /// Run-level configuration (seed, snapshot interval).
    pub config: SimConfig,

    /// Current tick; simulated time is always `tick * dt`.
    pub clock: SimClock,

    /// Traffic speed and the latest demand draw.
    pub environment: Environment,

    /// Stops in corridor order.
    pub corridor: Corridor,

    /// Fleet in ascending `BusId` order.
    pub buses: Vec<Bus>,

    /// Per-bus boarding RNGs, split from `buses` for disjoint borrows.
    pub rngs: BusRngs,

    pub(crate) env_rng:  SimRng,
    pub(crate) geofence: f64,
}

impl Model {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run until the clock reaches `params.end_time`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: ModelObserver>(&mut self, observer: &mut O) {
        info!(
            "running {} buses over {} stops to t = {} s (seed {})",
            self.buses.len(),
            self.corridor.len(),
            self.params.end_time,
            self.config.seed,
        );
        while !self.is_done() {
            self.observed_step(observer);
        }
        observer.on_sim_end(&self.snapshot());

        let finished = self.buses.iter().filter(|b| b.status == BusStatus::Finished).count();
        info!(
            "run complete at {}: {finished}/{} buses finished",
            self.clock,
            self.buses.len(),
        );
    }

    /// Run exactly `n` ticks from the current position (ignores `end_time`).
    ///
    /// Useful for tests and incremental stepping.  `on_sim_end` is not called.
    pub fn run_ticks<O: ModelObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.observed_step(observer);
        }
    }

    /// `true` once the clock has reached `end_time`.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.clock.reached(self.params.end_time)
    }

    /// Stop-arrival radius: `dt * initial_traffic_speed + 5`.
    #[inline]
    pub fn geofence(&self) -> f64 {
        self.geofence
    }

    /// Ticks simulated so far; also the length of every bus history.
    #[inline]
    pub fn ticks_simulated(&self) -> u64 {
        self.clock.current_tick.0
    }

    pub fn bus(&self, id: BusId) -> SimResult<&Bus> {
        self.buses
            .get(id.index())
            .ok_or(SimError::Core(BsError::BusNotFound(id)))
    }

    /// Borrowed view of the current state.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            tick:          self.clock.current_tick,
            time_secs:     self.clock.now_secs(),
            traffic_speed: self.environment.traffic_speed,
            buses:         &self.buses,
            corridor:      &self.corridor,
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    /// Advance the model by exactly one tick.
    pub fn step(&mut self) -> TickSummary {
        // ── Phase 1: environment at the pre-advance time ──────────────────
        let before = self.clock.now_secs();
        self.environment.update(before, &mut self.env_rng);
        self.corridor.set_arrival_rates(&self.environment.arrival_rates);

        // ── Phase 2: clock ────────────────────────────────────────────────
        self.clock.advance();
        let now = self.clock.now_secs();

        let ctx = TickContext {
            params:    &self.params,
            now,
            speed_cap: self.environment.traffic_speed,
            geofence:  self.geofence,
        };
        let mut summary = TickSummary::new(self.clock.current_tick, now, ctx.speed_cap);

        // ── Phase 3: buses, ascending id ──────────────────────────────────
        for bus in &mut self.buses {
            let rng = self.rngs.get_mut(bus.id);
            step_bus(bus, rng, &mut self.corridor, &ctx, &mut summary);
        }

        // ── Phase 4: record ───────────────────────────────────────────────
        for bus in &mut self.buses {
            bus.record_tick();
            summary.count(bus.status);
        }

        summary
    }

    fn observed_step<O: ModelObserver>(&mut self, observer: &mut O) {
        observer.on_tick_start(self.clock.current_tick + 1);
        let summary = self.step();
        observer.on_tick_end(&summary);
        if self.config.snapshot_due(summary.tick) {
            observer.on_snapshot(&self.snapshot());
        }
    }
}

// ── Bus state machine ─────────────────────────────────────────────────────────

/// Cascade one bus through Inactive → Moving → Dwelling.
///
/// Each check sees the status left by the previous one, so a bus can be
/// dispatched and move in the same tick, or reach a stop, dwell and leave
/// within one tick when the dwell is shorter than `dt`.
fn step_bus(
    bus:      &mut Bus,
    rng:      &mut BusRng,
    corridor: &mut Corridor,
    ctx:      &TickContext<'_>,
    summary:  &mut TickSummary,
) {
    let dt = ctx.params.dt;

    if bus.status == BusStatus::Inactive && ctx.now >= bus.dispatch_time - dt {
        bus.status = BusStatus::Moving;
        bus.accelerate(dt, ctx.speed_cap);
        debug!("{} dispatched at t = {}", bus.id, ctx.now);
    }

    if bus.status == BusStatus::Moving {
        bus.advance_motion(dt, ctx.speed_cap);
        if bus.position > corridor.length() {
            bus.status = BusStatus::Finished;
            bus.velocity = 0.0;
            debug!("{} finished at t = {} carrying {}", bus.id, ctx.now, bus.occupancy);
        } else if let Some(stop) = corridor.stop_within(bus.position, ctx.geofence) {
            if bus.last_visited_stop != Some(stop) {
                serve_stop(bus, rng, corridor, stop, ctx, summary);
            }
        }
    }

    // A dwell without an end time (possible after a restore) ends at once.
    if bus.status == BusStatus::Dwelling
        && bus.leave_stop_time.is_none_or(|leave| ctx.now >= leave - dt)
    {
        bus.status = BusStatus::Moving;
        bus.leave_stop_time = None;
        bus.accelerate(dt, ctx.speed_cap);
        debug!("{} left {:?} at t = {}", bus.id, bus.last_visited_stop, ctx.now);
    }
}

/// Board and alight passengers at a newly reached stop.
fn serve_stop(
    bus:      &mut Bus,
    rng:      &mut BusRng,
    corridor: &mut Corridor,
    stop_id:  StopId,
    ctx:      &TickContext<'_>,
    summary:  &mut TickSummary,
) {
    let now = ctx.now;
    let stop = &corridor.stops()[stop_id.index()];
    let rate = stop.arrival_rate.max(0.0);

    // First-ever visit: a full headway of waiting passengers, but only once
    // the stop is active.  Later visits: everyone since the previous bus.
    let demand = match stop.last_arrival() {
        None if stop.is_active(now) => rng.poisson(rate * ctx.params.headway),
        None => 0,
        Some(previous) => rng.poisson(rate * (now - previous)),
    };
    let boarding = demand.min(bus.remaining_capacity());
    let alighting = ((bus.occupancy as f64 * stop.departure_rate).floor() as u32).min(bus.occupancy);

    trace!(
        "{} at {} t = {}: demand {demand}, boarding {boarding}, alighting {alighting}",
        bus.id, stop_id, now,
    );

    if boarding + alighting > 0 {
        let p = ctx.params;
        let dwell = boarding as f64 * p.board_time
            + alighting as f64 * p.alight_time
            + p.stopping_time;
        bus.status = BusStatus::Dwelling;
        bus.velocity = 0.0;
        bus.leave_stop_time = Some(now + dwell);
        bus.occupancy = (bus.occupancy - alighting + boarding).min(bus.capacity);
        debug!("{} dwelling at {} until t = {}", bus.id, stop_id, now + dwell);
    }

    if let Err(e) = corridor.record_visit(stop_id, now) {
        warn!("{} visit not recorded: {e}", bus.id);
    }
    bus.last_visited_stop = Some(stop_id);

    summary.boardings += u64::from(boarding);
    summary.alightings += u64::from(alighting);
    summary.stop_visits += 1;
}
