//! Model observer trait for progress reporting and data collection.

use bs_agent::{Bus, Corridor};
use bs_core::Tick;

use crate::TickSummary;

/// Read-only view of the model after a tick.
///
/// Output writers record what they need from here without the model knowing
/// about any specific output format.
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    pub tick:          Tick,
    pub time_secs:     f64,
    pub traffic_speed: f64,
    pub buses:         &'a [Bus],
    pub corridor:      &'a Corridor,
}

/// Callbacks invoked by [`Model::run`][crate::Model::run] at key points in
/// the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl ModelObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, summary: &TickSummary) {
///         if summary.tick.0 % self.interval == 0 {
///             println!("{}: {} buses on the road", summary.tick, summary.on_road());
///         }
///     }
/// }
/// ```
pub trait ModelObserver {
    /// Called before the tick that will produce `tick`.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after every tick.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called after ticks that are a multiple of `config.output_interval_ticks`.
    fn on_snapshot(&mut self, _snapshot: &Snapshot<'_>) {}

    /// Called once after the final tick of [`Model::run`][crate::Model::run].
    fn on_sim_end(&mut self, _final_state: &Snapshot<'_>) {}
}

/// A [`ModelObserver`] that does nothing.
pub struct NoopObserver;

impl ModelObserver for NoopObserver {}
