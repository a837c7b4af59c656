//! `bs-sim` — tick engine for the bussim corridor simulator.
//!
//! # Tick loop
//!
//! ```text
//! for each tick until clock >= end_time:
//!   ① Environment — traffic speed decays with the trend factor; per-stop
//!                   arrival rates are redrawn and written into the stops.
//!   ② Clock       — advance by dt.
//!   ③ Buses       — in ascending BusId order, cascade through
//!                     Inactive  → dispatch when clock >= dispatch_time - dt
//!                     Moving    → accelerate + move; finish past the corridor
//!                                 end, or serve a newly reached stop
//!                     Dwelling  → leave when clock >= leave_stop_time - dt
//!   ④ Record      — every bus appends to its trajectory and ground truth.
//! ```
//!
//! Buses interact only through the shared environment and stop histories,
//! never with each other.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs [`replicate`] on Rayon's thread pool.             |
//! | `serde`    | Serde derives on params, ids, buses and stops.         |
//!
//! # Quick-start
//!
//! ```rust
//! use bs_core::{InitialConditions, ModelParams};
//! use bs_sim::{ModelBuilder, NoopObserver};
//!
//! let params  = ModelParams { stop_count: 5, end_time: 900.0, ..ModelParams::default() };
//! let initial = InitialConditions::uniform(5, 14.0, 0.01, 0.2);
//! let mut model = ModelBuilder::new(params, initial).seed(7).build()?;
//! model.run(&mut NoopObserver);
//! assert_eq!(model.clock.now_secs(), 900.0);
//! # Ok::<(), bs_sim::SimError>(())
//! ```

pub mod builder;
pub mod environment;
pub mod error;
pub mod export;
pub mod model;
pub mod observer;
pub mod replicate;
pub mod state;

#[cfg(test)]
mod tests;

pub use builder::ModelBuilder;
pub use environment::Environment;
pub use error::{SimError, SimResult};
pub use model::{Model, TickSummary};
pub use observer::{ModelObserver, NoopObserver, Snapshot};
pub use replicate::{replicate, ReplicationSummary};
