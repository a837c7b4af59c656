//! `bs-core` — foundational types for the `bussim` corridor simulator.
//!
//! This crate is a dependency of every other `bs-*` crate.  It has no `bs-*`
//! dependencies and minimal external ones (`rand`, `rand_distr` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `BusId`, `StopId`                                     |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`params`]      | `ModelParams`, `InitialConditions`                    |
//! | [`rng`]         | `BusRng` (per-bus), `SimRng` (model-level)            |
//! | [`error`]       | `BsError`, `BsResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, time and params.    |

pub mod error;
pub mod ids;
pub mod params;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{BsError, BsResult};
pub use ids::{BusId, StopId};
pub use params::{InitialConditions, ModelParams};
pub use rng::{BusRng, SimRng};
pub use time::{SimClock, SimConfig, Tick};
