//! `bs-agent` — the two agent kinds of the corridor simulator.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`stop`]      | `BusStop` — location, demand rates, visit history               |
//! | [`corridor`]  | `Corridor` — ordered stops, boundary rules, nearest-stop lookup |
//! | [`bus`]       | `Bus`, `BusStatus`, `GroundTruth` — kinematics and history      |
//! | [`fleet`]     | `FleetBuilder`, `BusRngs` — staggered fleet construction        |
//!
//! Agents here are passive: they expose state and small mutators
//! (`advance_motion`, `record_tick`, `record_visit`).  Every state-machine
//! transition is driven by `bs-sim`.

pub mod bus;
pub mod corridor;
pub mod fleet;
pub mod stop;


pub use bus::{Bus, BusStatus, GroundTruth};
pub use corridor::Corridor;
pub use fleet::{BusRngs, FleetBuilder};
pub use stop::BusStop;
