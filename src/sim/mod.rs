//! Deterministic round logic
//!
//! All gameplay lives here. This module must be pure and deterministic:
//! - Fixed frame cadence only
//! - Seeded RNG only
//! - No rendering or platform dependencies beyond the `Scene` trait object
//!   the host passes in

pub mod state;
pub mod tick;

pub use state::{
    day_or_night, Bridge, CarryOver, Platform, Player, RoundState, Stage, TimeOfDay,
};
pub use tick::{
    bridge_length, generate_next, pointer_up, start_round, success, tick, toggle_menu,
    toggle_music, TickInput,
};
