//! Plankfall - a bridge-timing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic round logic (bridge growth, crossings, day/night)
//! - `scene`: Capability contract the hosting engine implements
//! - `scores`: Session leaderboard

pub mod scene;
pub mod scores;
pub mod sim;

pub use scores::ScoreBoard;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical canvas size
    pub const WORLD_WIDTH: f32 = 400.0;
    pub const WORLD_HEIGHT: f32 = 640.0;

    /// Platform band height along the bottom of the screen
    pub const PLATFORM_HEIGHT: f32 = 80.0;
    /// Width of the fixed home ledge
    pub const PLATFORM_MIN_WIDTH: f32 = 64.0;

    /// Player sprite size
    pub const PLAYER_WIDTH: f32 = 12.0;
    pub const PLAYER_HEIGHT: f32 = 32.0;

    /// Bridge growth rate (pixels per millisecond of pointer hold)
    pub const BRIDGE_SPEED: f32 = 0.2;
    /// Plank thickness
    pub const BRIDGE_THICKNESS: f32 = 5.0;

    /// Crossings per daylight phase before dusk
    pub const DAY_DURATION: u32 = 7;
    /// Crossings per night phase before dawn
    pub const NIGHT_DURATION: u32 = 4;

    /// Animation durations (milliseconds)
    pub const BRIDGE_DROP_MS: f32 = 300.0;
    pub const PLAYER_WALK_MS: f32 = 800.0;
    pub const RETURN_HOME_MS: f32 = 400.0;
    pub const PLAYER_FALL_MS: f32 = 500.0;

    /// Granularity of the periodic control-unlock timer
    pub const CONTROL_UNLOCK_MS: f32 = 1000.0;

    /// Crossed platforms park with their right edge here before despawning
    pub const SLIDE_ANCHOR_X: f32 = 62.0;
}

/// Top surface of the platform band
#[inline]
pub fn platform_top() -> f32 {
    consts::WORLD_HEIGHT - consts::PLATFORM_HEIGHT
}

/// The player's resting spot, centered on the home ledge
#[inline]
pub fn home_player_pos() -> Vec2 {
    Vec2::new(
        consts::PLATFORM_MIN_WIDTH / 2.0 - consts::PLAYER_WIDTH / 2.0,
        platform_top() - consts::PLAYER_HEIGHT,
    )
}

/// Where planks sprout: just inside the right edge of the home ledge
#[inline]
pub fn bridge_anchor() -> Vec2 {
    Vec2::new(
        consts::PLATFORM_MIN_WIDTH - consts::BRIDGE_THICKNESS,
        platform_top(),
    )
}
