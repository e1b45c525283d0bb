//! Round state and core types
//!
//! Everything a round owns lives here. The fields are mutated only by the
//! event handlers in `sim::tick`; the host holds the `RoundState` and drives
//! it once per frame.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::scene::SceneHandle;
use crate::home_player_pos;

/// Backdrop phase; flips on a fixed crossing cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Day => "day",
            TimeOfDay::Night => "night",
        }
    }
}

/// Day/night rule: daylight lasts `DAY_DURATION` crossings, night lasts
/// `NIGHT_DURATION`; the counter resets to zero on a flip and is otherwise
/// left alone. Pure function, no side effects.
pub fn day_or_night(counter: u32, current: TimeOfDay) -> (TimeOfDay, u32) {
    match current {
        TimeOfDay::Day if counter == DAY_DURATION => (TimeOfDay::Night, 0),
        TimeOfDay::Night if counter == NIGHT_DURATION => (TimeOfDay::Day, 0),
        _ => (current, counter),
    }
}

/// An immovable horizontal span the player or a plank can rest on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub width: f32,
}

impl Platform {
    /// The fixed home ledge in the bottom-left corner
    pub fn home() -> Self {
        Self {
            x: 0.0,
            width: PLATFORM_MIN_WIDTH,
        }
    }

    #[inline]
    pub fn left_edge(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right_edge(&self) -> f32 {
        self.x + self.width
    }
}

/// The ephemeral plank; at most one exists at a time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bridge {
    /// Foot of the plank, on the home ledge
    pub anchor: Vec2,
    pub length: f32,
    pub handle: SceneHandle,
}

impl Bridge {
    /// Where the plank tip rests once pivoted down
    #[inline]
    pub fn far_x(&self) -> f32 {
        self.anchor.x + self.length
    }
}

/// The player pawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub pos: Vec2,
}

impl Player {
    pub fn at_home() -> Self {
        Self {
            pos: home_player_pos(),
        }
    }

    /// Leading edge used by the landing test
    #[inline]
    pub fn right_edge(&self) -> f32 {
        self.pos.x + PLAYER_WIDTH
    }
}

/// What survives an in-session restart; everything else starts fresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryOver {
    pub time_counter: u32,
    pub time_of_day: TimeOfDay,
    pub max_score: u32,
}

impl Default for CarryOver {
    fn default() -> Self {
        Self {
            time_counter: 0,
            time_of_day: TimeOfDay::Day,
            max_score: 0,
        }
    }
}

/// Stage of the drop sequence
///
/// The original game chained tween-completion closures three deep; naming the
/// stages and counting each one down makes ordering and exactly-once
/// completion testable. A stage's completion logic runs on the tick its
/// countdown reaches zero, never twice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    /// Waiting for input; the bridge may be growing
    Idle,
    /// Plank pivoting down 90°
    Dropping { remaining_ms: f32 },
    /// Player walking out to the plank tip
    Walking { remaining_ms: f32, target_x: f32 },
    /// Crossing succeeded; player and crossed platform sliding home
    ReturningHome { remaining_ms: f32 },
    /// Crossing missed; player tumbling off-screen
    Falling { remaining_ms: f32 },
    /// Terminal until the host restarts the round
    GameOver,
}

/// Complete round state
#[derive(Debug, Clone)]
pub struct RoundState {
    /// Round seed, for reproducible platform layouts
    pub seed: u64,
    pub rng: Pcg32,
    pub score: u32,
    pub max_score: u32,
    /// Crossings since the last day/night flip
    pub time_counter: u32,
    pub time_of_day: TimeOfDay,
    pub game_over: bool,
    /// Held for the whole drop-walk-resolve sequence. Advisory: every
    /// bridge-creation path must check it.
    pub bridge_locked: bool,
    /// Set by UI toggles; cleared by the periodic unlock timer, never
    /// immediately
    pub menu_locked: bool,
    pub menu_open: bool,
    pub music_on: bool,
    pub stage: Stage,
    pub player: Player,
    /// The fixed home ledge
    pub platform: Platform,
    /// The span the player is trying to reach
    pub next_platform: Platform,
    pub bridge: Option<Bridge>,
    /// How long the pointer has been held this press
    pub(crate) pointer_held_ms: f32,
    pub(crate) pointer_was_down: bool,
    /// Accumulator feeding the control-unlock timer
    pub(crate) unlock_accum_ms: f32,
    pub(crate) home_handle: Option<SceneHandle>,
    pub(crate) next_handle: Option<SceneHandle>,
}

impl RoundState {
    /// Fresh round. `carry` is what the previous round handed over.
    pub fn new(seed: u64, carry: CarryOver) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let next_platform = super::tick::generate_next(&mut rng, carry.time_of_day);
        Self {
            seed,
            rng,
            score: 0,
            max_score: carry.max_score,
            time_counter: carry.time_counter,
            time_of_day: carry.time_of_day,
            game_over: false,
            bridge_locked: false,
            menu_locked: false,
            menu_open: false,
            music_on: true,
            stage: Stage::Idle,
            player: Player::at_home(),
            platform: Platform::home(),
            next_platform,
            bridge: None,
            pointer_held_ms: 0.0,
            pointer_was_down: false,
            unlock_accum_ms: 0.0,
            home_handle: None,
            next_handle: None,
        }
    }

    /// What the round that follows this one starts from
    pub fn carry_over(&self) -> CarryOver {
        CarryOver {
            time_counter: self.time_counter,
            time_of_day: self.time_of_day,
            max_score: self.max_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_flips_to_night_at_duration() {
        assert_eq!(day_or_night(7, TimeOfDay::Day), (TimeOfDay::Night, 0));
    }

    #[test]
    fn test_night_flips_to_day_at_duration() {
        assert_eq!(day_or_night(4, TimeOfDay::Night), (TimeOfDay::Day, 0));
    }

    #[test]
    fn test_day_holds_before_duration() {
        assert_eq!(day_or_night(3, TimeOfDay::Day), (TimeOfDay::Day, 3));
        // Night's threshold does not end daylight
        assert_eq!(day_or_night(4, TimeOfDay::Day), (TimeOfDay::Day, 4));
        assert_eq!(day_or_night(7, TimeOfDay::Night), (TimeOfDay::Night, 7));
    }

    #[test]
    fn test_platform_edges() {
        let p = Platform { x: 80.0, width: 20.0 };
        assert_eq!(p.left_edge(), 80.0);
        assert_eq!(p.right_edge(), 100.0);
    }

    #[test]
    fn test_restart_carries_exactly_three_values() {
        let mut old = RoundState::new(1, CarryOver::default());
        old.score = 5;
        old.max_score = 9;
        old.time_counter = 3;
        old.time_of_day = TimeOfDay::Night;
        old.game_over = true;
        old.bridge_locked = true;
        old.menu_locked = true;

        let fresh = RoundState::new(2, old.carry_over());
        assert_eq!(fresh.time_counter, 3);
        assert_eq!(fresh.time_of_day, TimeOfDay::Night);
        assert_eq!(fresh.max_score, 9);
        assert_eq!(fresh.score, 0);
        assert!(!fresh.game_over);
        assert!(!fresh.bridge_locked);
        assert!(!fresh.menu_locked);
        assert!(fresh.bridge.is_none());
        assert_eq!(fresh.stage, Stage::Idle);
    }

    #[test]
    fn test_player_starts_centered_on_home_ledge() {
        let player = Player::at_home();
        assert_eq!(player.pos.x, 26.0);
        assert_eq!(player.right_edge(), 38.0);
    }
}
