//! Plankfall demo host
//!
//! Headless driver: wires the round logic to a logging scene backend, plays
//! a few rounds with a simple auto-player, and prints the session
//! leaderboard on exit. A real frontend implements `Scene` with an actual
//! engine instead of logging.

use glam::Vec2;

use plankfall::bridge_anchor;
use plankfall::consts::*;
use plankfall::scene::{Overlay, OverlayKind, Scene, SceneHandle};
use plankfall::scores::ScoreBoard;
use plankfall::sim::{
    pointer_up, start_round, tick, toggle_music, CarryOver, RoundState, Stage, TickInput,
};

const FRAME_MS: f32 = 16.0;

/// Scene backend that narrates everything to the log
#[derive(Debug, Default)]
struct LogScene {
    next_handle: u32,
}

impl LogScene {
    fn issue(&mut self) -> SceneHandle {
        self.next_handle += 1;
        SceneHandle(self.next_handle)
    }
}

impl Scene for LogScene {
    fn create_platform(&mut self, origin: Vec2, width: f32) -> SceneHandle {
        let handle = self.issue();
        log::debug!("platform {handle:?}: x={:.0} width={width:.0}", origin.x);
        handle
    }

    fn create_bridge(&mut self, anchor: Vec2, length: f32) -> SceneHandle {
        let handle = self.issue();
        log::trace!("bridge {handle:?}: x={:.0} length={length:.1}", anchor.x);
        handle
    }

    fn destroy(&mut self, handle: SceneHandle) {
        log::trace!("destroy {handle:?}");
    }

    fn slide_to(&mut self, handle: SceneHandle, x: f32, duration_ms: f32) {
        log::debug!("slide {handle:?} to x={x:.0} over {duration_ms:.0}ms");
    }

    fn rotate(&mut self, handle: SceneHandle, degrees: f32, duration_ms: f32) {
        log::debug!("rotate {handle:?} by {degrees:.0} deg over {duration_ms:.0}ms");
    }

    fn move_player_to(&mut self, x: f32, duration_ms: f32) {
        log::debug!("player walks to x={x:.0} over {duration_ms:.0}ms");
    }

    fn fall_player(&mut self, duration_ms: f32) {
        log::debug!("player falls over {duration_ms:.0}ms");
    }

    fn set_background(&mut self, time_of_day: plankfall::sim::TimeOfDay) {
        log::debug!("backdrop: {}", time_of_day.as_str());
    }

    fn set_score_text(&mut self, text: &str) {
        log::debug!("hud: {text}");
    }

    fn play_music(&mut self) {
        log::info!("music on");
    }

    fn stop_music(&mut self) {
        log::info!("music off");
    }

    fn show_overlay(&mut self, overlay: Overlay) {
        match overlay {
            Overlay::About => log::info!("overlay: about"),
            Overlay::FinalScores(fs) => {
                log::info!("overlay: game over, score {} best {}", fs.score, fs.best)
            }
        }
    }

    fn hide_overlay(&mut self, kind: OverlayKind) {
        log::debug!("overlay dismissed: {kind:?}");
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Hold the pointer long enough to grow a plank of `length` pixels
fn hold_for_length(state: &mut RoundState, scene: &mut dyn Scene, length: f32) {
    let ticks = (length / (BRIDGE_SPEED * FRAME_MS)).round() as usize + 1;
    let input = TickInput { pointer_down: true };
    for _ in 0..ticks {
        let _ = tick(state, &input, FRAME_MS, scene);
    }
}

/// Tick with no input until the drop sequence settles
fn wait_for_settle(state: &mut RoundState, scene: &mut dyn Scene) {
    let input = TickInput::default();
    while !matches!(state.stage, Stage::Idle | Stage::GameOver) {
        let _ = tick(state, &input, FRAME_MS, scene);
    }
}

fn main() {
    env_logger::init();

    let seed = env_u64("PLANKFALL_SEED", 0xB41D);
    let rounds = env_u64("PLANKFALL_ROUNDS", 3) as u32;
    log::info!("plankfall demo: seed={seed} rounds={rounds}");

    let mut scene = LogScene::default();
    let mut board = ScoreBoard::new();
    let mut carry = CarryOver::default();

    for round in 1..=rounds {
        let mut state = RoundState::new(seed.wrapping_add(round as u64), carry);
        start_round(&mut state, &mut scene);

        if round == rounds {
            // Last round runs silent; wait out the control lock afterwards
            toggle_music(&mut state, &mut scene);
            let input = TickInput::default();
            for _ in 0..70 {
                let _ = tick(&mut state, &input, FRAME_MS, &mut scene);
            }
        }

        // The auto-player clears a few spans, then fumbles one on purpose
        let planned = 3 + 2 * round;
        let mut attempts = 0u32;
        while !state.game_over {
            attempts += 1;
            let anchor_x = bridge_anchor().x;
            let length = if attempts > planned {
                // Overshoot: plank tip past the far edge
                state.next_platform.right_edge() - anchor_x
            } else {
                // Land the leading edge dead center in the span
                state.next_platform.x + state.next_platform.width / 2.0 - PLAYER_WIDTH - anchor_x
            };

            hold_for_length(&mut state, &mut scene, length);
            pointer_up(&mut state, &mut scene);
            wait_for_settle(&mut state, &mut scene);
        }

        log::info!(
            "round {round} over: score={} best={} ({})",
            state.score,
            state.max_score,
            state.time_of_day.as_str()
        );
        if let Some(rank) = board.add_round(state.score, state.time_of_day, round) {
            log::info!("round {round} ranked #{rank} this session");
        }

        // Tap to restart, like a player would
        let input = TickInput { pointer_down: true };
        if let Some(next) = tick(&mut state, &input, FRAME_MS, &mut scene) {
            carry = next;
        }
    }

    match serde_json::to_string_pretty(&board) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("could not serialize leaderboard: {err}"),
    }
}
