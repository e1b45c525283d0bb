//! Frame-driven round logic
//!
//! The host calls `tick` once per rendered frame and `pointer_up` when the
//! pointer is released. Animated effects are fire-and-forget on the `Scene`;
//! their completions are the stage countdowns in `RoundState`, so each fires
//! exactly once and in issuing order.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{day_or_night, Bridge, CarryOver, Platform, Player, RoundState, Stage, TimeOfDay};
use crate::consts::*;
use crate::scene::{FinalScores, Overlay, OverlayKind, Scene};
use crate::{bridge_anchor, home_player_pos, platform_top};

/// Input sampled by the host for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Pointer (mouse/touch) currently pressed
    pub pointer_down: bool,
}

/// Plank length after `held_ms` of pointer hold
#[inline]
pub fn bridge_length(held_ms: f32) -> f32 {
    held_ms * BRIDGE_SPEED
}

/// Issue the initial scene calls for a fresh round
pub fn start_round(state: &mut RoundState, scene: &mut dyn Scene) {
    scene.set_background(state.time_of_day);
    if state.music_on {
        scene.play_music();
    }

    let top = platform_top();
    state.home_handle = Some(scene.create_platform(Vec2::new(0.0, top), state.platform.width));
    state.next_handle = Some(scene.create_platform(
        Vec2::new(state.next_platform.x, top),
        state.next_platform.width,
    ));
    scene.set_score_text(&format!("SCORE: {}", state.score));
}

/// Advance the round by one frame
///
/// Returns the carry-over for the next round when the player asks for a
/// restart (pointer pressed after game over); the host then builds a fresh
/// `RoundState` from it.
pub fn tick(
    state: &mut RoundState,
    input: &TickInput,
    dt_ms: f32,
    scene: &mut dyn Scene,
) -> Option<CarryOver> {
    if state.game_over && input.pointer_down {
        return Some(state.carry_over());
    }

    run_unlock_timer(state, dt_ms);
    grow_bridge(state, input, dt_ms, scene);
    advance_stage(state, dt_ms, scene);

    None
}

/// Pointer released: finalize the plank and start the drop sequence
pub fn pointer_up(state: &mut RoundState, scene: &mut dyn Scene) {
    if state.bridge_locked {
        return;
    }
    let Some(bridge) = &state.bridge else {
        return;
    };

    state.bridge_locked = true;
    scene.rotate(bridge.handle, 90.0, BRIDGE_DROP_MS);
    state.stage = Stage::Dropping {
        remaining_ms: BRIDGE_DROP_MS,
    };
}

/// Flip background music on or off
pub fn toggle_music(state: &mut RoundState, scene: &mut dyn Scene) {
    state.menu_locked = true;
    if state.music_on {
        scene.stop_music();
    } else {
        scene.play_music();
    }
    state.music_on = !state.music_on;
}

/// Open or close the About overlay
pub fn toggle_menu(state: &mut RoundState, scene: &mut dyn Scene) {
    if state.menu_open {
        scene.hide_overlay(OverlayKind::About);
    } else {
        scene.show_overlay(Overlay::About);
    }
    state.menu_open = !state.menu_open;
    state.menu_locked = true;
}

/// Roll the next platform: a single unconditional draw. Night spans run
/// narrower than day spans.
pub fn generate_next(rng: &mut Pcg32, time_of_day: TimeOfDay) -> Platform {
    let (min_width, max_width) = match time_of_day {
        TimeOfDay::Day => (30.0, WORLD_WIDTH / 3.0),
        TimeOfDay::Night => (PLAYER_WIDTH, WORLD_WIDTH / 5.0),
    };
    let width = (rng.random::<f32>() * max_width + min_width).floor();

    let max_dist = WORLD_WIDTH - width;
    let min_dist = PLATFORM_MIN_WIDTH + 30.0;
    let x = (rng.random::<f32>() * (max_dist - min_dist) + min_dist).floor();

    Platform { x, width }
}

/// Landing test for the walked-out player
///
/// Both bounds are exclusive: a leading edge flush with either platform edge
/// is a miss. The asymmetric shape of the original check is kept on purpose;
/// do not symmetrize.
pub fn success(player_right: f32, next: &Platform) -> bool {
    if player_right >= next.right_edge() {
        false
    } else {
        player_right > next.left_edge()
    }
}

/// The periodic timer that re-enables input after a UI toggle. Granularity is
/// deliberately coarse: the unlock happens on the next 1000 ms boundary, not
/// immediately.
fn run_unlock_timer(state: &mut RoundState, dt_ms: f32) {
    state.unlock_accum_ms += dt_ms;
    while state.unlock_accum_ms >= CONTROL_UNLOCK_MS {
        state.unlock_accum_ms -= CONTROL_UNLOCK_MS;
        if state.menu_locked {
            state.menu_locked = false;
        }
    }
}

/// While the pointer is held, rebuild the plank at its current length.
/// The old plank is discarded first, so at most one is ever alive.
fn grow_bridge(state: &mut RoundState, input: &TickInput, dt_ms: f32, scene: &mut dyn Scene) {
    if !input.pointer_down {
        state.pointer_was_down = false;
        return;
    }

    state.pointer_held_ms = if state.pointer_was_down {
        state.pointer_held_ms + dt_ms
    } else {
        0.0
    };
    state.pointer_was_down = true;

    if state.bridge_locked || state.menu_locked {
        return;
    }

    if let Some(old) = state.bridge.take() {
        scene.destroy(old.handle);
    }

    let anchor = bridge_anchor();
    let length = bridge_length(state.pointer_held_ms);
    let handle = scene.create_bridge(anchor, length);
    state.bridge = Some(Bridge {
        anchor,
        length,
        handle,
    });
}

/// Count the in-flight stage down and run its completion when it expires
fn advance_stage(state: &mut RoundState, dt_ms: f32, scene: &mut dyn Scene) {
    match state.stage {
        Stage::Idle | Stage::GameOver => {}

        Stage::Dropping { remaining_ms } => {
            let remaining = remaining_ms - dt_ms;
            if remaining > 0.0 {
                state.stage = Stage::Dropping {
                    remaining_ms: remaining,
                };
                return;
            }

            // Plank is down; walk out to its tip
            debug_assert!(state.bridge.is_some(), "dropping without a live plank");
            let target_x = state
                .bridge
                .as_ref()
                .map(|b| b.far_x())
                .unwrap_or(state.player.pos.x);
            scene.move_player_to(target_x, PLAYER_WALK_MS);
            state.stage = Stage::Walking {
                remaining_ms: PLAYER_WALK_MS,
                target_x,
            };
        }

        Stage::Walking {
            remaining_ms,
            target_x,
        } => {
            let remaining = remaining_ms - dt_ms;
            if remaining > 0.0 {
                state.stage = Stage::Walking {
                    remaining_ms: remaining,
                    target_x,
                };
                return;
            }

            state.player.pos.x = target_x;
            resolve_crossing(state, scene);
        }

        Stage::ReturningHome { remaining_ms } => {
            let remaining = remaining_ms - dt_ms;
            if remaining > 0.0 {
                state.stage = Stage::ReturningHome {
                    remaining_ms: remaining,
                };
                return;
            }

            finish_crossing(state, scene);
        }

        Stage::Falling { remaining_ms } => {
            let remaining = remaining_ms - dt_ms;
            if remaining > 0.0 {
                state.stage = Stage::Falling {
                    remaining_ms: remaining,
                };
                return;
            }

            finish_round(state, scene);
        }
    }
}

/// The walk is over: decide whether the player made it
fn resolve_crossing(state: &mut RoundState, scene: &mut dyn Scene) {
    if success(state.player.right_edge(), &state.next_platform) {
        if let Some(bridge) = state.bridge.take() {
            scene.destroy(bridge.handle);
        }

        state.score += 1;
        state.max_score = state.max_score.max(state.score);
        debug_assert!(state.score <= state.max_score);
        scene.set_score_text(&format!("SCORE: {}", state.score));

        // Bring the player home; the crossed platform parks just left of the
        // home ledge until it is despawned
        scene.move_player_to(home_player_pos().x, RETURN_HOME_MS);
        if let Some(handle) = state.next_handle {
            scene.slide_to(
                handle,
                SLIDE_ANCHOR_X - state.next_platform.right_edge(),
                RETURN_HOME_MS,
            );
        }
        state.stage = Stage::ReturningHome {
            remaining_ms: RETURN_HOME_MS,
        };
    } else {
        scene.fall_player(PLAYER_FALL_MS);
        state.stage = Stage::Falling {
            remaining_ms: PLAYER_FALL_MS,
        };
    }
}

/// Player and platform are home: refresh the far span and advance the clock
fn finish_crossing(state: &mut RoundState, scene: &mut dyn Scene) {
    state.player = Player::at_home();

    if let Some(handle) = state.next_handle.take() {
        scene.destroy(handle);
    }
    // The new span is rolled under the phase in effect before the clock
    // advances, like the original
    state.next_platform = generate_next(&mut state.rng, state.time_of_day);
    state.next_handle = Some(scene.create_platform(
        Vec2::new(state.next_platform.x, platform_top()),
        state.next_platform.width,
    ));

    state.bridge_locked = false;
    state.time_counter += 1;
    let (time_of_day, counter) = day_or_night(state.time_counter, state.time_of_day);
    state.time_of_day = time_of_day;
    state.time_counter = counter;
    scene.set_background(state.time_of_day);

    state.stage = Stage::Idle;
}

/// The fall is over: surface the result and park the round
fn finish_round(state: &mut RoundState, scene: &mut dyn Scene) {
    state.player.pos.y = WORLD_HEIGHT;

    scene.stop_music();
    state.music_on = false;

    if state.menu_open {
        toggle_menu(state, scene);
    }
    scene.show_overlay(Overlay::FinalScores(FinalScores {
        score: state.score,
        best: state.max_score,
    }));

    state.game_over = true;
    // bridge_locked stays set: no plank can be built until a restart
    state.stage = Stage::GameOver;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{RecordingScene, SceneCall};
    use proptest::prelude::*;
    use rand::SeedableRng;

    const DT: f32 = 100.0;

    fn new_round(seed: u64) -> (RoundState, RecordingScene) {
        let mut scene = RecordingScene::new();
        let mut state = RoundState::new(seed, CarryOver::default());
        start_round(&mut state, &mut scene);
        (state, scene)
    }

    fn hold_pointer(state: &mut RoundState, scene: &mut RecordingScene, ticks: usize) {
        let input = TickInput { pointer_down: true };
        for _ in 0..ticks {
            let restart = tick(state, &input, DT, scene);
            assert!(restart.is_none());
        }
    }

    fn run_until_settled(state: &mut RoundState, scene: &mut RecordingScene) {
        let input = TickInput::default();
        for _ in 0..100 {
            if matches!(state.stage, Stage::Idle | Stage::GameOver) {
                return;
            }
            tick(state, &input, DT, scene);
        }
        panic!("stage never settled: {:?}", state.stage);
    }

    /// Aim the far span so the pending plank lands dead center in it
    fn place_reachable_platform(state: &mut RoundState) {
        let bridge = state.bridge.expect("no bridge to aim for");
        let player_right = bridge.far_x() + PLAYER_WIDTH;
        state.next_platform = Platform {
            x: player_right - 20.0,
            width: 40.0,
        };
    }

    #[test]
    fn test_bridge_grows_while_pointer_held() {
        let (mut state, mut scene) = new_round(7);

        hold_pointer(&mut state, &mut scene, 1);
        // First tick of a press: held for zero ms so far
        assert_eq!(state.bridge.unwrap().length, 0.0);

        hold_pointer(&mut state, &mut scene, 4);
        assert_eq!(state.bridge.unwrap().length, bridge_length(4.0 * DT));
        assert_eq!(state.bridge.unwrap().length, 80.0);
    }

    #[test]
    fn test_at_most_one_live_bridge() {
        let (mut state, mut scene) = new_round(7);
        hold_pointer(&mut state, &mut scene, 5);

        let created = scene.count(|c| matches!(c, SceneCall::CreateBridge { .. }));
        let destroyed = scene.count(|c| matches!(c, SceneCall::Destroy(_)));
        assert_eq!(created, 5);
        // Every rebuild destroys its predecessor
        assert_eq!(destroyed, created - 1);
        assert!(state.bridge.is_some());
    }

    #[test]
    fn test_pointer_up_without_bridge_is_noop() {
        let (mut state, mut scene) = new_round(7);
        pointer_up(&mut state, &mut scene);
        assert_eq!(state.stage, Stage::Idle);
        assert!(!state.bridge_locked);
        assert_eq!(scene.count(|c| matches!(c, SceneCall::Rotate { .. })), 0);
    }

    #[test]
    fn test_pointer_up_locks_and_pivots_once() {
        let (mut state, mut scene) = new_round(7);
        hold_pointer(&mut state, &mut scene, 3);

        pointer_up(&mut state, &mut scene);
        assert!(state.bridge_locked);
        assert!(matches!(state.stage, Stage::Dropping { .. }));

        // A second release while locked does nothing
        pointer_up(&mut state, &mut scene);
        assert_eq!(scene.count(|c| matches!(c, SceneCall::Rotate { .. })), 1);
    }

    #[test]
    fn test_no_bridge_rebuild_while_locked() {
        let (mut state, mut scene) = new_round(7);
        hold_pointer(&mut state, &mut scene, 3);
        pointer_up(&mut state, &mut scene);

        let before = scene.count(|c| matches!(c, SceneCall::CreateBridge { .. }));
        hold_pointer(&mut state, &mut scene, 2);
        let after = scene.count(|c| matches!(c, SceneCall::CreateBridge { .. }));
        assert_eq!(before, after);
    }

    #[test]
    fn test_successful_crossing_updates_score_and_refreshes_span() {
        let (mut state, mut scene) = new_round(7);
        hold_pointer(&mut state, &mut scene, 6);
        place_reachable_platform(&mut state);
        let old_next = state.next_platform;

        pointer_up(&mut state, &mut scene);
        run_until_settled(&mut state, &mut scene);

        assert_eq!(state.stage, Stage::Idle);
        assert_eq!(state.score, 1);
        assert_eq!(state.max_score, 1);
        assert_eq!(state.time_counter, 1);
        assert!(!state.bridge_locked);
        assert!(state.bridge.is_none());
        assert_ne!(state.next_platform, old_next);
        assert_eq!(state.player.pos.x, home_player_pos().x);

        // Drop, walk, resolve each fired exactly once and in order
        assert_eq!(scene.count(|c| matches!(c, SceneCall::Rotate { .. })), 1);
        let moves: Vec<_> = scene
            .calls
            .iter()
            .filter_map(|c| match c {
                SceneCall::MovePlayerTo { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(moves.len(), 2);
        assert!(moves[0] > moves[1], "walk out, then walk home");
        assert_eq!(
            scene.count(|c| matches!(c, SceneCall::SetScoreText(s) if s.as_str() == "SCORE: 1")),
            1
        );
    }

    #[test]
    fn test_max_score_tracks_but_never_decreases() {
        let mut state = RoundState::new(
            7,
            CarryOver {
                max_score: 10,
                ..CarryOver::default()
            },
        );
        let mut scene = RecordingScene::new();
        start_round(&mut state, &mut scene);

        hold_pointer(&mut state, &mut scene, 6);
        place_reachable_platform(&mut state);
        pointer_up(&mut state, &mut scene);
        run_until_settled(&mut state, &mut scene);

        assert_eq!(state.score, 1);
        assert_eq!(state.max_score, 10);
    }

    #[test]
    fn test_missed_crossing_ends_round() {
        let (mut state, mut scene) = new_round(7);
        hold_pointer(&mut state, &mut scene, 3);
        // Far span well beyond the plank tip
        state.next_platform = Platform {
            x: 350.0,
            width: 40.0,
        };

        pointer_up(&mut state, &mut scene);
        run_until_settled(&mut state, &mut scene);

        assert_eq!(state.stage, Stage::GameOver);
        assert!(state.game_over);
        assert!(state.bridge_locked, "round over: lock stays until restart");
        assert_eq!(state.score, 0);
        assert_eq!(scene.count(|c| matches!(c, SceneCall::FallPlayer { .. })), 1);
        assert_eq!(scene.count(|c| matches!(c, SceneCall::StopMusic)), 1);
        assert_eq!(
            scene.count(|c| matches!(
                c,
                SceneCall::ShowOverlay(Overlay::FinalScores(FinalScores { score: 0, best: 0 }))
            )),
            1
        );
    }

    #[test]
    fn test_restart_request_after_game_over() {
        let (mut state, mut scene) = new_round(7);
        hold_pointer(&mut state, &mut scene, 2);
        state.next_platform = Platform {
            x: 350.0,
            width: 40.0,
        };
        pointer_up(&mut state, &mut scene);
        run_until_settled(&mut state, &mut scene);
        assert!(state.game_over);

        let input = TickInput { pointer_down: true };
        let carry = tick(&mut state, &input, DT, &mut scene).expect("restart requested");
        assert_eq!(carry, state.carry_over());
    }

    #[test]
    fn test_menu_lock_suppresses_bridge_until_timer() {
        let (mut state, mut scene) = new_round(7);
        toggle_menu(&mut state, &mut scene);
        assert!(state.menu_locked);
        assert!(state.menu_open);
        assert_eq!(
            scene.count(|c| matches!(c, SceneCall::ShowOverlay(Overlay::About))),
            1
        );

        // 900 ms of held pointer: still locked, nothing built
        hold_pointer(&mut state, &mut scene, 9);
        assert!(state.menu_locked);
        assert!(state.bridge.is_none());

        // The next tick crosses the 1000 ms boundary and unlocks
        hold_pointer(&mut state, &mut scene, 1);
        assert!(!state.menu_locked);
        hold_pointer(&mut state, &mut scene, 1);
        assert!(state.bridge.is_some());
    }

    #[test]
    fn test_toggle_music_flips_playback() {
        let (mut state, mut scene) = new_round(7);
        assert_eq!(scene.count(|c| matches!(c, SceneCall::PlayMusic)), 1);

        toggle_music(&mut state, &mut scene);
        assert!(!state.music_on);
        assert!(state.menu_locked);
        assert_eq!(scene.count(|c| matches!(c, SceneCall::StopMusic)), 1);

        toggle_music(&mut state, &mut scene);
        assert!(state.music_on);
        assert_eq!(scene.count(|c| matches!(c, SceneCall::PlayMusic)), 2);
    }

    #[test]
    fn test_game_over_closes_about_overlay() {
        let (mut state, mut scene) = new_round(7);
        hold_pointer(&mut state, &mut scene, 2);
        state.next_platform = Platform {
            x: 350.0,
            width: 40.0,
        };
        pointer_up(&mut state, &mut scene);
        state.menu_open = true;
        run_until_settled(&mut state, &mut scene);

        assert!(!state.menu_open);
        assert_eq!(
            scene.count(|c| matches!(c, SceneCall::HideOverlay(OverlayKind::About))),
            1
        );
    }

    #[test]
    fn test_night_falls_after_seven_crossings() {
        let (mut state, mut scene) = new_round(42);

        for _ in 0..7 {
            hold_pointer(&mut state, &mut scene, 4);
            place_reachable_platform(&mut state);
            pointer_up(&mut state, &mut scene);
            run_until_settled(&mut state, &mut scene);
            assert_eq!(state.stage, Stage::Idle, "crossing must succeed");
        }

        assert_eq!(state.time_of_day, TimeOfDay::Night);
        assert_eq!(state.time_counter, 0);
        assert_eq!(
            scene.count(|c| matches!(c, SceneCall::SetBackground(TimeOfDay::Night))),
            1
        );
    }

    #[test]
    fn test_success_boundaries() {
        let platform = Platform { x: 80.0, width: 20.0 };
        // Flush with the far edge counts as a miss
        assert!(!success(100.0, &platform));
        assert!(success(99.0, &platform));
        assert!(!success(101.0, &platform));
        // Flush with the near edge is a miss too
        assert!(!success(80.0, &platform));
        assert!(success(80.5, &platform));
    }

    #[test]
    fn test_bridge_length_zero_at_zero_hold() {
        assert_eq!(bridge_length(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_night_spans_stay_within_bounds(seed: u64) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let p = generate_next(&mut rng, TimeOfDay::Night);
            prop_assert!(p.width >= PLAYER_WIDTH);
            prop_assert!(p.width <= WORLD_WIDTH / 5.0 + PLAYER_WIDTH);
            prop_assert!(p.x >= PLATFORM_MIN_WIDTH + 30.0);
        }

        #[test]
        fn prop_day_spans_stay_within_bounds(seed: u64) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let p = generate_next(&mut rng, TimeOfDay::Day);
            prop_assert!(p.width >= 30.0);
            prop_assert!(p.width <= WORLD_WIDTH / 3.0 + 30.0);
            prop_assert!(p.x >= PLATFORM_MIN_WIDTH + 30.0);
        }

        #[test]
        fn prop_bridge_length_monotone_in_hold(a in 0.0f32..60_000.0, b in 0.0f32..60_000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(bridge_length(lo) <= bridge_length(hi));
        }
    }
}
