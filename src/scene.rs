//! External scene-service contract
//!
//! The round logic never talks to a rendering engine directly. It issues
//! calls through this narrow trait and the host realizes them with whatever
//! engine it likes (sprites, tweens, audio, particles all live behind it).
//! Animated calls are fire-and-forget: the sim keeps its own stage clock and
//! never waits on the renderer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::TimeOfDay;

/// Opaque handle to a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneHandle(pub u32);

/// Overlay kinds the game can put on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    About,
    FinalScores,
}

/// Data shown on the end-of-round overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScores {
    pub score: u32,
    pub best: u32,
}

/// An overlay together with its payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay {
    About,
    FinalScores(FinalScores),
}

impl Overlay {
    pub fn kind(&self) -> OverlayKind {
        match self {
            Overlay::About => OverlayKind::About,
            Overlay::FinalScores(_) => OverlayKind::FinalScores,
        }
    }
}

/// Everything the round logic needs from the hosting engine
pub trait Scene {
    /// Spawn an immovable platform span; `origin` is its top-left corner
    fn create_platform(&mut self, origin: Vec2, width: f32) -> SceneHandle;
    /// Spawn an upright plank of the given length at `anchor`
    fn create_bridge(&mut self, anchor: Vec2, length: f32) -> SceneHandle;
    /// Remove an object from the scene
    fn destroy(&mut self, handle: SceneHandle);
    /// Tween an object horizontally to `x`
    fn slide_to(&mut self, handle: SceneHandle, x: f32, duration_ms: f32);
    /// Tween an object's rotation by `degrees`
    fn rotate(&mut self, handle: SceneHandle, degrees: f32, duration_ms: f32);
    /// Walk the player to `x`
    fn move_player_to(&mut self, x: f32, duration_ms: f32);
    /// Tumble the player off the bottom of the screen
    fn fall_player(&mut self, duration_ms: f32);
    /// Swap the backdrop for the given time of day
    fn set_background(&mut self, time_of_day: TimeOfDay);
    /// Update the score readout
    fn set_score_text(&mut self, text: &str);
    fn play_music(&mut self);
    fn stop_music(&mut self);
    fn show_overlay(&mut self, overlay: Overlay);
    fn hide_overlay(&mut self, kind: OverlayKind);
}

/// A scene that discards everything; for headless runs
#[derive(Debug, Default)]
pub struct NullScene {
    next_handle: u32,
}

impl NullScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> SceneHandle {
        self.next_handle += 1;
        SceneHandle(self.next_handle)
    }
}

impl Scene for NullScene {
    fn create_platform(&mut self, _origin: Vec2, _width: f32) -> SceneHandle {
        self.issue()
    }
    fn create_bridge(&mut self, _anchor: Vec2, _length: f32) -> SceneHandle {
        self.issue()
    }
    fn destroy(&mut self, _handle: SceneHandle) {}
    fn slide_to(&mut self, _handle: SceneHandle, _x: f32, _duration_ms: f32) {}
    fn rotate(&mut self, _handle: SceneHandle, _degrees: f32, _duration_ms: f32) {}
    fn move_player_to(&mut self, _x: f32, _duration_ms: f32) {}
    fn fall_player(&mut self, _duration_ms: f32) {}
    fn set_background(&mut self, _time_of_day: TimeOfDay) {}
    fn set_score_text(&mut self, _text: &str) {}
    fn play_music(&mut self) {}
    fn stop_music(&mut self) {}
    fn show_overlay(&mut self, _overlay: Overlay) {}
    fn hide_overlay(&mut self, _kind: OverlayKind) {}
}

/// One recorded scene call
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCall {
    CreatePlatform { handle: SceneHandle, origin: Vec2, width: f32 },
    CreateBridge { handle: SceneHandle, anchor: Vec2, length: f32 },
    Destroy(SceneHandle),
    SlideTo { handle: SceneHandle, x: f32, duration_ms: f32 },
    Rotate { handle: SceneHandle, degrees: f32, duration_ms: f32 },
    MovePlayerTo { x: f32, duration_ms: f32 },
    FallPlayer { duration_ms: f32 },
    SetBackground(TimeOfDay),
    SetScoreText(String),
    PlayMusic,
    StopMusic,
    ShowOverlay(Overlay),
    HideOverlay(OverlayKind),
}

/// A scene that records every call it receives; the test double
#[derive(Debug, Default)]
pub struct RecordingScene {
    next_handle: u32,
    pub calls: Vec<SceneCall>,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> SceneHandle {
        self.next_handle += 1;
        SceneHandle(self.next_handle)
    }

    /// Number of recorded calls matching `pred`
    pub fn count(&self, pred: impl Fn(&SceneCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl Scene for RecordingScene {
    fn create_platform(&mut self, origin: Vec2, width: f32) -> SceneHandle {
        let handle = self.issue();
        self.calls.push(SceneCall::CreatePlatform { handle, origin, width });
        handle
    }

    fn create_bridge(&mut self, anchor: Vec2, length: f32) -> SceneHandle {
        let handle = self.issue();
        self.calls.push(SceneCall::CreateBridge { handle, anchor, length });
        handle
    }

    fn destroy(&mut self, handle: SceneHandle) {
        self.calls.push(SceneCall::Destroy(handle));
    }

    fn slide_to(&mut self, handle: SceneHandle, x: f32, duration_ms: f32) {
        self.calls.push(SceneCall::SlideTo { handle, x, duration_ms });
    }

    fn rotate(&mut self, handle: SceneHandle, degrees: f32, duration_ms: f32) {
        self.calls.push(SceneCall::Rotate { handle, degrees, duration_ms });
    }

    fn move_player_to(&mut self, x: f32, duration_ms: f32) {
        self.calls.push(SceneCall::MovePlayerTo { x, duration_ms });
    }

    fn fall_player(&mut self, duration_ms: f32) {
        self.calls.push(SceneCall::FallPlayer { duration_ms });
    }

    fn set_background(&mut self, time_of_day: TimeOfDay) {
        self.calls.push(SceneCall::SetBackground(time_of_day));
    }

    fn set_score_text(&mut self, text: &str) {
        self.calls.push(SceneCall::SetScoreText(text.to_string()));
    }

    fn play_music(&mut self) {
        self.calls.push(SceneCall::PlayMusic);
    }

    fn stop_music(&mut self) {
        self.calls.push(SceneCall::StopMusic);
    }

    fn show_overlay(&mut self, overlay: Overlay) {
        self.calls.push(SceneCall::ShowOverlay(overlay));
    }

    fn hide_overlay(&mut self, kind: OverlayKind) {
        self.calls.push(SceneCall::HideOverlay(kind));
    }
}
