//! Per-frame input snapshot.
//!
//! The core never reads devices. Hosts fill an [`InputState`] each frame,
//! see [`crate::bevy::systems::collect_input`] for the keyboard mapping.

/// Keys held or edge-triggered during one frame.
///
/// Fields ending in `_pressed` are true only on the frame the key went down;
/// fields ending in `_released` only on the frame it went up. The rest are
/// true while held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Speeds up the debug camera.
    pub shift: bool,
    pub jump_pressed: bool,
    /// Debug camera zoom out (comma).
    pub zoom_out: bool,
    /// Debug camera zoom in (period).
    pub zoom_in: bool,
    /// Debug camera zoom back to 1 (slash).
    pub zoom_reset: bool,
    /// Debug camera back to the origin (backspace).
    pub recenter: bool,
    pub reset_world_released: bool,
    pub toggle_follow_released: bool,
}

impl InputState {
    /// Idle frame with nothing pressed.
    pub fn none() -> Self {
        Self::default()
    }

    /// Holds `right`.
    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::default()
        }
    }

    /// Holds `left`.
    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::default()
        }
    }

    /// Presses jump this frame.
    pub fn jump() -> Self {
        Self {
            jump_pressed: true,
            ..Self::default()
        }
    }
}
