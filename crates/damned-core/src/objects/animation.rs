//! Frame-based sprite animations.

/// What happens after the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Stays on the last frame.
    Normal,
    Loop,
    /// Plays forward then backward, repeating.
    LoopPingPong,
}

/// A named sequence of atlas frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    /// Atlas region key; frames are indexed within it.
    pub key: &'static str,
    pub frame_count: usize,
    /// Seconds each frame is shown.
    pub frame_duration: f32,
    pub mode: PlayMode,
}

impl Animation {
    pub const fn new(
        key: &'static str,
        frame_count: usize,
        frame_duration: f32,
        mode: PlayMode,
    ) -> Self {
        Self {
            key,
            frame_count,
            frame_duration,
            mode,
        }
    }

    /// Frame shown `state_time` seconds after the animation started.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn key_frame_index(&self, state_time: f32) -> usize {
        if self.frame_count <= 1 || self.frame_duration <= 0.0 {
            return 0;
        }
        let raw = (state_time.max(0.0) / self.frame_duration) as usize;
        let last = self.frame_count - 1;
        match self.mode {
            PlayMode::Normal => raw.min(last),
            PlayMode::Loop => raw % self.frame_count,
            PlayMode::LoopPingPong => {
                let cycle = last * 2;
                let pos = raw % cycle;
                if pos <= last { pos } else { cycle - pos }
            }
        }
    }

    /// Whether a [`PlayMode::Normal`] animation has shown its last frame.
    /// Looping animations never finish.
    #[allow(clippy::cast_precision_loss)]
    pub fn is_finished(&self, state_time: f32) -> bool {
        match self.mode {
            PlayMode::Normal => state_time >= self.frame_count as f32 * self.frame_duration,
            PlayMode::Loop | PlayMode::LoopPingPong => false,
        }
    }
}
