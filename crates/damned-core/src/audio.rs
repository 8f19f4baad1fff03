//! Sound cue output.
//!
//! The core only names sounds; playback belongs to the host.

use std::sync::Arc;

use parking_lot::Mutex;

/// A sound the game wants played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Powerup,
    Jump,
    LifeLost,
}

/// Receives sound cues as they happen.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Buffers cues in a shared queue that the host drains.
///
/// Clones share the queue, so one clone can be handed to the controller
/// while another is kept for [`SharedAudio::drain`].
#[derive(Debug, Default, Clone)]
pub struct SharedAudio {
    queue: Arc<Mutex<Vec<SoundCue>>>,
}

impl SharedAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes all cues queued so far.
    pub fn drain(&self) -> Vec<SoundCue> {
        std::mem::take(&mut *self.queue.lock())
    }
}

impl AudioSink for SharedAudio {
    fn play(&mut self, cue: SoundCue) {
        tracing::trace!(?cue, "[audio] cue queued");
        self.queue.lock().push(cue);
    }
}
