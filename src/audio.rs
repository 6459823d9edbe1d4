//! Audio collaborator.  The session only names cues; whatever implements
//! `AudioSink` decides how (or whether) they make a sound.

use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Music,
    Shoot,
    Hit,
    ShieldBreak,
}

impl Cue {
    pub const ALL: [Cue; 4] = [Cue::Music, Cue::Shoot, Cue::Hit, Cue::ShieldBreak];
}

pub trait AudioSink {
    fn play(&mut self, cue: Cue);
    fn pause(&mut self, cue: Cue);
    /// Rewind to the start.
    fn reset(&mut self, cue: Cue);
    fn set_volume(&mut self, cue: Cue, volume: f32);
    fn set_looping(&mut self, cue: Cue, looping: bool);
}

/// Rewind then play, so rapid repeats restart the effect.
pub fn restart<S: AudioSink + ?Sized>(sink: &mut S, cue: Cue) {
    sink.reset(cue);
    sink.play(cue);
}

/// A sink with no output device; cues are only traced.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, cue: Cue) {
        trace!(?cue, "play");
    }

    fn pause(&mut self, cue: Cue) {
        trace!(?cue, "pause");
    }

    fn reset(&mut self, cue: Cue) {
        trace!(?cue, "reset");
    }

    fn set_volume(&mut self, cue: Cue, volume: f32) {
        trace!(?cue, volume, "volume");
    }

    fn set_looping(&mut self, cue: Cue, looping: bool) {
        trace!(?cue, looping, "looping");
    }
}
