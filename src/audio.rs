//! Sound-cue output
//!
//! The simulation only emits named cues; a backend implements `CueSink` and
//! decides how (or whether) to play them. Playback must never block a tick.

use std::collections::BTreeMap;

use crate::sim::events::{GameEvent, SoundCue};

/// Receiver for sound cues
pub trait CueSink {
    fn play(&mut self, cue: SoundCue);
}

/// Forward every sound event in `events` to `sink`; returns how many were played
pub fn dispatch<S: CueSink + ?Sized>(events: &[GameEvent], sink: &mut S) -> usize {
    let mut played = 0;
    for event in events {
        if let GameEvent::Sound(cue) = event {
            sink.play(*cue);
            played += 1;
        }
    }
    played
}

/// Sink that logs cues and keeps per-cue counts
#[derive(Debug, Default)]
pub struct LogSink {
    muted: bool,
    counts: BTreeMap<&'static str, u64>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Muted sinks still count cues but stop logging them
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn count(&self, cue: SoundCue) -> u64 {
        self.counts.get(cue.as_str()).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Cue names with their counts, sorted by name
    pub fn counts(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.counts.iter().map(|(name, n)| (*name, *n))
    }
}

impl CueSink for LogSink {
    fn play(&mut self, cue: SoundCue) {
        *self.counts.entry(cue.as_str()).or_insert(0) += 1;
        if !self.muted {
            log::debug!("cue: {}", cue.as_str());
        }
    }
}
