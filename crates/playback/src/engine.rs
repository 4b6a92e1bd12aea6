//! Playback tick counter.
//!
//! `PlaybackEngine` is the pure, allocation-free core of timer-driven
//! playback: each timer tick either emits the next element (with the offset
//! it should be written to) or, once `watermark` elements have been emitted,
//! reports completion and disarms itself.
//!
//! The engine holds only the played count. The watermark is read by the
//! caller on every tick, so whoever owns it can move it mid-run.
//!
//! It has **no** I/O. The timer-tick handler owns the ring buffer, the
//! display and the timer; it asks the engine what to do on every tick.

/// What the current tick should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Play one element and store it at this offset of the destination.
    Emit(usize),
    /// `watermark` elements have been played; stop the timer.
    Done,
    /// Nothing armed. A stray tick.
    Idle,
}

/// Pure state machine for one playback run.
#[derive(Debug, Clone, Default)]
pub struct PlaybackEngine {
    played: usize,
    armed: bool,
}

impl PlaybackEngine {
    /// Disarmed engine.
    pub const fn new() -> Self {
        Self {
            played: 0,
            armed: false,
        }
    }

    /// Start a run from offset 0.
    pub fn arm(&mut self) {
        self.played = 0;
        self.armed = true;
    }

    /// Advance by one timer tick.
    ///
    /// Transitions:
    /// - armed, `played < watermark` → `Emit(played)`, `played += 1`
    /// - armed, `played == watermark` → `Done`, count reset, disarmed
    /// - disarmed → `Idle`
    pub fn tick(&mut self, watermark: usize) -> Tick {
        if !self.armed {
            return Tick::Idle;
        }
        if self.played >= watermark {
            self.played = 0;
            self.armed = false;
            return Tick::Done;
        }
        let offset = self.played;
        self.played = self.played.saturating_add(1);
        Tick::Emit(offset)
    }

    /// Elements emitted so far in the current run.
    pub fn played(&self) -> usize {
        self.played
    }

    /// `true` between [`arm`](Self::arm) and the `Done` tick.
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
