//! Game configuration.
//!
//! Wiring and timing the orchestrator and handlers read at runtime. The
//! defaults match the development board; board constants come from
//! [`platform::config`].

use platform::config::KEYPAD_PIN;
use platform::{Line, Period, Timer};

/// Length of a password or guess.
pub const CODE_LEN: usize = 4;

/// A captured password or guess.
pub type Code = [u8; CODE_LEN];

/// Settle delay after a key-matrix edge and after its release.
pub const SETTLE_MS: u32 = 20;

/// Runtime configuration for [`crate::game::setup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameConfig {
    /// Timer pacing playback.
    pub playback_timer: Timer,
    /// One digit is shown per period.
    pub playback_period: Period,
    /// Settle delay in milliseconds.
    pub settle_ms: u32,
    /// Port G pin wired to the key matrix "any key" output.
    pub key_pin: u8,
    /// Interrupt line of `key_pin`.
    pub keyboard_line: Line,
    /// Interrupt line of `playback_timer`.
    pub timer_line: Line,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            playback_timer: Timer::T0,
            playback_period: Period::OneSec,
            settle_ms: SETTLE_MS,
            key_pin: KEYPAD_PIN,
            keyboard_line: Line::EINT1,
            timer_line: Line::TIMER0,
        }
    }
}
