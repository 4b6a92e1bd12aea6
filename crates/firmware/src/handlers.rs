//! Interrupt handlers.
//!
//! Two event sources drive the game:
//!
//! - **Key event** (falling edge on the key-matrix line): capture one key
//!   into the ring buffer, or finish the capture phase on the terminator.
//! - **Timer tick** (playback timer expiry): play one captured key onto the
//!   display and into the current target buffer, or finish playback.
//!
//! Both run to completion with interrupts masked and acknowledge their line
//! as their last register write.

use core::sync::atomic::Ordering;

use embedded_hal::delay::DelayNs;
use platform::{PinState, SegmentDisplay};
use playback::Tick;

use crate::board::{Board, Vault};
use crate::config::GameConfig;

/// Entry points the platform dispatch layer calls.
pub trait InterruptHandlers {
    /// Key-matrix edge.
    fn on_key_event(&self);

    /// Playback timer expiry.
    fn on_timer_tick(&self);
}

/// Handlers bound to a vault.
pub struct Handlers<'a, B: Board> {
    vault: &'a Vault<B>,
    config: GameConfig,
}

impl<B: Board> Clone for Handlers<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Board> Copy for Handlers<'_, B> {}

impl<'a, B: Board> Handlers<'a, B> {
    pub(crate) fn new(vault: &'a Vault<B>, config: GameConfig) -> Self {
        Self { vault, config }
    }

    /// Vault the handlers operate on.
    pub fn vault(&self) -> &'a Vault<B> {
        self.vault
    }

    /// Configuration the handlers were set up with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

impl<B: Board> InterruptHandlers for Handlers<'_, B> {
    fn on_key_event(&self) {
        let shared = self.vault.shared();
        critical_section::with(|cs| {
            let mut p = self.vault.peripherals(cs).borrow_mut();

            p.delay.delay_ms(self.config.settle_ms);
            let mut terminated = false;
            match p.keypad.scan() {
                Some(key) if key.is_terminator() => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("key: terminator");
                    shared.input_done().store(true, Ordering::SeqCst);
                    terminated = true;
                }
                Some(key) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("key: {=u8:x}", key.code());
                    shared.ring(cs).borrow_mut().put(key.code());
                }
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("key: bounce, no key decoded");
                }
            }

            // Wait for release. A read error means the pin is misconfigured;
            // there is then nothing to wait for.
            while let Ok(PinState::Low) = p.port.read(self.config.key_pin) {}
            p.delay.delay_ms(self.config.settle_ms);

            if terminated {
                if let Err(_e) = p.intc.disable(self.config.keyboard_line) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("key line disable failed: {}", _e);
                }
            }
            if let Err(_e) = p.intc.acknowledge(self.config.keyboard_line) {
                #[cfg(feature = "defmt")]
                defmt::warn!("key line acknowledge failed: {}", _e);
            }
        });
    }

    fn on_timer_tick(&self) {
        let shared = self.vault.shared();
        critical_section::with(|cs| {
            let mut p = self.vault.peripherals(cs).borrow_mut();

            let tick = shared.engine(cs).borrow_mut().tick(shared.show_watermark());
            match tick {
                Tick::Done => {
                    p.timers.stop(self.config.playback_timer);
                    shared.show_done().store(true, Ordering::SeqCst);
                    #[cfg(feature = "defmt")]
                    defmt::debug!("playback done");
                }
                Tick::Emit(offset) => match shared.ring(cs).borrow_mut().get() {
                    Ok(code) => {
                        if let Some(target) = shared.target(cs) {
                            shared.store(cs, target, offset, code);
                        }
                        p.display.show_digit(code);
                    }
                    Err(_e) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("tick {=usize}: {}", offset, _e);
                    }
                },
                Tick::Idle => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("stray playback tick");
                }
            }

            if let Err(_e) = p.intc.acknowledge(self.config.timer_line) {
                #[cfg(feature = "defmt")]
                defmt::warn!("timer line acknowledge failed: {}", _e);
            }
        });
    }
}
