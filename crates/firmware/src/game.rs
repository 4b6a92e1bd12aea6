//! Game orchestrator.
//!
//! The foreground loop: a five-state machine that captures a password,
//! plays it back, then captures and plays back guesses until one matches.
//!
//! ```text
//! Init ──► ShowPassword ──► Guess ──► ShowGuess ──► GameOver
//!  ▲                          ▲                        │
//!  └──────── match ───────────┼────────────────────────┤
//!                             └────── mismatch ────────┘
//! ```
//!
//! The foreground only ever touches the peripherals to arm a phase. Data
//! moves through the handlers; the foreground waits on the flag that ends
//! the phase.

use core::sync::atomic::Ordering;

use platform::{Glyph, LineMode, Mode, PinMode, SegmentDisplay, Trigger};

use crate::board::{Board, Vault};
use crate::config::{Code, GameConfig, CODE_LEN};
use crate::handlers::Handlers;
use crate::shared::Target;
use crate::wait::{wait_until, Stalled, WaitHook};
use crate::FirmwareError;

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GameState {
    /// Capture the password.
    Init,
    /// Play the password back into the password buffer.
    ShowPassword,
    /// Capture a guess.
    Guess,
    /// Play the guess back into the guess buffer.
    ShowGuess,
    /// Compare guess and password.
    GameOver,
}

/// Wire the board and return the foreground game plus the handlers for the
/// dispatch layer.
///
/// Key pin: interrupt source with pull-up on its falling edge. Playback
/// timer: `config.playback_period` in reload mode, stopped. Interrupt
/// controller: reset, then IRQ on in vectored mode, FIQ off, both lines
/// IRQ-routed, timer line unmasked, keyboard line masked until a capture
/// phase, global line unmasked.
pub fn setup<B: Board>(
    vault: &Vault<B>,
    config: GameConfig,
) -> Result<(Game<'_, B>, Handlers<'_, B>), FirmwareError> {
    critical_section::with(|cs| -> Result<(), FirmwareError> {
        vault.shared().reset(cs);
        let mut p = vault.peripherals(cs).borrow_mut();

        p.port.configure(config.key_pin, PinMode::Eint)?;
        p.port.configure_pullup(config.key_pin, true)?;
        p.port
            .configure_edge_trigger(config.key_pin, Trigger::FallingEdge)?;

        p.timers.stop(config.playback_timer);
        p.timers
            .configure_period(config.playback_timer, config.playback_period, Mode::Reload)?;

        p.intc.reset();
        p.intc.configure_global(true, true);
        p.intc.configure_fiq(false);
        p.intc.set_line_mode(config.keyboard_line, LineMode::Irq)?;
        p.intc.set_line_mode(config.timer_line, LineMode::Irq)?;
        p.intc.enable(config.timer_line)?;
        p.intc.disable(config.keyboard_line)?;
        p.intc.enable(platform::Line::GLOBAL)?;

        p.display.show_glyph(Glyph::Blank);
        Ok(())
    })?;

    #[cfg(feature = "defmt")]
    defmt::info!("{=str} v{=str} ready", platform::config::APP_NAME, platform::config::APP_VERSION);

    Ok((
        Game {
            vault,
            config,
            state: GameState::Init,
        },
        Handlers::new(vault, config),
    ))
}

/// Foreground state machine.
pub struct Game<'a, B: Board> {
    vault: &'a Vault<B>,
    config: GameConfig,
    state: GameState,
}

impl<B: Board> Game<'_, B> {
    /// Current state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Password captured by the last `ShowPassword`.
    pub fn password(&self) -> Code {
        critical_section::with(|cs| self.vault.shared().code(cs, Target::Password))
    }

    /// Guess captured by the last `ShowGuess`.
    pub fn guess(&self) -> Code {
        critical_section::with(|cs| self.vault.shared().code(cs, Target::Guess))
    }

    /// Run the current state to completion and move to the next one.
    pub fn step(&mut self, hook: &mut impl WaitHook) -> Result<GameState, Stalled> {
        let next = match self.state {
            GameState::Init => {
                self.show(Glyph::Idle);
                self.capture(hook)?;
                GameState::ShowPassword
            }
            GameState::ShowPassword => {
                self.print_and_transfer(Some(Target::Password), hook)?;
                GameState::Guess
            }
            GameState::Guess => {
                self.show(Glyph::Prompt);
                self.capture(hook)?;
                GameState::ShowGuess
            }
            GameState::ShowGuess => {
                self.print_and_transfer(Some(Target::Guess), hook)?;
                GameState::GameOver
            }
            GameState::GameOver => {
                if self.password() == self.guess() {
                    #[cfg(feature = "defmt")]
                    defmt::info!("guess matches");
                    self.show(Glyph::Match);
                    GameState::Init
                } else {
                    #[cfg(feature = "defmt")]
                    defmt::info!("guess does not match");
                    self.show(Glyph::Mismatch);
                    GameState::Guess
                }
            }
        };

        #[cfg(feature = "defmt")]
        defmt::info!("{} -> {}", self.state, next);
        self.state = next;
        Ok(next)
    }

    /// Capture until at least a full code has been typed.
    fn capture(&mut self, hook: &mut impl WaitHook) -> Result<(), Stalled> {
        loop {
            let captured = self.read_user_input(hook)?;
            if captured >= CODE_LEN {
                return Ok(());
            }
            #[cfg(feature = "defmt")]
            defmt::info!("only {=usize} keys captured, retrying", captured);
        }
    }

    /// Run one capture phase: arm the keyboard line and wait for the
    /// terminator. Returns the number of keys held in the ring.
    pub fn read_user_input(&mut self, hook: &mut impl WaitHook) -> Result<usize, Stalled> {
        let shared = self.vault.shared();
        critical_section::with(|cs| {
            shared.ring(cs).borrow_mut().reset();
            shared.input_done().store(false, Ordering::SeqCst);
            let mut p = self.vault.peripherals(cs).borrow_mut();
            if let Err(_e) = p.intc.enable(self.config.keyboard_line) {
                #[cfg(feature = "defmt")]
                defmt::warn!("keyboard line enable failed: {}", _e);
            }
        });

        wait_until(shared.input_done(), hook)?;

        Ok(critical_section::with(|cs| shared.ring(cs).borrow().size()))
    }

    /// Play the ring back at the playback period, copying each element into
    /// `target` when given, and wait until the whole ring has been shown.
    pub fn print_and_transfer(
        &mut self,
        target: Option<Target>,
        hook: &mut impl WaitHook,
    ) -> Result<(), Stalled> {
        let shared = self.vault.shared();
        critical_section::with(|cs| {
            let watermark = shared.ring(cs).borrow().capacity();
            shared.set_show_watermark(watermark);
            shared.show_done().store(false, Ordering::SeqCst);
            shared.set_target(cs, target);
            shared.engine(cs).borrow_mut().arm();
            self.vault
                .peripherals(cs)
                .borrow_mut()
                .timers
                .start(self.config.playback_timer);
        });

        wait_until(shared.show_done(), hook)
    }

    fn show(&self, glyph: Glyph) {
        critical_section::with(|cs| {
            self.vault.peripherals(cs).borrow_mut().display.show_glyph(glyph);
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sim::{self, Simulator};
    use platform::mocks::DisplayEvent;
    use platform::{Key, Line, Timer};

    fn keys(codes: &[u8]) -> impl Iterator<Item = Key> + '_ {
        codes.iter().filter_map(|&c| Key::new(c))
    }

    #[test]
    fn setup_wires_lines_and_timer() {
        let vault = sim::vault();
        let _ = setup(&vault, GameConfig::default()).unwrap();
        critical_section::with(|cs| {
            let p = vault.peripherals(cs).borrow();
            assert!(p.intc.irq_enabled());
            assert!(p.intc.is_vectored());
            assert!(!p.intc.fiq_enabled());
            assert!(p.intc.is_enabled(Line::TIMER0).unwrap());
            assert!(!p.intc.is_enabled(Line::EINT1).unwrap());
            assert!(p.intc.is_enabled(Line::GLOBAL).unwrap());
            assert_eq!(p.intc.line_mode(Line::EINT1).unwrap(), LineMode::Irq);
            assert_eq!(p.port.mode(1).unwrap(), PinMode::Eint);
            assert_eq!(p.timers.mode(Timer::T0), Mode::Reload);
            assert_eq!(p.timers.live_count(Timer::T0), 31_250);
            assert!(!p.timers.is_running(Timer::T0));
        });
    }

    #[test]
    fn setup_rejects_invalid_pin() {
        let vault = sim::vault();
        let config = GameConfig {
            key_pin: 9,
            ..GameConfig::default()
        };
        assert!(matches!(
            setup(&vault, config),
            Err(FirmwareError::Hal(platform::HalError::InvalidPin(9)))
        ));
    }

    #[test]
    fn short_input_is_captured_again() {
        let vault = sim::vault();
        let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
        let mut sim = Simulator::new(handlers);
        sim.feed(keys(&[1, 2, 0xF, 5, 6, 7, 8, 0xF]));

        assert_eq!(game.step(&mut sim), Ok(GameState::ShowPassword));
        assert_eq!(game.step(&mut sim), Ok(GameState::Guess));
        assert_eq!(game.password(), [5, 6, 7, 8]);
    }

    #[test]
    fn extra_keys_keep_the_most_recent() {
        let vault = sim::vault();
        let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
        let mut sim = Simulator::new(handlers);
        sim.feed(keys(&[1, 2, 3, 4, 5, 6, 0xF]));

        game.step(&mut sim).unwrap();
        game.step(&mut sim).unwrap();
        assert_eq!(game.password(), [3, 4, 5, 6]);
    }

    #[test]
    fn keyboard_line_is_masked_after_capture() {
        let vault = sim::vault();
        let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
        let mut sim = Simulator::new(handlers);
        sim.feed(keys(&[1, 2, 3, 4, 0xF]));

        assert_eq!(game.read_user_input(&mut sim), Ok(4));
        critical_section::with(|cs| {
            let p = vault.peripherals(cs).borrow();
            assert!(!p.intc.is_enabled(Line::EINT1).unwrap());
            assert!(!p.intc.is_pending(Line::EINT1).unwrap());
        });
    }

    #[test]
    fn display_only_playback_leaves_buffers_alone() {
        let vault = sim::vault();
        let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
        let mut sim = Simulator::new(handlers);
        sim.feed(keys(&[7, 7, 7, 7, 0xF]));

        game.read_user_input(&mut sim).unwrap();
        game.print_and_transfer(None, &mut sim).unwrap();
        assert_eq!(game.password(), [0; CODE_LEN]);
        assert_eq!(sim.display_digits().as_slice(), &[7, 7, 7, 7]);
        critical_section::with(|cs| {
            let p = vault.peripherals(cs).borrow();
            assert!(!p.timers.is_running(Timer::T0));
            assert_eq!(
                p.display.current(),
                Some(DisplayEvent::Digit(7)),
                "last digit stays on the display"
            );
        });
    }

    #[test]
    fn capture_without_keys_stalls() {
        let vault = sim::vault();
        let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
        let mut sim = Simulator::new(handlers);
        assert_eq!(game.step(&mut sim), Err(Stalled));
        assert_eq!(game.state(), GameState::Init);
    }
}
