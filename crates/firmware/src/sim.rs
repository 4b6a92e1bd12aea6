//! Host board simulation.
//!
//! [`SimBoard`] backs every peripheral with a register model from
//! [`platform::mocks`]. [`Simulator`] stands in for the interrupt hardware:
//! it is the [`WaitHook`] the foreground spins on, and on each spin it
//! delivers at most one interrupt to the handlers, the way the controller
//! would between two polls of a flag.
//!
//! Delivery rules, checked in order:
//!
//! 1. Nothing is delivered unless IRQs are enabled and the global line is
//!    unmasked.
//! 2. A running playback timer with its line unmasked expires.
//! 3. With the keyboard line unmasked, the next scripted key is pressed,
//!    held for a few pin reads, and released after its handler returns.
//! 4. Otherwise the wait can never complete and the hook reports
//!    [`Stalled`].

use core::marker::PhantomData;

use embedded_hal::delay::DelayNs;
use platform::mocks::{
    KeypadSim, MockDisplay, PortGSim, SimIntcRegisters, SimTimerRegisters, DISPLAY_LOG,
};
use platform::{InterruptController, Key, KeyMatrix, Line, PortG, TimerBank};

use crate::board::{Board, Peripherals, Vault};
use crate::handlers::{Handlers, InterruptHandlers};
use crate::wait::{Stalled, WaitHook};

/// Keys a simulator can hold in its script.
pub const SCRIPT_LEN: usize = 64;

/// Timer expiries delivered before a simulator gives up.
pub const DEFAULT_TICK_BUDGET: usize = 1024;

/// PDATG reads a simulated key stays down for.
pub const DEFAULT_HOLD_READS: u32 = 3;

/// Delay that only accounts for the time requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimDelay {
    elapsed_ns: u64,
}

impl SimDelay {
    /// Zero elapsed.
    pub const fn new() -> Self {
        Self { elapsed_ns: 0 }
    }

    /// Total delay requested so far, in nanoseconds.
    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns = self.elapsed_ns.saturating_add(u64::from(ns));
    }
}

/// Board made of register models.
pub struct SimBoard<D = SimDelay>(PhantomData<D>);

impl<D: DelayNs> Board for SimBoard<D> {
    type Intc = SimIntcRegisters;
    type Timers = SimTimerRegisters;
    type Port = PortGSim;
    type Keypad = KeypadSim;
    type Display = MockDisplay;
    type Delay = D;
}

/// Power-on peripherals of a simulated board.
pub fn peripherals<D: DelayNs>(delay: D) -> Peripherals<SimBoard<D>> {
    Peripherals {
        intc: InterruptController::new(SimIntcRegisters::new()),
        timers: TimerBank::new(SimTimerRegisters::new()),
        port: PortG::new(PortGSim::new()),
        keypad: KeyMatrix::new(KeypadSim::new()),
        display: MockDisplay::new(),
        delay,
    }
}

/// Vault over a fresh simulated board with a [`SimDelay`].
pub fn vault() -> Vault<SimBoard> {
    Vault::new(peripherals(SimDelay::new()))
}

enum Event {
    Tick,
    Key(Key),
}

/// Interrupt dispatcher for a simulated board.
pub struct Simulator<'a, D: DelayNs = SimDelay> {
    handlers: Handlers<'a, SimBoard<D>>,
    script: heapless::Deque<Key, SCRIPT_LEN>,
    hold_reads: u32,
    tick_budget: usize,
    ticks: usize,
    key_events: usize,
}

impl<'a, D: DelayNs> Simulator<'a, D> {
    /// Dispatcher for `handlers` with an empty script.
    pub fn new(handlers: Handlers<'a, SimBoard<D>>) -> Self {
        Self {
            handlers,
            script: heapless::Deque::new(),
            hold_reads: DEFAULT_HOLD_READS,
            tick_budget: DEFAULT_TICK_BUDGET,
            ticks: 0,
            key_events: 0,
        }
    }

    /// Give up after `budget` timer expiries.
    #[must_use]
    pub fn with_tick_budget(mut self, budget: usize) -> Self {
        self.tick_budget = budget;
        self
    }

    /// Keep each key down for `reads` PDATG reads.
    #[must_use]
    pub fn with_hold_reads(mut self, reads: u32) -> Self {
        self.hold_reads = reads;
        self
    }

    /// Queue keys to press. Returns how many fit in the script.
    pub fn feed(&mut self, keys: impl IntoIterator<Item = Key>) -> usize {
        let mut queued = 0usize;
        for key in keys {
            if self.script.push_back(key).is_err() {
                break;
            }
            queued = queued.saturating_add(1);
        }
        queued
    }

    /// Queue the keys named by hex characters; other characters are skipped.
    pub fn type_str(&mut self, text: &str) -> usize {
        self.feed(text.bytes().filter_map(Key::from_ascii))
    }

    /// Scripted keys not yet pressed.
    pub fn pending_keys(&self) -> usize {
        self.script.len()
    }

    /// Timer expiries delivered so far.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Key events delivered so far.
    pub fn key_events(&self) -> usize {
        self.key_events
    }

    /// Vault the handlers operate on.
    pub fn vault(&self) -> &'a Vault<SimBoard<D>> {
        self.handlers.vault()
    }

    /// Digits shown on the simulated display so far.
    pub fn display_digits(&self) -> heapless::Vec<u8, DISPLAY_LOG> {
        critical_section::with(|cs| self.vault().peripherals(cs).borrow().display.digits())
    }

    fn next_event(&mut self) -> Option<Event> {
        let config = *self.handlers.config();
        let vault = self.handlers.vault();
        let ticks = self.ticks;
        let tick_budget = self.tick_budget;
        let hold_reads = self.hold_reads;
        let script = &mut self.script;

        critical_section::with(|cs| {
            let mut p = vault.peripherals(cs).borrow_mut();
            let unmasked = |p: &Peripherals<SimBoard<D>>, line: Line| {
                p.intc.is_enabled(line).unwrap_or(false)
            };

            if !p.intc.irq_enabled() || !unmasked(&p, Line::GLOBAL) {
                return None;
            }

            if p.timers.is_running(config.playback_timer) && unmasked(&p, config.timer_line) {
                if ticks >= tick_budget {
                    return None;
                }
                p.intc.registers_mut().raise(config.timer_line);
                return Some(Event::Tick);
            }

            if unmasked(&p, config.keyboard_line) {
                let key = script.pop_front()?;
                p.keypad.registers_mut().press(key);
                p.port.registers_mut().press(config.key_pin, hold_reads);
                p.intc.registers_mut().raise(config.keyboard_line);
                return Some(Event::Key(key));
            }

            None
        })
    }

    fn still_pending(&self, line: Line) -> bool {
        critical_section::with(|cs| {
            self.vault()
                .peripherals(cs)
                .borrow()
                .intc
                .is_pending(line)
                .unwrap_or(false)
        })
    }
}

impl<D: DelayNs> WaitHook for Simulator<'_, D> {
    fn idle(&mut self) -> Result<(), Stalled> {
        let config = *self.handlers.config();
        match self.next_event() {
            Some(Event::Tick) => {
                self.ticks = self.ticks.saturating_add(1);
                #[cfg(feature = "emulator")]
                tracing::debug!(tick = self.ticks, "timer expiry");
                self.handlers.on_timer_tick();
                if self.still_pending(config.timer_line) {
                    #[cfg(feature = "emulator")]
                    tracing::warn!("timer handler left its line pending");
                }
                Ok(())
            }
            Some(Event::Key(_key)) => {
                self.key_events = self.key_events.saturating_add(1);
                #[cfg(feature = "emulator")]
                tracing::debug!(key = _key.code(), "key press");
                self.handlers.on_key_event();
                critical_section::with(|cs| {
                    self.vault()
                        .peripherals(cs)
                        .borrow_mut()
                        .keypad
                        .registers_mut()
                        .release();
                });
                if self.still_pending(config.keyboard_line) {
                    #[cfg(feature = "emulator")]
                    tracing::warn!("key handler left its line pending");
                }
                Ok(())
            }
            None => {
                #[cfg(feature = "emulator")]
                tracing::debug!(
                    ticks = self.ticks,
                    pending_keys = self.script.len(),
                    "no deliverable interrupt"
                );
                Err(Stalled)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::setup;

    #[test]
    fn nothing_is_delivered_before_setup() {
        let vault = vault();
        let config = GameConfig::default();
        let mut sim = Simulator::new(Handlers::new(&vault, config));
        sim.type_str("12");
        assert_eq!(sim.idle(), Err(Stalled));
        assert_eq!(sim.pending_keys(), 2);
    }

    #[test]
    fn type_str_skips_non_hex() {
        let vault = vault();
        let mut sim = Simulator::new(Handlers::new(&vault, GameConfig::default()));
        assert_eq!(sim.type_str("1 2-x f"), 3);
    }

    #[test]
    fn key_handler_sees_press_and_release() {
        let vault = vault();
        let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
        let mut sim = Simulator::new(handlers).with_hold_reads(5);
        sim.type_str("abcdf");
        assert_eq!(game.read_user_input(&mut sim), Ok(4));
        assert_eq!(sim.key_events(), 5);
        critical_section::with(|cs| {
            let p = vault.peripherals(cs).borrow();
            assert!(!p.keypad.registers().is_pressed());
            assert!(!p.port.registers().is_held());
            // Two settle delays per key.
            assert_eq!(p.delay.elapsed_ns(), 5 * 2 * 20_000_000);
            // Every event acknowledged through the IRQ clear register.
            assert_eq!(p.intc.registers().irq_clears(), 5);
        });
    }

    #[test]
    fn tick_budget_bounds_a_runaway_timer() {
        let vault = vault();
        let (_game, handlers) = setup(&vault, GameConfig::default()).unwrap();
        critical_section::with(|cs| {
            vault.peripherals(cs).borrow_mut().timers.start(platform::Timer::T0);
        });
        let mut sim = Simulator::new(handlers).with_tick_budget(3);
        for _ in 0..3 {
            assert_eq!(sim.idle(), Ok(()));
        }
        assert_eq!(sim.idle(), Err(Stalled));
        assert_eq!(sim.ticks(), 3);
    }
}
