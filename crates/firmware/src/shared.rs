//! State shared between the foreground loop and the interrupt handlers.
//!
//! Ownership per phase:
//!
//! | Cell | Written by | Read by |
//! |------|------------|---------|
//! | `input_done` | key handler (set), foreground (clear) | foreground |
//! | `show_done` | tick handler (set), foreground (clear) | foreground |
//! | `show_watermark`, `target` | foreground, before arming playback | tick handler |
//! | ring | key handler (`put`), tick handler (`get`), foreground (`reset`) | |
//! | password / guess | tick handler | foreground, after `show_done` |
//!
//! Flags are `SeqCst` atomics. Everything else sits behind a
//! `critical_section::Mutex`; the foreground takes those only for short
//! accesses and never while it waits on a flag.

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use critical_section::{CriticalSection, Mutex};
use playback::{PlaybackEngine, RingBuffer};

use crate::config::{Code, CODE_LEN};

/// Destination of a playback run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// Played digits are stored as the password.
    Password,
    /// Played digits are stored as the guess.
    Guess,
}

/// Key codes captured from the matrix.
pub type KeyRing = RingBuffer<CODE_LEN>;

/// Flags, ring buffer and code buffers.
pub struct SharedState {
    input_done: AtomicBool,
    show_done: AtomicBool,
    show_watermark: AtomicUsize,
    target: Mutex<Cell<Option<Target>>>,
    ring: Mutex<RefCell<KeyRing>>,
    engine: Mutex<RefCell<PlaybackEngine>>,
    password: Mutex<Cell<Code>>,
    guess: Mutex<Cell<Code>>,
}

impl SharedState {
    /// Everything cleared.
    pub const fn new() -> Self {
        Self {
            input_done: AtomicBool::new(false),
            show_done: AtomicBool::new(false),
            show_watermark: AtomicUsize::new(0),
            target: Mutex::new(Cell::new(None)),
            ring: Mutex::new(RefCell::new(RingBuffer::new())),
            engine: Mutex::new(RefCell::new(PlaybackEngine::new())),
            password: Mutex::new(Cell::new([0; CODE_LEN])),
            guess: Mutex::new(Cell::new([0; CODE_LEN])),
        }
    }

    /// Clear every flag and buffer.
    pub fn reset(&self, cs: CriticalSection<'_>) {
        self.input_done.store(false, Ordering::SeqCst);
        self.show_done.store(false, Ordering::SeqCst);
        self.show_watermark.store(0, Ordering::SeqCst);
        self.target.borrow(cs).set(None);
        self.ring.borrow_ref_mut(cs).reset();
        *self.engine.borrow_ref_mut(cs) = PlaybackEngine::new();
        self.password.borrow(cs).set([0; CODE_LEN]);
        self.guess.borrow(cs).set([0; CODE_LEN]);
    }

    /// Set once the terminator key has been captured.
    pub fn input_done(&self) -> &AtomicBool {
        &self.input_done
    }

    /// Set once a playback run has emitted its watermark.
    pub fn show_done(&self) -> &AtomicBool {
        &self.show_done
    }

    /// Elements the current playback run emits.
    pub fn show_watermark(&self) -> usize {
        self.show_watermark.load(Ordering::SeqCst)
    }

    pub(crate) fn set_show_watermark(&self, watermark: usize) {
        self.show_watermark.store(watermark, Ordering::SeqCst);
    }

    /// Destination of the current playback run.
    pub fn target(&self, cs: CriticalSection<'_>) -> Option<Target> {
        self.target.borrow(cs).get()
    }

    pub(crate) fn set_target(&self, cs: CriticalSection<'_>, target: Option<Target>) {
        self.target.borrow(cs).set(target);
    }

    /// Capture ring buffer.
    pub fn ring<'cs>(&'cs self, cs: CriticalSection<'cs>) -> &'cs RefCell<KeyRing> {
        self.ring.borrow(cs)
    }

    pub(crate) fn engine<'cs>(&'cs self, cs: CriticalSection<'cs>) -> &'cs RefCell<PlaybackEngine> {
        self.engine.borrow(cs)
    }

    /// Code buffer written by a playback run targeting `target`.
    pub fn code(&self, cs: CriticalSection<'_>, target: Target) -> Code {
        self.code_cell(cs, target).get()
    }

    /// Store `value` at `offset` of the `target` buffer. Offsets past the
    /// buffer are dropped.
    pub(crate) fn store(&self, cs: CriticalSection<'_>, target: Target, offset: usize, value: u8) {
        let cell = self.code_cell(cs, target);
        let mut code = cell.get();
        if let Some(slot) = code.get_mut(offset) {
            *slot = value;
            cell.set(code);
        }
    }

    fn code_cell<'cs>(&'cs self, cs: CriticalSection<'cs>, target: Target) -> &'cs Cell<Code> {
        match target {
            Target::Password => self.password.borrow(cs),
            Target::Guess => self.guess.borrow(cs),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_writes_only_the_target_buffer() {
        let shared = SharedState::new();
        critical_section::with(|cs| {
            shared.store(cs, Target::Guess, 2, 9);
            shared.store(cs, Target::Guess, CODE_LEN, 7);
            assert_eq!(shared.code(cs, Target::Guess), [0, 0, 9, 0]);
            assert_eq!(shared.code(cs, Target::Password), [0; CODE_LEN]);
        });
    }

    #[test]
    fn reset_clears_flags_and_ring() {
        let shared = SharedState::new();
        shared.input_done().store(true, Ordering::SeqCst);
        shared.set_show_watermark(4);
        critical_section::with(|cs| {
            shared.ring(cs).borrow_mut().put(3);
            shared.set_target(cs, Some(Target::Password));
            shared.reset(cs);
            assert!(shared.ring(cs).borrow().is_empty());
            assert_eq!(shared.target(cs), None);
        });
        assert!(!shared.input_done().load(Ordering::SeqCst));
        assert_eq!(shared.show_watermark(), 0);
    }
}
