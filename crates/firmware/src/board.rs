//! Board abstraction.
//!
//! A [`Board`] names the register banks and collaborators the game drives.
//! The firmware owns them as one [`Peripherals`] set inside a [`Vault`],
//! together with the [`SharedState`]; both the foreground loop and the
//! interrupt handlers borrow the same vault.

use core::cell::RefCell;

use critical_section::{CriticalSection, Mutex};
use embedded_hal::delay::DelayNs;
use platform::{InterruptController, KeyMatrix, PortG, Registers, SegmentDisplay, TimerBank};

use crate::shared::SharedState;

/// Register banks and collaborators of one board.
pub trait Board {
    /// Interrupt controller registers.
    type Intc: Registers;
    /// Timer bank registers.
    type Timers: Registers;
    /// Port G registers.
    type Port: Registers;
    /// Key-matrix bus window.
    type Keypad: Registers;
    /// Segment display.
    type Display: SegmentDisplay;
    /// Busy-wait delay.
    type Delay: DelayNs;
}

/// Every peripheral the game touches.
pub struct Peripherals<B: Board> {
    /// Interrupt controller.
    pub intc: InterruptController<B::Intc>,
    /// PWM timers.
    pub timers: TimerBank<B::Timers>,
    /// GPIO port G.
    pub port: PortG<B::Port>,
    /// Key matrix.
    pub keypad: KeyMatrix<B::Keypad>,
    /// Segment display.
    pub display: B::Display,
    /// Settle delays.
    pub delay: B::Delay,
}

/// Peripherals plus shared state, borrowed by the game and its handlers.
pub struct Vault<B: Board> {
    peripherals: Mutex<RefCell<Peripherals<B>>>,
    shared: SharedState,
}

impl<B: Board> Vault<B> {
    /// Take ownership of the board's peripherals.
    pub const fn new(peripherals: Peripherals<B>) -> Self {
        Self {
            peripherals: Mutex::new(RefCell::new(peripherals)),
            shared: SharedState::new(),
        }
    }

    /// Peripheral set. Borrow it for as short as possible.
    pub fn peripherals<'cs>(&'cs self, cs: CriticalSection<'cs>) -> &'cs RefCell<Peripherals<B>> {
        self.peripherals.borrow(cs)
    }

    /// Flags and buffers.
    pub fn shared(&self) -> &SharedState {
        &self.shared
    }
}
