//! S3C44B0X board support.
//!
//! Everything that only exists on the real board: memory-mapped register
//! banks, the busy-wait delay, the critical-section implementation, the
//! defmt transport and the interrupt vector glue.

pub mod cpsr;
pub mod logger;
pub mod vectors;

use embedded_hal::delay::DelayNs;
use platform::config::{INTC_BASE, KEYPAD_BASE, MCLK_HZ, PORTG_BASE, SEGMENT_BASE, TIMER_BASE};
use platform::{InterruptController, KeyMatrix, Mmio, PortG, Segment8, TimerBank};

use crate::board::{Board, Peripherals};

/// The development board.
pub struct S3c44b0x;

impl Board for S3c44b0x {
    type Intc = Mmio;
    type Timers = Mmio;
    type Port = Mmio;
    type Keypad = Mmio;
    type Display = Segment8<Mmio>;
    type Delay = SpinDelay;
}

impl S3c44b0x {
    /// Bind every peripheral to its register block.
    ///
    /// # Safety
    ///
    /// Must be called at most once: the returned set assumes exclusive
    /// ownership of the register blocks.
    pub unsafe fn peripherals() -> Peripherals<Self> {
        // SAFETY: the bases are the board's register blocks and the caller
        // guarantees this is the only binding.
        unsafe {
            Peripherals {
                intc: InterruptController::new(Mmio::new(INTC_BASE)),
                timers: TimerBank::new(Mmio::new(TIMER_BASE)),
                port: PortG::new(Mmio::new(PORTG_BASE)),
                keypad: KeyMatrix::new(Mmio::new(KEYPAD_BASE)),
                display: Segment8::new(Mmio::new(SEGMENT_BASE)),
                delay: SpinDelay,
            }
        }
    }
}

/// CPU cycles one iteration of the delay loop takes (`nop`, `subs`, `bne`).
const CYCLES_PER_ITERATION: u64 = 5;

/// Busy-wait delay calibrated against MCLK.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl DelayNs for SpinDelay {
    #[allow(clippy::arithmetic_side_effects)] // constant non-zero divisors
    fn delay_ns(&mut self, ns: u32) {
        let cycles = u64::from(ns).saturating_mul(u64::from(MCLK_HZ / 1_000_000)) / 1000;
        for _ in 0..cycles / CYCLES_PER_ITERATION {
            // SAFETY: `nop` has no effects; it keeps the loop from being
            // optimized away.
            unsafe { core::arch::asm!("nop", options(nomem, nostack, preserves_flags)) };
        }
    }
}

/// Stop here forever with interrupts still serviced.
pub fn park() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
