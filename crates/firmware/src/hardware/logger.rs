//! defmt global logger over UART0.
//!
//! Frames are written with polled transmits at 115200 8N1. Each frame is
//! emitted inside a critical section, so log lines from a handler never
//! interleave with foreground ones.

use core::sync::atomic::{AtomicBool, Ordering};

use platform::config::{MCLK_HZ, PORTE_BASE, UART0_BASE};
use platform::regs::{bit, Registers};
use platform::Mmio;

const ULCON: usize = 0x00;
const UCON: usize = 0x04;
const UFCON: usize = 0x08;
const UMCON: usize = 0x0C;
const UTRSTAT: usize = 0x10;
const UTXH: usize = 0x20;
const UBRDIV: usize = 0x28;

/// UTRSTAT bit 1: transmit buffer empty.
const TX_EMPTY: u32 = bit(1);

/// Port E PCONE fields of TxD0 (bits 3:2) and RxD0 (bits 5:4).
const PCONE_UART0_MASK: u32 = 0xF << 2;
const PCONE_UART0_FUNC: u32 = (0b10 << 2) | (0b10 << 4);

const BAUD: u32 = 115_200;

fn uart() -> Mmio {
    // SAFETY: UART0 is used by nothing but this logger.
    unsafe { Mmio::new(UART0_BASE) }
}

/// Configure UART0 for logging. Call once before the first log line.
#[allow(clippy::arithmetic_side_effects)] // constant divisor
pub fn init() {
    // SAFETY: PCONE is only touched here, before interrupts are enabled.
    let mut porte = unsafe { Mmio::new(PORTE_BASE) };
    porte.write_field(0, PCONE_UART0_MASK, PCONE_UART0_FUNC);

    let mut regs = uart();
    regs.write(UFCON, 0);
    regs.write(UMCON, 0);
    // 8 data bits, no parity, one stop bit.
    regs.write(ULCON, 0b11);
    // Polled transmit and receive.
    regs.write(UCON, 0b0101);
    regs.write(UBRDIV, (MCLK_HZ + BAUD * 8) / (BAUD * 16) - 1);
}

fn write_bytes(bytes: &[u8]) {
    let mut regs = uart();
    for &b in bytes {
        while regs.read(UTRSTAT) & TX_EMPTY == 0 {}
        regs.write(UTXH, u32::from(b));
    }
}

#[defmt::global_logger]
struct Logger;

static TAKEN: AtomicBool = AtomicBool::new(false);
static mut RESTORE: critical_section::RestoreState = critical_section::RestoreState::invalid();
static mut ENCODER: defmt::Encoder = defmt::Encoder::new();

// SAFETY: acquire/release bracket every frame inside a critical section and
// `TAKEN` rejects re-entry, so the statics are never aliased.
unsafe impl defmt::Logger for Logger {
    fn acquire() {
        // SAFETY: released in `release`.
        let restore = unsafe { critical_section::acquire() };
        if TAKEN.load(Ordering::SeqCst) {
            // Logging from inside a log call.
            super::park();
        }
        TAKEN.store(true, Ordering::SeqCst);
        // SAFETY: exclusive while TAKEN is set.
        unsafe {
            RESTORE = restore;
            (*core::ptr::addr_of_mut!(ENCODER)).start_frame(write_bytes);
        }
    }

    unsafe fn flush() {}

    unsafe fn release() {
        // SAFETY: called after a successful `acquire`.
        unsafe {
            (*core::ptr::addr_of_mut!(ENCODER)).end_frame(write_bytes);
            TAKEN.store(false, Ordering::SeqCst);
            critical_section::release(RESTORE);
        }
    }

    unsafe fn write(bytes: &[u8]) {
        // SAFETY: called between `acquire` and `release`.
        unsafe { (*core::ptr::addr_of_mut!(ENCODER)).write(bytes, write_bytes) };
    }
}
