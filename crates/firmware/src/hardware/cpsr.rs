//! `critical-section` implementation for a single ARM7TDMI core.
//!
//! Acquire masks IRQ and FIQ in CPSR (bits 7:6) and returns the previous CPSR control
//! byte; release writes it back, so nested sections and sections entered
//! from an interrupt handler (where IRQ is already masked) restore exactly
//! the state they found.

use core::arch::asm;

struct CpsrCriticalSection;
critical_section::set_impl!(CpsrCriticalSection);

// SAFETY: single core; masking IRQ and FIQ excludes every other context.
unsafe impl critical_section::Impl for CpsrCriticalSection {
    unsafe fn acquire() -> u32 {
        let cpsr: u32;
        // SAFETY: privileged mode; only the I/F bits change.
        unsafe {
            asm!(
                "mrs {cpsr}, cpsr",
                "orr {tmp}, {cpsr}, #0xC0",
                "msr cpsr_c, {tmp}",
                cpsr = out(reg) cpsr,
                tmp = out(reg) _,
                options(nomem, nostack, preserves_flags),
            );
        }
        cpsr
    }

    unsafe fn release(cpsr: u32) {
        // SAFETY: `cpsr` came from `acquire` in the same mode.
        unsafe {
            asm!(
                "msr cpsr_c, {cpsr}",
                cpsr = in(reg) cpsr,
                options(nomem, nostack, preserves_flags),
            );
        }
    }
}
