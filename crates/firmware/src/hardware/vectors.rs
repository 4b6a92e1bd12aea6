//! Startup and interrupt vector glue.
//!
//! The boot monitor dispatches every IRQ line through a RAM table at
//! [`ISR_TABLE_BASE`]: the entry for line `n` sits at
//! `ISR_TABLE_BASE + ISR_LINE_ENTRIES + 4 * n` and is jumped to in IRQ
//! mode with `lr_irq` pointing one instruction past the interrupted one.
//! [`install`] writes the two trampolines below into their entries; each
//! saves the caller-saved registers, calls the Rust dispatch function and
//! returns by reloading `pc` and CPSR from the saved frame.

use core::cell::Cell;

use critical_section::Mutex;
use platform::config::{ISR_LINE_ENTRIES, ISR_TABLE_BASE};
use platform::Line;

use super::S3c44b0x;
use crate::handlers::{Handlers, InterruptHandlers};

static HANDLERS: Mutex<Cell<Option<Handlers<'static, S3c44b0x>>>> = Mutex::new(Cell::new(None));

extern "C" {
    fn key_irq_entry();
    fn timer_irq_entry();
}

core::arch::global_asm!(
    r#"
    .section .text.vectors, "ax"
    .arm
    .global key_irq_entry
key_irq_entry:
    sub     lr, lr, #4
    stmfd   sp!, {{r0-r3, r12, lr}}
    bl      key_irq_dispatch
    ldmfd   sp!, {{r0-r3, r12, pc}}^

    .global timer_irq_entry
timer_irq_entry:
    sub     lr, lr, #4
    stmfd   sp!, {{r0-r3, r12, lr}}
    bl      timer_irq_dispatch
    ldmfd   sp!, {{r0-r3, r12, pc}}^

    .section .text.start, "ax"
    .global _start
_start:
    @ IRQ mode stack, interrupts masked.
    msr     cpsr_c, #0xD2
    ldr     sp, =_irq_stack_top
    @ SVC mode stack, interrupts masked until the game unmasks its lines.
    msr     cpsr_c, #0xD3
    ldr     sp, =_svc_stack_top

    @ Zero .bss.
    ldr     r0, =__sbss
    ldr     r1, =__ebss
    mov     r2, #0
1:
    cmp     r0, r1
    strlo   r2, [r0], #4
    blo     1b

    @ Unmask IRQ in CPSR; the controller still gates every line.
    msr     cpsr_c, #0x53
    bl      Main
2:
    b       2b
"#
);

/// Table entry for `line`.
#[allow(clippy::arithmetic_side_effects)] // line < 27, inside the table
fn entry(line: Line) -> *mut usize {
    (ISR_TABLE_BASE + ISR_LINE_ENTRIES + 4 * usize::from(line.number())) as *mut usize
}

/// Hand `handlers` to the dispatch functions and point the key and timer
/// table entries at their trampolines.
pub fn install(handlers: Handlers<'static, S3c44b0x>) {
    let config = *handlers.config();
    critical_section::with(|cs| {
        HANDLERS.borrow(cs).set(Some(handlers));
        // SAFETY: the table is reserved RAM owned by this firmware; the
        // writes happen with interrupts masked.
        unsafe {
            entry(config.keyboard_line).write_volatile(key_irq_entry as usize);
            entry(config.timer_line).write_volatile(timer_irq_entry as usize);
        }
    });
    #[cfg(feature = "defmt")]
    defmt::debug!(
        "vectors installed: key line {=u8}, timer line {=u8}",
        config.keyboard_line.number(),
        config.timer_line.number()
    );
}

fn installed() -> Option<Handlers<'static, S3c44b0x>> {
    critical_section::with(|cs| HANDLERS.borrow(cs).get())
}

#[no_mangle]
extern "C" fn key_irq_dispatch() {
    match installed() {
        Some(handlers) => handlers.on_key_event(),
        None => {
            #[cfg(feature = "defmt")]
            defmt::warn!("key interrupt before install");
        }
    }
}

#[no_mangle]
extern "C" fn timer_irq_dispatch() {
    match installed() {
        Some(handlers) => handlers.on_timer_tick(),
        None => {
            #[cfg(feature = "defmt")]
            defmt::warn!("timer interrupt before install");
        }
    }
}
