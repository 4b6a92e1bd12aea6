//! Board configuration and constants
//!
//! Central register map and wiring of the S3C44B0X development board. Drivers
//! take register offsets relative to the bases below; firmware wiring takes
//! pin and line numbers from here rather than hardcoding values.

/// The application name
pub const APP_NAME: &str = "Keypad Vault";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main clock feeding the timer prescalers, in Hz.
pub const MCLK_HZ: u32 = 64_000_000;

// ── Register block bases ────────────────────────────────────────────────────

/// Interrupt controller (INTCON).
pub const INTC_BASE: usize = 0x01E0_0000;

/// PWM timers (TCFG0).
pub const TIMER_BASE: usize = 0x01D5_0000;

/// Port G control register (PCONG). Port G data, pull-up and the external
/// interrupt registers follow it.
pub const PORTG_BASE: usize = 0x01D2_0040;

/// Key-matrix bus window (nGCS3).
pub const KEYPAD_BASE: usize = 0x0600_0000;

/// 8-segment display latch.
pub const SEGMENT_BASE: usize = 0x0214_0000;

/// UART0 (ULCON0), the defmt log channel.
pub const UART0_BASE: usize = 0x01D0_0000;

/// Port E control register (PCONE); carries the UART0 pins.
pub const PORTE_BASE: usize = 0x01D2_0028;

/// Start of the RAM interrupt vector table the board monitor dispatches
/// through. Entry for interrupt line `n` sits at `0x20 + 4 * n`.
pub const ISR_TABLE_BASE: usize = 0x0C7F_FF00;

/// Offset of the first per-line entry in the ISR table.
pub const ISR_LINE_ENTRIES: usize = 0x20;

// ── Wiring ──────────────────────────────────────────────────────────────────

/// Port G pin carrying the key-matrix "any key down" signal (EINT1).
pub const KEYPAD_PIN: u8 = 1;
