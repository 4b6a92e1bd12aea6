//! Keypad Vault Firmware
//!
//! Password challenge/response game for the S3C44B0X development board:
//! type a code on the 4×4 key pad, watch it played back on the segment
//! display, then guess it.
//!
//! # Architecture
//!
//! This firmware follows a layered architecture:
//!
//! ```text
//! Foreground (game::Game FSM, flag polling via wait::wait_until)
//!         ↕  shared::SharedState (atomics + critical-section cells)
//! Interrupt handlers (handlers::Handlers: key event, timer tick)
//!         ↓
//! Board abstraction (board::Board, board::Peripherals)
//!         ↓
//! Platform HAL (platform crate drivers over Mmio or register models)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the S3C44B0X target (armv4t, defmt over UART0)
//! - `emulator` - Build the host game (`tracing` logs)
//! - `std` - Enable standard library (for emulator and testing)
//! - `defmt` - defmt logging and `defmt::Format` derives
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target armv4t-none-eabi --features hardware
//! ```
//!
//! ## Emulator Target
//!
//! ```bash
//! cargo run --example host_game --features emulator -- 1234f 9999f 1234f
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]

pub mod board;
pub mod config;
pub mod game;
pub mod handlers;
pub mod shared;
pub mod sim;
pub mod wait;

#[cfg(feature = "hardware")]
pub mod hardware;

pub use board::{Board, Peripherals, Vault};
pub use config::{GameConfig, CODE_LEN};
pub use game::{setup, Game, GameState};
pub use handlers::{Handlers, InterruptHandlers};
pub use shared::{SharedState, Target};
pub use wait::{wait_until, SpinWait, Stalled, WaitHook};

use platform::HalError;

/// Errors raised while wiring the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirmwareError {
    /// A peripheral rejected its configuration.
    Hal(HalError),
}

impl From<HalError> for FirmwareError {
    fn from(e: HalError) -> Self {
        Self::Hal(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FirmwareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Hal(e) => Some(e),
        }
    }
}

impl core::fmt::Display for FirmwareError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Hal(e) => write!(f, "board setup failed: {e}"),
        }
    }
}
