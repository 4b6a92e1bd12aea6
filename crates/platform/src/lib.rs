//! Hardware Abstraction Layer (HAL) for the key-pad vault board
//!
//! This crate provides register-level abstractions for the S3C44B0X
//! peripherals the vault firmware drives, enabling development and testing
//! without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: game FSM + event handlers)
//!         ↓
//! Feature Layers (playback: ring buffer, tick engine)
//!         ↓
//! Platform HAL (this crate - peripheral drivers over `Registers`)
//!         ↓
//! Hardware Layer (memory-mapped registers, or host register models)
//! ```
//!
//! # Peripherals
//!
//! - [`intc`] - Interrupt controller (masking, IRQ/FIQ routing, acknowledge)
//! - [`timer`] - Six PWM timers with shared prescalers
//! - [`gpio`] - Port G pin configuration and external interrupt triggers
//! - [`keypad`] - 4×4 key-matrix decoder
//! - [`display`] - 8-segment display
//!
//! Every driver is generic over [`Registers`]; on the board the backing
//! implementation is [`Mmio`], on the host the [`mocks`] register models.
//!
//! # Features
//!
//! - `std`: Enable standard library support (host tests, simulator)
//! - `defmt`: Enable defmt derives on public types
//!
//! # Example
//!
//! ```
//! use platform::mocks::SimTimerRegisters;
//! use platform::timer::{Mode, Period, Timer, TimerBank};
//!
//! let mut timers = TimerBank::new(SimTimerRegisters::new());
//! timers.configure_period(Timer::T0, Period::OneSec, Mode::Reload).unwrap();
//! assert_eq!(timers.live_count(Timer::T0), 31_250);
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)]
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod display;
pub mod error;
pub mod gpio;
pub mod intc;
pub mod keypad;
pub mod mocks;
pub mod regs;
pub mod timer;

pub use display::{Glyph, Segment8, SegmentDisplay};
pub use error::HalError;
pub use gpio::{PinMode, PinState, PortG, Trigger};
pub use intc::{InterruptController, Line, LineMode};
pub use keypad::{Key, KeyMatrix};
pub use regs::{Mmio, Registers};
pub use timer::{Divider, Mode, Period, Timer, TimerBank};
