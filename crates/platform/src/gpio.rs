//! GPIO port G driver
//!
//! Port G carries the push buttons and the key-matrix interrupt line. Each
//! of its eight pins has a two-bit function field in PCONG, a data bit in
//! PDATG, an active-low pull-up disable bit in PUPG and a four-bit trigger
//! field in EXTINT.

use crate::error::HalError;
use crate::regs::{bit, Registers};

/// PCONG: two bits per pin.
pub const PCONG: usize = 0x00;
/// PDATG: pin levels.
pub const PDATG: usize = 0x04;
/// PUPG: 1 = pull-up disabled.
pub const PUPG: usize = 0x08;
/// EXTINT: external interrupt trigger, four bits per pin.
pub const EXTINT: usize = 0x10;

/// Highest pin number on port G.
pub const MAX_PIN: u8 = 7;

/// Pin function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Digital input.
    Input,
    /// Digital output.
    Output,
    /// Alternate function output.
    Function,
    /// External interrupt source.
    Eint,
}

impl PinMode {
    const fn bits(self) -> u32 {
        match self {
            Self::Input => 0b00,
            Self::Output => 0b01,
            Self::Function => 0b10,
            Self::Eint => 0b11,
        }
    }

    const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => Self::Input,
            0b01 => Self::Output,
            0b10 => Self::Function,
            _ => Self::Eint,
        }
    }
}

/// Pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    /// High (logic 1)
    High,
    /// Low (logic 0)
    Low,
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<PinState> for bool {
    fn from(value: PinState) -> Self {
        matches!(value, PinState::High)
    }
}

/// External interrupt trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// While the pin is low
    LowLevel,
    /// While the pin is high
    HighLevel,
    /// Trigger on falling edge
    FallingEdge,
    /// Trigger on rising edge
    RisingEdge,
    /// Trigger on both edges
    BothEdges,
}

impl Trigger {
    const fn bits(self) -> u32 {
        match self {
            Self::LowLevel => 0x0,
            Self::HighLevel => 0x1,
            Self::FallingEdge => 0x2,
            Self::RisingEdge => 0x4,
            Self::BothEdges => 0x6,
        }
    }
}

/// Port G over its register block.
pub struct PortG<R> {
    regs: R,
}

#[allow(clippy::arithmetic_side_effects)] // pin <= 7 checked before every shift
impl<R: Registers> PortG<R> {
    /// Wrap a register bank.
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Borrow the register bank.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Mutably borrow the register bank.
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    fn check(pin: u8) -> Result<u32, HalError> {
        if pin > MAX_PIN {
            Err(HalError::InvalidPin(pin))
        } else {
            Ok(u32::from(pin))
        }
    }

    /// Select the function of `pin`.
    pub fn configure(&mut self, pin: u8, mode: PinMode) -> Result<(), HalError> {
        let shift = Self::check(pin)? * 2;
        self.regs.write_field(PCONG, 0b11 << shift, mode.bits() << shift);
        Ok(())
    }

    /// Current function of `pin`.
    pub fn mode(&self, pin: u8) -> Result<PinMode, HalError> {
        let shift = Self::check(pin)? * 2;
        Ok(PinMode::from_bits(self.regs.read(PCONG) >> shift))
    }

    /// Sample `pin`. The pin must be an input or an interrupt source.
    pub fn read(&self, pin: u8) -> Result<PinState, HalError> {
        let n = Self::check(pin)?;
        match self.mode(pin)? {
            PinMode::Input | PinMode::Eint => {
                Ok(PinState::from(self.regs.read(PDATG) & bit(n) != 0))
            }
            PinMode::Output | PinMode::Function => Err(HalError::WrongPinMode(pin)),
        }
    }

    /// Drive `pin`. The pin must be an output.
    pub fn write(&mut self, pin: u8, state: PinState) -> Result<(), HalError> {
        let n = Self::check(pin)?;
        if self.mode(pin)? != PinMode::Output {
            return Err(HalError::WrongPinMode(pin));
        }
        match state {
            PinState::High => self.regs.set_bits(PDATG, bit(n)),
            PinState::Low => self.regs.clear_bits(PDATG, bit(n)),
        }
        Ok(())
    }

    /// Enable or disable the internal pull-up of `pin`.
    pub fn configure_pullup(&mut self, pin: u8, enable: bool) -> Result<(), HalError> {
        let n = Self::check(pin)?;
        if enable {
            self.regs.clear_bits(PUPG, bit(n));
        } else {
            self.regs.set_bits(PUPG, bit(n));
        }
        Ok(())
    }

    /// Select the external interrupt trigger of `pin`.
    pub fn configure_edge_trigger(&mut self, pin: u8, trigger: Trigger) -> Result<(), HalError> {
        let shift = Self::check(pin)? * 4;
        self.regs
            .write_field(EXTINT, 0xF << shift, trigger.bits() << shift);
        Ok(())
    }
}
