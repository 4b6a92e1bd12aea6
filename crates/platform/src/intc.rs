//! Interrupt controller driver.
//!
//! The S3C44B0X controller has 26 source lines plus a global mask bit
//! (line 26). Each line is either IRQ- or FIQ-routed (INTMOD) and either
//! masked or unmasked (INTMSK). INTCON holds the global IRQ/FIQ enables and
//! the vectored-dispatch switch, all active low.
//!
//! A handler must [`acknowledge`](InterruptController::acknowledge) its line
//! as its last step; the pending bit otherwise stays set and the line fires
//! again as soon as the handler returns.

use crate::error::HalError;
use crate::regs::{bit, Registers};

/// INTCON: global configuration.
pub const INTCON: usize = 0x00;
/// INTPND: pending lines.
pub const INTPND: usize = 0x04;
/// INTMOD: 1 = FIQ, 0 = IRQ.
pub const INTMOD: usize = 0x08;
/// INTMSK: 1 = masked.
pub const INTMSK: usize = 0x0C;
/// I_ISPC: write 1 to clear an IRQ-routed pending bit.
pub const I_ISPC: usize = 0x24;
/// F_ISPC: write 1 to clear a FIQ-routed pending bit.
pub const F_ISPC: usize = 0x3C;

/// INTCON bit 2: 1 = non-vectored IRQ dispatch.
const INTCON_NON_VECTORED: u32 = bit(2);
/// INTCON bit 1: 1 = IRQ disabled.
const INTCON_IRQ_DISABLE: u32 = bit(1);
/// INTCON bit 0: 1 = FIQ disabled.
const INTCON_FIQ_DISABLE: u32 = bit(0);

/// Number of addressable lines, global bit included.
pub const LINE_COUNT: u8 = 27;

/// Mask covering every line bit.
pub const ALL_LINES: u32 = 0x07FF_FFFF;

/// Interrupt line number.
///
/// Not validated at construction: every controller operation range-checks
/// the line and fails with [`HalError::InvalidLine`] before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line(u8);

impl Line {
    /// Timer 0 expiry.
    pub const TIMER0: Self = Self(13);
    /// Timer 1 expiry.
    pub const TIMER1: Self = Self(12);
    /// External interrupt 1 (key matrix).
    pub const EINT1: Self = Self(24);
    /// External interrupt 0.
    pub const EINT0: Self = Self(25);
    /// Global mask bit; unmasking it is required for any line to fire.
    pub const GLOBAL: Self = Self(26);

    /// Line with raw number `n`.
    pub const fn new(n: u8) -> Self {
        Self(n)
    }

    /// Raw line number.
    pub const fn number(self) -> u8 {
        self.0
    }

    fn mask(self) -> Result<u32, HalError> {
        if self.0 < LINE_COUNT {
            Ok(bit(u32::from(self.0)))
        } else {
            Err(HalError::InvalidLine(self.0))
        }
    }
}

/// Line routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineMode {
    /// Normal interrupt request.
    Irq,
    /// Fast interrupt request.
    Fiq,
}

/// Interrupt controller over its register bank.
pub struct InterruptController<R> {
    regs: R,
}

impl<R: Registers> InterruptController<R> {
    /// Wrap a register bank. Registers are left untouched; call
    /// [`reset`](Self::reset) before use.
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

    /// All lines IRQ-routed and masked, non-vectored, IRQ and FIQ disabled.
    pub fn reset(&mut self) {
        self.regs.write(INTMOD, 0);
        self.regs
            .write(INTCON, INTCON_NON_VECTORED | INTCON_IRQ_DISABLE | INTCON_FIQ_DISABLE);
        self.regs.write(INTMSK, ALL_LINES);
    }

    /// Enable or disable IRQ delivery and select vectored dispatch.
    pub fn configure_global(&mut self, irq_enable: bool, vectored: bool) {
        self.regs.modify(INTCON, |mut v| {
            if vectored {
                v &= !INTCON_NON_VECTORED;
            } else {
                v |= INTCON_NON_VECTORED;
            }
            if irq_enable {
                v &= !INTCON_IRQ_DISABLE;
            } else {
                v |= INTCON_IRQ_DISABLE;
            }
            v
        });
    }

    /// Enable or disable FIQ delivery.
    pub fn configure_fiq(&mut self, enable: bool) {
        if enable {
            self.regs.clear_bits(INTCON, INTCON_FIQ_DISABLE);
        } else {
            self.regs.set_bits(INTCON, INTCON_FIQ_DISABLE);
        }
    }

    /// Route `line` to IRQ or FIQ.
    pub fn set_line_mode(&mut self, line: Line, mode: LineMode) -> Result<(), HalError> {
        let mask = line.mask()?;
        match mode {
            LineMode::Irq => self.regs.clear_bits(INTMOD, mask),
            LineMode::Fiq => self.regs.set_bits(INTMOD, mask),
        }
        Ok(())
    }

    /// Unmask `line`. Idempotent.
    pub fn enable(&mut self, line: Line) -> Result<(), HalError> {
        let mask = line.mask()?;
        self.regs.clear_bits(INTMSK, mask);
        Ok(())
    }

    /// Mask `line`. Idempotent.
    pub fn disable(&mut self, line: Line) -> Result<(), HalError> {
        let mask = line.mask()?;
        self.regs.set_bits(INTMSK, mask);
        Ok(())
    }

    /// Clear the pending-service bit of `line` through the clear register
    /// matching its routing.
    pub fn acknowledge(&mut self, line: Line) -> Result<(), HalError> {
        let mask = line.mask()?;
        if self.regs.read(INTMOD) & mask == 0 {
            self.regs.write(I_ISPC, mask);
        } else {
            self.regs.write(F_ISPC, mask);
        }
        Ok(())
    }

    /// `true` when `line` is unmasked.
    pub fn is_enabled(&self, line: Line) -> Result<bool, HalError> {
        let mask = line.mask()?;
        Ok(self.regs.read(INTMSK) & mask == 0)
    }

    /// `true` when `line` has a pending request.
    pub fn is_pending(&self, line: Line) -> Result<bool, HalError> {
        let mask = line.mask()?;
        Ok(self.regs.read(INTPND) & mask != 0)
    }

    /// Current routing of `line`.
    pub fn line_mode(&self, line: Line) -> Result<LineMode, HalError> {
        let mask = line.mask()?;
        Ok(if self.regs.read(INTMOD) & mask == 0 {
            LineMode::Irq
        } else {
            LineMode::Fiq
        })
    }

    /// `true` when IRQ delivery is globally enabled.
    pub fn irq_enabled(&self) -> bool {
        self.regs.read(INTCON) & INTCON_IRQ_DISABLE == 0
    }

    /// `true` when FIQ delivery is globally enabled.
    pub fn fiq_enabled(&self) -> bool {
        self.regs.read(INTCON) & INTCON_FIQ_DISABLE == 0
    }

    /// `true` in vectored dispatch mode.
    pub fn is_vectored(&self) -> bool {
        self.regs.read(INTCON) & INTCON_NON_VECTORED == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::SimIntcRegisters;

    fn intc() -> InterruptController<SimIntcRegisters> {
        let mut ic = InterruptController::new(SimIntcRegisters::new());
        ic.reset();
        ic
    }

    #[test]
    fn reset_masks_everything_and_disables_delivery() {
        let ic = intc();
        assert!(!ic.irq_enabled());
        assert!(!ic.fiq_enabled());
        assert!(!ic.is_vectored());
        for n in 0..LINE_COUNT {
            assert!(!ic.is_enabled(Line::new(n)).unwrap());
            assert_eq!(ic.line_mode(Line::new(n)).unwrap(), LineMode::Irq);
        }
    }

    #[test]
    fn configure_global_sets_irq_and_vectored() {
        let mut ic = intc();
        ic.configure_global(true, true);
        ic.configure_fiq(false);
        assert!(ic.irq_enabled());
        assert!(ic.is_vectored());
        assert!(!ic.fiq_enabled());

        ic.configure_global(false, false);
        assert!(!ic.irq_enabled());
        assert!(!ic.is_vectored());
    }

    #[test]
    fn enable_and_disable_are_idempotent() {
        let mut ic = intc();
        ic.enable(Line::EINT1).unwrap();
        ic.enable(Line::EINT1).unwrap();
        assert!(ic.is_enabled(Line::EINT1).unwrap());
        assert!(!ic.is_enabled(Line::TIMER0).unwrap());

        ic.disable(Line::EINT1).unwrap();
        ic.disable(Line::EINT1).unwrap();
        assert!(!ic.is_enabled(Line::EINT1).unwrap());
    }

    #[test]
    fn out_of_range_line_fails_without_side_effects() {
        let mut ic = intc();
        let before = ic.registers().snapshot();
        assert_eq!(ic.enable(Line::new(27)), Err(HalError::InvalidLine(27)));
        assert_eq!(ic.disable(Line::new(40)), Err(HalError::InvalidLine(40)));
        assert_eq!(
            ic.set_line_mode(Line::new(200), LineMode::Fiq),
            Err(HalError::InvalidLine(200))
        );
        assert_eq!(ic.acknowledge(Line::new(27)), Err(HalError::InvalidLine(27)));
        assert_eq!(ic.registers().snapshot(), before);
    }

    #[test]
    fn acknowledge_uses_clear_register_of_routing() {
        let mut ic = intc();
        ic.registers_mut().raise(Line::TIMER0);
        ic.registers_mut().raise(Line::EINT1);
        ic.set_line_mode(Line::EINT1, LineMode::Fiq).unwrap();

        ic.acknowledge(Line::TIMER0).unwrap();
        assert!(!ic.is_pending(Line::TIMER0).unwrap());
        assert!(ic.is_pending(Line::EINT1).unwrap());
        assert_eq!(ic.registers().irq_clears(), 1);

        ic.acknowledge(Line::EINT1).unwrap();
        assert!(!ic.is_pending(Line::EINT1).unwrap());
        assert_eq!(ic.registers().fiq_clears(), 1);
    }
}
