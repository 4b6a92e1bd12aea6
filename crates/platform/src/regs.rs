//! Register access abstraction.
//!
//! Peripheral drivers never touch raw pointers. They address registers by
//! byte offset from their peripheral base through [`Registers`], which is
//! implemented by [`Mmio`] on the board and by the register models in
//! [`crate::mocks`] on the host.

/// Word-wide register bank addressed by byte offset.
pub trait Registers {
    /// Read the 32-bit register at `offset`.
    fn read(&self, offset: usize) -> u32;

    /// Write the 32-bit register at `offset`.
    fn write(&mut self, offset: usize, value: u32);

    /// Read a byte-wide register at `offset`.
    ///
    /// The key matrix is wired on the 8-bit bus; banks that can decode byte
    /// accesses override this.
    #[allow(clippy::cast_possible_truncation)] // low byte is the register
    fn read_byte(&self, offset: usize) -> u8 {
        (self.read(offset) & 0xFF) as u8
    }

    /// Read-modify-write.
    fn modify(&mut self, offset: usize, f: impl FnOnce(u32) -> u32) {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Set every bit of `mask`.
    fn set_bits(&mut self, offset: usize, mask: u32) {
        self.modify(offset, |v| v | mask);
    }

    /// Clear every bit of `mask`.
    fn clear_bits(&mut self, offset: usize, mask: u32) {
        self.modify(offset, |v| v & !mask);
    }

    /// Replace the `mask` field with `value` (already shifted into place).
    fn write_field(&mut self, offset: usize, mask: u32, value: u32) {
        self.modify(offset, |v| (v & !mask) | (value & mask));
    }
}

/// Memory-mapped peripheral registers at a fixed base address.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Bind a register bank to `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the address of a peripheral register block on the
    /// running device, and the caller must not create a second `Mmio` for the
    /// same block that could race with this one outside a critical section.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the bank.
    pub const fn base(&self) -> usize {
        self.base
    }

    #[allow(clippy::arithmetic_side_effects)] // offsets are register constants below the block size
    fn addr(&self, offset: usize) -> usize {
        self.base + offset
    }
}

impl Registers for Mmio {
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `new` guarantees `base` is a live register block and all
        // offsets used by the drivers lie within it and are word aligned.
        unsafe { core::ptr::read_volatile(self.addr(offset) as *const u32) }
    }

    fn write(&mut self, offset: usize, value: u32) {
        // SAFETY: see `read`; exclusive access is guaranteed by `&mut self`.
        unsafe { core::ptr::write_volatile(self.addr(offset) as *mut u32, value) }
    }

    fn read_byte(&self, offset: usize) -> u8 {
        // SAFETY: see `read`; byte-wide banks decode every byte address.
        unsafe { core::ptr::read_volatile(self.addr(offset) as *const u8) }
    }
}

/// Bit mask with bit `n` set.
#[inline]
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // callers pass n < 32
pub const fn bit(n: u32) -> u32 {
    1 << n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::RegisterFile;

    #[test]
    fn write_field_only_touches_masked_bits() {
        let mut regs: RegisterFile<4> = RegisterFile::new();
        regs.write(0, 0xFFFF_FFFF);
        regs.write_field(0, 0x0000_FF00, 0x0000_1200);
        assert_eq!(regs.read(0), 0xFFFF_12FF);
    }

    #[test]
    fn set_and_clear_bits_are_read_modify_write() {
        let mut regs: RegisterFile<4> = RegisterFile::new();
        regs.set_bits(4, bit(3) | bit(0));
        regs.clear_bits(4, bit(0));
        assert_eq!(regs.read(4), bit(3));
    }

    #[test]
    fn default_read_byte_takes_low_byte() {
        let mut regs: RegisterFile<4> = RegisterFile::new();
        regs.write(8, 0xABCD_EF7E);
        assert_eq!(regs.read_byte(8), 0x7E);
    }
}
