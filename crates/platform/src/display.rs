//! 8-segment display abstraction layer

use crate::regs::Registers;

/// Display driver trait for the single-digit segment display
pub trait SegmentDisplay {
    /// Show a hexadecimal digit. Values above 0xF show their low nibble.
    fn show_digit(&mut self, digit: u8);

    /// Show a status glyph
    fn show_glyph(&mut self, glyph: Glyph);
}

/// Status glyphs shown between digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Glyph {
    /// Waiting for the password (`-`)
    Idle,
    /// Waiting for a guess (`P`)
    Prompt,
    /// Guess matched (`A`)
    Match,
    /// Guess did not match (`E`)
    Mismatch,
    /// All segments off
    Blank,
}

// Segment bits: a = bit 0 … g = bit 6, decimal point = bit 7.
const SEG_A: u8 = 1 << 0;
const SEG_B: u8 = 1 << 1;
const SEG_C: u8 = 1 << 2;
const SEG_D: u8 = 1 << 3;
const SEG_E: u8 = 1 << 4;
const SEG_F: u8 = 1 << 5;
const SEG_G: u8 = 1 << 6;

/// Lit segments for 0x0..=0xF.
const DIGITS: [u8; 16] = [
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,         // 0
    SEG_B | SEG_C,                                         // 1
    SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,                 // 2
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,                 // 3
    SEG_B | SEG_C | SEG_F | SEG_G,                         // 4
    SEG_A | SEG_C | SEG_D | SEG_F | SEG_G,                 // 5
    SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,         // 6
    SEG_A | SEG_B | SEG_C,                                 // 7
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G, // 8
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,         // 9
    SEG_A | SEG_B | SEG_C | SEG_E | SEG_F | SEG_G,         // A
    SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,                 // b
    SEG_A | SEG_D | SEG_E | SEG_F,                         // C
    SEG_B | SEG_C | SEG_D | SEG_E | SEG_G,                 // d
    SEG_A | SEG_D | SEG_E | SEG_F | SEG_G,                 // E
    SEG_A | SEG_E | SEG_F | SEG_G,                         // F
];

impl Glyph {
    /// Lit segments for this glyph.
    pub const fn segments(self) -> u8 {
        match self {
            Self::Idle => SEG_G,
            Self::Prompt => SEG_A | SEG_B | SEG_E | SEG_F | SEG_G,
            Self::Match => SEG_A | SEG_B | SEG_C | SEG_E | SEG_F | SEG_G,
            Self::Mismatch => SEG_A | SEG_D | SEG_E | SEG_F | SEG_G,
            Self::Blank => 0,
        }
    }
}

/// Lit segments for a hexadecimal digit.
#[allow(clippy::indexing_slicing)] // masked to 0..=15
pub const fn digit_segments(digit: u8) -> u8 {
    DIGITS[(digit & 0xF) as usize]
}

/// Segment display behind the board's LED latch.
///
/// The latch is active low: a written 0 bit lights the segment.
pub struct Segment8<R> {
    regs: R,
}

impl<R: Registers> Segment8<R> {
    /// Wrap the latch register.
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Borrow the latch register.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Segments currently lit.
    #[allow(clippy::cast_possible_truncation)] // 8-bit latch
    pub fn lit(&self) -> u8 {
        !(self.regs.read(0) as u8)
    }

    fn latch(&mut self, segments: u8) {
        self.regs.write(0, u32::from(!segments));
    }
}

impl<R: Registers> SegmentDisplay for Segment8<R> {
    fn show_digit(&mut self, digit: u8) {
        self.latch(digit_segments(digit));
    }

    fn show_glyph(&mut self, glyph: Glyph) {
        self.latch(glyph.segments());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::RegisterFile;

    #[test]
    fn latch_is_active_low() {
        let mut display = Segment8::new(RegisterFile::<1>::new());
        display.show_digit(1);
        assert_eq!(display.registers().read(0), u32::from(!(SEG_B | SEG_C)));
        assert_eq!(display.lit(), SEG_B | SEG_C);
    }

    #[test]
    fn digits_are_distinct() {
        for a in 0..16u8 {
            for b in (a + 1)..16 {
                assert_ne!(digit_segments(a), digit_segments(b), "{a:x} vs {b:x}");
            }
        }
    }

    #[test]
    fn high_nibble_is_masked() {
        assert_eq!(digit_segments(0x1A), digit_segments(0xA));
    }

    #[test]
    fn glyphs_render_their_letters() {
        let mut display = Segment8::new(RegisterFile::<1>::new());
        display.show_glyph(Glyph::Idle);
        assert_eq!(display.lit(), SEG_G);
        display.show_glyph(Glyph::Mismatch);
        assert_eq!(display.lit(), digit_segments(0xE));
        display.show_glyph(Glyph::Blank);
        assert_eq!(display.lit(), 0);
    }
}
