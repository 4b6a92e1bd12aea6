//! 4×4 key-matrix decoder.
//!
//! The matrix sits on the external bus. Reading one of four line addresses
//! drives that row and returns the column levels in the low nibble, active
//! low: `0xF` means no key on the line, a single zero bit names the column.
//!
//! Only the first active line in scan order is reported per scan. Keys held
//! down on several lines at once are not disambiguated, and a line with more
//! than one column low is skipped.

use crate::regs::Registers;

/// Line address offsets from the key-pad base, in scan order.
pub const LINE_OFFSETS: [usize; 4] = [0xFD, 0xFB, 0xF7, 0xEF];

/// Low nibble of an idle line.
const IDLE: u8 = 0x0F;

/// Key code for each (line, column) intersection.
const KEYMAP: [[u8; 4]; 4] = [
    [0x0, 0x1, 0x2, 0x3],
    [0x4, 0x5, 0x6, 0x7],
    [0x8, 0x9, 0xA, 0xB],
    [0xC, 0xD, 0xE, 0xF],
];

/// Decoded key, 0x0..=0xF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Key(u8);

impl Key {
    /// Key that ends a capture phase.
    pub const TERMINATOR: Self = Self(0xF);

    /// Key with code `code`, if it is a 4-bit value.
    pub const fn new(code: u8) -> Option<Self> {
        if code <= 0xF {
            Some(Self(code))
        } else {
            None
        }
    }

    /// Key for a hexadecimal ASCII digit (`0-9`, `a-f`, `A-F`).
    #[allow(clippy::arithmetic_side_effects)] // ranges checked by the match arms
    pub const fn from_ascii(c: u8) -> Option<Self> {
        match c {
            b'0'..=b'9' => Some(Self(c - b'0')),
            b'a'..=b'f' => Some(Self(c - b'a' + 10)),
            b'A'..=b'F' => Some(Self(c - b'A' + 10)),
            _ => None,
        }
    }

    /// Raw 4-bit code.
    pub const fn code(self) -> u8 {
        self.0
    }

    /// `true` for [`Key::TERMINATOR`].
    pub const fn is_terminator(self) -> bool {
        self.0 == Self::TERMINATOR.0
    }

    /// `(line, column)` of this key in the matrix.
    pub const fn matrix_position(self) -> (usize, usize) {
        ((self.0 / 4) as usize, (self.0 % 4) as usize)
    }
}

/// Column decoded from a line's low nibble.
const fn column(nibble: u8) -> Option<usize> {
    match nibble {
        0x7 => Some(0),
        0xB => Some(1),
        0xD => Some(2),
        0xE => Some(3),
        _ => None,
    }
}

/// Line nibble that reports `column` as the only active one.
pub const fn column_nibble(column: usize) -> u8 {
    match column {
        0 => 0x7,
        1 => 0xB,
        2 => 0xD,
        _ => 0xE,
    }
}

/// Key-matrix decoder over the key-pad bus window.
pub struct KeyMatrix<R> {
    regs: R,
}

impl<R: Registers> KeyMatrix<R> {
    /// Wrap the key-pad window.
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Borrow the register window.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Mutably borrow the register window.
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Scan the four lines once and return the first key found.
    pub fn scan(&self) -> Option<Key> {
        LINE_OFFSETS
            .iter()
            .zip(KEYMAP.iter())
            .find_map(|(&offset, codes)| {
                let nibble = self.regs.read_byte(offset) & IDLE;
                if nibble == IDLE {
                    return None;
                }
                column(nibble)
                    .and_then(|col| codes.get(col))
                    .map(|&code| Key(code))
            })
    }
}
