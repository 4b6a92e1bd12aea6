//! Const-generic, stack-allocated ring buffer for captured key codes.
//!
//! `RingBuffer<N>` holds up to `N` bytes without heap allocation. Writes
//! never fail: once the buffer is full, `put` overwrites the oldest byte so
//! the buffer always holds the `N` most recent values.
//!
//! # Layout
//!
//! - `start` is the next slot to write, `end` the next slot to read.
//! - `start == end` is ambiguous, so a `full` flag records whether the last
//!   `put` closed the gap by wraparound.
//!
//! This implementation is **not** interrupt-safe. The capture path shares
//! it with the foreground inside a `critical_section::Mutex`.

/// Returned by [`RingBuffer::get`] when there is nothing to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Empty;

impl core::fmt::Display for Empty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ring buffer is empty")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Empty {}

/// A fixed-capacity, overwrite-oldest ring buffer of bytes.
///
/// Capacity is set at compile time via the const generic `N`, which must be
/// non-zero.
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    /// Next slot to write.
    start: usize,
    /// Next slot to read.
    end: usize,
    full: bool,
}

impl<const N: usize> RingBuffer<N> {
    const NON_ZERO: () = assert!(N > 0, "ring buffer capacity must be non-zero");

    /// Create a new, empty ring buffer.
    ///
    /// `const` so that ring buffers may live in `static` cells.
    #[allow(clippy::let_unit_value)]
    pub const fn new() -> Self {
        let () = Self::NON_ZERO;
        Self {
            buf: [0; N],
            start: 0,
            end: 0,
            full: false,
        }
    }

    /// Drop every stored byte.
    pub fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
        self.full = false;
    }

    /// Store `byte`, overwriting the oldest one when full.
    #[allow(clippy::arithmetic_side_effects)] // wrap via % N, N > 0
    pub fn put(&mut self, byte: u8) {
        if let Some(slot) = self.buf.get_mut(self.start) {
            *slot = byte;
        }
        if self.full {
            self.end = (self.end + 1) % N;
        }
        self.start = (self.start + 1) % N;
        self.full = self.start == self.end;
    }

    /// Remove and return the oldest byte.
    ///
    /// # Errors
    ///
    /// Returns [`Empty`] with the buffer left untouched when nothing is
    /// stored.
    #[allow(clippy::arithmetic_side_effects)] // wrap via % N, N > 0
    pub fn get(&mut self) -> Result<u8, Empty> {
        if self.is_empty() {
            return Err(Empty);
        }
        let byte = self.buf.get(self.end).copied().ok_or(Empty)?;
        self.full = false;
        self.end = (self.end + 1) % N;
        Ok(byte)
    }

    /// `true` when no bytes are stored.
    pub fn is_empty(&self) -> bool {
        !self.full && self.start == self.end
    }

    /// `true` once `N` bytes are stored, until the next `get`.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Number of bytes currently stored.
    #[allow(clippy::arithmetic_side_effects)] // start, end < N
    pub fn size(&self) -> usize {
        if self.full {
            N
        } else if self.start >= self.end {
            self.start - self.end
        } else {
            self.start + N - self.end
        }
    }

    /// Maximum number of bytes the buffer can hold.
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
