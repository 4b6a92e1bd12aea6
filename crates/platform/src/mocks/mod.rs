//! Mock implementations for testing
//!
//! Register models standing in for the memory-mapped peripherals, plus a
//! recording display. Each model reproduces the side effects the drivers
//! rely on (write-one-to-clear pending bits, buffered timer counts, key-pad
//! bus decoding) so that drivers and firmware run unchanged on the host.

use core::cell::Cell;

use crate::display::{Glyph, SegmentDisplay};
use crate::gpio::{PDATG, MAX_PIN};
use crate::intc::{Line, ALL_LINES, F_ISPC, INTCON, INTMSK, INTPND, I_ISPC};
use crate::keypad::{column_nibble, Key, LINE_OFFSETS};
use crate::regs::{bit, Registers};
use crate::timer::{Timer, TCON, TCON_UPDATE};

/// Plain word-addressed register file with no side effects.
///
/// Offsets outside the file read as zero and ignore writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile<const WORDS: usize> {
    words: [u32; WORDS],
}

impl<const WORDS: usize> RegisterFile<WORDS> {
    /// All registers zero.
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Copy of every register.
    pub fn snapshot(&self) -> [u32; WORDS] {
        self.words
    }
}

impl<const WORDS: usize> Default for RegisterFile<WORDS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const WORDS: usize> Registers for RegisterFile<WORDS> {
    fn read(&self, offset: usize) -> u32 {
        self.words.get(offset / 4).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: usize, value: u32) {
        if let Some(word) = self.words.get_mut(offset / 4) {
            *word = value;
        }
    }
}

/// Words covering the interrupt controller up to F_ISPC.
const INTC_WORDS: usize = F_ISPC / 4 + 1;

/// Controller writes kept by [`SimIntcRegisters`].
pub const INTC_LOG: usize = 64;

/// Interrupt controller model.
///
/// Writing a mask to I_ISPC or F_ISPC clears those INTPND bits instead of
/// storing the value. Every write is also logged as `(offset, value)` until
/// the log is full.
#[derive(Debug, Clone)]
pub struct SimIntcRegisters {
    file: RegisterFile<INTC_WORDS>,
    irq_clears: usize,
    fiq_clears: usize,
    writes: heapless::Vec<(usize, u32), INTC_LOG>,
}

impl SimIntcRegisters {
    /// Power-on state: IRQ and FIQ disabled, non-vectored, every line
    /// masked, nothing pending.
    pub fn new() -> Self {
        let mut file = RegisterFile::new();
        file.write(INTCON, 0b111);
        file.write(INTMSK, ALL_LINES);
        Self {
            file,
            irq_clears: 0,
            fiq_clears: 0,
            writes: heapless::Vec::new(),
        }
    }

    /// Copy of every register.
    pub fn snapshot(&self) -> [u32; INTC_WORDS] {
        self.file.snapshot()
    }

    /// Latch a request on `line`, as the hardware does when the source fires.
    pub fn raise(&mut self, line: Line) {
        if line.number() < 32 {
            self.file.set_bits(INTPND, bit(u32::from(line.number())));
        }
    }

    /// Number of writes to I_ISPC so far.
    pub fn irq_clears(&self) -> usize {
        self.irq_clears
    }

    /// Number of writes to F_ISPC so far.
    pub fn fiq_clears(&self) -> usize {
        self.fiq_clears
    }

    /// Logged writes, oldest first.
    pub fn writes(&self) -> &[(usize, u32)] {
        &self.writes
    }

    /// Forget logged writes.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl Default for SimIntcRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers for SimIntcRegisters {
    fn read(&self, offset: usize) -> u32 {
        match offset {
            I_ISPC | F_ISPC => 0,
            _ => self.file.read(offset),
        }
    }

    fn write(&mut self, offset: usize, value: u32) {
        let _ = self.writes.push((offset, value));
        match offset {
            I_ISPC => {
                self.irq_clears = self.irq_clears.saturating_add(1);
                self.file.clear_bits(INTPND, value);
            }
            F_ISPC => {
                self.fiq_clears = self.fiq_clears.saturating_add(1);
                self.file.clear_bits(INTPND, value);
            }
            _ => self.file.write(offset, value),
        }
    }
}

/// Words covering the timer bank up to TCNTO5.
const TIMER_WORDS: usize = 0x4C / 4 + 1;

/// Timer bank model.
///
/// A TCON write with a timer's manual-update bit set copies that timer's
/// count buffer into its observation register, the way the hardware loads
/// the live counter.
#[derive(Debug, Clone, Default)]
pub struct SimTimerRegisters {
    file: RegisterFile<TIMER_WORDS>,
}

impl SimTimerRegisters {
    /// Power-on state: all zero.
    pub const fn new() -> Self {
        Self {
            file: RegisterFile::new(),
        }
    }

    /// Copy of every register.
    pub fn snapshot(&self) -> [u32; TIMER_WORDS] {
        self.file.snapshot()
    }
}

impl Registers for SimTimerRegisters {
    fn read(&self, offset: usize) -> u32 {
        self.file.read(offset)
    }

    fn write(&mut self, offset: usize, value: u32) {
        self.file.write(offset, value);
        if offset != TCON {
            return;
        }
        for timer in Timer::ALL {
            if value & (TCON_UPDATE << timer.tcon_shift()) != 0 {
                let count = self.file.read(timer.count_buffer());
                self.file.write(timer.count_observation(), count);
            }
        }
    }
}

/// Words covering port G up to EXTINT.
const PORTG_WORDS: usize = 0x10 / 4 + 1;

/// Port G model with pulled-up inputs.
///
/// Pins idle high. [`PortGSim::press`] pulls a pin low for a given number
/// of PDATG reads, after which it floats back high: a button held while
/// firmware polls for its release.
#[derive(Debug, Clone)]
pub struct PortGSim {
    file: RegisterFile<PORTG_WORDS>,
    held: Cell<u32>,
    held_pin: u8,
}

impl PortGSim {
    /// Every pin high.
    pub fn new() -> Self {
        let mut file = RegisterFile::new();
        file.write(PDATG, 0xFF);
        Self {
            file,
            held: Cell::new(0),
            held_pin: 0,
        }
    }

    /// Hold `pin` low for the next `reads` PDATG reads.
    pub fn press(&mut self, pin: u8, reads: u32) {
        if pin <= MAX_PIN {
            self.held_pin = pin;
            self.held.set(reads);
        }
    }

    /// `true` while a pressed pin is still held low.
    pub fn is_held(&self) -> bool {
        self.held.get() > 0
    }

    /// Copy of every register.
    pub fn snapshot(&self) -> [u32; PORTG_WORDS] {
        self.file.snapshot()
    }
}

impl Default for PortGSim {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers for PortGSim {
    fn read(&self, offset: usize) -> u32 {
        let value = self.file.read(offset);
        if offset != PDATG {
            return value;
        }
        let remaining = self.held.get();
        if remaining == 0 {
            return value;
        }
        self.held.set(remaining.saturating_sub(1));
        value & !bit(u32::from(self.held_pin))
    }

    fn write(&mut self, offset: usize, value: u32) {
        self.file.write(offset, value);
    }
}

/// Key-matrix bus model.
///
/// Holds one byte per scan line; bytes read back as written, addresses
/// outside the four line offsets read as idle.
#[derive(Debug, Clone)]
pub struct KeypadSim {
    lines: [u8; 4],
}

impl KeypadSim {
    /// Every line idle.
    pub const fn new() -> Self {
        Self { lines: [0xFF; 4] }
    }

    /// Hold `key` down, releasing any other.
    pub fn press(&mut self, key: Key) {
        self.release();
        let (line, column) = key.matrix_position();
        self.set_line(line, 0xF0 | column_nibble(column));
    }

    /// Release every key.
    pub fn release(&mut self) {
        self.lines = [0xFF; 4];
    }

    /// Store a raw byte for scan `line`. Out-of-range lines are ignored.
    pub fn set_line(&mut self, line: usize, value: u8) {
        if let Some(slot) = self.lines.get_mut(line) {
            *slot = value;
        }
    }

    /// `true` when any line reads non-idle.
    pub fn is_pressed(&self) -> bool {
        self.lines.iter().any(|&l| l & 0x0F != 0x0F)
    }
}

impl Default for KeypadSim {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers for KeypadSim {
    fn read(&self, offset: usize) -> u32 {
        u32::from(self.read_byte(offset))
    }

    fn write(&mut self, _offset: usize, _value: u32) {}

    fn read_byte(&self, offset: usize) -> u8 {
        LINE_OFFSETS
            .iter()
            .position(|&o| o == offset)
            .and_then(|line| self.lines.get(line))
            .copied()
            .unwrap_or(0xFF)
    }
}

/// Something the display was asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// A hexadecimal digit.
    Digit(u8),
    /// A status glyph.
    Glyph(Glyph),
}

/// Events kept by [`MockDisplay`].
pub const DISPLAY_LOG: usize = 128;

/// Mock display implementation
///
/// Records everything shown. Once the log is full further events are
/// dropped; [`MockDisplay::current`] keeps tracking the latest.
#[derive(Debug, Clone, Default)]
pub struct MockDisplay {
    events: heapless::Vec<DisplayEvent, DISPLAY_LOG>,
    current: Option<DisplayEvent>,
}

impl MockDisplay {
    /// Create new mock display
    pub const fn new() -> Self {
        Self {
            events: heapless::Vec::new(),
            current: None,
        }
    }

    /// Every recorded event, oldest first.
    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    /// Recorded digits only, oldest first.
    pub fn digits(&self) -> heapless::Vec<u8, DISPLAY_LOG> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::Digit(d) => Some(*d),
                DisplayEvent::Glyph(_) => None,
            })
            .collect()
    }

    /// What the display shows now.
    pub fn current(&self) -> Option<DisplayEvent> {
        self.current
    }

    /// Forget recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn record(&mut self, event: DisplayEvent) {
        self.current = Some(event);
        let _ = self.events.push(event);
    }
}

impl SegmentDisplay for MockDisplay {
    fn show_digit(&mut self, digit: u8) {
        self.record(DisplayEvent::Digit(digit & 0xF));
    }

    fn show_glyph(&mut self, glyph: Glyph) {
        self.record(DisplayEvent::Glyph(glyph));
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn register_file_ignores_out_of_range() {
        let mut regs: RegisterFile<2> = RegisterFile::new();
        regs.write(0x40, 7);
        assert_eq!(regs.read(0x40), 0);
        assert_eq!(regs.snapshot(), [0, 0]);
    }

    #[test]
    fn intc_clear_registers_are_write_one_to_clear() {
        let mut regs = SimIntcRegisters::new();
        regs.raise(Line::TIMER0);
        regs.raise(Line::EINT1);
        regs.write(I_ISPC, bit(13));
        assert_eq!(regs.read(INTPND), bit(24));
        assert_eq!(regs.read(I_ISPC), 0);
        assert_eq!(regs.irq_clears(), 1);
    }

    #[test]
    fn intc_logs_writes_in_order() {
        let mut regs = SimIntcRegisters::new();
        assert!(regs.writes().is_empty());
        regs.write(INTMSK, 0);
        regs.write(I_ISPC, bit(24));
        assert_eq!(regs.writes(), &[(INTMSK, 0), (I_ISPC, bit(24))]);
        regs.clear_writes();
        assert!(regs.writes().is_empty());
    }

    #[test]
    fn timer_update_bit_loads_observation() {
        let mut regs = SimTimerRegisters::new();
        regs.write(Timer::T1.count_buffer(), 500);
        regs.write(TCON, TCON_UPDATE << Timer::T0.tcon_shift());
        assert_eq!(regs.read(Timer::T1.count_observation()), 0);
        regs.write(TCON, TCON_UPDATE << Timer::T1.tcon_shift());
        assert_eq!(regs.read(Timer::T1.count_observation()), 500);
    }

    #[test]
    fn port_pin_is_held_for_given_reads() {
        let mut port = PortGSim::new();
        port.press(1, 2);
        assert_eq!(port.read(PDATG) & bit(1), 0);
        assert_eq!(port.read(PDATG) & bit(1), 0);
        assert!(!port.is_held());
        assert_eq!(port.read(PDATG) & bit(1), bit(1));
    }

    #[test]
    fn keypad_press_and_release() {
        let mut keypad = KeypadSim::new();
        keypad.press(Key::TERMINATOR);
        assert!(keypad.is_pressed());
        assert_eq!(keypad.read_byte(LINE_OFFSETS[3]), 0xFE);
        assert_eq!(keypad.read_byte(0x00), 0xFF);
        keypad.release();
        assert!(!keypad.is_pressed());
    }

    #[test]
    fn mock_display_records_digits_in_order() {
        let mut display = MockDisplay::new();
        display.show_glyph(Glyph::Idle);
        display.show_digit(3);
        display.show_digit(0xC);
        assert_eq!(display.digits().as_slice(), &[3, 0xC]);
        assert_eq!(display.current(), Some(DisplayEvent::Digit(0xC)));
        assert_eq!(display.events().len(), 3);
    }
}
