//! PWM timer bank driver.
//!
//! Six 16-bit down-counting timers. Timers share prescalers pairwise
//! (group 0: timers 0–1, group 1: 2–3, group 2: 4–5) and each has its own
//! divider mux. Count and compare values are written to buffer registers
//! (TCNTBn / TCMPBn) and only reach the live counter on the next manual
//! update or auto-reload, so every configuration change must be followed by
//! [`TimerBank::commit`].
//!
//! # Timing
//!
//! ```text
//! f_tick = MCLK / (prescaler + 1) / divider
//! period = reload_count / f_tick
//! ```
//!
//! At MCLK = 64 MHz and prescaler 255 the prescaled clock is 250 kHz; every
//! canonical [`Period`] then uses a reload count of 31 250 and differs only
//! in its divider.

use crate::config::MCLK_HZ;
use crate::error::HalError;
use crate::regs::Registers;

/// TCFG0: prescalers 0..2 (8 bits each) and dead zone length.
pub const TCFG0: usize = 0x00;
/// TCFG1: divider mux per timer (4 bits each) and DMA select.
pub const TCFG1: usize = 0x04;
/// TCON: start / manual update / inverter / auto-reload bits per timer.
pub const TCON: usize = 0x08;

/// TCON bit within a timer's field: start.
const TCON_START: u32 = 0b0001;
/// TCON bit within a timer's field: manual update.
pub(crate) const TCON_UPDATE: u32 = 0b0010;

/// Prescaler value used by every canonical period.
pub const PERIOD_PRESCALER: u8 = 255;
/// Reload count used by every canonical period.
pub const PERIOD_COUNT: u16 = 31_250;

/// One of the six PWM timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timer {
    /// Timer 0.
    T0,
    /// Timer 1.
    T1,
    /// Timer 2.
    T2,
    /// Timer 3.
    T3,
    /// Timer 4.
    T4,
    /// Timer 5 (no compare register, no inverter).
    T5,
}

impl Timer {
    /// All timers in index order.
    pub const ALL: [Self; 6] = [Self::T0, Self::T1, Self::T2, Self::T3, Self::T4, Self::T5];

    /// Timer for a raw index.
    pub fn from_index(index: u8) -> Result<Self, HalError> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(HalError::InvalidTimer(index))
    }

    /// Raw index 0..=5.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Prescaler group this timer draws from.
    pub const fn prescaler_group(self) -> u8 {
        self.index() / 2
    }

    /// Offset of TCNTBn.
    #[allow(clippy::arithmetic_side_effects)] // index <= 5
    pub const fn count_buffer(self) -> usize {
        0x0C + 0x0C * self.index() as usize
    }

    /// Offset of TCMPBn; timer 5 has none.
    #[allow(clippy::arithmetic_side_effects)] // index <= 5
    pub const fn compare_buffer(self) -> Option<usize> {
        match self {
            Self::T5 => None,
            _ => Some(0x10 + 0x0C * self.index() as usize),
        }
    }

    /// Offset of TCNTOn (live count observation).
    #[allow(clippy::arithmetic_side_effects)] // index <= 4
    pub const fn count_observation(self) -> usize {
        match self {
            Self::T5 => 0x4C,
            _ => 0x14 + 0x0C * self.index() as usize,
        }
    }

    /// Bit position of this timer's field in TCON. A dead-zone bit sits
    /// between timer 0 and timer 1.
    #[allow(clippy::arithmetic_side_effects)] // index <= 5
    pub const fn tcon_shift(self) -> u32 {
        match self {
            Self::T0 => 0,
            _ => 4 + 4 * self.index() as u32,
        }
    }

    /// TCON auto-reload bit. Timer 5 lacks the inverter bit, so its reload
    /// bit sits one position lower.
    const fn tcon_reload(self) -> u32 {
        match self {
            Self::T5 => 0b0100,
            _ => 0b1000,
        }
    }
}

/// Clock divider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Divider {
    /// 1/2
    Div2,
    /// 1/4
    Div4,
    /// 1/8
    Div8,
    /// 1/16
    Div16,
    /// 1/32 (timers 0–3 only)
    Div32,
    /// Internal TCLK input (timer 4 only)
    Tclk,
    /// External clock input (timer 5 only)
    ExtClk,
}

impl Divider {
    /// Mux code written to TCFG1 for `timer`, or an error when the divider
    /// is not wired to that timer.
    pub fn mux_code(self, timer: Timer) -> Result<u32, HalError> {
        let invalid = HalError::InvalidDivider {
            timer: timer.index(),
        };
        match self {
            Self::Div2 => Ok(0),
            Self::Div4 => Ok(1),
            Self::Div8 => Ok(2),
            Self::Div16 => Ok(3),
            Self::Div32 if timer.index() <= 3 => Ok(4),
            Self::Tclk if timer == Timer::T4 => Ok(4),
            Self::ExtClk if timer == Timer::T5 => Ok(4),
            Self::Div32 | Self::Tclk | Self::ExtClk => Err(invalid),
        }
    }

    fn from_mux_code(code: u32, timer: Timer) -> Self {
        match code {
            0 => Self::Div2,
            1 => Self::Div4,
            2 => Self::Div8,
            3 => Self::Div16,
            _ => match timer {
                Timer::T4 => Self::Tclk,
                Timer::T5 => Self::ExtClk,
                _ => Self::Div32,
            },
        }
    }

    /// Division ratio, or `None` for the external clock inputs.
    pub const fn ratio(self) -> Option<u32> {
        match self {
            Self::Div2 => Some(2),
            Self::Div4 => Some(4),
            Self::Div8 => Some(8),
            Self::Div16 => Some(16),
            Self::Div32 => Some(32),
            Self::Tclk | Self::ExtClk => None,
        }
    }
}

/// Reload behaviour on expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Stop after one expiry.
    OneShot,
    /// Reload TCNTBn and keep counting.
    Reload,
}

/// Canonical playback periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Period {
    /// 2 s
    TwoSecs,
    /// 1 s
    OneSec,
    /// 0.5 s
    HalfSec,
    /// 0.25 s
    QuarterSec,
}

/// Register values producing a [`Period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSettings {
    /// Prescaler value (shared with the paired timer).
    pub prescaler: u8,
    /// Divider.
    pub divider: Divider,
    /// Reload count.
    pub count: u16,
}

impl Period {
    /// Prescaler/divider/count triple for this period.
    pub const fn settings(self) -> PeriodSettings {
        let divider = match self {
            Self::TwoSecs => Divider::Div16,
            Self::OneSec => Divider::Div8,
            Self::HalfSec => Divider::Div4,
            Self::QuarterSec => Divider::Div2,
        };
        PeriodSettings {
            prescaler: PERIOD_PRESCALER,
            divider,
            count: PERIOD_COUNT,
        }
    }

    /// Nominal length in milliseconds.
    pub const fn millis(self) -> u32 {
        match self {
            Self::TwoSecs => 2000,
            Self::OneSec => 1000,
            Self::HalfSec => 500,
            Self::QuarterSec => 250,
        }
    }
}

impl PeriodSettings {
    /// Period produced by these settings at [`MCLK_HZ`], in milliseconds.
    /// `None` for external-clock dividers.
    #[allow(clippy::arithmetic_side_effects)] // prescaler + 1 <= 256, ratio >= 2
    pub fn millis(self) -> Option<u32> {
        let ratio = self.divider.ratio()?;
        let tick_hz = MCLK_HZ / (u32::from(self.prescaler) + 1) / ratio;
        Some(u32::from(self.count) * 1000 / tick_hz)
    }
}

/// Timer bank over its register block.
pub struct TimerBank<R> {
    regs: R,
}

impl<R: Registers> TimerBank<R> {
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

    /// Set prescaler `group` (0..=2). Affects both timers of the pair.
    #[allow(clippy::arithmetic_side_effects)] // group <= 2, index <= 5
    pub fn set_prescaler(&mut self, group: u8, value: u8) -> Result<(), HalError> {
        if group > 2 {
            return Err(HalError::InvalidPrescaler(group));
        }
        let shift = u32::from(group) * 8;
        self.regs
            .write_field(TCFG0, 0xFF << shift, u32::from(value) << shift);
        Ok(())
    }

    /// Select the divider of `timer`.
    #[allow(clippy::arithmetic_side_effects)] // group <= 2, index <= 5
    pub fn set_divider(&mut self, timer: Timer, divider: Divider) -> Result<(), HalError> {
        let code = divider.mux_code(timer)?;
        let shift = u32::from(timer.index()) * 4;
        self.regs.write_field(TCFG1, 0xF << shift, code << shift);
        Ok(())
    }

    /// Write the buffered reload count and compare value. Timer 5 has no
    /// compare register and ignores `compare`.
    pub fn set_count(&mut self, timer: Timer, reload: u16, compare: u16) {
        self.regs.write(timer.count_buffer(), u32::from(reload));
        if let Some(offset) = timer.compare_buffer() {
            self.regs.write(offset, u32::from(compare));
        }
    }

    /// Select one-shot or auto-reload.
    pub fn set_mode(&mut self, timer: Timer, mode: Mode) {
        let mask = timer.tcon_reload() << timer.tcon_shift();
        match mode {
            Mode::OneShot => self.regs.clear_bits(TCON, mask),
            Mode::Reload => self.regs.set_bits(TCON, mask),
        }
    }

    /// Flush the buffered count/compare into the live counter.
    ///
    /// The manual-update bit must be cleared again before the next TCON
    /// write, otherwise every later write re-triggers an update.
    pub fn commit(&mut self, timer: Timer) {
        let mask = TCON_UPDATE << timer.tcon_shift();
        self.regs.set_bits(TCON, mask);
        self.regs.clear_bits(TCON, mask);
    }

    /// Start counting.
    pub fn start(&mut self, timer: Timer) {
        self.regs.set_bits(TCON, TCON_START << timer.tcon_shift());
    }

    /// Stop counting.
    pub fn stop(&mut self, timer: Timer) {
        self.regs.clear_bits(TCON, TCON_START << timer.tcon_shift());
    }

    /// `true` while the start bit is set.
    pub fn is_running(&self, timer: Timer) -> bool {
        self.regs.read(TCON) & (TCON_START << timer.tcon_shift()) != 0
    }

    /// Program `timer` for one of the canonical periods and commit.
    ///
    /// Also rewrites the prescaler of the paired timer.
    pub fn configure_period(
        &mut self,
        timer: Timer,
        period: Period,
        mode: Mode,
    ) -> Result<(), HalError> {
        let settings = period.settings();
        // Validate before the first write so a rejected divider leaves the
        // bank untouched.
        settings.divider.mux_code(timer)?;
        self.set_prescaler(timer.prescaler_group(), settings.prescaler)?;
        self.set_divider(timer, settings.divider)?;
        self.set_count(timer, settings.count, 0);
        self.set_mode(timer, mode);
        self.commit(timer);
        Ok(())
    }

    // ── Readback ────────────────────────────────────────────────────────────

    /// Prescaler value of `group`.
    #[allow(clippy::cast_possible_truncation)] // masked to 8 bits
    #[allow(clippy::arithmetic_side_effects)] // group <= 2, index <= 5
    pub fn prescaler(&self, group: u8) -> Result<u8, HalError> {
        if group > 2 {
            return Err(HalError::InvalidPrescaler(group));
        }
        Ok(((self.regs.read(TCFG0) >> (u32::from(group) * 8)) & 0xFF) as u8)
    }

    /// Divider currently selected for `timer`.
    #[allow(clippy::arithmetic_side_effects)] // group <= 2, index <= 5
    pub fn divider(&self, timer: Timer) -> Divider {
        let code = (self.regs.read(TCFG1) >> (u32::from(timer.index()) * 4)) & 0xF;
        Divider::from_mux_code(code, timer)
    }

    /// Buffered reload count (TCNTBn).
    #[allow(clippy::cast_possible_truncation)] // 16-bit register
    pub fn reload_count(&self, timer: Timer) -> u16 {
        (self.regs.read(timer.count_buffer()) & 0xFFFF) as u16
    }

    /// Live counter value (TCNTOn).
    #[allow(clippy::cast_possible_truncation)] // 16-bit register
    pub fn live_count(&self, timer: Timer) -> u16 {
        (self.regs.read(timer.count_observation()) & 0xFFFF) as u16
    }

    /// Reload mode currently selected.
    pub fn mode(&self, timer: Timer) -> Mode {
        if self.regs.read(TCON) & (timer.tcon_reload() << timer.tcon_shift()) == 0 {
            Mode::OneShot
        } else {
            Mode::Reload
        }
    }
}
