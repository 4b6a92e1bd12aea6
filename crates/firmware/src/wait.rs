//! Flag polling.
//!
//! The board has no blocking primitive: the foreground synchronizes with the
//! handlers by spinning on a flag. [`wait_until`] is the only place that
//! spins, so the host can swap the spin for an interrupt simulator.

use core::sync::atomic::{AtomicBool, Ordering};

/// Called on every iteration of a flag wait.
pub trait WaitHook {
    /// Let time pass.
    ///
    /// Returns [`Stalled`] when nothing can ever set the awaited flag, which
    /// only a simulated board can know.
    fn idle(&mut self) -> Result<(), Stalled>;
}

/// A wait that can never complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stalled;

impl core::fmt::Display for Stalled {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "no pending event can complete the wait")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Stalled {}

/// Busy-wait for real interrupts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinWait;

impl WaitHook for SpinWait {
    #[inline]
    fn idle(&mut self) -> Result<(), Stalled> {
        core::hint::spin_loop();
        Ok(())
    }
}

/// Spin until `flag` is set.
pub fn wait_until(flag: &AtomicBool, hook: &mut impl WaitHook) -> Result<(), Stalled> {
    while !flag.load(Ordering::SeqCst) {
        hook.idle()?;
    }
    Ok(())
}
