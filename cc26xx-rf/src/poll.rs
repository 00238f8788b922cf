//! Blocking wait strategies.
//!
//! Every hardware handshake in this crate is a "poll until" loop. The loop body
//! is injected through [`Poll`] so the same sequences can spin forever on the
//! target ([`Spin`]) or give up with [`Error::Timeout`] in tests and
//! diagnostics ([`Bounded`], [`Deadline`]).

use crate::error::Error;
use crate::osc::ClockSource;
use crate::prcm::PowerDomains;

/// The condition a poll loop is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wait {
    /// PDSTAT0/PDSTAT1 report the domains ON.
    PowerOn(PowerDomains),
    /// PDSTAT0/PDSTAT1 report the domains OFF.
    PowerOff(PowerDomains),
    /// CLKLOADCTL.LOAD_DONE.
    ClockLoad,
    /// DDI0_OSC.STAT0 reports the requested HF source.
    HfSource(ClockSource),
    /// DDI0_OSC.STAT0 reports the requested LF source.
    LfSource(ClockSource),
    /// CMDR reads back zero.
    DoorbellIdle,
    /// RFACKIFG raised by the RF core.
    DoorbellAck,
    /// Record with this command number left the running states.
    Command(u16),
}

pub trait Poll {
    /// Call `ready` until it returns `true`.
    fn until(&mut self, wait: Wait, ready: impl FnMut() -> bool) -> Result<(), Error>;
}

impl<P: Poll> Poll for &mut P {
    fn until(&mut self, wait: Wait, ready: impl FnMut() -> bool) -> Result<(), Error> {
        P::until(self, wait, ready)
    }
}

/// Unbounded busy wait. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spin;

impl Poll for Spin {
    #[inline]
    fn until(&mut self, _wait: Wait, mut ready: impl FnMut() -> bool) -> Result<(), Error> {
        while !ready() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

/// Busy wait that gives up after a fixed number of checks.
#[derive(Debug, Clone, Copy)]
pub struct Bounded {
    /// Checks allowed per wait.
    pub max_polls: u32,
    /// Checks performed since construction, across all waits.
    pub polls: u64,
}

impl Bounded {
    pub const fn new(max_polls: u32) -> Self {
        Self { max_polls, polls: 0 }
    }
}

impl Default for Bounded {
    fn default() -> Self {
        Self::new(2_000_000)
    }
}

impl Poll for Bounded {
    fn until(&mut self, wait: Wait, mut ready: impl FnMut() -> bool) -> Result<(), Error> {
        for _ in 0..self.max_polls {
            self.polls += 1;
            if ready() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        warn!("Gave up waiting for {:?} after {} polls", wait, self.max_polls);
        Err(Error::Timeout(wait))
    }
}

/// Busy wait bounded by wall-clock time.
#[cfg(feature = "time")]
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    pub timeout: embassy_time::Duration,
}

#[cfg(feature = "time")]
impl Deadline {
    pub const fn new(timeout: embassy_time::Duration) -> Self {
        Self { timeout }
    }
}

#[cfg(feature = "time")]
impl Poll for Deadline {
    fn until(&mut self, wait: Wait, mut ready: impl FnMut() -> bool) -> Result<(), Error> {
        let start = embassy_time::Instant::now();
        while !ready() {
            if start.elapsed() > self.timeout {
                warn!("Gave up waiting for {:?} after {} us", wait, self.timeout.as_micros());
                return Err(Error::Timeout(wait));
            }
        }
        Ok(())
    }
}
