//! Power, Reset and Clock Management sequencing.
//!
//! Every transition follows the same pattern: request it in a control
//! register, then block until the matching status bit confirms it. Clock gate
//! changes only take effect after a `CLKLOADCTL` load, which is itself
//! acknowledged by `LOAD_DONE`.

use core::ops::{BitOr, BitOrAssign};

use crate::error::Error;
use crate::hw::Hardware;
use crate::poll::{Poll, Wait};
use crate::regs::prcm::{self, clkloadctl, pdctl0rfc, pdstat0, pdstat1, rfcclkg, rfcmodesel, vimsclkg};
use crate::regs::rfc_pwr;

/// Set of power domains.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerDomains(u8);

impl PowerDomains {
    /// RF core.
    pub const RFC: Self = Self(1 << 0);
    /// SSI0, UART0, I2C0, I2S.
    pub const SERIAL: Self = Self(1 << 1);
    /// GPIO, timers, crypto, TRNG, DMA.
    pub const PERIPH: Self = Self(1 << 2);
    pub const CPU: Self = Self(1 << 3);
    /// Flash controller and cache.
    pub const VIMS: Self = Self(1 << 4);
    /// System bus. Has no control register of its own.
    pub const SYSBUS: Self = Self(1 << 5);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::RFC, "RFC"),
        (Self::SERIAL, "SERIAL"),
        (Self::PERIPH, "PERIPH"),
        (Self::CPU, "CPU"),
        (Self::VIMS, "VIMS"),
        (Self::SYSBUS, "SYSBUS"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for PowerDomains {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for PowerDomains {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl core::fmt::Debug for PowerDomains {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PowerDomains(")?;
        let mut first = true;
        for (domain, name) in Self::NAMES {
            if self.contains(domain) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}

/// Ordered power and clock transitions over a borrowed register interface.
pub struct Sequencer<'a, H: Hardware, P: Poll> {
    pub(crate) hw: &'a mut H,
    pub(crate) poll: &'a mut P,
}

impl<'a, H: Hardware, P: Poll> Sequencer<'a, H, P> {
    pub fn new(hw: &'a mut H, poll: &'a mut P) -> Self {
        Self { hw, poll }
    }

    pub(crate) fn wait(&mut self, wait: Wait, mut ready: impl FnMut(&mut H) -> bool) -> Result<(), Error> {
        let hw = &mut *self.hw;
        self.poll.until(wait, || ready(hw))
    }

    /// Domains currently reported ON by PDSTAT0/PDSTAT1.
    pub fn status(&mut self) -> PowerDomains {
        read_status(self.hw)
    }

    /// Power on `domains` and wait until all of them report ON.
    ///
    /// The status is always polled, even when the domains were already on.
    pub fn power_on(&mut self, domains: PowerDomains) -> Result<(), Error> {
        debug!("Powering on {:?}", domains);
        write_control(self.hw, domains, true);
        self.wait(Wait::PowerOn(domains), |hw| read_status(hw).contains(domains))?;
        trace!("{:?} powered", domains);
        Ok(())
    }

    /// Power off `domains` and wait until none of them reports ON.
    pub fn power_off(&mut self, domains: PowerDomains) -> Result<(), Error> {
        debug!("Powering off {:?}", domains);
        write_control(self.hw, domains, false);
        self.wait(Wait::PowerOff(domains), |hw| !read_status(hw).intersects(domains))?;
        trace!("{:?} off", domains);
        Ok(())
    }

    /// Latch pending clock gate settings and wait for the load to finish.
    pub fn commit_load(&mut self) -> Result<(), Error> {
        trace!("Loading clock settings");
        self.hw.write(prcm::CLKLOADCTL, clkloadctl::LOAD.mask());
        self.wait(Wait::ClockLoad, |hw| clkloadctl::LOAD_DONE.is_set(hw.read(prcm::CLKLOADCTL)))
    }

    /// Open the clock gates of `domains`, then load.
    ///
    /// Only RFC and VIMS have a gate in PRCM; the other domains are clocked as
    /// soon as they are powered and are only checked for power.
    pub fn enable_clock(&mut self, domains: PowerDomains) -> Result<(), Error> {
        let powered = self.status();
        if !powered.contains(domains) {
            let missing = domains.difference(powered);
            error!("Refusing to clock unpowered domains {:?}", missing);
            return Err(Error::DomainNotPowered(missing));
        }

        debug!("Enabling clocks for {:?}", domains);
        if domains.contains(PowerDomains::RFC) {
            self.hw.modify(prcm::RFCCLKG, |r| rfcclkg::CLK_EN.set(r, 1));
        }
        if domains.contains(PowerDomains::VIMS) {
            self.hw.modify(prcm::VIMSCLKG, |r| vimsclkg::CLK_EN.set(r, 0b11));
        }
        self.commit_load()
    }

    /// Power on, load, then enable clocks.
    pub fn bring_up(&mut self, domains: PowerDomains) -> Result<(), Error> {
        self.power_on(domains)?;
        self.commit_load()?;
        self.enable_clock(domains)
    }

    /// Select the RF core firmware mode (`RFCMODESEL.CURR`).
    ///
    /// Only takes effect while the RFC domain is off.
    pub fn set_rf_mode(&mut self, mode: u8) {
        if self.status().contains(PowerDomains::RFC) {
            warn!("RFCMODESEL written while the RF core is powered");
        }
        debug!("Selecting RF mode {}", mode);
        self.hw.write(prcm::RFCMODESEL, rfcmodesel::CURR.set(0, mode as u32));
    }

    /// Enable the RF core internal module clocks (`RFC_PWR.PWMCLKEN`), then load.
    pub fn enable_rf_modules(&mut self, mask: u32) -> Result<(), Error> {
        debug!("Enabling RF core module clocks 0x{:03X}", mask);
        self.hw.write(rfc_pwr::PWMCLKEN, mask);
        self.commit_load()
    }
}

fn write_control<H: Hardware>(hw: &mut H, domains: PowerDomains, on: bool) {
    let value = pdctl0rfc::ON.set(0, on as u32);
    if domains.contains(PowerDomains::RFC) {
        hw.write(prcm::PDCTL0RFC, value);
        hw.write(prcm::PDCTL1RFC, value);
    }
    if domains.contains(PowerDomains::SERIAL) {
        hw.write(prcm::PDCTL0SERIAL, value);
    }
    if domains.contains(PowerDomains::PERIPH) {
        hw.write(prcm::PDCTL0PERIPH, value);
    }
    if domains.contains(PowerDomains::CPU) {
        hw.write(prcm::PDCTL1CPU, value);
    }
    if domains.contains(PowerDomains::VIMS) {
        hw.write(prcm::PDCTL1VIMS, value);
    }
}

fn read_status<H: Hardware>(hw: &mut H) -> PowerDomains {
    let s0 = hw.read(prcm::PDSTAT0);
    let s1 = hw.read(prcm::PDSTAT1);

    let mut on = PowerDomains::empty();
    if pdstat0::RFC_ON.is_set(s0) || pdstat1::RFC_ON.is_set(s1) {
        on |= PowerDomains::RFC;
    }
    if pdstat0::SERIAL_ON.is_set(s0) {
        on |= PowerDomains::SERIAL;
    }
    if pdstat0::PERIPH_ON.is_set(s0) {
        on |= PowerDomains::PERIPH;
    }
    if pdstat1::CPU_ON.is_set(s1) {
        on |= PowerDomains::CPU;
    }
    if pdstat1::VIMS_ON.is_set(s1) {
        on |= PowerDomains::VIMS;
    }
    if pdstat1::BUS_ON.is_set(s1) {
        on |= PowerDomains::SYSBUS;
    }
    on
}
