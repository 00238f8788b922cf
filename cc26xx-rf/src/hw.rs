//! Register access seam.
//!
//! Everything that touches the silicon goes through [`Hardware`]. On the target
//! [`Mmio`] performs volatile accesses at the addresses generated from
//! `data/<chip>/*.yaml`; host tests substitute a simulated register file.

use embassy_hal_internal::{into_ref, Peripheral, PeripheralRef};

use crate::peripherals;

/// A memory mapped 32-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg {
    name: &'static str,
    addr: usize,
}

impl Reg {
    pub const fn new(name: &'static str, addr: usize) -> Self {
        Self { name, addr }
    }

    /// `BLOCK.REGISTER`, as named in the register map.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn addr(&self) -> usize {
        self.addr
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Reg {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}@{=usize:#x}", self.name, self.addr)
    }
}

/// A bit field inside a [`Reg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    pos: u8,
    width: u8,
}

impl Field {
    pub const fn new(pos: u8, width: u8) -> Self {
        Self { pos, width }
    }

    pub const fn pos(&self) -> u8 {
        self.pos
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    /// In-place mask of the field.
    pub const fn mask(&self) -> u32 {
        let ones = if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        };
        ones << self.pos
    }

    /// Extract the field from a register value.
    pub const fn get(&self, reg: u32) -> u32 {
        (reg & self.mask()) >> self.pos
    }

    /// Replace the field in `reg` with `value`, truncated to the field width.
    pub const fn set(&self, reg: u32, value: u32) -> u32 {
        (reg & !self.mask()) | ((value << self.pos) & self.mask())
    }

    pub const fn is_set(&self, reg: u32) -> bool {
        reg & self.mask() != 0
    }
}

/// Access to the registers and memory shared with the RF core.
pub trait Hardware {
    fn read(&mut self, reg: Reg) -> u32;

    fn write(&mut self, reg: Reg, value: u32);

    fn modify(&mut self, reg: Reg, f: impl FnOnce(u32) -> u32) {
        let value = self.read(reg);
        self.write(reg, f(value));
    }

    /// Address of `ptr` as seen by the RF core, written to the doorbell.
    ///
    /// Both CPUs share one 32-bit address space, so on the target this is the
    /// pointer value itself.
    fn bus_address<T>(&mut self, ptr: *const T) -> u32 {
        ptr as usize as u32
    }

    /// Read the status word of a record the RF core may be writing.
    ///
    /// # Safety
    ///
    /// `status` must point to the live status field of a submitted record.
    unsafe fn read_status(&mut self, status: *const u16) -> u16 {
        core::ptr::read_volatile(status)
    }

    /// Run one pass of the ROM's safe HF source switch.
    fn hf_source_switch(&mut self);
}

/// ROM function table ("HAPI") shared by all CC26x0 devices.
mod rom {
    const HAPI_TABLE: usize = 0x1000_0048;
    const HF_SOURCE_SAFE_SWITCH: usize = 14;

    /// Switch SCLK_HF to the pending source once the ROM deems it safe.
    pub(super) fn hf_source_safe_switch() {
        unsafe {
            let table = HAPI_TABLE as *const u32;
            let entry = core::ptr::read_volatile(table.add(HF_SOURCE_SAFE_SWITCH));
            let f: extern "C" fn() = core::mem::transmute(entry as usize);
            f();
        }
    }
}

/// Volatile register access on real silicon.
///
/// Holding the peripheral singletons guarantees nothing else drives the
/// power manager, the oscillator or the doorbell concurrently.
pub struct Mmio<'d> {
    _prcm: PeripheralRef<'d, peripherals::PRCM>,
    _osc: PeripheralRef<'d, peripherals::DDI0_OSC>,
    _rfc_pwr: PeripheralRef<'d, peripherals::RFC_PWR>,
    _rfc_dbell: PeripheralRef<'d, peripherals::RFC_DBELL>,
}

impl<'d> Mmio<'d> {
    pub fn new(
        prcm: impl Peripheral<P = peripherals::PRCM> + 'd,
        osc: impl Peripheral<P = peripherals::DDI0_OSC> + 'd,
        rfc_pwr: impl Peripheral<P = peripherals::RFC_PWR> + 'd,
        rfc_dbell: impl Peripheral<P = peripherals::RFC_DBELL> + 'd,
    ) -> Self {
        into_ref!(prcm, osc, rfc_pwr, rfc_dbell);
        Self {
            _prcm: prcm,
            _osc: osc,
            _rfc_pwr: rfc_pwr,
            _rfc_dbell: rfc_dbell,
        }
    }
}

impl Hardware for Mmio<'_> {
    #[inline]
    fn read(&mut self, reg: Reg) -> u32 {
        unsafe { core::ptr::read_volatile(reg.addr() as *const u32) }
    }

    #[inline]
    fn write(&mut self, reg: Reg, value: u32) {
        unsafe { core::ptr::write_volatile(reg.addr() as *mut u32, value) }
    }

    fn hf_source_switch(&mut self) {
        rom::hf_source_safe_switch();
    }
}
