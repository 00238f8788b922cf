#![no_std]
#![doc = include_str!("../README.md")]
#![allow(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod macros;

pub mod adv;
pub mod delay;
pub mod error;
pub mod hw;
pub mod osc;
pub mod poll;
pub mod prcm;
pub mod rfc;

#[cfg(test)]
mod sim;

// Reexports
pub use embassy_hal_internal::{into_ref, Peripheral, PeripheralRef};
pub use error::Error;

pub(crate) mod _generated {
    #![allow(dead_code)]
    #![allow(unused_imports)]
    #![allow(non_snake_case)]
    #![allow(missing_docs)]
    #![allow(clippy::all)]

    include!(concat!(env!("OUT_DIR"), "/_generated.rs"));
}

pub use _generated::regs;
pub use _generated::{peripherals, Peripherals};

/// Take the peripheral singletons.
///
/// This should only be called once at startup, otherwise it panics.
pub fn init() -> Peripherals {
    let p = Peripherals::take();
    debug!("cc26xx-rf initialized");
    p
}
