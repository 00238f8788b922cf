//! Busy-wait delays.

use embedded_hal_1::delay::DelayNs;

/// SCLK_HF with the 24 MHz crystal doubled.
pub const HCLK_HZ: u32 = 48_000_000;

/// Blocking delay that burns CPU cycles.
///
/// With the `time` feature the delay is measured by `embassy-time` instead.
#[derive(Debug, Clone, Copy)]
pub struct BlockingDelay {
    hclk_hz: u32,
}

impl BlockingDelay {
    pub const fn new(hclk_hz: u32) -> Self {
        Self { hclk_hz }
    }

    fn cycles(&self, ns: u32) -> u32 {
        let cycles = self.hclk_hz as u64 * ns as u64 / 1_000_000_000;
        cycles.min(u32::MAX as u64) as u32
    }
}

impl Default for BlockingDelay {
    fn default() -> Self {
        Self::new(HCLK_HZ)
    }
}

impl DelayNs for BlockingDelay {
    fn delay_ns(&mut self, ns: u32) {
        #[cfg(feature = "time")]
        {
            let _ = self;
            embassy_time::block_for(embassy_time::Duration::from_nanos(ns as u64));
        }

        #[cfg(not(feature = "time"))]
        {
            let cycles = self.cycles(ns);
            cfg_if::cfg_if! {
                if #[cfg(target_arch = "arm")] {
                    cortex_m::asm::delay(cycles);
                } else {
                    for _ in 0..cycles {
                        core::hint::spin_loop();
                    }
                }
            }
        }
    }
}
