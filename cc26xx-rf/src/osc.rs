//! Clock source selection (DDI0 OSC).
//!
//! The HF switch cannot be completed by a register write alone: after the new
//! source is requested the ROM routine has to perform the actual switch once
//! the crystal is stable, so the request is re-issued until STAT0 agrees.

use crate::error::Error;
use crate::hw::Hardware;
use crate::poll::{Poll, Wait};
use crate::prcm::Sequencer;
use crate::regs::ddi0_osc::{self, ctl0, stat0};

/// Clock tree to configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockTree {
    /// SCLK_HF, with SCLK_MF following it.
    Hf,
    /// SCLK_LF.
    Lf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// 48 MHz RC oscillator. On the LF tree: divided by 1536.
    RcoscHf,
    /// 24 MHz crystal, doubled. On the LF tree: divided by 1536.
    XoscHf,
    /// 32 kHz RC oscillator. LF tree only.
    RcoscLf,
    /// 32.768 kHz crystal. LF tree only.
    XoscLf,
}

impl ClockSource {
    const fn hf_code(self) -> Option<u32> {
        match self {
            Self::RcoscHf => Some(0),
            Self::XoscHf => Some(1),
            Self::RcoscLf | Self::XoscLf => None,
        }
    }

    const fn lf_code(self) -> u32 {
        match self {
            Self::RcoscHf => 0,
            Self::XoscHf => 1,
            Self::RcoscLf => 2,
            Self::XoscLf => 3,
        }
    }

    const fn from_lf_code(code: u32) -> Self {
        match code & 0b11 {
            0 => Self::RcoscHf,
            1 => Self::XoscHf,
            2 => Self::RcoscLf,
            _ => Self::XoscLf,
        }
    }
}

impl<'a, H: Hardware, P: Poll> Sequencer<'a, H, P> {
    /// Source currently driving `tree`, as reported by STAT0.
    pub fn clock_source(&mut self, tree: ClockTree) -> ClockSource {
        let stat = self.hw.read(ddi0_osc::STAT0);
        match tree {
            ClockTree::Hf if stat0::SCLK_HF_SRC.is_set(stat) => ClockSource::XoscHf,
            ClockTree::Hf => ClockSource::RcoscHf,
            ClockTree::Lf => ClockSource::from_lf_code(stat0::SCLK_LF_SRC.get(stat)),
        }
    }

    /// Switch `tree` to `source` and wait until STAT0 reports it active.
    pub fn select_clock_source(&mut self, tree: ClockTree, source: ClockSource) -> Result<(), Error> {
        match tree {
            ClockTree::Hf => {
                let Some(code) = source.hf_code() else {
                    error!("{:?} cannot drive the HF tree", source);
                    return Err(Error::InvalidClockSource { tree, source });
                };

                debug!("Requesting HF/MF source {:?}", source);
                self.hw.modify(ddi0_osc::CTL0, |r| {
                    let r = ctl0::SCLK_HF_SRC_SEL.set(r, code);
                    ctl0::SCLK_MF_SRC_SEL.set(r, code)
                });

                let mut switches = 0u32;
                self.wait(Wait::HfSource(source), |hw| {
                    let active = stat0::SCLK_HF_SRC.get(hw.read(ddi0_osc::STAT0));
                    if active == code {
                        return true;
                    }
                    hw.hf_source_switch();
                    switches += 1;
                    false
                })?;
                debug!("HF source is {:?} after {} switch attempts", source, switches);
            }
            ClockTree::Lf => {
                let code = source.lf_code();
                debug!("Requesting LF source {:?}", source);
                self.hw.modify(ddi0_osc::CTL0, |r| ctl0::SCLK_LF_SRC_SEL.set(r, code));
                self.wait(Wait::LfSource(source), |hw| {
                    stat0::SCLK_LF_SRC.get(hw.read(ddi0_osc::STAT0)) == code
                })?;
                debug!("LF source is {:?}", source);
            }
        }
        Ok(())
    }
}
