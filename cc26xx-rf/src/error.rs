//! Crate error type.

use crate::adv::AdvError;
use crate::osc::{ClockSource, ClockTree};
use crate::poll::Wait;
use crate::prcm::PowerDomains;
use crate::rfc::{CmdSta, Status};

/// Errors reported by the power sequencer and the RF core mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The doorbell refused the command; the record was never started.
    Transport(CmdSta),

    /// The command ran but finished with a status outside the accepted range.
    Protocol {
        /// Command number of the record.
        command: u16,
        /// Final record status.
        status: Status,
    },

    /// A bounded poll strategy gave up.
    Timeout(Wait),

    /// The record was submitted without being reset to the idle state.
    StaleRecord(Status),

    /// Clock enable requested for domains that are not powered.
    DomainNotPowered(PowerDomains),

    /// The source cannot drive the requested clock tree.
    InvalidClockSource { tree: ClockTree, source: ClockSource },

    /// Advertising payload could not be built.
    Adv(AdvError),
}

impl From<AdvError> for Error {
    fn from(err: AdvError) -> Self {
        Self::Adv(err)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport(sta) => write!(f, "doorbell rejected command: CMDSTA 0x{:08X}", sta.0),
            Self::Protocol { command, status } => {
                write!(f, "command 0x{:04X} finished with status 0x{:04X}", command, status.0)
            }
            Self::Timeout(wait) => write!(f, "timed out waiting for {:?}", wait),
            Self::StaleRecord(status) => {
                write!(f, "record not idle (status 0x{:04X}), zero it before reuse", status.0)
            }
            Self::DomainNotPowered(domains) => write!(f, "domains {:?} are not powered", domains),
            Self::InvalidClockSource { tree, source } => {
                write!(f, "{:?} cannot drive the {:?} clock tree", source, tree)
            }
            Self::Adv(err) => write!(f, "advertising data: {:?}", err),
        }
    }
}
