//! Doorbell handshake with the RF core's command and packet engine.

use super::CmdSta;
use crate::error::Error;
use crate::hw::Hardware;
use crate::poll::{Poll, Wait};
use crate::regs::rfc_dbell::{self, rfackifg};

/// CMDR encoding of a direct command.
pub const fn direct_command(cmd: u16) -> u32 {
    ((cmd as u32) << 16) | 1
}

fn clear_ack<H: Hardware>(hw: &mut H) {
    while rfackifg::ACKFLAG.is_set(hw.read(rfc_dbell::RFACKIFG)) {
        hw.write(rfc_dbell::RFACKIFG, 0);
    }
}

/// Write `cmdr` to the doorbell and return the RF core's CMDSTA answer.
///
/// CMDR holds either a 4-byte aligned record address or a direct command
/// (bit 0 set).
pub(crate) fn send<H: Hardware, P: Poll>(hw: &mut H, poll: &mut P, cmdr: u32) -> Result<CmdSta, Error> {
    poll.until(Wait::DoorbellIdle, || hw.read(rfc_dbell::CMDR) == 0)?;
    clear_ack(hw);

    trace!("CMDR <- 0x{:08X}", cmdr);
    hw.write(rfc_dbell::CMDR, cmdr);

    poll.until(Wait::DoorbellAck, || rfackifg::ACKFLAG.is_set(hw.read(rfc_dbell::RFACKIFG)))?;
    clear_ack(hw);

    let sta = CmdSta(hw.read(rfc_dbell::CMDSTA));
    trace!("CMDSTA -> 0x{:08X}", sta.0);
    Ok(sta)
}
