//! Simulated register file and RF core for host tests.
//!
//! Power status follows the control registers, clock loads complete on the
//! second status read, the HF source only changes after a configurable number
//! of ROM switch calls, and the doorbell executes records against a tiny model
//! of the command and packet engine. Output blocks are only written when a
//! record turns terminal.

use std::collections::BTreeMap;
use std::vec::Vec;

use crate::hw::{Hardware, Reg};
use crate::prcm::PowerDomains;
use crate::regs::{ddi0_osc, prcm, rfc_dbell, rfc_pwr};
use crate::rfc::cmd::{self, BleAdvOutput, BleTxTestOutput, CmdBleAdvNc, CmdBleTxTest, CmdRadioSetup};
use crate::rfc::{CmdSta, OverrideTable, Status};

/// Fake bus addresses handed out for records, 4-byte aligned.
const HANDLE_BASE: u32 = 0x2000_0000;

/// Output block update applied when a record turns terminal.
#[derive(Clone, Copy)]
enum Output {
    None,
    Adv(*mut BleAdvOutput),
    TxTest(*mut BleTxTestOutput, u16),
}

struct Pending {
    status: *mut u16,
    polls_left: u32,
    status_done: Status,
    output: Output,
}

pub struct Sim {
    regs: BTreeMap<usize, u32>,
    reads: BTreeMap<&'static str, u32>,
    records: Vec<*mut u8>,
    pending: Option<Pending>,
    load_pending: bool,
    hf_active: u32,

    /// Every register write, in order.
    pub writes: Vec<(&'static str, u32)>,
    /// Completed CLKLOADCTL loads.
    pub loads: u32,
    /// Domains that never report ON.
    pub stuck_domains: PowerDomains,
    /// ROM switch calls needed before a requested HF source becomes active.
    pub hf_switches_needed: u32,
    pub hf_switch_calls: u32,
    /// Reads of a submitted record's status word.
    pub status_polls: u32,
    /// Status reads that see ACTIVE before the record turns terminal.
    pub polls_to_complete: u32,
    /// Next doorbell write is answered with this CMDSTA result.
    pub reject: Option<u8>,
    /// Final status of the next record, instead of the modelled one.
    pub force_status: Option<Status>,
    pub rat_running: bool,
    pub radio_ready: bool,
    pub mode_written_while_powered: bool,
    /// Command numbers the RF core accepted, direct commands included.
    pub executed: Vec<u16>,
    /// Payload of the last advertisement.
    pub last_adv: Vec<u8>,
    pub last_channel: u8,
    /// Override words of the last radio setup, terminator excluded.
    pub override_words: usize,
}

impl Sim {
    pub fn new() -> Self {
        Self {
            regs: BTreeMap::new(),
            reads: BTreeMap::new(),
            records: Vec::new(),
            pending: None,
            load_pending: false,
            hf_active: 0,
            writes: Vec::new(),
            loads: 0,
            stuck_domains: PowerDomains::empty(),
            hf_switches_needed: 0,
            hf_switch_calls: 0,
            status_polls: 0,
            polls_to_complete: 2,
            reject: None,
            force_status: None,
            rat_running: false,
            radio_ready: false,
            mode_written_while_powered: false,
            executed: Vec::new(),
            last_adv: Vec::new(),
            last_channel: 0,
            override_words: 0,
        }
    }

    /// Host domains powered and clocked, crystals running.
    pub fn booted_host() -> Self {
        let mut sim = Self::new();
        for reg in [prcm::PDCTL0SERIAL, prcm::PDCTL0PERIPH, prcm::PDCTL1CPU, prcm::PDCTL1VIMS] {
            sim.regs.insert(reg.addr(), 1);
        }
        sim.regs.insert(prcm::VIMSCLKG.addr(), 0b11);
        sim.regs.insert(ddi0_osc::CTL0.addr(), 0b1111);
        sim.hf_active = 1;
        sim
    }

    pub fn read_count(&self, name: &str) -> u32 {
        self.reads.get(name).copied().unwrap_or(0)
    }

    pub fn writes_to(&self, name: &str) -> usize {
        self.writes.iter().filter(|(n, _)| *n == name).count()
    }

    fn reg(&self, reg: Reg) -> u32 {
        self.regs.get(&reg.addr()).copied().unwrap_or(0)
    }

    fn on(&self, reg: Reg, domain: PowerDomains) -> bool {
        self.reg(reg) & 1 != 0 && !self.stuck_domains.contains(domain)
    }

    fn rfc_running(&self) -> bool {
        self.on(prcm::PDCTL0RFC, PowerDomains::RFC)
            && prcm::rfcclkg::CLK_EN.is_set(self.reg(prcm::RFCCLKG))
            && self.reg(rfc_pwr::PWMCLKEN) != 0
    }

    fn doorbell(&mut self, cmdr: u32) -> u32 {
        if let Some(result) = self.reject.take() {
            return result as u32;
        }

        if cmdr & 1 == 1 {
            let command = (cmdr >> 16) as u16;
            return match command {
                cmd::CMD_START_RAT if self.rat_running => CmdSta::CONTEXT_ERROR as u32,
                cmd::CMD_START_RAT => {
                    self.rat_running = true;
                    self.executed.push(command);
                    CmdSta::DONE as u32
                }
                cmd::CMD_PING => {
                    self.executed.push(command);
                    CmdSta::DONE as u32
                }
                _ => CmdSta::UNKNOWN_DIR_COMMAND as u32,
            };
        }

        let index = (cmdr.wrapping_sub(HANDLE_BASE) / 4) as usize;
        let Some(&record) = self.records.get(index) else {
            return CmdSta::ILLEGAL_POINTER as u32;
        };
        if self.pending.is_some() {
            return CmdSta::QUEUE_BUSY as u32;
        }

        let command = unsafe { *(record as *const u16) };
        let (status, output) = match command {
            cmd::CMD_NOP => (Status::DONE_OK, Output::None),
            cmd::CMD_RADIO_SETUP => unsafe { (self.radio_setup(&*(record as *const CmdRadioSetup)), Output::None) },
            cmd::CMD_BLE_ADV_NC => unsafe { self.advertise(&*(record as *const CmdBleAdvNc)) },
            cmd::CMD_BLE_TX_TEST => unsafe { self.tx_test(&*(record as *const CmdBleTxTest)) },
            _ => return CmdSta::UNKNOWN_COMMAND as u32,
        };
        self.executed.push(command);

        let status_ptr = unsafe { record.add(2) as *mut u16 };
        unsafe { *status_ptr = Status::PENDING.0 };
        self.pending = Some(Pending {
            status: status_ptr,
            polls_left: self.polls_to_complete,
            status_done: self.force_status.take().unwrap_or(status),
            output,
        });
        CmdSta::DONE as u32
    }

    unsafe fn radio_setup(&mut self, cmd: &CmdRadioSetup) -> Status {
        let mut words = 0;
        if !cmd.reg_override.is_null() {
            loop {
                if words == 64 {
                    return Status::ERROR_PAR;
                }
                if *cmd.reg_override.add(words) == OverrideTable::END {
                    break;
                }
                words += 1;
            }
        }
        self.override_words = words;
        self.radio_ready = true;
        Status::DONE_OK
    }

    unsafe fn advertise(&mut self, cmd: &CmdBleAdvNc) -> (Status, Output) {
        if !self.radio_ready {
            return (Status::ERROR_NO_SETUP, Output::None);
        }
        if !(37..=39).contains(&cmd.channel) || cmd.params.is_null() {
            return (Status::BLE_ERROR_PAR, Output::None);
        }
        let params = &*cmd.params;
        self.last_channel = cmd.channel;
        self.last_adv = core::slice::from_raw_parts(params.adv_data, params.adv_len as usize).to_vec();
        let output = if cmd.output.is_null() { Output::None } else { Output::Adv(cmd.output) };
        (Status::BLE_DONE_OK, output)
    }

    unsafe fn tx_test(&mut self, cmd: &CmdBleTxTest) -> (Status, Output) {
        if !self.radio_ready {
            return (Status::ERROR_NO_SETUP, Output::None);
        }
        if cmd.params.is_null() {
            return (Status::BLE_ERROR_PAR, Output::None);
        }
        let params = &*cmd.params;
        self.last_channel = cmd.channel;
        let output = if cmd.output.is_null() {
            Output::None
        } else {
            Output::TxTest(cmd.output, params.num_packets)
        };
        (Status::BLE_DONE_OK, output)
    }
}

impl Hardware for Sim {
    fn read(&mut self, reg: Reg) -> u32 {
        *self.reads.entry(reg.name()).or_insert(0) += 1;

        if reg == prcm::PDSTAT0 {
            let mut v = 0;
            if self.on(prcm::PDCTL0RFC, PowerDomains::RFC) {
                v |= prcm::pdstat0::RFC_ON.mask();
            }
            if self.on(prcm::PDCTL0SERIAL, PowerDomains::SERIAL) {
                v |= prcm::pdstat0::SERIAL_ON.mask();
            }
            if self.on(prcm::PDCTL0PERIPH, PowerDomains::PERIPH) {
                v |= prcm::pdstat0::PERIPH_ON.mask();
            }
            v
        } else if reg == prcm::PDSTAT1 {
            let mut v = prcm::pdstat1::BUS_ON.mask();
            if self.on(prcm::PDCTL1CPU, PowerDomains::CPU) {
                v |= prcm::pdstat1::CPU_ON.mask();
            }
            if self.on(prcm::PDCTL1RFC, PowerDomains::RFC) {
                v |= prcm::pdstat1::RFC_ON.mask();
            }
            if self.on(prcm::PDCTL1VIMS, PowerDomains::VIMS) {
                v |= prcm::pdstat1::VIMS_ON.mask();
            }
            v
        } else if reg == prcm::CLKLOADCTL {
            if self.load_pending {
                self.load_pending = false;
                self.loads += 1;
                0
            } else {
                prcm::clkloadctl::LOAD_DONE.mask()
            }
        } else if reg == ddi0_osc::STAT0 {
            let lf = ddi0_osc::ctl0::SCLK_LF_SRC_SEL.get(self.reg(ddi0_osc::CTL0));
            let v = ddi0_osc::stat0::SCLK_HF_SRC.set(0, self.hf_active);
            ddi0_osc::stat0::SCLK_LF_SRC.set(v, lf)
        } else {
            self.reg(reg)
        }
    }

    fn write(&mut self, reg: Reg, value: u32) {
        self.writes.push((reg.name(), value));

        if reg == prcm::CLKLOADCTL {
            if prcm::clkloadctl::LOAD.is_set(value) {
                self.load_pending = true;
            }
        } else if reg == prcm::RFCMODESEL {
            if self.on(prcm::PDCTL0RFC, PowerDomains::RFC) {
                self.mode_written_while_powered = true;
            }
            self.regs.insert(reg.addr(), value);
        } else if reg == rfc_dbell::CMDR {
            if self.rfc_running() {
                let sta = self.doorbell(value);
                self.regs.insert(rfc_dbell::CMDSTA.addr(), sta);
                self.regs.insert(rfc_dbell::RFACKIFG.addr(), 1);
                self.regs.insert(reg.addr(), 0);
            } else {
                // Nobody home: the command stays in CMDR and is never acknowledged.
                self.regs.insert(reg.addr(), value);
            }
        } else {
            self.regs.insert(reg.addr(), value);
        }
    }

    fn bus_address<T>(&mut self, ptr: *const T) -> u32 {
        self.records.push(ptr as *mut u8);
        HANDLE_BASE + 4 * (self.records.len() as u32 - 1)
    }

    unsafe fn read_status(&mut self, status: *const u16) -> u16 {
        self.status_polls += 1;
        if let Some(pending) = self.pending.as_mut() {
            if pending.status as *const u16 == status {
                if pending.polls_left == 0 {
                    // Counters land before the status, like on the RF core.
                    match pending.output {
                        Output::None => {}
                        Output::Adv(out) => (*out).n_tx_adv_ind += 1,
                        Output::TxTest(out, n) => (*out).n_tx = n,
                    }
                    *pending.status = pending.status_done.0;
                    self.pending = None;
                } else {
                    pending.polls_left -= 1;
                    *pending.status = Status::ACTIVE.0;
                }
            }
        }
        core::ptr::read_volatile(status)
    }

    fn hf_source_switch(&mut self) {
        self.hf_switch_calls += 1;
        if self.hf_switch_calls >= self.hf_switches_needed {
            self.hf_active = ddi0_osc::ctl0::SCLK_HF_SRC_SEL.get(self.reg(ddi0_osc::CTL0));
        }
    }
}
