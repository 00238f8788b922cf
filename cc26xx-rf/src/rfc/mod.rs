//! RF core mailbox driver.
//!
//! The RF core (a Cortex-M0 running TI's command and packet engine) is driven
//! by handing it command records through the doorbell:
//!
//! 1. the record address is written to `CMDR`;
//! 2. the RF core acknowledges with `RFACKIFG` and reports in `CMDSTA` whether
//!    it accepted the record;
//! 3. an accepted record's `status` moves from IDLE through PENDING/ACTIVE to
//!    a terminal value, written by the RF core into our memory.
//!
//! Only one record is outstanding at a time. [`Rfc::submit`] borrows the record
//! mutably until it is terminal, so the caller cannot touch it while the RF
//! core owns it.
//!
//! ## Usage
//!
//! ```no_run
//! use cc26xx_rf::adv::AdvData;
//! use cc26xx_rf::hw::Mmio;
//! use cc26xx_rf::poll::Spin;
//! use cc26xx_rf::rfc::{Config, Rfc};
//!
//! let p = cc26xx_rf::init();
//! let hw = Mmio::new(p.PRCM, p.DDI0_OSC, p.RFC_PWR, p.RFC_DBELL);
//! let mut rfc = Rfc::new(hw, Spin, Config::default());
//! rfc.boot()?;
//!
//! let mut adv = AdvData::new();
//! adv.flags(0x06)?.tx_power(5)?.complete_name("Awesomeness")?;
//! rfc.send_advertisement(&adv)?;
//! # Ok::<(), cc26xx_rf::Error>(())
//! ```

pub mod cmd;
mod doorbell;
pub mod overrides;

use core::ops::RangeInclusive;
use core::sync::atomic::{fence, Ordering};

pub use cmd::{PacketType, RadioCommand, SetupConfig, TxPower};
pub use doorbell::direct_command;
pub use overrides::OverrideTable;

use self::cmd::{BleAdvOutput, BleAdvPar, BleTxTestOutput, BleTxTestPar, CmdBleAdvNc, CmdBleTxTest, CmdRadioSetup, RadioOp};
use crate::adv::AdvData;
use crate::error::Error;
use crate::hw::Hardware;
use crate::poll::{Poll, Spin, Wait};
use crate::prcm::{PowerDomains, Sequencer};

/// 16-bit record status, written by the RF core.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u16);

impl Status {
    pub const IDLE: Self = Self(0x0000);
    pub const PENDING: Self = Self(0x0001);
    pub const ACTIVE: Self = Self(0x0002);
    pub const SKIPPED: Self = Self(0x0003);

    pub const DONE_OK: Self = Self(0x0400);
    pub const DONE_COUNTDOWN: Self = Self(0x0401);
    pub const DONE_RXERR: Self = Self(0x0402);
    pub const DONE_TIMEOUT: Self = Self(0x0403);
    pub const DONE_STOPPED: Self = Self(0x0404);
    pub const DONE_ABORT: Self = Self(0x0405);
    pub const DONE_FAILED: Self = Self(0x0406);

    pub const ERROR_PAST_START: Self = Self(0x0800);
    pub const ERROR_START_TRIG: Self = Self(0x0801);
    pub const ERROR_CONDITION: Self = Self(0x0802);
    pub const ERROR_PAR: Self = Self(0x0803);
    pub const ERROR_POINTER: Self = Self(0x0804);
    pub const ERROR_CMDID: Self = Self(0x0805);
    pub const ERROR_WRONG_BG: Self = Self(0x0806);
    pub const ERROR_NO_SETUP: Self = Self(0x0807);
    pub const ERROR_NO_FS: Self = Self(0x0808);
    pub const ERROR_SYNTH_PROG: Self = Self(0x0809);
    pub const ERROR_TXUNF: Self = Self(0x080A);
    pub const ERROR_RXOVF: Self = Self(0x080B);
    pub const ERROR_NO_RX: Self = Self(0x080C);
    pub const ERROR_PENDING: Self = Self(0x080D);

    pub const BLE_DONE_OK: Self = Self(0x1400);
    pub const BLE_DONE_RXTIMEOUT: Self = Self(0x1401);
    pub const BLE_DONE_NOSYNC: Self = Self(0x1402);
    pub const BLE_DONE_RXERR: Self = Self(0x1403);
    pub const BLE_DONE_CONNECT: Self = Self(0x1404);
    pub const BLE_DONE_MAXNACK: Self = Self(0x1405);
    pub const BLE_DONE_ENDED: Self = Self(0x1406);
    pub const BLE_DONE_ABORT: Self = Self(0x1407);
    pub const BLE_DONE_STOPPED: Self = Self(0x1408);

    pub const BLE_ERROR_PAR: Self = Self(0x1800);
    pub const BLE_ERROR_RXBUF: Self = Self(0x1801);
    pub const BLE_ERROR_NO_SETUP: Self = Self(0x1802);
    pub const BLE_ERROR_NO_FS: Self = Self(0x1803);
    pub const BLE_ERROR_SYNTH_PROG: Self = Self(0x1804);
    pub const BLE_ERROR_RXOVF: Self = Self(0x1805);
    pub const BLE_ERROR_TXUNF: Self = Self(0x1806);

    /// The RF core is done with the record.
    pub const fn is_terminal(self) -> bool {
        self.0 > Self::ACTIVE.0
    }

    pub const fn state(self) -> RecordState {
        match self.0 {
            0x0000 => RecordState::Idle,
            0x0001 => RecordState::Pending,
            0x0002 => RecordState::Active,
            _ => RecordState::Finished,
        }
    }
}

impl core::fmt::Debug for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Status(0x{:04X})", self.0)
    }
}

/// Lifecycle of a submitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordState {
    /// Freshly zeroed; the only state `submit` accepts.
    Idle,
    Pending,
    Active,
    /// Any terminal status. Absorbing until the record is zeroed again.
    Finished,
}

/// Doorbell command status register value.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CmdSta(pub u32);

impl CmdSta {
    pub const PENDING: u8 = 0x00;
    pub const DONE: u8 = 0x01;
    pub const ILLEGAL_POINTER: u8 = 0x81;
    pub const UNKNOWN_COMMAND: u8 = 0x82;
    pub const UNKNOWN_DIR_COMMAND: u8 = 0x83;
    pub const CONTEXT_ERROR: u8 = 0x85;
    pub const SCHEDULING_ERROR: u8 = 0x86;
    pub const PAR_ERROR: u8 = 0x87;
    pub const QUEUE_ERROR: u8 = 0x88;
    pub const QUEUE_BUSY: u8 = 0x89;

    /// Result byte.
    pub const fn result(self) -> u8 {
        self.0 as u8
    }

    /// Command specific return bytes.
    pub const fn return_value(self) -> u32 {
        self.0 >> 8
    }

    /// The RF core refused the command.
    pub const fn is_rejected(self) -> bool {
        self.result() > Self::DONE
    }
}

impl core::fmt::Debug for CmdSta {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CmdSta(0x{:08X})", self.0)
    }
}

/// Channel 37, the first BLE advertising channel.
pub const ADV_CHANNEL_37: u8 = 37;

/// `RFCMODESEL` value that runs the BLE firmware on CC2640.
pub const RF_MODE_BLE: u8 = 1;

/// PHY test transmission settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub struct TxTestConfig {
    pub num_packets: u16,
    pub payload_length: u8,
    pub packet_type: PacketType,
    pub channel: u8,
}

impl TxTestConfig {
    pub const fn new() -> Self {
        Self {
            num_packets: 50,
            payload_length: 35,
            packet_type: PacketType::Repeated55,
            channel: ADV_CHANNEL_37,
        }
    }
}

impl Default for TxTestConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// RF core configuration.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct Config {
    /// Written to `RFCMODESEL` while the RF core is off.
    pub rf_mode: u8,
    /// `CMD_RADIO_SETUP.mode`; 0 is BLE.
    pub setup_mode: u8,
    pub setup_config: SetupConfig,
    pub tx_power: TxPower,
    /// Must match the board's front end and bias configuration.
    pub overrides: OverrideTable,
    /// Advertising channel (37, 38 or 39).
    pub channel: u8,
    /// `RFC_PWR.PWMCLKEN` mask; 0x7FF enables every RF core module.
    pub module_clocks: u32,
    pub tx_test: TxTestConfig,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            rf_mode: RF_MODE_BLE,
            setup_mode: 0,
            setup_config: SetupConfig::DIFFERENTIAL_INTERNAL_BIAS,
            tx_power: TxPower::DBM_5,
            overrides: overrides::BLE_DIFFERENTIAL_INTERNAL_BIAS,
            channel: ADV_CHANNEL_37,
            module_clocks: 0x7FF,
            tx_test: TxTestConfig::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// RF core driver.
pub struct Rfc<H: Hardware, P: Poll = Spin> {
    hw: H,
    poll: P,
    config: Config,
}

impl<H: Hardware, P: Poll> Rfc<H, P> {
    pub fn new(hw: H, poll: P, config: Config) -> Self {
        Self { hw, poll, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direct register access, e.g. to inspect `RFCPEIFG`.
    pub fn hardware(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn poll_mut(&mut self) -> &mut P {
        &mut self.poll
    }

    pub fn release(self) -> (H, P) {
        (self.hw, self.poll)
    }

    /// Power sequencer over this driver's hardware.
    pub fn sequencer(&mut self) -> Sequencer<'_, H, P> {
        Sequencer::new(&mut self.hw, &mut self.poll)
    }

    /// Power and clock the RF core, set up the radio and start the radio timer.
    ///
    /// The host domains and the HF crystal must already be running.
    pub fn boot(&mut self) -> Result<(), Error> {
        info!("Booting RF core");
        let config = self.config;
        let mut seq = self.sequencer();

        debug!("Step 1: Powering off RF core");
        seq.power_off(PowerDomains::RFC)?;
        seq.commit_load()?;

        debug!("Step 2: Selecting RF mode");
        seq.set_rf_mode(config.rf_mode);

        debug!("Step 3: Powering on RF core");
        seq.power_on(PowerDomains::RFC)?;
        seq.commit_load()?;

        debug!("Step 4: Enabling RF core clock");
        seq.enable_clock(PowerDomains::RFC)?;

        debug!("Step 5: Enabling RF core modules");
        seq.enable_rf_modules(config.module_clocks)?;

        debug!("Step 6: Radio setup");
        self.setup_radio()?;

        debug!("Step 7: Starting radio timer");
        self.start_rat()?;

        info!("RF core booted");
        Ok(())
    }

    /// Submit `CMD_RADIO_SETUP` with the configured mode, TX power and overrides.
    pub fn setup_radio(&mut self) -> Result<(), Error> {
        let mut cmd = CmdRadioSetup::new();
        cmd.mode = self.config.setup_mode;
        cmd.config = self.config.setup_config;
        cmd.tx_power = self.config.tx_power;
        cmd.reg_override = self.config.overrides.as_ptr() as *mut u32;

        let status = self.submit(&mut cmd)?;
        expect(cmd::CMD_RADIO_SETUP, status, Status::DONE_OK..=Status::DONE_OK)
    }

    /// Start the radio timer. Already running counts as success.
    pub fn start_rat(&mut self) -> Result<(), Error> {
        let sta = self.direct(cmd::CMD_START_RAT)?;
        match sta.result() {
            CmdSta::DONE => Ok(()),
            CmdSta::CONTEXT_ERROR => {
                debug!("Radio timer already running");
                Ok(())
            }
            _ => {
                error!("CMD_START_RAT rejected: {:?}", sta);
                Err(Error::Transport(sta))
            }
        }
    }

    /// Check the RF core answers direct commands.
    pub fn ping(&mut self) -> Result<(), Error> {
        let sta = self.direct(cmd::CMD_PING)?;
        if sta.result() == CmdSta::DONE {
            Ok(())
        } else {
            warn!("CMD_PING answered {:?}", sta);
            Err(Error::Transport(sta))
        }
    }

    /// Send a direct command and return the raw doorbell answer.
    pub fn direct(&mut self, cmd: u16) -> Result<CmdSta, Error> {
        debug!("Direct command 0x{:04X}", cmd);
        doorbell::send(&mut self.hw, &mut self.poll, direct_command(cmd))
    }

    /// Submit a record and block until the RF core is done with it.
    ///
    /// Returns the terminal status; classifying it is up to the caller. A
    /// record that is not IDLE is refused with [`Error::StaleRecord`]; create
    /// a fresh one with [`RadioCommand::zeroed`] or [`RadioCommand::new`].
    ///
    /// If a bounded poll strategy gives up while waiting for completion, the
    /// RF core may still be using the record.
    pub fn submit<C: RadioCommand>(&mut self, cmd: &mut C) -> Result<Status, Error> {
        let command = cmd.header().command_no;
        let status = cmd.status();
        if status != Status::IDLE {
            warn!("Refusing to submit command 0x{:04X} in state {:?}", command, status);
            return Err(Error::StaleRecord(status));
        }

        let record: *mut C = cmd;
        let addr = self.hw.bus_address(record as *const C);
        debug!("Submitting command 0x{:04X} at 0x{:08X}", command, addr);

        // The record and its parameter blocks must be in memory before the RF core sees the address.
        fence(Ordering::SeqCst);

        let sta = doorbell::send(&mut self.hw, &mut self.poll, addr)?;
        if sta.is_rejected() {
            error!("Command 0x{:04X} rejected: {:?}", command, sta);
            return Err(Error::Transport(sta));
        }

        let status_ptr = unsafe { (record as *const u8).add(core::mem::offset_of!(RadioOp, status)) as *const u16 };
        let hw = &mut self.hw;
        let mut status = Status::IDLE;
        self.poll.until(Wait::Command(command), || {
            status = Status(unsafe { hw.read_status(status_ptr) });
            status.is_terminal()
        })?;

        // Output blocks written by the RF core are only read after the terminal status.
        fence(Ordering::SeqCst);

        debug!("Command 0x{:04X} finished with {:?}", command, status);
        Ok(status)
    }

    /// Run the configured PHY test transmission and return its counters.
    pub fn send_test_transmit(&mut self) -> Result<BleTxTestOutput, Error> {
        let test = self.config.tx_test;

        let mut out = BleTxTestOutput::default();
        let mut params: BleTxTestPar = unsafe { core::mem::zeroed() };
        params.num_packets = test.num_packets;
        params.payload_length = test.payload_length;
        params.packet_type = test.packet_type as u8;

        let mut cmd = CmdBleTxTest::new();
        cmd.channel = test.channel;
        cmd.params = &mut params;
        cmd.output = &mut out;

        let status = self.submit(&mut cmd)?;
        expect(cmd::CMD_BLE_TX_TEST, status, Status::BLE_DONE_OK..=Status::BLE_DONE_STOPPED)?;

        let out = unsafe { core::ptr::read_volatile(cmd.output) };
        debug!("Test transmission sent {} packets", out.n_tx);
        Ok(out)
    }

    /// Send one non-connectable advertising event on the configured channel.
    pub fn send_advertisement(&mut self, data: &AdvData) -> Result<BleAdvOutput, Error> {
        let mut out = BleAdvOutput::default();
        let mut params: BleAdvPar = unsafe { core::mem::zeroed() };
        params.adv_len = data.len() as u8;
        params.adv_data = data.as_bytes().as_ptr() as *mut u8;

        let mut cmd = CmdBleAdvNc::new();
        cmd.channel = self.config.channel;
        cmd.params = &mut params;
        cmd.output = &mut out;

        let status = self.submit(&mut cmd)?;
        expect(cmd::CMD_BLE_ADV_NC, status, Status::BLE_DONE_OK..=Status::BLE_DONE_STOPPED)?;

        let out = unsafe { core::ptr::read_volatile(cmd.output) };
        trace!("Advertised, {} ADV_IND sent", out.n_tx_adv_ind);
        Ok(out)
    }
}

fn expect(command: u16, status: Status, accepted: RangeInclusive<Status>) -> Result<(), Error> {
    if accepted.contains(&status) {
        Ok(())
    } else {
        error!("Command 0x{:04X} failed with {:?}", command, status);
        Err(Error::Protocol { command, status })
    }
}

#[cfg(test)]
mod tests;
