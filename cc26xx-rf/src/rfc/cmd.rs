//! Command records shared with the RF core.
//!
//! Records are `#[repr(C)]` and match the RF core firmware's layout on the
//! 32-bit target bit for bit. The RF core reads them, and writes their status
//! and output blocks, while they are submitted.

use super::Status;

pub const CMD_NOP: u16 = 0x0801;
pub const CMD_RADIO_SETUP: u16 = 0x0802;
pub const CMD_BLE_ADV_NC: u16 = 0x1805;
pub const CMD_BLE_TX_TEST: u16 = 0x180A;

/// Direct (immediate) commands, sent in CMDR instead of a record pointer.
pub const CMD_START_RAT: u16 = 0x0405;
pub const CMD_PING: u16 = 0x0406;

/// A record the RF core can execute.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]` and start with the radio operation
/// header fields (`command_no`, `status`, `next_op`, `start_time`,
/// `start_trigger`, `condition`), as generated by `radio_op!`. All-zero bytes
/// must be a valid value.
pub unsafe trait RadioCommand: Sized {
    const COMMAND_NO: u16;

    /// All fields zero, status IDLE.
    fn zeroed() -> Self {
        unsafe { core::mem::zeroed() }
    }

    /// Zeroed record carrying its command number, never conditionally chained.
    fn new() -> Self {
        let mut cmd = Self::zeroed();
        let op = cmd.header_mut();
        op.command_no = Self::COMMAND_NO;
        op.condition = Condition::NEVER;
        cmd
    }

    fn header(&self) -> &RadioOp {
        unsafe { &*(self as *const Self as *const RadioOp) }
    }

    fn header_mut(&mut self) -> &mut RadioOp {
        unsafe { &mut *(self as *mut Self as *mut RadioOp) }
    }

    fn status(&self) -> Status {
        self.header().status
    }
}

radio_op! {
    /// The bare radio operation header.
    pub struct RadioOp {}
}

radio_op! {
    /// No operation.
    pub struct CmdNop {}
}
impl_radio_command!(CmdNop, CMD_NOP);

radio_op! {
    /// Configure the RF core for a protocol and power up the frequency synthesizer.
    pub struct CmdRadioSetup {
        /// 0 selects BLE.
        pub mode: u8,
        pub __dummy0: u8,
        pub config: SetupConfig,
        pub tx_power: TxPower,
        /// Override table, terminated by `0xFFFF_FFFF`.
        pub reg_override: *mut u32,
    }
}
impl_radio_command!(CmdRadioSetup, CMD_RADIO_SETUP);

radio_op! {
    /// Send one non-connectable advertising event.
    pub struct CmdBleAdvNc {
        pub channel: u8,
        pub whitening: Whitening,
        pub params: *mut BleAdvPar,
        pub output: *mut BleAdvOutput,
    }
}
impl_radio_command!(CmdBleAdvNc, CMD_BLE_ADV_NC);

radio_op! {
    /// Transmit PHY test packets.
    pub struct CmdBleTxTest {
        pub channel: u8,
        pub whitening: Whitening,
        pub params: *mut BleTxTestPar,
        pub output: *mut BleTxTestOutput,
    }
}
impl_radio_command!(CmdBleTxTest, CMD_BLE_TX_TEST);

assert_layout!(CmdNop, size = 16, status @ 2);
assert_layout!(RadioOp, size = 16, status @ 2, next_op @ 4, start_time @ 8, start_trigger @ 12, condition @ 13);
assert_layout!(CmdRadioSetup, size = 24, mode @ 14, config @ 16, tx_power @ 18, reg_override @ 20);
assert_layout!(CmdBleAdvNc, size = 24, channel @ 14, whitening @ 15, params @ 16, output @ 20);
assert_layout!(CmdBleTxTest, size = 24, channel @ 14, whitening @ 15, params @ 16, output @ 20);

/// Advertising parameters.
#[repr(C, align(4))]
#[derive(Debug, Clone, Copy)]
pub struct BleAdvPar {
    /// Receive queue for scan/connect requests; unused when non-connectable.
    pub rx_queue: *mut u8,
    pub rx_config: u8,
    pub adv_config: u8,
    pub adv_len: u8,
    pub scan_rsp_len: u8,
    pub adv_data: *mut u8,
    pub scan_rsp_data: *mut u8,
    /// Null uses the device's factory address.
    pub device_address: *mut u16,
    pub white_list: *mut u32,
    pub __dummy0: u16,
    pub __dummy1: u8,
    pub end_trigger: Trigger,
    pub end_time: u32,
}
assert_layout!(BleAdvPar, size = 32, adv_len @ 6, adv_data @ 8, device_address @ 16, end_trigger @ 27, end_time @ 28);

/// Advertising counters, updated by the RF core.
#[repr(C, align(4))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BleAdvOutput {
    pub n_tx_adv_ind: u16,
    pub n_tx_scan_rsp: u8,
    pub n_rx_scan_req: u8,
    pub n_rx_connect_req: u8,
    pub __dummy0: u8,
    pub n_rx_nok: u16,
    pub n_rx_ignored: u16,
    pub n_rx_buf_full: u8,
    pub last_rssi: i8,
    pub time_stamp: u32,
}
assert_layout!(BleAdvOutput, size = 16, n_rx_nok @ 6, last_rssi @ 11, time_stamp @ 12);

#[repr(C, align(4))]
#[derive(Debug, Clone, Copy)]
pub struct BleTxTestPar {
    /// 0 means transmit until stopped.
    pub num_packets: u16,
    pub payload_length: u8,
    pub packet_type: u8,
    /// Packet interval in radio timer ticks; 0 uses the default of 625 us.
    pub period: u32,
    pub config: u8,
    pub byte_val: u8,
    pub __dummy0: u8,
    pub end_trigger: Trigger,
    pub end_time: u32,
}
assert_layout!(BleTxTestPar, size = 16, period @ 4, config @ 8, end_trigger @ 11, end_time @ 12);

#[repr(C, align(4))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BleTxTestOutput {
    /// Packets transmitted.
    pub n_tx: u16,
}
assert_layout!(BleTxTestOutput, size = 4);

/// PHY test payload pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PacketType {
    Prbs9 = 0,
    /// Repeated `11110000`.
    Repeated0F = 1,
    /// Repeated `10101010`.
    Repeated55 = 2,
}

macro_rules! bitfield_accessors {
    ($ty:ty, $raw:ty; $($get:ident, $set:ident: $pos:expr, $width:expr;)*) => {
        impl $ty {
            $(
                pub const fn $get(&self) -> $raw {
                    (self.0 >> $pos) & ((1 << $width) - 1)
                }

                pub const fn $set(self, value: $raw) -> Self {
                    let mask: $raw = ((1 << $width) - 1) << $pos;
                    Self((self.0 & !mask) | ((value << $pos) & mask))
                }
            )*
        }
    };
}

/// Start or end trigger byte.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Trigger(pub u8);

bitfield_accessors! { Trigger, u8;
    trigger_type, with_trigger_type: 0, 4;
    ena_cmd, with_ena_cmd: 4, 1;
    trigger_no, with_trigger_no: 5, 2;
    past_trig, with_past_trig: 7, 1;
}

impl Trigger {
    pub const NOW: Self = Self(0);
    pub const NEVER: Self = Self(1);
    pub const ABS_TIME: Self = Self(2);
    pub const REL_SUBMIT: Self = Self(3);
}

/// Chaining condition byte.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Condition(pub u8);

bitfield_accessors! { Condition, u8;
    rule, with_rule: 0, 4;
    n_skip, with_n_skip: 4, 4;
}

impl Condition {
    pub const ALWAYS: Self = Self(0);
    pub const NEVER: Self = Self(1);
}

/// Whitening byte of BLE radio operations. Zero uses the channel default.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Whitening(pub u8);

bitfield_accessors! { Whitening, u8;
    init, with_init: 0, 7;
    override_, with_override: 7, 1;
}

/// `CMD_RADIO_SETUP.config`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetupConfig(pub u16);

bitfield_accessors! { SetupConfig, u16;
    front_end_mode, with_front_end_mode: 0, 3;
    bias_mode, with_bias_mode: 3, 1;
    no_fs_power_up, with_no_fs_power_up: 10, 1;
}

impl SetupConfig {
    /// Differential front end, internal bias, synthesizer powered up.
    pub const DIFFERENTIAL_INTERNAL_BIAS: Self = Self(0);
}

/// `CMD_RADIO_SETUP.txPower`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxPower(pub u16);

bitfield_accessors! { TxPower, u16;
    ib, with_ib: 0, 6;
    gc, with_gc: 6, 2;
    boost, with_boost: 8, 1;
    temp_coeff, with_temp_coeff: 9, 7;
}

impl TxPower {
    /// +5 dBm, the CC2640 maximum, from TI's PA table: IB 0x30, GC 0,
    /// boost 1, tempCoeff 0x49.
    ///
    /// Assigning `boost = 5` and `tempCoeff = 0x93` field by field gives a
    /// different word, 0x2730 (boost 1, tempCoeff 0x13), because each value
    /// is reduced modulo its field width.
    pub const DBM_5: Self = Self(0x9330);
    /// 0 dBm.
    pub const DBM_0: Self = Self(0x3161);
    /// -21 dBm.
    pub const DBM_MINUS_21: Self = Self(0x0CC7);
}
