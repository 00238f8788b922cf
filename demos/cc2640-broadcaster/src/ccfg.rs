//! Customer configuration area at the top of flash.
//!
//! The ROM boot code reads these words before jumping to the image. Values
//! are the driverlib defaults for a CC2640 with a 24 MHz crystal and the
//! 32.768 kHz crystal as SCLK_LF.

#[used]
#[no_mangle]
#[link_section = ".ccfg"]
pub static CCFG: [u32; 22] = [
    0x0180_0000, // EXT_LF_CLK
    0xFF82_0010, // MODE_CONF_1
    0x0058_FFFD, // SIZE_AND_DIS_FLAGS
    0xF3BF_FF3A, // MODE_CONF: XOSC_LF as SCLK_LF
    0xFFFF_FFFF, // VOLT_LOAD_0
    0xFFFF_FFFF, // VOLT_LOAD_1
    0xFFFF_FFFF, // RTC_OFFSET
    0xFFFF_FFFF, // FREQ_OFFSET
    0xFFFF_FFFF, // IEEE_MAC_0
    0xFFFF_FFFF, // IEEE_MAC_1
    0xFFFF_FFFF, // IEEE_BLE_0
    0xFFFF_FFFF, // IEEE_BLE_1
    0x00FF_FFFF, // BL_CONFIG: ROM bootloader disabled
    0xFFFF_FFFF, // ERASE_CONF
    0xFFFF_FFC5, // CCFG_TI_OPTIONS
    0xFFC5_C5C5, // CCFG_TAP_DAP_0
    0xFFC5_C5C5, // CCFG_TAP_DAP_1
    0x0000_0000, // IMAGE_VALID_CONF: boot from flash
    0xFFFF_FFFF, // CCFG_PROT_31_0
    0xFFFF_FFFF, // CCFG_PROT_63_32
    0xFFFF_FFFF, // CCFG_PROT_95_64
    0xFFFF_FFFF, // CCFG_PROT_127_96
];
