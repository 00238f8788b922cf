//! Radio register override tables for `CMD_RADIO_SETUP`.

/// A list of override words ending with [`OverrideTable::END`].
///
/// The terminator is checked when the table is built, so a `const` table with
/// a missing terminator fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideTable(&'static [u32]);

impl OverrideTable {
    pub const END: u32 = 0xFFFF_FFFF;

    pub const fn new(words: &'static [u32]) -> Self {
        if words.is_empty() || words[words.len() - 1] != Self::END {
            ::core::panic!("override table must end with 0xFFFFFFFF");
        }
        Self(words)
    }

    /// All words, terminator included.
    pub const fn words(&self) -> &'static [u32] {
        self.0
    }

    /// Override entries, terminator excluded.
    pub fn entries(&self) -> &'static [u32] {
        &self.0[..self.0.len() - 1]
    }

    pub const fn as_ptr(&self) -> *const u32 {
        self.0.as_ptr()
    }
}

/// BLE, differential front end, internal bias (CC2640 rev 2.x).
pub const BLE_DIFFERENTIAL_INTERNAL_BIAS: OverrideTable = OverrideTable::new(&[
    0x0000_1007,
    0x0035_4038,
    0x4001_402D,
    0x0060_8402,
    0x4001_405D,
    0x1801_F800,
    0x0007_84A3,
    0xA47E_0583,
    0xEAE0_0603,
    0x0001_0623,
    0x0201_0403,
    0x4001_4035,
    0x177F_0408,
    0x3800_0463,
    0x0045_6088,
    0x0138_00C3,
    0x0360_52AC,
    0x01AD_02A3,
    0x0168_0263,
    OverrideTable::END,
]);
