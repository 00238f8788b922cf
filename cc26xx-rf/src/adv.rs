//! BLE advertising data.
//!
//! A payload is a sequence of AD structures, each `<len:1><type:1><data:len-1>`,
//! at most 31 bytes in total for legacy advertising.

/// Largest legacy advertising payload.
pub const MAX_ADV_LEN: usize = 31;

/// AD type codes (Bluetooth Assigned Numbers, Generic Access Profile).
pub mod ad_type {
    pub const FLAGS: u8 = 0x01;
    pub const SHORT_LOCAL_NAME: u8 = 0x08;
    pub const COMPLETE_LOCAL_NAME: u8 = 0x09;
    pub const TX_POWER_LEVEL: u8 = 0x0A;
    pub const MANUFACTURER_SPECIFIC: u8 = 0xFF;
}

/// Bits of the flags AD structure.
pub mod flags {
    pub const LE_LIMITED_DISCOVERABLE: u8 = 0x01;
    pub const LE_GENERAL_DISCOVERABLE: u8 = 0x02;
    pub const BR_EDR_NOT_SUPPORTED: u8 = 0x04;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvError {
    /// Adding the structure would exceed [`MAX_ADV_LEN`].
    TooLong {
        /// Total payload length the structure would need.
        needed: usize,
    },
    /// Structure data must be 1..=254 bytes.
    InvalidLength(usize),
    /// The structure starting at `offset` runs past the end of the payload.
    Malformed { offset: usize },
}

/// Advertising payload builder.
#[derive(Clone, PartialEq, Eq)]
pub struct AdvData {
    buf: [u8; MAX_ADV_LEN],
    len: usize,
}

impl AdvData {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_ADV_LEN],
            len: 0,
        }
    }

    /// Append a raw AD structure.
    pub fn field(&mut self, ty: u8, data: &[u8]) -> Result<&mut Self, AdvError> {
        self.push(ty, &[data])
    }

    pub fn flags(&mut self, flags: u8) -> Result<&mut Self, AdvError> {
        self.push(ad_type::FLAGS, &[&[flags]])
    }

    /// Advertised TX power in dBm. Informational only, scanners use it for
    /// path loss estimates.
    pub fn tx_power(&mut self, dbm: i8) -> Result<&mut Self, AdvError> {
        self.push(ad_type::TX_POWER_LEVEL, &[&[dbm as u8]])
    }

    pub fn complete_name(&mut self, name: &str) -> Result<&mut Self, AdvError> {
        self.push(ad_type::COMPLETE_LOCAL_NAME, &[name.as_bytes()])
    }

    pub fn short_name(&mut self, name: &str) -> Result<&mut Self, AdvError> {
        self.push(ad_type::SHORT_LOCAL_NAME, &[name.as_bytes()])
    }

    /// Manufacturer specific data, prefixed with the little-endian company id.
    pub fn manufacturer(&mut self, company_id: u16, data: &[u8]) -> Result<&mut Self, AdvError> {
        self.push(ad_type::MANUFACTURER_SPECIFIC, &[&company_id.to_le_bytes(), data])
    }

    fn push(&mut self, ty: u8, parts: &[&[u8]]) -> Result<&mut Self, AdvError> {
        let data_len: usize = parts.iter().map(|p| p.len()).sum();
        if data_len == 0 || data_len > 254 {
            return Err(AdvError::InvalidLength(data_len));
        }

        let needed = self.len + 2 + data_len;
        if needed > MAX_ADV_LEN {
            return Err(AdvError::TooLong { needed });
        }

        self.buf[self.len] = (data_len + 1) as u8;
        self.buf[self.len + 1] = ty;
        let mut pos = self.len + 2;
        for part in parts {
            self.buf[pos..pos + part.len()].copy_from_slice(part);
            pos += part.len();
        }
        self.len = pos;
        Ok(self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> AdStructures<'_> {
        AdStructures::new(self.as_bytes())
    }
}

impl Default for AdvData {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for AdvData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AdvData").field(&crate::fmt::Bytes(self.as_bytes())).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AdvData {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "AdvData({})", crate::fmt::Bytes(self.as_bytes()))
    }
}

/// One AD structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdStructure<'a> {
    pub ty: u8,
    pub data: &'a [u8],
}

/// Iterator over the AD structures of a payload.
///
/// Stops at a zero length byte (the rest is padding) or after the first
/// malformed structure.
#[derive(Debug, Clone)]
pub struct AdStructures<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> AdStructures<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for AdStructures<'a> {
    type Item = Result<AdStructure<'a>, AdvError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset;
        let len = *self.bytes.get(offset)? as usize;
        if len == 0 {
            self.offset = self.bytes.len();
            return None;
        }

        let end = offset + 1 + len;
        if end > self.bytes.len() {
            self.offset = self.bytes.len();
            return Some(Err(AdvError::Malformed { offset }));
        }

        self.offset = end;
        Some(Ok(AdStructure {
            ty: self.bytes[offset + 1],
            data: &self.bytes[offset + 2..end],
        }))
    }
}
