use serde::{Deserialize, Serialize};

// ---------- peripherals.yaml ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peripherals {
    pub peripherals: Vec<Peripheral>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peripheral {
    pub name: String,
    /// Hex string, e.g. `"0x40082000"`.
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------- <PERIPHERAL>.yaml ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub registers: Vec<Register>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Register {
    pub name: String,
    /// Hex string, offset from the block base.
    pub offset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub bit: u8,
    #[serde(default = "default_width")]
    pub width: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_width() -> u8 {
    1
}

/// Parse a `0x`-prefixed (or plain) hexadecimal string.
pub fn parse_hex(s: &str) -> Result<u64, String> {
    let digits = s
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .replace('_', "");
    u64::from_str_radix(&digits, 16).map_err(|e| format!("invalid hex value {:?}: {}", s, e))
}
