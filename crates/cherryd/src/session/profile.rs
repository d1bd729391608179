//! Hardware profiles that change how table-miss entries are installed.

use cherry_openflow::DescReply;
use std::fmt;

/// Switch families with a non-default flow table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchProfile {
    /// HP 2920-24G: table 100 is the hardware table and table 200 a slow
    /// software table, so misses chain 0 -> 100 -> 200 -> controller.
    Hp2920,
    /// Accton AS4600-54T: rejects a table-miss entry on table 0 with
    /// TABLE_FULL (type=5, code=1) right after all flows are removed.
    As4600,
    /// Single-table behavior: table 0 -> controller.
    Generic,
}

impl SwitchProfile {
    pub fn classify(manufacturer: &str, hardware: &str) -> Self {
        if manufacturer.starts_with("HP") && hardware.starts_with("2920-24G") {
            SwitchProfile::Hp2920
        } else if hardware.contains("AS4600-54T") {
            SwitchProfile::As4600
        } else {
            SwitchProfile::Generic
        }
    }

    /// Table the controller-bound table-miss entry ends up in, or `None` when
    /// no entry is installed.
    pub const fn default_table(&self) -> Option<u8> {
        match self {
            SwitchProfile::Hp2920 => Some(200),
            SwitchProfile::As4600 => None,
            SwitchProfile::Generic => Some(0),
        }
    }
}

impl From<&DescReply> for SwitchProfile {
    fn from(desc: &DescReply) -> Self {
        Self::classify(&desc.manufacturer, &desc.hardware)
    }
}

impl fmt::Display for SwitchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchProfile::Hp2920 => write!(f, "HP 2920-24G"),
            SwitchProfile::As4600 => write!(f, "AS4600-54T"),
            SwitchProfile::Generic => write!(f, "generic"),
        }
    }
}
