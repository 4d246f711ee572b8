//! Opaque flow tag
//!
//! A tag is a 32-bit value assigned by the control plane. This subsystem
//! treats it as opaque; only the low 20 bits ever reach the wire (both the
//! flow-label field and the extension-header option carry 20 bits). No value
//! is reserved here except the no-match sentinel, which exists purely for
//! observability: it lets a packet capture distinguish "classified, no
//! match" from "never touched by this pipeline".

use serde::{Deserialize, Serialize};

/// An opaque 32-bit flow tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowTag(u32);

impl FlowTag {
    /// Sentinel written into the flow-label field when the table misses.
    pub const NO_MATCH: Self = Self(0xF_FFFF);

    /// Mask selecting the bits that reach the wire.
    pub const WIRE_MASK: u32 = 0xF_FFFF;

    /// Wrap a raw tag value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The full 32-bit tag value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The low 20 bits, as embedded on the wire.
    #[must_use]
    pub const fn wire_bits(self) -> u32 {
        self.0 & Self::WIRE_MASK
    }
}

impl std::fmt::Display for FlowTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:05x}", self.wire_bits())
    }
}

impl From<u32> for FlowTag {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_bits_truncate_to_20() {
        let tag = FlowTag::new(0xABC_DEF0);
        assert_eq!(tag.wire_bits(), 0xC_DEF0);
        assert_eq!(tag.value(), 0xABC_DEF0);
    }

    #[test]
    fn test_no_match_sentinel() {
        assert_eq!(FlowTag::NO_MATCH.wire_bits(), 0xF_FFFF);
    }

    #[test]
    fn test_display() {
        assert_eq!(FlowTag::new(0x0A_BCDE).to_string(), "0xabcde");
    }
}
