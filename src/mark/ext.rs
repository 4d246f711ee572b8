//! IPv6 extension-header layout
//!
//! Hop-by-hop (RFC 2460 §4.3) and destination options (§4.6) headers share
//! one layout; only the next-header code point *referring* to them differs.
//! The tag fits in a single minimal 8-octet header: one experimental 3-byte
//! TLV option plus a Pad1 option to reach the 8-octet granule.
//!
//! ```text
//! [next header:1][hdr len=0:1][opt type 0x1E:1][opt len=3:1]
//! [tag 19..16:1][tag 15..8:1][tag 7..0:1][Pad1 0x00:1]
//! ```
//!
//! The option type is the RFC 4727 experimental code point with "skip if
//! unrecognized" semantics, so marked packets survive routers that have
//! never heard of the tag.

use crate::flow::FlowTag;

/// Next-header code point for a hop-by-hop options header
pub const NEXT_HEADER_HOP_BY_HOP: u8 = 0;

/// Next-header code point for a destination options header
pub const NEXT_HEADER_DEST_OPTS: u8 = 60;

/// Experimental option type (RFC 4727), skip-if-unrecognized
pub const OPTION_TYPE_EXPERIMENTAL: u8 = 0x1E;

/// Length in octets of the option's data (the 3 tag bytes)
pub const OPTION_DATA_LEN: u8 = 3;

/// Total size of one minimal extension header
pub const EXTENSION_HEADER_LEN: usize = 8;

/// Total size of the chained hop-by-hop + destination-options pair
pub const COMPOSITE_HEADER_LEN: usize = 2 * EXTENSION_HEADER_LEN;

/// One minimal 8-octet extension header carrying a flow tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionHeader {
    bytes: [u8; EXTENSION_HEADER_LEN],
}

impl ExtensionHeader {
    /// Build a header chaining to `next_header` and carrying `tag`.
    #[must_use]
    pub fn new(next_header: u8, tag: FlowTag) -> Self {
        let bits = tag.wire_bits();
        let mut bytes = [0u8; EXTENSION_HEADER_LEN];
        bytes[0] = next_header;
        // Header length is in 8-octet units beyond the first 8; this design
        // always emits exactly one granule.
        bytes[1] = 0;
        bytes[2] = OPTION_TYPE_EXPERIMENTAL;
        bytes[3] = OPTION_DATA_LEN;
        bytes[4] = ((bits >> 16) & 0x0F) as u8;
        bytes[5] = ((bits >> 8) & 0xFF) as u8;
        bytes[6] = (bits & 0xFF) as u8;
        // bytes[7] stays 0x00: the Pad1 option
        Self { bytes }
    }

    /// The wire bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; EXTENSION_HEADER_LEN] {
        &self.bytes
    }

    /// The next-header field.
    #[must_use]
    pub const fn next_header(&self) -> u8 {
        self.bytes[0]
    }
}

/// Hop-by-hop and destination-options headers chained back to back, each
/// carrying the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeExtensionHeader {
    bytes: [u8; COMPOSITE_HEADER_LEN],
}

impl CompositeExtensionHeader {
    /// Build the pair: hop-by-hop first, pointing at the destination-options
    /// header, which in turn points at `original_next_header`.
    #[must_use]
    pub fn new(original_next_header: u8, tag: FlowTag) -> Self {
        let hop_by_hop = ExtensionHeader::new(NEXT_HEADER_DEST_OPTS, tag);
        let dest_opts = ExtensionHeader::new(original_next_header, tag);

        let mut bytes = [0u8; COMPOSITE_HEADER_LEN];
        bytes[..EXTENSION_HEADER_LEN].copy_from_slice(hop_by_hop.as_bytes());
        bytes[EXTENSION_HEADER_LEN..].copy_from_slice(dest_opts.as_bytes());
        Self { bytes }
    }

    /// The wire bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; COMPOSITE_HEADER_LEN] {
        &self.bytes
    }
}

/// Recover the 20-bit tag from extension-header wire bytes.
///
/// The inverse of the embedding: returns `None` if the bytes are not a
/// minimal tag-carrying header as emitted by this crate.
#[must_use]
pub fn recover_tag(header: &[u8]) -> Option<u32> {
    if header.len() < EXTENSION_HEADER_LEN {
        return None;
    }
    if header[1] != 0 || header[2] != OPTION_TYPE_EXPERIMENTAL || header[3] != OPTION_DATA_LEN {
        return None;
    }
    Some(
        (u32::from(header[4] & 0x0F) << 16) | (u32::from(header[5]) << 8) | u32::from(header[6]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let hdr = ExtensionHeader::new(6, FlowTag::new(0x0A_BCDE));
        assert_eq!(
            hdr.as_bytes(),
            &[6, 0, OPTION_TYPE_EXPERIMENTAL, 3, 0x0A, 0xBC, 0xDE, 0x00]
        );
    }

    #[test]
    fn test_tag_high_bits_masked() {
        let hdr = ExtensionHeader::new(6, FlowTag::new(0xFFF1_2345));
        // Only the low 20 bits reach the option data
        assert_eq!(hdr.as_bytes()[4], 0x01);
        assert_eq!(hdr.as_bytes()[5], 0x23);
        assert_eq!(hdr.as_bytes()[6], 0x45);
    }

    #[test]
    fn test_composite_chaining() {
        let comp = CompositeExtensionHeader::new(6, FlowTag::new(0x00001));
        let bytes = comp.as_bytes();

        // First header: hop-by-hop shape pointing at destination options
        assert_eq!(bytes[0], NEXT_HEADER_DEST_OPTS);
        // Second header: destination options pointing at the original
        assert_eq!(bytes[EXTENSION_HEADER_LEN], 6);
        // Both carry the tag
        assert_eq!(recover_tag(&bytes[..8]), Some(1));
        assert_eq!(recover_tag(&bytes[8..]), Some(1));
    }

    #[test]
    fn test_recover_tag_round_trip() {
        let hdr = ExtensionHeader::new(17, FlowTag::new(0x54321));
        assert_eq!(recover_tag(hdr.as_bytes()), Some(0x54321));
    }

    #[test]
    fn test_recover_tag_rejects_foreign_bytes() {
        assert_eq!(recover_tag(&[0u8; 8]), None);
        assert_eq!(recover_tag(&[6, 0, OPTION_TYPE_EXPERIMENTAL, 3]), None);
    }
}
