//! IPv6 fixed-header view
//!
//! ```text
//!  0               1               2               3
//!  0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! +-------+-------+---------------+-------------------------------+
//! |Version| T.Cls |           Flow Label (20 bits)                |
//! +---------------+---------------+---------------+---------------+
//! |        Payload Length         |  Next Header  |   Hop Limit   |
//! +-------------------------------+---------------+---------------+
//! |                  Source Address (128 bits)                    |
//! +---------------------------------------------------------------+
//! |               Destination Address (128 bits)                  |
//! +---------------------------------------------------------------+
//! ```
//!
//! [`Ipv6Header`] is an offset view, not a borrowed slice: parsing records
//! where in the packet the header starts, and accessors re-index the buffer
//! on each call. That keeps the view usable across the in-place growth the
//! tag embedder performs (extension headers are only ever spliced in *after*
//! this header, so its offset never moves).

use super::cursor::HeaderCursor;

/// IPv6 fixed header length
pub const IPV6_HEADER_LEN: usize = 40;

/// Protocol number for TCP
pub const PROTO_TCP: u8 = 6;

/// Protocol number for UDP
pub const PROTO_UDP: u8 = 17;

/// Protocol number for ICMPv6
pub const PROTO_ICMPV6: u8 = 58;

/// Byte offset of the flow-label bytes within the header
const FLOW_LABEL_OFFSET: usize = 1;

/// Byte offset of the payload-length field within the header
const PAYLOAD_LEN_OFFSET: usize = 4;

/// Byte offset of the next-header field within the header
const NEXT_HEADER_OFFSET: usize = 6;

/// Byte offset of the source address within the header
const SADDR_OFFSET: usize = 8;

/// Byte offset of the destination address within the header
const DADDR_OFFSET: usize = 24;

/// An offset view onto the packet's IPv6 fixed header.
#[derive(Debug, Clone, Copy)]
pub struct Ipv6Header {
    offset: usize,
}

impl Ipv6Header {
    /// Resolve the IPv6 header at the cursor's position, advancing past it.
    ///
    /// Returns `None` if the 40 fixed bytes do not fit in the buffer.
    #[must_use]
    pub fn parse(cur: &mut HeaderCursor<'_>) -> Option<Self> {
        let offset = cur.offset();
        cur.advance(IPV6_HEADER_LEN)?;
        Some(Self { offset })
    }

    /// Offset of the header's first byte within the packet.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Offset of the first byte following the fixed header, where extension
    /// headers are inserted.
    #[must_use]
    pub const fn payload_offset(&self) -> usize {
        self.offset + IPV6_HEADER_LEN
    }

    /// The next-header protocol number.
    #[must_use]
    pub fn next_header(&self, buf: &[u8]) -> u8 {
        buf[self.offset + NEXT_HEADER_OFFSET]
    }

    /// Overwrite the next-header protocol number.
    pub fn set_next_header(&self, buf: &mut [u8], value: u8) {
        buf[self.offset + NEXT_HEADER_OFFSET] = value;
    }

    /// The payload length in bytes (everything after the fixed header).
    #[must_use]
    pub fn payload_len(&self, buf: &[u8]) -> u16 {
        let at = self.offset + PAYLOAD_LEN_OFFSET;
        u16::from_be_bytes([buf[at], buf[at + 1]])
    }

    /// Overwrite the payload length, in the protocol's big-endian order.
    pub fn set_payload_len(&self, buf: &mut [u8], value: u16) {
        let at = self.offset + PAYLOAD_LEN_OFFSET;
        buf[at..at + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// The 20-bit flow label, read from the low 20 bits of the label bytes.
    #[must_use]
    pub fn flow_label(&self, buf: &[u8]) -> u32 {
        let at = self.offset + FLOW_LABEL_OFFSET;
        (u32::from(buf[at] & 0x0F) << 16) | (u32::from(buf[at + 1]) << 8) | u32::from(buf[at + 2])
    }

    /// Overwrite the flow-label bytes with the tag's low 20 bits, split
    /// 4/8/8 across the three label bytes.
    pub fn set_flow_label(&self, buf: &mut [u8], tag: u32) {
        let at = self.offset + FLOW_LABEL_OFFSET;
        buf[at] = ((tag >> 16) & 0x0F) as u8;
        buf[at + 1] = ((tag >> 8) & 0xFF) as u8;
        buf[at + 2] = (tag & 0xFF) as u8;
    }

    /// The source address as big-endian-normalized (hi, lo) u64 halves.
    #[must_use]
    pub fn src_halves(&self, buf: &[u8]) -> (u64, u64) {
        address_halves_at(buf, self.offset + SADDR_OFFSET)
    }

    /// The destination address as big-endian-normalized (hi, lo) u64 halves.
    #[must_use]
    pub fn dst_halves(&self, buf: &[u8]) -> (u64, u64) {
        address_halves_at(buf, self.offset + DADDR_OFFSET)
    }
}

/// Split the 16 address bytes at `at` into big-endian (hi, lo) u64 halves:
/// byte 0 is the most significant byte of `hi`.
fn address_halves_at(buf: &[u8], at: usize) -> (u64, u64) {
    let mut hi = [0u8; 8];
    let mut lo = [0u8; 8];
    hi.copy_from_slice(&buf[at..at + 8]);
    lo.copy_from_slice(&buf[at + 8..at + 16]);
    (u64::from_be_bytes(hi), u64::from_be_bytes(lo))
}
