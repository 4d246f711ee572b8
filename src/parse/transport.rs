//! Transport-layer port extraction
//!
//! Only the port pair is read. TCP requires its full 20-byte fixed header in
//! bounds before any field is touched; UDP requires its 8 bytes. Both carry
//! the ports in the same place:
//!
//! ```text
//! [source port:2][destination port:2]...
//! ```
//!
//! ICMPv6 has no ports and no parser here; the flow key builder substitutes
//! fixed sentinel ports for it instead.

use super::cursor::HeaderCursor;

/// TCP fixed header length
pub const TCP_HEADER_LEN: usize = 20;

/// UDP header length
pub const UDP_HEADER_LEN: usize = 8;

/// The port pair of a transport header, byte-order-normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportPorts {
    /// Source port (host order)
    pub src: u16,
    /// Destination port (host order)
    pub dst: u16,
}

/// Resolve a TCP header at the cursor, returning its ports.
///
/// Returns `None` if the 20 fixed bytes do not fit.
#[must_use]
pub fn parse_tcp(cur: &mut HeaderCursor<'_>) -> Option<TransportPorts> {
    ports_from(cur.advance(TCP_HEADER_LEN)?)
}

/// Resolve a UDP header at the cursor, returning its ports.
///
/// Returns `None` if the 8 bytes do not fit.
#[must_use]
pub fn parse_udp(cur: &mut HeaderCursor<'_>) -> Option<TransportPorts> {
    ports_from(cur.advance(UDP_HEADER_LEN)?)
}

fn ports_from(header: &[u8]) -> Option<TransportPorts> {
    if header.len() < 4 {
        return None;
    }
    Some(TransportPorts {
        src: u16::from_be_bytes([header[0], header[1]]),
        dst: u16::from_be_bytes([header[2], header[3]]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(src: u16, dst: u16, len: usize) -> Vec<u8> {
        let mut seg = vec![0u8; len];
        seg[0..2].copy_from_slice(&src.to_be_bytes());
        seg[2..4].copy_from_slice(&dst.to_be_bytes());
        seg
    }

    #[test]
    fn test_tcp_ports() {
        let seg = segment(51000, 443, TCP_HEADER_LEN);
        let mut cur = HeaderCursor::new(&seg);
        let ports = parse_tcp(&mut cur).unwrap();
        assert_eq!(ports.src, 51000);
        assert_eq!(ports.dst, 443);
        assert_eq!(cur.offset(), TCP_HEADER_LEN);
    }

    #[test]
    fn test_tcp_requires_full_fixed_header() {
        // Ports are present, but the fixed header is truncated
        let seg = segment(51000, 443, TCP_HEADER_LEN - 1);
        let mut cur = HeaderCursor::new(&seg);
        assert!(parse_tcp(&mut cur).is_none());
        assert_eq!(cur.offset(), 0);
    }

    #[test]
    fn test_udp_ports() {
        let seg = segment(5353, 53, UDP_HEADER_LEN);
        let mut cur = HeaderCursor::new(&seg);
        let ports = parse_udp(&mut cur).unwrap();
        assert_eq!(ports.src, 5353);
        assert_eq!(ports.dst, 53);
    }

    #[test]
    fn test_udp_truncated() {
        let seg = segment(5353, 53, UDP_HEADER_LEN)[..7].to_vec();
        let mut cur = HeaderCursor::new(&seg);
        assert!(parse_udp(&mut cur).is_none());
    }
}
