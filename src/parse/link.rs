//! Link-layer (Ethernet / 802.1Q) parsing
//!
//! Recognizes exactly two frame shapes:
//!
//! ```text
//! Ethernet:  [dst MAC:6][src MAC:6][EtherType:2]                      = 14 bytes
//! 802.1Q:    [dst MAC:6][src MAC:6][TPID 0x8100:2][TCI:2][EtherType:2] = 18 bytes
//! ```
//!
//! In both cases the encapsulated protocol must be IPv6; any other
//! EtherType, or a second stacked VLAN tag, means the packet is not ours to
//! touch.

use tracing::trace;

use super::cursor::HeaderCursor;

/// EtherType for IPv6
pub const ETH_P_IPV6: u16 = 0x86DD;

/// EtherType for an 802.1Q VLAN tag
pub const ETH_P_8021Q: u16 = 0x8100;

/// Plain Ethernet header length
pub const ETHERNET_HEADER_LEN: usize = 14;

/// Single-tagged 802.1Q header length
pub const VLAN_HEADER_LEN: usize = 18;

/// The resolved outer link-layer shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkHeader {
    /// Plain Ethernet frame carrying IPv6
    Ethernet,
    /// Single 802.1Q-tagged frame carrying IPv6
    Vlan,
}

impl LinkHeader {
    /// Length of this link-layer header in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Ethernet => ETHERNET_HEADER_LEN,
            Self::Vlan => VLAN_HEADER_LEN,
        }
    }
}

/// Resolve the outer link-layer header, leaving the cursor at the first
/// byte of the network-layer header.
///
/// Returns `None` if the frame is truncated or does not encapsulate IPv6.
#[must_use]
pub fn parse_link(cur: &mut HeaderCursor<'_>) -> Option<LinkHeader> {
    // EtherType sits in the last two bytes of the plain Ethernet header.
    let ethertype = cur.peek_u16_at(ETHERNET_HEADER_LEN - 2)?;

    match ethertype {
        ETH_P_IPV6 => {
            cur.advance(ETHERNET_HEADER_LEN)?;
            Some(LinkHeader::Ethernet)
        }
        ETH_P_8021Q => {
            // The encapsulated EtherType follows the 4-byte 802.1Q tag.
            let inner = cur.peek_u16_at(VLAN_HEADER_LEN - 2)?;
            if inner != ETH_P_IPV6 {
                trace!("802.1Q frame does not encapsulate IPv6 (got 0x{inner:04x})");
                return None;
            }
            cur.advance(VLAN_HEADER_LEN)?;
            Some(LinkHeader::Vlan)
        }
        other => {
            trace!("Unrecognized EtherType 0x{other:04x}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethernet_frame(ethertype: u16) -> Vec<u8> {
        let mut frame = vec![0u8; 12];
        frame.extend_from_slice(&ethertype.to_be_bytes());
        frame
    }

    fn vlan_frame(inner: u16) -> Vec<u8> {
        let mut frame = vec![0u8; 12];
        frame.extend_from_slice(&ETH_P_8021Q.to_be_bytes());
        frame.extend_from_slice(&[0x00, 0x01]); // TCI: VLAN id 1
        frame.extend_from_slice(&inner.to_be_bytes());
        frame
    }

    #[test]
    fn test_plain_ethernet_ipv6() {
        let frame = ethernet_frame(ETH_P_IPV6);
        let mut cur = HeaderCursor::new(&frame);
        assert_eq!(parse_link(&mut cur), Some(LinkHeader::Ethernet));
        assert_eq!(cur.offset(), ETHERNET_HEADER_LEN);
    }

    #[test]
    fn test_vlan_ipv6() {
        let frame = vlan_frame(ETH_P_IPV6);
        let mut cur = HeaderCursor::new(&frame);
        assert_eq!(parse_link(&mut cur), Some(LinkHeader::Vlan));
        assert_eq!(cur.offset(), VLAN_HEADER_LEN);
    }

    #[test]
    fn test_ipv4_rejected() {
        let frame = ethernet_frame(0x0800);
        let mut cur = HeaderCursor::new(&frame);
        assert_eq!(parse_link(&mut cur), None);
    }

    #[test]
    fn test_vlan_encapsulating_ipv4_rejected() {
        let frame = vlan_frame(0x0800);
        let mut cur = HeaderCursor::new(&frame);
        assert_eq!(parse_link(&mut cur), None);
    }

    #[test]
    fn test_double_tagged_rejected() {
        // A second VLAN tag where the encapsulated EtherType should be
        let frame = vlan_frame(ETH_P_8021Q);
        let mut cur = HeaderCursor::new(&frame);
        assert_eq!(parse_link(&mut cur), None);
    }

    #[test]
    fn test_truncated_ethernet() {
        let frame = [0u8; 13];
        let mut cur = HeaderCursor::new(&frame);
        assert_eq!(parse_link(&mut cur), None);
        assert_eq!(cur.offset(), 0);
    }

    #[test]
    fn test_truncated_vlan() {
        let mut frame = vec![0u8; 12];
        frame.extend_from_slice(&ETH_P_8021Q.to_be_bytes());
        frame.push(0x00); // TCI cut short
        let mut cur = HeaderCursor::new(&frame);
        assert_eq!(parse_link(&mut cur), None);
    }
}
