//! Canonical flow identifier
//!
//! Both sides of the flow table (the control plane registering flows and
//! the packet path looking them up) must derive byte-identical keys, so
//! the conventions live here in one place:
//!
//! - Addresses are the packet's **destination** address, split into
//!   big-endian-normalized (hi, lo) u64 halves (byte 0 of the address is
//!   the most significant byte of `addr_hi`).
//! - Ports are in host order on both sides.
//! - Port-less protocols (ICMPv6 echo and friends) use the fixed sentinel
//!   pair [`ICMPV6_DST_PORT`]/[`ICMPV6_SRC_PORT`]. The control plane must
//!   register such flows with the same sentinels; nothing enforces this at
//!   the type level, it is a documented cross-component contract. The
//!   sentinels are deliberately non-zero so address-only flows cannot
//!   collide with a transport flow that genuinely uses port 0.
//!
//! Keys are plain value types constructed whole; every constructor
//! populates all fields, so no stale bits can leak into a lookup.

use std::net::Ipv6Addr;

use crate::parse::ipv6::Ipv6Header;

/// Sentinel destination port for port-less (ICMPv6) flows
pub const ICMPV6_DST_PORT: u16 = 5777;

/// Sentinel source port for port-less (ICMPv6) flows
pub const ICMPV6_SRC_PORT: u16 = 2345;

/// Canonical flow identifier: destination address halves plus port pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlowKey {
    /// Upper 64 bits of the destination address, big-endian-normalized
    pub addr_hi: u64,
    /// Lower 64 bits of the destination address, big-endian-normalized
    pub addr_lo: u64,
    /// Destination port (host order), or [`ICMPV6_DST_PORT`]
    pub dst_port: u16,
    /// Source port (host order), or [`ICMPV6_SRC_PORT`]
    pub src_port: u16,
}

impl FlowKey {
    /// The all-zeroes key used in match-all deployments, where a single
    /// table entry tags every parsed flow.
    pub const MATCH_ALL: Self = Self {
        addr_hi: 0,
        addr_lo: 0,
        dst_port: 0,
        src_port: 0,
    };

    /// Key for a port-bearing (TCP/UDP) flow.
    #[must_use]
    pub const fn for_transport(addr_hi: u64, addr_lo: u64, dst_port: u16, src_port: u16) -> Self {
        Self {
            addr_hi,
            addr_lo,
            dst_port,
            src_port,
        }
    }

    /// Key for a port-less (ICMPv6) flow, with the sentinel port pair.
    #[must_use]
    pub const fn for_control(addr_hi: u64, addr_lo: u64) -> Self {
        Self {
            addr_hi,
            addr_lo,
            dst_port: ICMPV6_DST_PORT,
            src_port: ICMPV6_SRC_PORT,
        }
    }

    /// Key derived from a parsed IPv6 header's destination address.
    #[must_use]
    pub fn from_headers(l3: Ipv6Header, buf: &[u8], dst_port: u16, src_port: u16) -> Self {
        let (addr_hi, addr_lo) = l3.dst_halves(buf);
        Self::for_transport(addr_hi, addr_lo, dst_port, src_port)
    }

    /// Key built on the control-plane side from a destination address.
    ///
    /// Uses the same big-endian normalization as the packet path, so a key
    /// registered here matches the key a packet to `dst` derives.
    #[must_use]
    pub fn from_destination(dst: Ipv6Addr, dst_port: u16, src_port: u16) -> Self {
        let (addr_hi, addr_lo) = address_halves(&dst);
        Self::for_transport(addr_hi, addr_lo, dst_port, src_port)
    }
}

/// Split an IPv6 address into big-endian-normalized (hi, lo) u64 halves.
#[must_use]
pub fn address_halves(addr: &Ipv6Addr) -> (u64, u64) {
    let octets = addr.octets();
    let mut hi = [0u8; 8];
    let mut lo = [0u8; 8];
    hi.copy_from_slice(&octets[0..8]);
    lo.copy_from_slice(&octets[8..16]);
    (u64::from_be_bytes(hi), u64::from_be_bytes(lo))
}
