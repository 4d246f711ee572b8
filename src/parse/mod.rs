//! Bounds-checked header parsing
//!
//! This module walks a packet's layer-2/3/4 headers with strict bounds
//! verification. The [`HeaderCursor`] advances through the buffer one typed
//! header at a time and never backtracks; every advance asks a single
//! question ("do the next N bytes fit?") and any layer that does not fit
//! short-circuits the whole pipeline into a pass-through verdict.
//!
//! Exactly two outer link-layer shapes are recognized: a plain Ethernet
//! frame and a single 802.1Q-tagged frame. Deeper tag nesting is out of
//! scope. The encapsulated protocol must be IPv6; anything else is not an
//! error, just nothing to do.

pub mod cursor;
pub mod ipv6;
pub mod link;
pub mod transport;

pub use cursor::HeaderCursor;
pub use ipv6::{Ipv6Header, IPV6_HEADER_LEN, PROTO_ICMPV6, PROTO_TCP, PROTO_UDP};
pub use link::{parse_link, LinkHeader, ETHERNET_HEADER_LEN, ETH_P_8021Q, ETH_P_IPV6, VLAN_HEADER_LEN};
pub use transport::{parse_tcp, parse_udp, TransportPorts, TCP_HEADER_LEN, UDP_HEADER_LEN};
