//! Tag embedding strategies
//!
//! Given a resolved IPv6 header and a flow tag, [`Marker`] rewrites the
//! packet according to exactly one statically-selected [`Strategy`]:
//!
//! 1. **Label**: overwrite the 20-bit flow-label field in place. No length
//!    change, no checksum impact (the field sits outside every checksum
//!    scope). Always succeeds once reached.
//! 2. **Hop-by-hop**: splice one minimal 8-byte hop-by-hop options header
//!    in after the IPv6 header.
//! 3. **Destination**: the same header shape as a destination-options
//!    header; only the code point written into the IPv6 next-header field
//!    differs.
//! 4. **Hop-by-hop + destination**: both headers back to back (16 bytes),
//!    the first chaining to the second, the second chaining to whatever
//!    originally followed the IPv6 header.
//!
//! Insertion is transactional per packet: MTU check first, then grow, write,
//! and patch the IPv6 next-header and payload-length fields. An MTU overrun
//! skips the mutation entirely (fail-open); a growth failure follows the
//! configured [`GrowthPolicy`], because a half-grown packet would be
//! structurally invalid.

pub mod ext;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::classify::Verdict;
use crate::error::{ConfigError, GrowthError};
use crate::flow::FlowTag;
use crate::packet::PacketBuf;
use crate::parse::ipv6::Ipv6Header;

pub use ext::{
    recover_tag, CompositeExtensionHeader, ExtensionHeader, COMPOSITE_HEADER_LEN,
    EXTENSION_HEADER_LEN, NEXT_HEADER_DEST_OPTS, NEXT_HEADER_HOP_BY_HOP,
};

/// Default path MTU when none is configured.
pub const DEFAULT_PATH_MTU: usize = 1500;

/// The wire-level embedding strategy, selected at deployment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Rewrite the IPv6 flow-label field in place
    Label,
    /// Insert a hop-by-hop options extension header
    HopByHop,
    /// Insert a destination-options extension header
    Destination,
    /// Insert both headers, hop-by-hop first
    HopByHopDestination,
}

impl Strategy {
    /// The configuration string for this strategy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::HopByHop => "hop-by-hop",
            Self::Destination => "destination",
            Self::HopByHopDestination => "hop-by-hop-destination",
        }
    }

    /// Bytes this strategy adds to a packet on a table hit.
    #[must_use]
    pub const fn growth(&self) -> usize {
        match self {
            Self::Label => 0,
            Self::HopByHop | Self::Destination => EXTENSION_HEADER_LEN,
            Self::HopByHopDestination => COMPOSITE_HEADER_LEN,
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "label" => Ok(Self::Label),
            "hop-by-hop" => Ok(Self::HopByHop),
            "destination" => Ok(Self::Destination),
            "hop-by-hop-destination" => Ok(Self::HopByHopDestination),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown marking strategy: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a packet whose buffer could not be grown.
///
/// The source behavior differs between deployments, so it is a policy knob
/// rather than a constant: pass the unmodified packet through, or drop it on
/// the grounds that the flow was supposed to be marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrowthPolicy {
    /// Fail-open: the packet continues unmodified
    PassThrough,
    /// Fail-closed: the packet is dropped
    Drop,
}

impl FromStr for GrowthPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pass-through" => Ok(Self::PassThrough),
            "drop" => Ok(Self::Drop),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown growth policy: {other}"
            ))),
        }
    }
}

/// Embeds flow tags into packets using one fixed strategy.
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    strategy: Strategy,
    growth_policy: GrowthPolicy,
    path_mtu: usize,
}

impl Marker {
    /// Create a marker for a fixed strategy, growth policy, and path MTU.
    ///
    /// The MTU bounds the *network-layer* packet length (IPv6 header plus
    /// payload); link-layer bytes do not count against it.
    #[must_use]
    pub const fn new(strategy: Strategy, growth_policy: GrowthPolicy, path_mtu: usize) -> Self {
        Self {
            strategy,
            growth_policy,
            path_mtu,
        }
    }

    /// The configured strategy.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Embed `tag` into the packet per the configured strategy.
    pub fn mark(&self, packet: &mut PacketBuf, l3: Ipv6Header, tag: FlowTag) -> Verdict {
        trace!("marking packet with tag {tag} via {}", self.strategy);

        match self.strategy {
            Strategy::Label => {
                l3.set_flow_label(packet.as_mut_slice(), tag.wire_bits());
                Verdict::Pass
            }
            Strategy::HopByHop => {
                let hdr = ExtensionHeader::new(l3.next_header(packet.as_slice()), tag);
                self.insert(packet, l3, hdr.as_bytes(), NEXT_HEADER_HOP_BY_HOP)
            }
            Strategy::Destination => {
                let hdr = ExtensionHeader::new(l3.next_header(packet.as_slice()), tag);
                self.insert(packet, l3, hdr.as_bytes(), NEXT_HEADER_DEST_OPTS)
            }
            Strategy::HopByHopDestination => {
                let hdr = CompositeExtensionHeader::new(l3.next_header(packet.as_slice()), tag);
                self.insert(packet, l3, hdr.as_bytes(), NEXT_HEADER_HOP_BY_HOP)
            }
        }
    }

    /// Force the flow-label field to the no-match sentinel.
    ///
    /// Applied on a table miss so observers can tell "classified, no match"
    /// from "not processed at all". Only the flow-label location is touched;
    /// no extension header is ever inserted for a miss.
    pub fn mark_no_match(&self, packet: &mut PacketBuf, l3: Ipv6Header) {
        l3.set_flow_label(packet.as_mut_slice(), FlowTag::NO_MATCH.wire_bits());
    }

    /// Splice `header` in after the IPv6 fixed header and patch the IPv6
    /// next-header and payload-length fields.
    fn insert(
        &self,
        packet: &mut PacketBuf,
        l3: Ipv6Header,
        header: &[u8],
        first_kind: u8,
    ) -> Verdict {
        let extra = header.len();

        // MTU check happens before any mutation.
        let grown_network_len = packet.len() - l3.offset() + extra;
        if grown_network_len > self.path_mtu {
            trace!(
                "inserting {extra} extension-header bytes would overflow the MTU \
                 ({grown_network_len} > {}), skipping",
                self.path_mtu
            );
            return Verdict::Pass;
        }

        // The payload-length field is packet-supplied and may lie; a value
        // the growth would push past u16 cannot be patched coherently, so
        // such packets are skipped before any mutation, like an MTU overrun.
        let payload_len = l3.payload_len(packet.as_slice());
        let Some(new_payload_len) = payload_len.checked_add(extra as u16) else {
            trace!("payload length field {payload_len} cannot grow by {extra}, skipping");
            return Verdict::Pass;
        };

        let at = l3.payload_offset();
        if let Err(e) = packet.insert_gap(at, extra) {
            return self.growth_failure(&e);
        }

        let buf = packet.as_mut_slice();
        buf[at..at + extra].copy_from_slice(header);

        l3.set_next_header(buf, first_kind);
        l3.set_payload_len(buf, new_payload_len);

        Verdict::Pass
    }

    fn growth_failure(&self, err: &GrowthError) -> Verdict {
        match self.growth_policy {
            GrowthPolicy::PassThrough => {
                debug!("buffer growth failed ({err}), passing packet unmodified");
                Verdict::Pass
            }
            GrowthPolicy::Drop => {
                debug!("buffer growth failed ({err}), dropping packet");
                Verdict::Drop
            }
        }
    }
}
