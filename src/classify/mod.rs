//! Per-packet classification entry point
//!
//! [`Classifier::classify`] is the whole pipeline for one packet:
//!
//! ```text
//! ParseOuter → ParseNetwork → (ParseTransport | ControlProtocol)
//!            → Lookup → (Embed | Fallback) → Verdict
//! ```
//!
//! Every parse state can exit straight to `Verdict::Pass`: a truncated or
//! unrecognized packet is never an error, just not ours to touch. The only
//! path to `Verdict::Drop` is an extension-header insertion failing under
//! [`crate::mark::GrowthPolicy::Drop`]. There is no retry: each packet is
//! classified exactly once and the verdict is final.
//!
//! The classifier holds no per-packet state; one instance is safely shared
//! across any number of concurrent invocations, each working on its own
//! packet. The flow table is the only thing they share.

use std::sync::Arc;

use tracing::trace;

use crate::config::Config;
use crate::flow::{FlowKey, FlowTable};
use crate::mark::Marker;
use crate::packet::PacketBuf;
use crate::parse::ipv6::{Ipv6Header, PROTO_ICMPV6, PROTO_TCP, PROTO_UDP};
use crate::parse::{parse_link, parse_tcp, parse_udp, HeaderCursor};

/// The pipeline's decision for one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Re-offer the packet to the stack on its normal path
    Pass,
    /// Discard the packet
    Drop,
}

/// The per-packet classification pipeline.
pub struct Classifier {
    table: Arc<dyn FlowTable>,
    marker: Marker,
    match_all: bool,
}

impl Classifier {
    /// Build a classifier over `table` from the deployment configuration.
    #[must_use]
    pub fn new(table: Arc<dyn FlowTable>, config: &Config) -> Self {
        Self {
            table,
            marker: Marker::new(config.strategy, config.growth_policy, config.path_mtu),
            match_all: config.match_all,
        }
    }

    /// Build a classifier with an explicit marker.
    #[must_use]
    pub fn with_marker(table: Arc<dyn FlowTable>, marker: Marker, match_all: bool) -> Self {
        Self {
            table,
            marker,
            match_all,
        }
    }

    /// Classify one packet, marking it in place on a flow-table hit.
    ///
    /// Never panics and never reads past the packet's end, whatever the
    /// input bytes.
    pub fn classify(&self, packet: &mut PacketBuf) -> Verdict {
        let (l3, key) = {
            let buf = packet.as_slice();
            let mut cur = HeaderCursor::new(buf);

            let Some(_link) = parse_link(&mut cur) else {
                return Verdict::Pass;
            };
            let Some(l3) = Ipv6Header::parse(&mut cur) else {
                return Verdict::Pass;
            };

            // Transport bounds checks run even in match-all deployments, so
            // a malformed packet is never marked.
            let key = match l3.next_header(buf) {
                PROTO_TCP => {
                    let Some(ports) = parse_tcp(&mut cur) else {
                        return Verdict::Pass;
                    };
                    FlowKey::from_headers(l3, buf, ports.dst, ports.src)
                }
                PROTO_UDP => {
                    let Some(ports) = parse_udp(&mut cur) else {
                        return Verdict::Pass;
                    };
                    FlowKey::from_headers(l3, buf, ports.dst, ports.src)
                }
                PROTO_ICMPV6 => {
                    let (hi, lo) = l3.dst_halves(buf);
                    FlowKey::for_control(hi, lo)
                }
                other => {
                    trace!("unhandled transport protocol {other}");
                    return Verdict::Pass;
                }
            };

            (l3, key)
        };

        let key = if self.match_all { FlowKey::MATCH_ALL } else { key };

        match self.table.lookup(&key) {
            Some(tag) => self.marker.mark(packet, l3, tag),
            None => {
                self.marker.mark_no_match(packet, l3);
                Verdict::Pass
            }
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("marker", &self.marker)
            .field("match_all", &self.match_all)
            .finish_non_exhaustive()
    }
}
