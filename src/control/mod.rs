//! Control-plane flow registration
//!
//! The packet path never writes the flow table; this module is the writing
//! side. A control plane feeds it [`FlowEvent`]s ("flow started, tag it" /
//! "flow ended, forget it") and [`apply_event`] turns them into table
//! upserts and removals. The transport delivering the events (Unix socket,
//! shared pipe, in-process channel) is an external concern; this crate only
//! offers [`run_control_loop`] to drain an in-process channel.
//!
//! # Tag composition
//!
//! Tags are composed from a 9-bit *experiment* id and an *activity* id.
//! For the flow-label strategy the layout interleaves entropy bits so that
//! label-based load balancers still see variation between flows:
//!
//! ```text
//! bits 19..18  entropy
//! bits 17..9   experiment id, bit-reversed
//! bit  8       entropy
//! bits 7..2    activity id (low 6 bits)
//! bits 1..0    entropy
//! ```
//!
//! Extension-header strategies carry the tag inside an option nothing load-
//! balances on, so those use the plain packing `experiment << 8 | activity`.

use std::net::Ipv6Addr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::flow::{FlowKey, FlowTable, FlowTag, ICMPV6_DST_PORT, ICMPV6_SRC_PORT};
use crate::mark::Strategy;

/// Lifecycle state of a flow, as reported by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowState {
    /// The flow is starting: register it
    Start,
    /// The flow has ended: unregister it
    End,
}

/// A flow registration event from the control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEvent {
    /// Lifecycle state
    pub state: FlowState,
    /// Destination address of the flow
    pub dst: Ipv6Addr,
    /// Destination port (host order)
    pub dst_port: u16,
    /// Source port (host order)
    pub src_port: u16,
    /// Experiment id (9 bits significant)
    pub experiment: u32,
    /// Activity id
    pub activity: u32,
}

impl FlowEvent {
    /// The flow-table key this event addresses.
    #[must_use]
    pub fn key(&self) -> FlowKey {
        FlowKey::from_destination(self.dst, self.dst_port, self.src_port)
    }

    /// An event for a port-less (ICMPv6) flow, using the sentinel port pair
    /// the packet path substitutes for such flows.
    #[must_use]
    pub fn control_flow(state: FlowState, dst: Ipv6Addr, experiment: u32, activity: u32) -> Self {
        Self {
            state,
            dst,
            dst_port: ICMPV6_DST_PORT,
            src_port: ICMPV6_SRC_PORT,
            experiment,
            activity,
        }
    }
}

/// Compose a flow tag from experiment and activity ids for `strategy`.
#[must_use]
pub fn compose_tag(strategy: Strategy, experiment: u32, activity: u32) -> FlowTag {
    if strategy != Strategy::Label {
        // No entropy needed when the tag rides in an extension header.
        return FlowTag::new(experiment << 8 | (activity & 0xFF));
    }

    let entropy: u32 = rand::random();
    let experiment_rev = reverse_experiment_bits(experiment);

    FlowTag::new(
        (entropy & (0x3 << 18))
            | ((experiment_rev & 0x1FF) << 9)
            | (entropy & (0x1 << 8))
            | ((activity & 0x3F) << 2)
            | (entropy & 0x3),
    )
}

/// Reverse the low 9 bits of the experiment id, as the tag layout requires.
#[must_use]
pub fn reverse_experiment_bits(experiment: u32) -> u32 {
    let mut reversed = 0u32;
    for i in 0..9 {
        reversed |= ((experiment >> i) & 0x1) << (8 - i);
    }
    reversed
}

/// Apply one control-plane event to the flow table.
pub fn apply_event(table: &dyn FlowTable, strategy: Strategy, event: &FlowEvent) {
    let key = event.key();
    match event.state {
        FlowState::Start => {
            let tag = compose_tag(strategy, event.experiment, event.activity);
            debug!("registering flow {key:?} with tag {tag}");
            table.insert(key, tag);
        }
        FlowState::End => {
            debug!("unregistering flow {key:?}");
            table.remove(&key);
        }
    }
}

/// Drain control-plane events into the flow table until the channel closes.
///
/// IPv4 events have no business here (the pipeline only marks IPv6) and are
/// expected to be filtered out before the channel; this loop applies every
/// event it receives.
pub async fn run_control_loop(
    table: Arc<dyn FlowTable>,
    strategy: Strategy,
    mut events: mpsc::Receiver<FlowEvent>,
) {
    info!("control loop running (strategy {strategy})");

    while let Some(event) = events.recv().await {
        apply_event(table.as_ref(), strategy, &event);
    }

    warn!("control channel closed, exiting control loop");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::LruFlowTable;

    fn event(state: FlowState) -> FlowEvent {
        FlowEvent {
            state,
            dst: "2001:db8::1".parse().unwrap(),
            dst_port: 443,
            src_port: 51000,
            experiment: 0x1A5,
            activity: 0x2B,
        }
    }

    #[test]
    fn test_reverse_experiment_bits() {
        assert_eq!(reverse_experiment_bits(0b0_0000_0001), 0b1_0000_0000);
        assert_eq!(reverse_experiment_bits(0b1_0000_0000), 0b0_0000_0001);
        assert_eq!(reverse_experiment_bits(0b1_1111_1111), 0b1_1111_1111);
        assert_eq!(reverse_experiment_bits(0b0_0101_0011), 0b1_1001_0100);
    }

    #[test]
    fn test_compose_tag_header_strategies_are_plain() {
        for strategy in [
            Strategy::HopByHop,
            Strategy::Destination,
            Strategy::HopByHopDestination,
        ] {
            let tag = compose_tag(strategy, 0x1A5, 0x2B);
            assert_eq!(tag.value(), 0x1A5 << 8 | 0x2B);
        }
    }

    #[test]
    fn test_compose_tag_label_layout() {
        let tag = compose_tag(Strategy::Label, 0x1A5, 0x2B).value();
        // Entropy bits aside, the experiment and activity fields are fixed
        assert_eq!((tag >> 9) & 0x1FF, reverse_experiment_bits(0x1A5));
        assert_eq!((tag >> 2) & 0x3F, 0x2B & 0x3F);
        // And the tag fits on the wire
        assert_eq!(tag & !FlowTag::WIRE_MASK, 0);
    }

    #[test]
    fn test_apply_start_then_end() {
        let table = LruFlowTable::new(16);

        apply_event(&table, Strategy::HopByHop, &event(FlowState::Start));
        let key = event(FlowState::Start).key();
        assert_eq!(table.lookup(&key), Some(FlowTag::new(0x1A5 << 8 | 0x2B)));

        apply_event(&table, Strategy::HopByHop, &event(FlowState::End));
        table.run_pending_tasks();
        assert_eq!(table.lookup(&key), None);
    }

    #[test]
    fn test_control_flow_event_uses_sentinels() {
        let dst: Ipv6Addr = "2001:db8::2".parse().unwrap();
        let e = FlowEvent::control_flow(FlowState::Start, dst, 1, 2);
        assert_eq!(e.dst_port, ICMPV6_DST_PORT);
        assert_eq!(e.src_port, ICMPV6_SRC_PORT);
    }

    #[test]
    fn test_event_serde() {
        let e = event(FlowState::Start);
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"start\""));
        let back: FlowEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.key(), e.key());
    }

    #[tokio::test]
    async fn test_control_loop_applies_events() {
        // Subscriber so the loop's lifecycle logging is exercised; ignore
        // the error if another test installed one first.
        let _ = tracing_subscriber::fmt()
            .with_env_filter("flowmark=trace")
            .with_test_writer()
            .try_init();

        let table = Arc::new(LruFlowTable::new(16));
        let (tx, rx) = mpsc::channel(8);

        let loop_table = Arc::clone(&table) as Arc<dyn FlowTable>;
        let handle = tokio::spawn(run_control_loop(loop_table, Strategy::HopByHop, rx));

        tx.send(event(FlowState::Start)).await.unwrap();
        drop(tx); // closing the channel stops the loop
        handle.await.unwrap();

        let key = event(FlowState::Start).key();
        assert_eq!(table.lookup(&key), Some(FlowTag::new(0x1A5 << 8 | 0x2B)));
    }
}
