//! Flow identification and the shared flow table
//!
//! A *flow* is identified by its destination address plus the transport port
//! pair ([`FlowKey`]); the control plane associates each flow of interest
//! with an opaque 32-bit [`FlowTag`]. The [`FlowTable`] is the only state
//! shared between the packet path and the control plane: a bounded,
//! concurrently-readable, LRU-evicting map that the packet path only ever
//! reads.

pub mod key;
pub mod table;
pub mod tag;

pub use key::{FlowKey, ICMPV6_DST_PORT, ICMPV6_SRC_PORT};
pub use table::{FlowTable, LruFlowTable, TableStats, DEFAULT_TABLE_CAPACITY};
pub use tag::FlowTag;
