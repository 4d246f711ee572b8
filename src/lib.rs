//! flowmark: IPv6 flow classification and tag embedding
//!
//! This crate classifies packets on a host's egress/ingress path and, for
//! flows a control plane has registered, stamps each packet with an opaque
//! 32-bit flow tag so that downstream network elements can recognize the
//! flow without per-packet deep inspection.
//!
//! # Features
//!
//! - **Bounds-Checked Parsing**: Ethernet/802.1Q + IPv6 + TCP/UDP headers
//!   resolved layer by layer, failing open on any truncation
//! - **Bounded Flow Table**: concurrent, capacity-limited, LRU-evicting map
//!   from flow key to flow tag, read-only from the packet path
//! - **Four Marking Strategies**: flow label rewrite, hop-by-hop extension
//!   header, destination-options extension header, or both headers chained
//! - **In-Place Growth**: extension headers are spliced in after the IPv6
//!   header with MTU checks and payload-length bookkeeping
//!
//! # Architecture
//!
//! ```text
//! Packet → HeaderCursor → FlowKey → FlowTable lookup
//!                                        │
//!                          ┌─────────────┴────────────┐
//!                        (hit)                      (miss)
//!                          ↓                          ↓
//!                    Marker::mark            no-match sentinel
//!                          ↓                          ↓
//!                       Verdict ←─────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use std::net::Ipv6Addr;
//! use std::sync::Arc;
//!
//! use flowmark::classify::Classifier;
//! use flowmark::config::Config;
//! use flowmark::flow::{FlowKey, FlowTag, FlowTable, LruFlowTable};
//!
//! let config = Config::default_config();
//! let table = Arc::new(LruFlowTable::new(config.flow_table.capacity));
//!
//! // The control plane registers a flow of interest...
//! let dst: Ipv6Addr = "2001:db8::1".parse().unwrap();
//! table.insert(FlowKey::from_destination(dst, 443, 51000), FlowTag::new(0x0ABCDE));
//!
//! // ...and the packet path consults the table per packet.
//! let classifier = Classifier::new(table, &config);
//! # let _ = classifier;
//! ```
//!
//! # Modules
//!
//! - [`classify`]: Per-packet entry point and verdicts
//! - [`config`]: Configuration types and loading
//! - [`control`]: Control-plane flow registration interface
//! - [`error`]: Error types
//! - [`flow`]: Flow keys, tags, and the flow table
//! - [`mark`]: Tag embedding strategies
//! - [`packet`]: Owned packet buffer with bounded growth
//! - [`parse`]: Bounds-checked header cursor and header views

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod classify;
pub mod config;
pub mod control;
pub mod error;
pub mod flow;
pub mod mark;
pub mod packet;
pub mod parse;

// Re-export commonly used types at the crate root
pub use classify::{Classifier, Verdict};
pub use config::{load_config, Config};
pub use control::{FlowEvent, FlowState};
pub use error::{ConfigError, FlowmarkError, GrowthError};
pub use flow::{FlowKey, FlowTag, FlowTable, LruFlowTable};
pub use mark::{GrowthPolicy, Marker, Strategy};
pub use packet::PacketBuf;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
