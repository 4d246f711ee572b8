//! Performance benchmarks for the classification pipeline.
//!
//! Run with: `cargo bench`
//!
//! Performance targets:
//! - Flow table lookup: <100ns
//! - Label marking (hit): <500ns per packet
//! - Extension header insertion (hit): <2us per packet
//! - Table miss (sentinel write): <500ns per packet
//! - Non-IPv6 reject: <50ns per packet

use std::net::Ipv6Addr;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flowmark::{
    Classifier, FlowKey, FlowTable, FlowTag, GrowthPolicy, LruFlowTable, Marker, PacketBuf,
    Strategy,
};

// ============================================================================
// Helper Functions
// ============================================================================

const DST: &str = "2001:db8::1";

/// Build an Ethernet + IPv6 + TCP frame with `payload_len` TCP payload bytes.
fn tcp_frame(dst: &str, dst_port: u16, src_port: u16, payload_len: usize) -> Vec<u8> {
    let dst: Ipv6Addr = dst.parse().expect("valid address");

    let mut frame = vec![0u8; 12];
    frame.extend_from_slice(&0x86DDu16.to_be_bytes());

    let l4_len = 20 + payload_len;
    let mut ipv6 = vec![0u8; 40];
    ipv6[0] = 0x60;
    ipv6[4..6].copy_from_slice(&(l4_len as u16).to_be_bytes());
    ipv6[6] = 6; // TCP
    ipv6[7] = 64;
    ipv6[24..40].copy_from_slice(&dst.octets());
    frame.extend_from_slice(&ipv6);

    let mut tcp = vec![0u8; 20];
    tcp[0..2].copy_from_slice(&src_port.to_be_bytes());
    tcp[2..4].copy_from_slice(&dst_port.to_be_bytes());
    frame.extend_from_slice(&tcp);

    frame.extend_from_slice(&vec![0u8; payload_len]);
    frame
}

/// Build a classifier with `flow_count` registered flows plus one known flow.
fn build_classifier(strategy: Strategy, flow_count: usize) -> (Classifier, Arc<LruFlowTable>) {
    let table = Arc::new(LruFlowTable::new(100_000));

    for i in 0..flow_count {
        let dst: Ipv6Addr = format!("2001:db8:1::{:x}", i + 1).parse().expect("valid");
        table.insert(
            FlowKey::from_destination(dst, 443, 40000 + (i % 20000) as u16),
            FlowTag::new((i as u32) & 0xF_FFFF),
        );
    }

    // Known flow for the hit benchmarks
    let dst: Ipv6Addr = DST.parse().expect("valid");
    table.insert(
        FlowKey::from_destination(dst, 443, 51000),
        FlowTag::new(0x0A_BCDE),
    );
    table.run_pending_tasks();

    let marker = Marker::new(strategy, GrowthPolicy::PassThrough, 1500);
    let classifier =
        Classifier::with_marker(Arc::clone(&table) as Arc<dyn FlowTable>, marker, false);
    (classifier, table)
}

// ============================================================================
// Flow Table Benchmarks
// ============================================================================

fn bench_flow_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow_table");

    for flow_count in [100, 10_000, 100_000].iter() {
        let (_, table) = build_classifier(Strategy::Label, *flow_count);
        let dst: Ipv6Addr = DST.parse().expect("valid");
        let hit_key = FlowKey::from_destination(dst, 443, 51000);
        let miss_key = FlowKey::from_destination("2001:db8:ff::1".parse().expect("valid"), 1, 1);

        group.bench_with_input(BenchmarkId::new("lookup_hit", flow_count), flow_count, |b, _| {
            b.iter(|| black_box(table.lookup(&hit_key)));
        });

        group.bench_with_input(
            BenchmarkId::new("lookup_miss", flow_count),
            flow_count,
            |b, _| {
                b.iter(|| black_box(table.lookup(&miss_key)));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Classification Benchmarks
// ============================================================================

fn bench_classify_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_hit");

    for strategy in [
        Strategy::Label,
        Strategy::HopByHop,
        Strategy::Destination,
        Strategy::HopByHopDestination,
    ] {
        let (classifier, _table) = build_classifier(strategy, 10_000);
        let frame = tcp_frame(DST, 443, 51000, 512);

        group.bench_function(strategy.as_str(), |b| {
            b.iter(|| {
                // Fresh buffer each iteration: insertion grows the packet
                let mut packet = PacketBuf::new(frame.clone());
                black_box(classifier.classify(&mut packet))
            });
        });
    }

    group.finish();
}

fn bench_classify_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_miss");

    let (classifier, _table) = build_classifier(Strategy::Label, 10_000);
    let frame = tcp_frame("2001:db8:ff::1", 8080, 1234, 512);

    group.bench_function("unregistered_flow", |b| {
        b.iter(|| {
            let mut packet = PacketBuf::new(frame.clone());
            black_box(classifier.classify(&mut packet))
        });
    });

    group.finish();
}

fn bench_classify_reject(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_reject");

    let (classifier, _table) = build_classifier(Strategy::Label, 100);

    // ARP frame: rejected at the link layer
    let mut arp = vec![0u8; 12];
    arp.extend_from_slice(&0x0806u16.to_be_bytes());
    arp.extend_from_slice(&[0u8; 28]);

    group.bench_function("non_ipv6", |b| {
        b.iter(|| {
            let mut packet = PacketBuf::new(arp.clone());
            black_box(classifier.classify(&mut packet))
        });
    });

    // Truncated IPv6 header: rejected at the network layer
    let truncated = tcp_frame(DST, 443, 51000, 0)[..30].to_vec();

    group.bench_function("truncated", |b| {
        b.iter(|| {
            let mut packet = PacketBuf::new(truncated.clone());
            black_box(classifier.classify(&mut packet))
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_flow_table,
    bench_classify_hit,
    bench_classify_miss,
    bench_classify_reject,
);
criterion_main!(benches);
