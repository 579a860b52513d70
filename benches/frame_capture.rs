//! Benchmark: framing vs the full pipeline on a synthetic avrdude flash
//! session (sync burst, signature read, then page-program loop). Framing is
//! a single linear scan per stream; analyze adds decode, validation, and
//! pairing on top.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stktrace::{analyze, frame_commands, frame_responses};

const PAGE_BYTES: usize = 128;

/// Build both capture streams for a session that programs `pages` flash
/// pages. Data bytes stay clear of the protocol markers so the synthetic
/// capture frames exactly like a clean real one.
fn synth_session(pages: usize) -> (Vec<u8>, Vec<u8>) {
    let mut host = Vec::new();
    let mut device = Vec::new();
    let ack = [0x14, 0x10];

    for _ in 0..3 {
        host.extend_from_slice(&[0x30, 0x20]);
        device.extend_from_slice(&ack);
    }
    host.extend_from_slice(&[0x50, 0x20]);
    device.extend_from_slice(&ack);
    host.extend_from_slice(&[0x75, 0x20]);
    device.extend_from_slice(&[0x14, 0x1E, 0x95, 0x0F, 0x10]);

    for page in 0..pages {
        let word_addr = (page * PAGE_BYTES / 2) as u16;
        host.extend_from_slice(&[0x55, (word_addr & 0xFF) as u8, (word_addr >> 8) as u8, 0x20]);
        device.extend_from_slice(&ack);

        host.extend_from_slice(&[0x64, (PAGE_BYTES >> 8) as u8, (PAGE_BYTES & 0xFF) as u8, b'F']);
        for i in 0..PAGE_BYTES {
            host.push(0x80 | (i as u8 & 0x3F));
        }
        host.push(0x20);
        device.extend_from_slice(&ack);
    }

    host.extend_from_slice(&[0x51, 0x20]);
    device.extend_from_slice(&ack);
    (host, device)
}

fn bench_pipeline(c: &mut Criterion) {
    let (host, device) = synth_session(256);
    eprintln!(
        "synthetic session: {} host bytes, {} device bytes",
        host.len(),
        device.len()
    );

    c.bench_function("frame_commands", |b| {
        b.iter(|| frame_commands(black_box(&host)))
    });
    c.bench_function("frame_responses", |b| {
        b.iter(|| frame_responses(black_box(&device)))
    });
    c.bench_function("analyze", |b| {
        b.iter(|| analyze(black_box(&host), black_box(&device)))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
