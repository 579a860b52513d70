//! Pipeline fuzz target: feed arbitrary bytes to both capture streams.
//! analyze must not panic; every anomaly comes back as data on the Trace.
//! Build with: cargo fuzz run analyze_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    // First byte picks the host/device split point.
    let (first, rest) = match data.split_first() {
        Some(x) => x,
        None => return,
    };
    let split = (*first as usize) % (rest.len() + 1);
    let (host, device) = rest.split_at(split);
    let trace = stktrace::analyze(host, device);
    let _ = trace.anomalies();
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run analyze_fuzz");
}
