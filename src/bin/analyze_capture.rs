//! Analyze a captured STK500v1 programming session.
//!
//! Usage:
//!   analyze_capture [OPTIONS] [HOST_CAPTURE] [DEVICE_CAPTURE]
//!
//! The captures are raw binary files: HOST_CAPTURE holds the bytes the host
//! (avrdude) sent, DEVICE_CAPTURE the bytes the programmer answered.
//! Defaults are `in.txt` and `out.txt`.
//!
//! Options:
//!   --verbose, -v  Include noise runs and the anomaly report in the listing
//!   --dump=PATH    Write the pair listing to PATH instead of stdout
//!
//! The pair listing goes to stdout (or the dump file); the run summary goes
//! to stderr.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use stktrace::{analyze, dump};

fn main() -> anyhow::Result<()> {
    let mut raw_args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = if let Some(pos) = raw_args.iter().position(|a| a == "--verbose" || a == "-v") {
        raw_args.remove(pos);
        true
    } else {
        false
    };
    let dump_path: Option<PathBuf> = raw_args
        .iter()
        .position(|a| a.starts_with("--dump"))
        .and_then(|pos| {
            let arg = raw_args.remove(pos);
            if arg == "--dump" {
                Some(PathBuf::from("-"))
            } else {
                arg.strip_prefix("--dump=").map(PathBuf::from)
            }
        });
    let mut args = raw_args.into_iter();
    let host_path: PathBuf = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("in.txt"));
    let device_path: PathBuf = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("out.txt"));

    let host = std::fs::read(&host_path)?;
    let device = std::fs::read(&device_path)?;

    let trace = analyze(&host, &device);

    match dump_path {
        Some(p) if p.as_os_str() != "-" => {
            let mut f = File::create(&p)?;
            dump::write_trace(&mut f, &trace, verbose)?;
            f.flush()?;
        }
        _ => {
            let stdout = std::io::stdout();
            dump::write_trace(&mut stdout.lock(), &trace, verbose)?;
        }
    }

    eprintln!("host capture:   {}", host_path.display());
    eprintln!("device capture: {}", device_path.display());
    eprintln!("commands:  {}", trace.command_count);
    eprintln!("responses: {}", trace.response_count);
    eprintln!("paired:    {}", trace.paired_count());
    if trace.unmatched_count() > 0 {
        eprintln!("unmatched: {}", trace.unmatched_count());
    }
    if trace.noise_bytes > 0 {
        eprintln!("noise bytes: {}", trace.noise_bytes);
    }
    if trace.malformed_frames > 0 {
        eprintln!("malformed frames: {}", trace.malformed_frames);
    }

    Ok(())
}
