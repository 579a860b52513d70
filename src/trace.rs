//! Pairing engine and trace model.
//!
//! Commands and responses are aligned strictly by position: the k-th command
//! pairs with the k-th response. The protocol is half-duplex
//! request/response, so a clean capture lines up 1:1; when the counts
//! disagree the surplus is kept as one-sided pairs rather than discarded.
//! No resynchronization heuristic is attempted; a count mismatch is
//! reported, not silently resolved.

use crate::command::{decode, DecodedCommand};
use crate::frame::{frame_commands, frame_responses, FrameKind, NoiseRun, Stream};
use crate::opcode::Opcode;
use crate::response::{validate, DecodedResponse, Outcome};

/// One slot in the reconstructed exchange. Exactly one side may be absent
/// (surplus command or orphan response); both absent never occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair<'a> {
    pub index: usize,
    pub command: Option<DecodedCommand<'a>>,
    pub response: Option<DecodedResponse<'a>>,
}

/// The reconstructed trace: ordered pairs plus stream-level accounting.
/// Built once per run, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace<'a> {
    pub pairs: Vec<Pair<'a>>,
    pub command_count: usize,
    pub response_count: usize,
    /// Device-stream bytes outside any frame, in stream order.
    pub noise: Vec<NoiseRun<'a>>,
    pub noise_bytes: usize,
    /// Truncated command frames plus responses classified malformed.
    pub malformed_frames: usize,
}

/// A protocol-level anomaly surfaced by [`Trace::anomalies`]. Anomalies are
/// data, never fatal: the trace that contains them is still complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Anomaly {
    #[error("{count} noise byte(s) at device-stream offset {offset}")]
    NoiseRun { offset: usize, count: usize },
    #[error("truncated {stream} frame at stream offset {offset}")]
    TruncatedFrame { stream: Stream, offset: usize },
    #[error("unknown opcode {opcode:#04x} in command {index}")]
    UnknownOpcode { index: usize, opcode: u8 },
    #[error("length mismatch in {stream} frame of pair {index}")]
    LengthMismatch { index: usize, stream: Stream },
    #[error("command {index} has no response")]
    UnpairedCommand { index: usize },
    #[error("response {index} has no command")]
    OrphanResponse { index: usize },
    #[error("malformed response in pair {index}")]
    MalformedResponse { index: usize },
}

impl<'a> Trace<'a> {
    /// Number of pairs with both sides present.
    pub fn paired_count(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| p.command.is_some() && p.response.is_some())
            .count()
    }

    /// Number of one-sided pairs.
    pub fn unmatched_count(&self) -> usize {
        self.command_count.abs_diff(self.response_count)
    }

    /// Every recorded anomaly: pair-level findings in sequence order, then
    /// noise runs in stream order.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        let mut out = Vec::new();
        for p in &self.pairs {
            if let Some(cmd) = &p.command {
                if cmd.frame.kind == FrameKind::Truncated {
                    out.push(Anomaly::TruncatedFrame {
                        stream: Stream::HostToDevice,
                        offset: cmd.frame.offset,
                    });
                }
                if let Opcode::Unknown(opcode) = cmd.opcode {
                    out.push(Anomaly::UnknownOpcode {
                        index: p.index,
                        opcode,
                    });
                }
                if cmd.length_mismatch {
                    out.push(Anomaly::LengthMismatch {
                        index: p.index,
                        stream: Stream::HostToDevice,
                    });
                }
                if p.response.is_none() {
                    out.push(Anomaly::UnpairedCommand { index: p.index });
                }
            }
            if let Some(rsp) = &p.response {
                if rsp.frame.kind == FrameKind::Truncated {
                    out.push(Anomaly::TruncatedFrame {
                        stream: Stream::DeviceToHost,
                        offset: rsp.frame.offset,
                    });
                }
                if rsp.outcome == Outcome::Malformed {
                    out.push(Anomaly::MalformedResponse { index: p.index });
                }
                if rsp.length_mismatch {
                    out.push(Anomaly::LengthMismatch {
                        index: p.index,
                        stream: Stream::DeviceToHost,
                    });
                }
                if p.command.is_none() {
                    out.push(Anomaly::OrphanResponse { index: p.index });
                }
            }
        }
        for n in &self.noise {
            out.push(Anomaly::NoiseRun {
                offset: n.offset,
                count: n.bytes.len(),
            });
        }
        out
    }
}

/// Align decoded commands with validated responses by position and assemble
/// the trace. `pairs.len() == max(commands, responses)`; the surplus side
/// shows up as one-sided pairs.
pub fn pair<'a>(
    commands: Vec<DecodedCommand<'a>>,
    responses: Vec<DecodedResponse<'a>>,
    noise: Vec<NoiseRun<'a>>,
) -> Trace<'a> {
    let command_count = commands.len();
    let response_count = responses.len();
    let malformed_frames = commands
        .iter()
        .filter(|c| c.frame.kind == FrameKind::Truncated)
        .count()
        + responses
            .iter()
            .filter(|r| r.outcome == Outcome::Malformed)
            .count();
    let noise_bytes = noise.iter().map(|n| n.bytes.len()).sum();

    let total = command_count.max(response_count);
    let mut cmds = commands.into_iter();
    let mut rsps = responses.into_iter();
    let mut pairs = Vec::with_capacity(total);
    for index in 0..total {
        pairs.push(Pair {
            index,
            command: cmds.next(),
            response: rsps.next(),
        });
    }

    Trace {
        pairs,
        command_count,
        response_count,
        noise,
        noise_bytes,
        malformed_frames,
    }
}

/// Run the full pipeline on two captured streams: frame both, decode the
/// commands, validate each response against its positional command, pair.
///
/// Pure and synchronous: no I/O, no state across runs. Identical inputs
/// produce identical traces.
pub fn analyze<'a>(host: &'a [u8], device: &'a [u8]) -> Trace<'a> {
    let commands: Vec<DecodedCommand<'a>> =
        frame_commands(host).into_iter().map(decode).collect();
    let scan = frame_responses(device);
    let responses: Vec<DecodedResponse<'a>> = scan
        .frames
        .into_iter()
        .enumerate()
        .map(|(k, f)| validate(f, commands.get(k)))
        .collect();
    pair(commands, responses, scan.noise)
}
