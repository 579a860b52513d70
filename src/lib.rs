//! # stktrace — STK500v1 Trace Analyzer
//!
//! Reconstructs the STK500v1 serial programming protocol from two captured
//! byte streams (host→device commands, device→host responses): framing,
//! command decoding, response validation, command/response pairing, and
//! anomaly reporting.
//!
//! ## Frame format
//!
//! ```text
//! Command:  <opcode> [params...] <EOP=0x20>
//! Response: <INSYNC=0x14> [payload...] <OK=0x10 | FAILED=0x11>
//! ```
//!
//! ## Pipeline
//!
//! - **Framer** ([`frame`]): splits each raw stream into frames, keeping
//!   truncated tails and noise bytes visible instead of dropping them.
//! - **Command decoder** ([`command`], table in [`opcode`]): identifies each
//!   opcode and decodes its parameters; unrecognized opcodes are preserved
//!   as [`Opcode::Unknown`], never an error.
//! - **Response validator** ([`response`]): checks the sync/terminator
//!   contract and the payload length the paired command implies.
//! - **Pairing engine** ([`trace`]): strict positional 1:1 alignment into a
//!   [`Trace`]; surplus frames become one-sided pairs.
//!
//! Nothing in the pipeline is fatal: every anomaly (noise, truncation,
//! unknown opcode, length mismatch, count mismatch) is surfaced as data on
//! the trace. The core takes two byte slices and returns a [`Trace`];
//! file loading and printing live in the `analyze_capture` binary.
//!
//! ## Usage
//!
//! ```
//! use stktrace::{analyze, Outcome};
//!
//! // get-sync command, clean acknowledgement
//! let host = [0x30, 0x20];
//! let device = [0x14, 0x10];
//! let trace = analyze(&host, &device);
//! assert_eq!(trace.paired_count(), 1);
//! let rsp = trace.pairs[0].response.as_ref().expect("response");
//! assert_eq!(rsp.outcome, Outcome::Ok);
//! ```

pub mod command;
pub mod dump;
pub mod frame;
pub mod opcode;
pub mod response;
pub mod trace;

pub use command::{decode, CommandArgs, DecodedCommand, MemType};
pub use frame::{
    frame_commands, frame_responses, Frame, FrameKind, NoiseRun, ResponseScan, Stream,
    EOP, FAILED, INSYNC, NOSYNC, OK,
};
pub use opcode::{schema_for, CommandSchema, Opcode, ParamLen, ResponseLen, SCHEMAS};
pub use response::{validate, DecodedResponse, Outcome};
pub use trace::{analyze, pair, Anomaly, Pair, Trace};
