//! Format decoded traces for display (pair listing, hex dump, summaries). The core never calls in here.

use crate::command::{CommandArgs, DecodedCommand, MemType};
use crate::frame::{FrameKind, NOSYNC};
use crate::opcode::Opcode;
use crate::response::{DecodedResponse, Outcome};
use crate::trace::Trace;
use std::io::Write;

/// Space-separated uppercase hex, e.g. `30 20`.
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn memtype_label(m: MemType) -> String {
    match m {
        MemType::Flash => "flash".to_string(),
        MemType::Eeprom => "eeprom".to_string(),
        MemType::Other(b) => format!("memtype {:#04x}", b),
    }
}

/// One-line command summary: mnemonic, decoded arguments, flags.
pub fn command_summary(cmd: &DecodedCommand<'_>) -> String {
    let mut s = match cmd.opcode.name() {
        Some(name) => name.to_string(),
        None => match cmd.opcode {
            Opcode::Unknown(b) => format!("UNKNOWN({:#04x})", b),
            _ => "?".to_string(),
        },
    };
    match cmd.args {
        CommandArgs::None => {}
        CommandArgs::SetParameter { param, value } => {
            s.push_str(&format!(" param={:#04x} value={:#04x}", param, value));
        }
        CommandArgs::Address { word } => {
            s.push_str(&format!(" addr={:#06x}", word));
        }
        CommandArgs::Page { size, memtype } => {
            s.push_str(&format!(" size={} {}", size, memtype_label(memtype)));
        }
        CommandArgs::Universal { bytes } => {
            s.push_str(&format!(" spi={}", hex_string(&bytes)));
        }
    }
    if cmd.frame.kind == FrameKind::Truncated {
        s.push_str(" [truncated]");
    } else if !cmd.terminator_ok {
        s.push_str(" [no EOP]");
    }
    if cmd.length_mismatch {
        s.push_str(" [length mismatch]");
    }
    s
}

/// One-line response summary: outcome, payload size, flags.
pub fn response_summary(rsp: &DecodedResponse<'_>) -> String {
    let mut s = match rsp.outcome {
        Outcome::Ok => "OK".to_string(),
        Outcome::Failed => "FAILED".to_string(),
        Outcome::Malformed => {
            if rsp.frame.kind == FrameKind::Truncated {
                "MALFORMED (truncated)".to_string()
            } else if !rsp.sync_ok {
                "MALFORMED (no sync)".to_string()
            } else {
                "MALFORMED".to_string()
            }
        }
    };
    if !rsp.payload.is_empty() {
        s.push_str(&format!(" payload={} byte(s)", rsp.payload.len()));
    }
    if rsp.length_mismatch {
        s.push_str(" [length mismatch]");
    }
    s
}

/// Write the numbered pair listing. With `verbose`, noise runs and the full
/// anomaly report follow the listing.
pub fn write_trace(w: &mut dyn Write, trace: &Trace<'_>, verbose: bool) -> std::io::Result<()> {
    for p in &trace.pairs {
        match &p.command {
            Some(cmd) => {
                writeln!(
                    w,
                    "{:04} CMD: {}  | {}",
                    p.index + 1,
                    hex_string(cmd.frame.bytes),
                    command_summary(cmd)
                )?;
            }
            None => writeln!(w, "{:04} CMD: (none)", p.index + 1)?,
        }
        match &p.response {
            Some(rsp) => {
                writeln!(
                    w,
                    "     RSP: {}  | {}",
                    hex_string(rsp.frame.bytes),
                    response_summary(rsp)
                )?;
            }
            None => writeln!(w, "     RSP: (none)")?,
        }
        writeln!(w)?;
    }

    if verbose {
        for n in &trace.noise {
            let tag = if n.bytes.len() == 1 && n.bytes[0] == NOSYNC {
                "  (NOSYNC)"
            } else {
                ""
            };
            writeln!(
                w,
                "noise @{}: {}{}",
                n.offset,
                hex_string(n.bytes),
                tag
            )?;
        }
        for a in trace.anomalies() {
            writeln!(w, "anomaly: {}", a)?;
        }
    }
    Ok(())
}
