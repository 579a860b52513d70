//! Command decoding: opcode identification, parameter extraction, and the
//! semantic arguments carried by the parameter bytes.
//!
//! [`decode`] never fails: any frame of at least one byte yields a
//! [`DecodedCommand`]. Problems (missing terminator, declared/actual length
//! disagreement) are flags on the result, not errors.

use crate::frame::{Frame, EOP};
use crate::opcode::{Opcode, ParamLen, ResponseLen};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Memory space addressed by a page operation, from the memtype parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemType {
    Flash,
    Eeprom,
    Other(u8),
}

impl MemType {
    pub fn from_byte(b: u8) -> MemType {
        match b {
            b'F' | b'f' => MemType::Flash,
            b'E' | b'e' => MemType::Eeprom,
            other => MemType::Other(other),
        }
    }
}

/// Arguments decoded from a command's parameter bytes.
///
/// Multi-byte fields keep their wire byte order: the word address is
/// little-endian, the page size big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandArgs {
    /// No parameters, or too few bytes to decode them.
    None,
    /// SET_PARAMETER: parameter id and value.
    SetParameter { param: u8, value: u8 },
    /// LOAD_ADDRESS: word address.
    Address { word: u16 },
    /// PROG_PAGE / READ_PAGE: declared byte count and memory space.
    Page { size: u16, memtype: MemType },
    /// UNIVERSAL: raw 4-byte SPI transaction.
    Universal { bytes: [u8; 4] },
}

/// A command frame after decoding. References exactly one source [`Frame`]
/// and never outlives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedCommand<'a> {
    pub frame: Frame<'a>,
    pub opcode: Opcode,
    /// Raw parameter bytes (between opcode and EOP), preserved verbatim even
    /// for unknown opcodes.
    pub params: &'a [u8],
    pub args: CommandArgs,
    /// Last byte is EOP and the frame is at least opcode + terminator.
    pub terminator_ok: bool,
    /// Declared parameter length disagrees with the actual bytes.
    pub length_mismatch: bool,
}

impl DecodedCommand<'_> {
    /// Payload length the device is expected to answer with, when the schema
    /// (plus declared size for page reads) pins one down.
    pub fn expected_response_len(&self) -> Option<usize> {
        match self.opcode.schema()?.response {
            ResponseLen::Fixed(n) => Some(n),
            ResponseLen::Declared => match self.args {
                CommandArgs::Page { size, .. } => Some(size as usize),
                _ => None,
            },
        }
    }
}

/// Decode one command frame.
pub fn decode(frame: Frame<'_>) -> DecodedCommand<'_> {
    let bytes = frame.bytes;
    let op_byte = bytes.first().copied().unwrap_or(0);
    let opcode = Opcode::from_byte(op_byte);
    let terminator_ok = bytes.len() >= 2 && bytes[bytes.len() - 1] == EOP;
    let params = if terminator_ok {
        &bytes[1..bytes.len() - 1]
    } else if bytes.is_empty() {
        bytes
    } else {
        &bytes[1..]
    };

    let length_mismatch = match opcode.schema().map(|s| s.params) {
        Some(ParamLen::Fixed(n)) => params.len() != n,
        Some(ParamLen::PageWrite) => {
            if params.len() < 3 {
                true
            } else {
                let declared = BigEndian::read_u16(&params[..2]) as usize;
                params.len() - 3 != declared
            }
        }
        None => false,
    };

    let args = decode_args(opcode, params);

    DecodedCommand {
        frame,
        opcode,
        params,
        args,
        terminator_ok,
        length_mismatch,
    }
}

fn decode_args(opcode: Opcode, params: &[u8]) -> CommandArgs {
    match opcode {
        Opcode::SetParameter if params.len() >= 2 => CommandArgs::SetParameter {
            param: params[0],
            value: params[1],
        },
        Opcode::LoadAddress if params.len() >= 2 => CommandArgs::Address {
            word: LittleEndian::read_u16(&params[..2]),
        },
        Opcode::ProgPage | Opcode::ReadPage if params.len() >= 3 => CommandArgs::Page {
            size: BigEndian::read_u16(&params[..2]),
            memtype: MemType::from_byte(params[2]),
        },
        Opcode::Universal if params.len() >= 4 => CommandArgs::Universal {
            bytes: [params[0], params[1], params[2], params[3]],
        },
        _ => CommandArgs::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameKind, Stream};

    fn cmd_frame(bytes: &[u8]) -> Frame<'_> {
        Frame {
            stream: Stream::HostToDevice,
            offset: 0,
            bytes,
            kind: if bytes.last() == Some(&EOP) {
                FrameKind::Complete
            } else {
                FrameKind::Truncated
            },
        }
    }

    #[test]
    fn load_address_word_is_little_endian() {
        let cmd = decode(cmd_frame(&[0x55, 0x00, 0x10, 0x20]));
        assert_eq!(cmd.opcode, Opcode::LoadAddress);
        assert_eq!(cmd.args, CommandArgs::Address { word: 0x1000 });
        assert!(cmd.terminator_ok);
        assert!(!cmd.length_mismatch);
    }

    #[test]
    fn prog_page_declared_size_checked_against_data() {
        // Declares 4 data bytes but carries 2.
        let cmd = decode(cmd_frame(&[0x64, 0x00, 0x04, b'F', 0xAA, 0xBB, 0x20]));
        assert_eq!(cmd.opcode, Opcode::ProgPage);
        assert!(cmd.length_mismatch);
        assert_eq!(
            cmd.args,
            CommandArgs::Page {
                size: 4,
                memtype: MemType::Flash
            }
        );
    }

    #[test]
    fn eeprom_memtype_distinguished() {
        let cmd = decode(cmd_frame(&[0x74, 0x00, 0x80, b'E', 0x20]));
        assert_eq!(
            cmd.args,
            CommandArgs::Page {
                size: 0x80,
                memtype: MemType::Eeprom
            }
        );
        assert_eq!(cmd.expected_response_len(), Some(0x80));
    }
}
