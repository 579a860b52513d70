//! STK500v1 command vocabulary and per-opcode schema table.
//!
//! The table covers the command subset avrdude's `-c arduino` programmer
//! actually exchanges. Opcodes outside the table decode as
//! [`Opcode::Unknown`]: the vocabulary is open-world, so an unrecognized
//! byte never aborts an analysis. Adding a command means adding one
//! [`CommandSchema`] entry and one `Opcode` variant; no decode logic changes.

/// A recognized STK500v1 command, or an opcode byte outside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    GetSync,
    GetSignOn,
    SetParameter,
    SetDevice,
    SetDeviceExt,
    EnterProgMode,
    LeaveProgMode,
    ChipErase,
    CheckAutoInc,
    LoadAddress,
    Universal,
    ProgPage,
    ReadPage,
    ReadSign,
    Unknown(u8),
}

impl Opcode {
    /// Map an opcode byte through the schema table.
    pub fn from_byte(byte: u8) -> Opcode {
        match schema_for(byte) {
            Some(s) => s.opcode,
            None => Opcode::Unknown(byte),
        }
    }

    /// Schema entry for this opcode, if it is in the table.
    pub fn schema(self) -> Option<&'static CommandSchema> {
        SCHEMAS.iter().find(|s| s.opcode == self)
    }

    /// Protocol mnemonic (without the `Cmnd_STK_` prefix), or `None` for
    /// unknown opcodes.
    pub fn name(self) -> Option<&'static str> {
        self.schema().map(|s| s.name)
    }
}

/// Declared parameter length rule for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLen {
    /// Exactly this many parameter bytes between opcode and EOP.
    Fixed(usize),
    /// Page write: 2-byte big-endian size, memtype byte, then `size` data
    /// bytes.
    PageWrite,
}

/// Payload length the device answers a command with (between INSYNC and OK).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseLen {
    /// Fixed payload size; zero for plain `INSYNC OK` acknowledgements.
    Fixed(usize),
    /// Page read: the size declared in the command's parameters.
    Declared,
}

/// Capability descriptor for one table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSchema {
    pub opcode: Opcode,
    pub byte: u8,
    pub name: &'static str,
    pub params: ParamLen,
    pub response: ResponseLen,
}

/// Schema table. Parameter counts match the framing table in the programmer
/// firmware; response payload sizes match what it writes back.
pub static SCHEMAS: &[CommandSchema] = &[
    CommandSchema {
        opcode: Opcode::GetSync,
        byte: 0x30,
        name: "GET_SYNC",
        params: ParamLen::Fixed(0),
        response: ResponseLen::Fixed(0),
    },
    CommandSchema {
        opcode: Opcode::GetSignOn,
        byte: 0x31,
        name: "GET_SIGN_ON",
        params: ParamLen::Fixed(0),
        // "AVR ISP"
        response: ResponseLen::Fixed(7),
    },
    CommandSchema {
        opcode: Opcode::SetParameter,
        byte: 0x40,
        name: "SET_PARAMETER",
        params: ParamLen::Fixed(2),
        response: ResponseLen::Fixed(0),
    },
    CommandSchema {
        opcode: Opcode::SetDevice,
        byte: 0x42,
        name: "SET_DEVICE",
        params: ParamLen::Fixed(20),
        response: ResponseLen::Fixed(0),
    },
    CommandSchema {
        opcode: Opcode::SetDeviceExt,
        byte: 0x45,
        name: "SET_DEVICE_EXT",
        params: ParamLen::Fixed(5),
        response: ResponseLen::Fixed(0),
    },
    CommandSchema {
        opcode: Opcode::EnterProgMode,
        byte: 0x50,
        name: "ENTER_PROGMODE",
        params: ParamLen::Fixed(0),
        response: ResponseLen::Fixed(0),
    },
    CommandSchema {
        opcode: Opcode::LeaveProgMode,
        byte: 0x51,
        name: "LEAVE_PROGMODE",
        params: ParamLen::Fixed(0),
        response: ResponseLen::Fixed(0),
    },
    CommandSchema {
        opcode: Opcode::ChipErase,
        byte: 0x52,
        name: "CHIP_ERASE",
        params: ParamLen::Fixed(0),
        response: ResponseLen::Fixed(0),
    },
    CommandSchema {
        opcode: Opcode::CheckAutoInc,
        byte: 0x53,
        name: "CHECK_AUTOINC",
        params: ParamLen::Fixed(0),
        response: ResponseLen::Fixed(1),
    },
    CommandSchema {
        opcode: Opcode::LoadAddress,
        byte: 0x55,
        name: "LOAD_ADDRESS",
        params: ParamLen::Fixed(2),
        response: ResponseLen::Fixed(0),
    },
    CommandSchema {
        opcode: Opcode::Universal,
        byte: 0x56,
        name: "UNIVERSAL",
        params: ParamLen::Fixed(4),
        response: ResponseLen::Fixed(1),
    },
    CommandSchema {
        opcode: Opcode::ProgPage,
        byte: 0x64,
        name: "PROG_PAGE",
        params: ParamLen::PageWrite,
        response: ResponseLen::Fixed(0),
    },
    CommandSchema {
        opcode: Opcode::ReadPage,
        byte: 0x74,
        name: "READ_PAGE",
        params: ParamLen::Fixed(3),
        response: ResponseLen::Declared,
    },
    CommandSchema {
        opcode: Opcode::ReadSign,
        byte: 0x75,
        name: "READ_SIGN",
        params: ParamLen::Fixed(0),
        response: ResponseLen::Fixed(3),
    },
];

/// Look up the schema entry for an opcode byte.
pub fn schema_for(byte: u8) -> Option<&'static CommandSchema> {
    SCHEMAS.iter().find(|s| s.byte == byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_bytes_are_unique() {
        for (i, a) in SCHEMAS.iter().enumerate() {
            for b in &SCHEMAS[i + 1..] {
                assert_ne!(a.byte, b.byte, "duplicate opcode byte {:#04x}", a.byte);
            }
        }
    }

    #[test]
    fn unknown_byte_round_trips() {
        assert_eq!(Opcode::from_byte(0x41), Opcode::Unknown(0x41));
        assert_eq!(Opcode::from_byte(0x30), Opcode::GetSync);
        assert_eq!(Opcode::GetSync.name(), Some("GET_SYNC"));
        assert_eq!(Opcode::Unknown(0x41).name(), None);
    }
}
