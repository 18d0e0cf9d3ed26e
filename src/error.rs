use std::fmt;

use failure::Fail;

/// Which controller command was waiting for the busy bit to clear
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Operation {
	Read,
	WriteEnable,
	Write,
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Operation::Read => write!(f, "read"),
			Operation::WriteEnable => write!(f, "write enable"),
			Operation::Write => write!(f, "write"),
		}
	}
}

// all of these are fatal for the operation in progress; `main` turns them
// into a non-zero exit status
#[derive(Clone, PartialEq, Eq, Debug, Fail)]
pub enum EepromError {
	#[fail(display = "Incorrect EEPROM address 0x{:x}", address)]
	Address {
		address: u32,
	},

	#[fail(display = "EEPROM {} timeout", operation)]
	Timeout {
		operation: Operation,
	},

	#[fail(display = "EEPROM write error at 0x{:x}: read back 0x{:08x} != written 0x{:08x}", address, found, expected)]
	Verify {
		address: u32,
		expected: u32,
		found: u32,
	},

	#[fail(display = "Wrong signature 0x{:02x} (expected 0x{:02x})", found, expected)]
	WrongSignature {
		found: u8,
		expected: u8,
	},

	#[fail(display = "Truncated image: need {} bytes, have {}", needed, available)]
	TruncatedImage {
		needed: usize,
		available: usize,
	},
}

impl EepromError {
	/// Errors caused by the content of an image, as opposed to the hardware
	pub fn is_format_error(&self) -> bool {
		match self {
			EepromError::WrongSignature { .. } | EepromError::TruncatedImage { .. } => true,
			_ => false,
		}
	}
}
