//! Configuration table records: register overrides applied by the switch
//! when it loads the EEPROM.
//!
//! Each record is 6 bytes, little endian:
//! - u16 header: bits 0..9 register (dword index), bits 10..15 port code
//! - u32 value

use std::fmt;

pub const RECORD_LEN: usize = 6;

const REGISTER_MASK: u16 = 0x03ff;
const PORT_CODE_SHIFT: u8 = 10;

pub mod port_types {
	/// Side of a non-transparent port
	#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
	pub enum NtSide {
		Link,
		Virtual,
	}
}

use self::port_types::*;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Port {
	/// address lookup table
	ALut(u8),
	DmaRam,
	Dma(u8),
	/// port 0 of a station
	Station(u8),
	NonTransparent {
		instance: u8,
		side: NtSide,
	},
	/// plain port number
	Number(u8),
}

impl Port {
	// bit patterns, not ranges: 0x2c must be checked before the 0x28 group
	pub fn from_code(code: u8) -> Self {
		let code = code & 0x3f;
		if code & 0x38 == 0x20 {
			Port::ALut(code & 0x3)
		} else if code == 0x2c {
			Port::DmaRam
		} else if code & 0x38 == 0x28 {
			Port::Dma(code & 0x7)
		} else if code & 0x38 == 0x30 {
			Port::Station(code & 0x7)
		} else if code & 0x38 == 0x38 {
			let side = if 0 != code & 0x1 { NtSide::Virtual } else { NtSide::Link };
			Port::NonTransparent {
				instance: (code >> 1) & 0x1,
				side,
			}
		} else {
			Port::Number(code)
		}
	}
}

impl fmt::Display for Port {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Port::ALut(lane) => write!(f, "A-LUT {}", lane),
			Port::DmaRam => write!(f, "DMA RAM"),
			Port::Dma(channel) => write!(f, "DMA {}", channel),
			Port::Station(station) => write!(f, "S{}P0", station),
			Port::NonTransparent { instance, side } => write!(f, "NT{} {}", instance, match side {
				NtSide::Link => 'L',
				NtSide::Virtual => 'V',
			}),
			Port::Number(n) => write!(f, "{}", n),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ConfigRecord {
	pub port_code: u8,
	/// register byte offset
	pub register: u16,
	pub value: u32,
}

impl ConfigRecord {
	pub fn from_bytes(raw: &[u8]) -> Self {
		assert!(raw.len() >= RECORD_LEN);
		let header = u16::from_le_bytes([raw[0], raw[1]]);
		let value = u32::from_le_bytes([raw[2], raw[3], raw[4], raw[5]]);
		ConfigRecord {
			port_code: (header >> PORT_CODE_SHIFT) as u8,
			register: (header & REGISTER_MASK) * 4,
			value,
		}
	}

	pub fn port(&self) -> Port {
		Port::from_code(self.port_code)
	}
}

/// Records in `table`; trailing bytes that don't make a full record are ignored
pub fn decode_table(table: &[u8]) -> Vec<ConfigRecord> {
	table.chunks_exact(RECORD_LEN).map(ConfigRecord::from_bytes).collect()
}

#[cfg(test)]
mod test {
	use super::*;

	fn check_label(code: u8, label: &str) {
		assert_eq!(Port::from_code(code).to_string(), label, "port code 0x{:02x}", code);
	}

	#[test]
	fn port_labels() {
		check_label(0x00, "0");
		check_label(0x1f, "31");
		check_label(0x20, "A-LUT 0");
		check_label(0x23, "A-LUT 3");
		check_label(0x24, "A-LUT 0"); // bit 2 isn't part of the lane
		check_label(0x28, "DMA 0");
		check_label(0x2b, "DMA 3");
		check_label(0x2c, "DMA RAM");
		check_label(0x2f, "DMA 7");
		check_label(0x30, "S0P0");
		check_label(0x35, "S5P0");
		check_label(0x38, "NT0 L");
		check_label(0x39, "NT0 V");
		check_label(0x3a, "NT1 L");
		check_label(0x3b, "NT1 V");
		check_label(0x3f, "NT1 V");
	}

	#[test]
	fn record_fields() {
		let r = ConfigRecord::from_bytes(&[0x05, 0x00, 0x78, 0x56, 0x34, 0x12]);
		assert_eq!(r, ConfigRecord { port_code: 0, register: 0x014, value: 0x1234_5678 });

		// port code 0x39, register field 0x3ff
		let r = ConfigRecord::from_bytes(&[0xff, 0xe7, 0, 0, 0, 0x80]);
		assert_eq!(r.port_code, 0x39);
		assert_eq!(r.register, 0xffc);
		assert_eq!(r.value, 0x8000_0000);
		assert_eq!(r.port(), Port::NonTransparent { instance: 0, side: NtSide::Virtual });
	}

	#[test]
	fn table_ignores_partial_record() {
		let table = [0x01, 0xd0, 1, 0, 0, 0, 0x02, 0x00, 2, 0, 0, 0, 0xaa, 0xbb];
		let records = decode_table(&table);
		assert_eq!(records.len(), 2);
		assert_eq!(records[0].port(), Port::Station(4));
		assert_eq!(records[0].register, 0x004);
		assert_eq!(records[1].register, 0x008);
		assert_eq!(records[1].value, 2);
	}
}
