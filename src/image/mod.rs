/* EEPROM image of PLX PEX switches
 *
 * dword 0: byte 0 signature (0x5a), bytes 2..3 length of the configuration
 * table in bytes; the table follows at byte 4.
 */

use std::io;

use crate::error::EepromError;
use crate::mem::RegisterSpace;
use crate::plx::{
	Delay,
	Eeprom,
};

mod record;

pub use self::record::{
	ConfigRecord,
	Port,
	RECORD_LEN,
	decode_table,
	port_types,
};

pub const IMAGE_SIGNATURE: u8 = 0x5a;
pub const IMAGE_HEADER_LEN: usize = 4;

fn round_up_dword(n: usize) -> usize {
	(n + 3) & !3
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ImageHeader {
	pub signature: u8,
	pub table_len: usize,
}

impl ImageHeader {
	pub fn from_word(word: u32) -> Self {
		ImageHeader {
			signature: word as u8,
			table_len: (word >> 16) as usize,
		}
	}

	pub fn is_valid(&self) -> bool {
		IMAGE_SIGNATURE == self.signature
	}

	/// Bytes covered by a raw dump: header plus table in whole dwords, or
	/// only the header if the signature is wrong
	pub fn dump_len(&self) -> usize {
		if self.is_valid() {
			IMAGE_HEADER_LEN + round_up_dword(self.table_len)
		} else {
			IMAGE_HEADER_LEN
		}
	}
}

/// Decode the configuration table of an image file (or a raw dump)
pub fn decode_file(image: &[u8]) -> crate::AResult<Vec<ConfigRecord>> {
	if image.len() < IMAGE_HEADER_LEN {
		return Err(EepromError::TruncatedImage {
			needed: IMAGE_HEADER_LEN,
			available: image.len(),
		}.into());
	}
	let header = ImageHeader::from_word(u32::from_ne_bytes([image[0], image[1], image[2], image[3]]));
	if !header.is_valid() {
		return Err(EepromError::WrongSignature {
			found: header.signature,
			expected: IMAGE_SIGNATURE,
		}.into());
	}
	let end = IMAGE_HEADER_LEN + header.table_len;
	if end > image.len() {
		return Err(EepromError::TruncatedImage {
			needed: end,
			available: image.len(),
		}.into());
	}

	Ok(decode_table(&image[IMAGE_HEADER_LEN..end]))
}

/// Read and decode the configuration table from the EEPROM
///
/// Returns `None` if the EEPROM doesn't start with a signature, i.e. there
/// is no table.
pub fn read_live<S, D>(eeprom: &mut Eeprom<S, D>) -> crate::AResult<Option<Vec<ConfigRecord>>>
where
	S: RegisterSpace,
	D: Delay,
{
	let header = ImageHeader::from_word(eeprom.read(0)?);
	if !header.is_valid() {
		info!("No configuration table in EEPROM (first byte 0x{:02x})", header.signature);
		return Ok(None);
	}

	let mut table = Vec::with_capacity(round_up_dword(header.table_len));
	for offset in (0..header.table_len).step_by(4) {
		let data = eeprom.read((IMAGE_HEADER_LEN + offset) as u32)?;
		table.extend_from_slice(&data.to_ne_bytes());
	}

	Ok(Some(decode_table(&table[..header.table_len])))
}

/// Print records as a table
pub fn render<W: io::Write + ?Sized>(records: &[ConfigRecord], out: &mut W) -> io::Result<()> {
	writeln!(out, "   #\tPort\tReg\tValue")?;
	writeln!(out, "--------------------------------")?;
	for (i, record) in records.iter().enumerate() {
		writeln!(out, " {:3}\t{}\t{:03x}\t{:08x}", i, record.port(), record.register, record.value)?;
	}
	Ok(())
}
