use std::io::{
	self,
	Read,
	Write,
};
use std::time::Duration;

use crate::error::EepromError;
use crate::image::ImageHeader;
use crate::mem::RegisterSpace;

use super::{
	Delay,
	EeControl,
	Eeprom,
	RegisterSpaceEeExt,
};

/// Raw command words written to EECTL before a restore, each followed by
/// `settle`.
///
/// Undocumented and board specific; other switch boards may need a
/// different (or no) sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct UnlockSequence {
	pub first: u32,
	pub second: u32,
	pub settle: Duration,
}

/// Unlock sequence used on One Stop Systems boards
pub const ONE_STOP_SYSTEMS_UNLOCK: UnlockSequence = UnlockSequence {
	first: 0x0000_a000,
	second: 0x0000_2000,
	settle: Duration::from_millis(1),
};

impl<S: RegisterSpace, D: Delay> Eeprom<S, D> {
	pub fn unlock(&mut self, sequence: &UnlockSequence) {
		info!("Sending EEPROM unlock sequence 0x{:04x}, 0x{:04x}", sequence.first, sequence.second);
		self.space.eectl_write(EeControl(sequence.first));
		self.delay.sleep(sequence.settle);
		self.space.eectl_write(EeControl(sequence.second));
		self.delay.sleep(sequence.settle);
	}
}

/// Copy the raw image (header and configuration table) to `sink`
///
/// Without a valid signature only the header dword is copied. Returns the
/// number of bytes written.
pub fn dump<S, D, W>(eeprom: &mut Eeprom<S, D>, sink: &mut W) -> crate::AResult<usize>
where
	S: RegisterSpace,
	D: Delay,
	W: Write + ?Sized,
{
	let first = eeprom.read(0)?;
	sink.write_all(&first.to_ne_bytes())?;

	let header = ImageHeader::from_word(first);
	if !header.is_valid() {
		warn!("No EEPROM signature (first byte 0x{:02x}), dumping header only", header.signature);
	}
	let len = header.dump_len();
	debug!("Dumping {} bytes of EEPROM", len);

	for address in (4..len).step_by(4) {
		let data = eeprom.read(address as u32)?;
		sink.write_all(&data.to_ne_bytes())?;
	}
	sink.flush()?;

	Ok(len)
}

// next full dword from `source`; a partial dword at the end is dropped
fn read_dword<R: Read + ?Sized>(source: &mut R) -> io::Result<Option<u32>> {
	let mut buf = [0u8; 4];
	let mut filled = 0;
	while filled < buf.len() {
		match source.read(&mut buf[filled..]) {
			Ok(0) => break,
			Ok(n) => filled += n,
			Err(ref e) if e.kind() == io::ErrorKind::Interrupted => (),
			Err(e) => return Err(e),
		}
	}
	match filled {
		0 => Ok(None),
		4 => Ok(Some(u32::from_ne_bytes(buf))),
		n => {
			warn!("Ignoring {} trailing bytes (not a full dword)", n);
			Ok(None)
		},
	}
}

/// Write the raw image from `source` to the EEPROM, starting at address 0,
/// reading back every dword.
///
/// Stops at the first mismatch. Returns the number of dwords written.
pub fn restore<S, D, R>(eeprom: &mut Eeprom<S, D>, source: &mut R, unlock: Option<&UnlockSequence>) -> crate::AResult<usize>
where
	S: RegisterSpace,
	D: Delay,
	R: Read + ?Sized,
{
	if let Some(sequence) = unlock {
		eeprom.unlock(sequence);
	}

	let mut address = 0u32;
	let mut count = 0usize;
	while let Some(data) = read_dword(source)? {
		eeprom.write(address, data)?;
		let found = eeprom.read(address)?;
		if found != data {
			return Err(EepromError::Verify {
				address,
				expected: data,
				found,
			}.into());
		}
		count += 1;
		if 0 == count % 256 {
			debug!("{} dwords written", count);
		}
		address += 4;
	}

	Ok(count)
}
