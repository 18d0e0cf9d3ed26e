use std::fmt;

// EEPROM control/status register ("EECTL" at 0x260)
const EEPROM_ADDRESS_LOW_MASK:  u32 = 0x0000_1fff; // dword address bits 0..12
const EEPROM_COMMAND_SHIFT:      u8 = 13;
const EEPROM_COMMAND_MASK:      u32 = 0x0000_e000;
const EEPROM_BUSY:              u32 = 0x0004_0000; // read only
const EEPROM_ADDRESS_BIT13:     u32 = 0x0010_0000; // dword address bit 13
const EEPROM_ADDRESS_BIT13_SHIFT: u8 = 7;
// bits 21..31 are not ours to touch
const EEPROM_PRESERVE_MASK:     u32 = 0xffe0_0000;

const DWORD_ADDRESS_LOW_BITS: u32 = 0x3fff;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum EeCommand {
	WriteStatus,
	Write,
	Read,
	ReadStatus,
	WriteEnable,
	Other(u8),
}

impl EeCommand {
	pub fn from_bits(v: u8) -> Self {
		match v & 0x7 {
			1 => EeCommand::WriteStatus,
			2 => EeCommand::Write,
			3 => EeCommand::Read,
			5 => EeCommand::ReadStatus,
			6 => EeCommand::WriteEnable,
			v => EeCommand::Other(v),
		}
	}

	pub fn bits(self) -> u8 {
		match self {
			EeCommand::WriteStatus => 1,
			EeCommand::Write => 2,
			EeCommand::Read => 3,
			EeCommand::ReadStatus => 5,
			EeCommand::WriteEnable => 6,
			EeCommand::Other(v) => v & 0x7,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EeControl(pub u32);

impl EeControl {
	// start from the current register value; keeps the bits above the
	// command/address fields
	pub fn preserving(current: EeControl) -> Self {
		EeControl(current.0 & EEPROM_PRESERVE_MASK)
	}

	pub fn command(&self) -> EeCommand {
		EeCommand::from_bits(((self.0 & EEPROM_COMMAND_MASK) >> EEPROM_COMMAND_SHIFT) as u8)
	}

	pub fn set_command(&mut self, command: EeCommand) -> &mut Self {
		self.0 = (self.0 & !EEPROM_COMMAND_MASK) | ((command.bits() as u32) << EEPROM_COMMAND_SHIFT);
		self
	}

	// dword address (byte address >> 2); only the low 14 bits fit: 13 bits
	// in the low field, bit 13 moved up to bit 20
	pub fn dword_address(&self) -> u32 {
		(self.0 & EEPROM_ADDRESS_LOW_MASK)
		| ((self.0 & EEPROM_ADDRESS_BIT13) >> EEPROM_ADDRESS_BIT13_SHIFT)
	}

	pub fn set_dword_address(&mut self, dword_address: u32) -> &mut Self {
		let dword_address = dword_address & DWORD_ADDRESS_LOW_BITS;
		self.0 = (self.0 & !(EEPROM_ADDRESS_LOW_MASK | EEPROM_ADDRESS_BIT13))
			| ((dword_address << EEPROM_ADDRESS_BIT13_SHIFT) & EEPROM_ADDRESS_BIT13)
			| (dword_address & EEPROM_ADDRESS_LOW_MASK);
		self
	}

	pub fn is_busy(&self) -> bool {
		0 != self.0 & EEPROM_BUSY
	}
}

impl fmt::Display for EeControl {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:08x}", self.0)
	}
}

impl fmt::Debug for EeControl {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f,
			"0x{:08x} (command: {:?}, dword address: 0x{:04x}",
			self.0,
			self.command(),
			self.dword_address(),
		)?;
		if self.is_busy() { write!(f, " [BUSY]")?; }
		write!(f, ")")
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn read_command_packing() {
		// byte address 0x8004 -> dword 0x2001: bit 13 goes to bit 20
		let mut ctl = EeControl::preserving(EeControl(0xabcd_ffff));
		ctl.set_command(EeCommand::Read).set_dword_address(0x8004 >> 2);
		assert_eq!(ctl.0, 0xabc0_0000 | 0x0010_0000 | (3 << 13) | 0x0001);
		assert_eq!(ctl.command(), EeCommand::Read);
		assert_eq!(ctl.dword_address(), 0x2001);
		assert!(!ctl.is_busy());
	}

	#[test]
	fn write_enable_has_no_address() {
		let mut ctl = EeControl::preserving(EeControl(0x0004_3fff));
		ctl.set_command(EeCommand::WriteEnable);
		assert_eq!(ctl.0, 0xc000);
		assert_eq!(ctl.dword_address(), 0);
	}

	#[test]
	fn unlock_words_decode() {
		assert_eq!(EeControl(0xa000).command(), EeCommand::ReadStatus);
		assert_eq!(EeControl(0x2000).command(), EeCommand::WriteStatus);
		assert_eq!(EeControl(0x4_0000 | (4 << 13)).command(), EeCommand::Other(4));
		assert!(EeControl(0x4_0000).is_busy());
	}
}
