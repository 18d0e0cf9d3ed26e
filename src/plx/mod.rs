/* Serial EEPROM controller of PLX (Broadcom) PEX 87xx/97xx PCIe switches */

use crate::error::{
	EepromError,
	Operation,
};
use crate::mem::RegisterSpace;

mod bulk;
mod delay;
mod eectl;
#[cfg(test)]
pub(crate) mod sim;

pub use self::bulk::{
	ONE_STOP_SYSTEMS_UNLOCK,
	UnlockSequence,
	dump,
	restore,
};
pub use self::delay::{
	Delay,
	ThreadDelay,
	reliable_sleep,
};
#[cfg(test)]
pub(crate) use self::delay::CountingDelay;
pub use self::eectl::{
	EeCommand,
	EeControl,
};

pub mod consts {
	use std::time::Duration;

	pub const EEPROM_CONTROL: usize = 0x260; // command + status
	pub const EEPROM_DATA: usize = 0x264; // read result / data to write
	pub const EEPROM_ADDRESS_HIGH: usize = 0x26c; // low byte: high address bits

	// 24-bit byte addresses
	pub const EEPROM_ADDRESS_LIMIT: u32 = 0x00ff_ffff;

	// worst case ~10ms per command
	pub const POLL_ATTEMPTS: usize = 100;
	pub const POLL_INTERVAL: Duration = Duration::from_micros(100);
}

use self::consts::*;

trait RegisterSpaceEeExt: RegisterSpace {
	fn eectl_read(&self) -> EeControl {
		let data = EeControl(self.read_dword(EEPROM_CONTROL));
		trace!("EECTL read : {:?}", data);
		data
	}

	fn eectl_write(&mut self, data: EeControl) {
		trace!("EECTL write: {:?}", data);
		self.write_dword(EEPROM_CONTROL, data.0);
	}

	fn set_address_high(&mut self, high: u32) {
		let val = self.read_dword(EEPROM_ADDRESS_HIGH);
		self.write_dword(EEPROM_ADDRESS_HIGH, (val & !0xff) | (high & 0xff));
	}

	fn ee_command(&mut self, command: EeCommand, dword_address: u32) {
		let mut eectl = EeControl::preserving(self.eectl_read());
		eectl.set_command(command).set_dword_address(dword_address);
		self.eectl_write(eectl);
	}
}
impl<S: RegisterSpace + ?Sized> RegisterSpaceEeExt for S {}

/// Returns the dword address for a valid EEPROM byte address
fn check_address(address: u32) -> crate::AResult<u32> {
	if address > EEPROM_ADDRESS_LIMIT || 0 != address & 0x3 {
		return Err(EepromError::Address { address }.into());
	}
	Ok(address >> 2)
}

pub struct Eeprom<S: RegisterSpace, D: Delay = ThreadDelay> {
	space: S,
	delay: D,
}

impl<S: RegisterSpace> Eeprom<S> {
	pub fn new(space: S) -> Self {
		Eeprom::with_delay(space, ThreadDelay)
	}
}

impl<S: RegisterSpace, D: Delay> Eeprom<S, D> {
	pub fn with_delay(space: S, delay: D) -> Self {
		Eeprom {
			space,
			delay,
		}
	}

	pub fn space(&self) -> &S {
		&self.space
	}

	pub fn delay(&self) -> &D {
		&self.delay
	}

	pub fn into_inner(self) -> (S, D) {
		(self.space, self.delay)
	}

	/// returns EECTL once the busy flag is clear; fails after `POLL_ATTEMPTS` polls
	fn wait_idle(&mut self, operation: Operation) -> crate::AResult<EeControl> {
		for _ in 0..POLL_ATTEMPTS {
			let eectl = self.space.eectl_read();
			if !eectl.is_busy() {
				return Ok(eectl);
			}
			self.delay.sleep(POLL_INTERVAL);
		}
		Err(EepromError::Timeout { operation }.into())
	}

	/// Read the dword at `address` (byte address, 4-byte aligned)
	pub fn read(&mut self, address: u32) -> crate::AResult<u32> {
		let dword_address = check_address(address)?;

		self.space.set_address_high(address >> 24);
		self.space.ee_command(EeCommand::Read, dword_address);
		self.wait_idle(Operation::Read)?;

		let data = self.space.read_dword(EEPROM_DATA);
		trace!("EEPROM read  @{:06x}: {:08x}", address, data);
		Ok(data)
	}

	/// Write the dword at `address` (byte address, 4-byte aligned)
	///
	/// Doesn't verify; read it back if you need to know.
	pub fn write(&mut self, address: u32, data: u32) -> crate::AResult<()> {
		let dword_address = check_address(address)?;
		trace!("EEPROM write @{:06x}: {:08x}", address, data);

		// the controller wants the high bits from the dword address here,
		// not from the byte address as for reads
		self.space.set_address_high(dword_address >> 14);

		self.space.ee_command(EeCommand::WriteEnable, 0);
		self.wait_idle(Operation::WriteEnable)?;

		self.space.write_dword(EEPROM_DATA, data);
		self.space.ee_command(EeCommand::Write, dword_address);
		self.wait_idle(Operation::Write)?;

		Ok(())
	}
}
