// Simulated EEPROM controller for tests: executes commands as soon as they
// are written, then reports busy for `busy_polls` status reads.

use std::cell::Cell;

use crate::mem::{
	REGISTER_SPACE_SIZE,
	RegisterSpace,
};

use super::consts::*;
use super::eectl::{
	EeCommand,
	EeControl,
};

const BUSY: u32 = 0x0004_0000;

// 64 KiB part; the command word carries a 14-bit dword address
pub const SIM_EEPROM_DWORDS: usize = 0x4000;

pub struct SimController {
	control: u32,
	data: u32,
	address_high: u32,
	write_enabled: bool,
	eeprom: Vec<u32>,
	commands: usize,
	busy_left: Cell<u32>,
	control_reads: Cell<usize>,
	writes: Vec<(usize, u32)>,
	committed: Vec<u32>,
	flip: Option<(u32, u32)>,

	pub busy_polls: u32,
	pub stuck_busy: bool,
	pub stuck_busy_after_commands: Option<usize>,
}

impl SimController {
	pub fn new() -> Self {
		SimController {
			control: 0,
			data: 0,
			address_high: 0,
			write_enabled: false,
			eeprom: vec![0xffff_ffff; SIM_EEPROM_DWORDS],
			commands: 0,
			busy_left: Cell::new(0),
			control_reads: Cell::new(0),
			writes: Vec::new(),
			committed: Vec::new(),
			flip: None,
			busy_polls: 0,
			stuck_busy: false,
			stuck_busy_after_commands: None,
		}
	}

	/// Sim with `image` loaded at address 0 (host byte order dwords, zero padded)
	pub fn with_image(image: &[u8]) -> Self {
		let mut sim = SimController::new();
		let dwords: Vec<u32> = image.chunks(4).map(|chunk| {
			let mut buf = [0u8; 4];
			buf[..chunk.len()].copy_from_slice(chunk);
			u32::from_ne_bytes(buf)
		}).collect();
		sim.load_dwords(0, &dwords);
		sim
	}

	pub fn load_dwords(&mut self, dword_address: usize, data: &[u32]) {
		self.eeprom[dword_address..dword_address + data.len()].copy_from_slice(data);
	}

	pub fn dwords(&self) -> &[u32] {
		&self.eeprom
	}

	pub fn preset_control(&mut self, value: u32) {
		self.control = value & !BUSY;
	}

	pub fn preset_address_high(&mut self, value: u32) {
		self.address_high = value;
	}

	/// Flip `mask` bits in the next read result from `address` (byte address)
	pub fn flip_next_read(&mut self, address: u32, mask: u32) {
		self.flip = Some((address >> 2, mask));
	}

	pub fn register_writes(&self) -> &[(usize, u32)] {
		&self.writes
	}

	/// byte addresses the EEPROM actually stored data at
	pub fn committed_addresses(&self) -> Vec<u32> {
		self.committed.iter().map(|dword_address| dword_address << 2).collect()
	}

	pub fn control_reads(&self) -> usize {
		self.control_reads.get()
	}

	fn is_stuck(&self) -> bool {
		self.stuck_busy || match self.stuck_busy_after_commands {
			Some(n) => self.commands > n,
			None => false,
		}
	}

	fn execute(&mut self, eectl: EeControl) {
		let index = eectl.dword_address() as usize % SIM_EEPROM_DWORDS;
		match eectl.command() {
			EeCommand::Read => {
				self.data = self.eeprom[index];
				if let Some((dword_address, mask)) = self.flip {
					if dword_address as usize % SIM_EEPROM_DWORDS == index {
						self.data ^= mask;
						self.flip = None;
					}
				}
			},
			EeCommand::WriteEnable => {
				self.write_enabled = true;
			},
			EeCommand::Write => {
				// without write enable the part ignores writes
				if self.write_enabled {
					self.eeprom[index] = self.data;
					self.committed.push(eectl.dword_address());
					self.write_enabled = false;
				}
			},
			_ => (),
		}
		self.commands += 1;
		self.busy_left.set(self.busy_polls);
	}
}

impl RegisterSpace for SimController {
	fn len(&self) -> usize {
		REGISTER_SPACE_SIZE
	}

	fn read_dword(&self, offset: usize) -> u32 {
		assert!(offset & 3 == 0);
		assert!(offset + 3 < REGISTER_SPACE_SIZE);
		match offset {
			EEPROM_CONTROL => {
				self.control_reads.set(self.control_reads.get() + 1);
				if self.is_stuck() {
					return self.control | BUSY;
				}
				let left = self.busy_left.get();
				if left > 0 {
					self.busy_left.set(left - 1);
					self.control | BUSY
				} else {
					self.control
				}
			},
			EEPROM_DATA => self.data,
			EEPROM_ADDRESS_HIGH => self.address_high,
			_ => 0,
		}
	}

	fn write_dword(&mut self, offset: usize, data: u32) {
		assert!(offset & 3 == 0);
		assert!(offset + 3 < REGISTER_SPACE_SIZE);
		self.writes.push((offset, data));
		match offset {
			EEPROM_CONTROL => {
				self.control = data & !BUSY;
				self.execute(EeControl(data));
			},
			EEPROM_DATA => self.data = data,
			EEPROM_ADDRESS_HIGH => self.address_high = data,
			_ => (),
		}
	}
}
