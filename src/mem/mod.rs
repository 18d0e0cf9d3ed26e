mod mapped;

pub use self::mapped::Mapped;

/// Size of the switch register window mapped from the physical base address
pub const REGISTER_SPACE_SIZE: usize = 256 * 1024;

/// 32-bit register window of the switch
///
/// Offsets are byte offsets into the window; they must be 4-byte aligned and
/// inside the window, otherwise implementations panic. Values are in host
/// byte order.
pub trait RegisterSpace {
	fn len(&self) -> usize;

	fn read_dword(&self, offset: usize) -> u32;
	fn write_dword(&mut self, offset: usize, data: u32);
}

impl<'a, S: ?Sized + RegisterSpace> RegisterSpace for &'a mut S {
	fn len(&self) -> usize {
		S::len(*self)
	}

	fn read_dword(&self, offset: usize) -> u32 {
		S::read_dword(*self, offset)
	}
	fn write_dword(&mut self, offset: usize, data: u32) {
		S::write_dword(*self, offset, data);
	}
}

/// Parse a physical address like `strtoull(s, NULL, 0)`: "0x" prefix for
/// hex, leading "0" for octal, decimal otherwise.
pub fn parse_base_address(s: &str) -> crate::AResult<u64> {
	let s = s.trim();
	ensure!(!s.is_empty(), "empty base address");

	let (digits, radix) = if s.starts_with("0x") || s.starts_with("0X") {
		(&s[2..], 16)
	} else if s.len() > 1 && s.starts_with('0') {
		(&s[1..], 8)
	} else {
		(s, 10)
	};

	with_context!(("invalid base address: {}", s),
		Ok(u64::from_str_radix(digits, radix)?)
	)
}
