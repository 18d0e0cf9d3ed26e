use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::io::FromRawFd;
use std::ptr;

use libc::{
	MAP_SHARED,
	O_CLOEXEC,
	O_RDWR,
	O_SYNC,
	PROT_READ,
	PROT_WRITE,
	_SC_PAGESIZE,
	c_void,
	mmap,
	munmap,
	open,
	sysconf,
};

use super::{
	REGISTER_SPACE_SIZE,
	RegisterSpace,
};

const PHYSICAL_MEMORY: &str = "/dev/mem";

/// Register window of the switch, mapped from physical memory
#[derive(Debug)]
pub struct Mapped {
	ptr: ptr::NonNull<u8>, // u8 instead of void for easier offset operations
	len: usize,
	base: u64,
}

impl Drop for Mapped {
	fn drop(&mut self) {
		unsafe {
			let res = munmap(
				self.ptr.as_ptr() as *mut c_void,
				self.len,
			);
			if 0 != res {
				error!("munmap of register window at 0x{:x} failed: {}", self.base, io::Error::last_os_error());
			}
		}
	}
}

impl Mapped {
	pub fn open(base: u64) -> crate::AResult<Mapped> {
		let page_size = unsafe { sysconf(_SC_PAGESIZE) };
		ensure!(page_size > 0, "couldn't determine page size");
		ensure!(0 == base % (page_size as u64), "base address 0x{:x} is not page aligned", base);

		with_context!(("Can't map {} at 0x{:x}", PHYSICAL_MEMORY, base), {
			Ok(inner_open(base)?)
		})
	}

	pub fn base(&self) -> u64 {
		self.base
	}
}

impl RegisterSpace for Mapped {
	fn len(&self) -> usize {
		self.len
	}

	fn read_dword(&self, offset: usize) -> u32 {
		assert!(offset & 3 == 0);
		assert!(offset + 3 < self.len);
		unsafe { ptr::read_volatile(self.ptr.as_ptr().add(offset) as *const u32) }
	}

	fn write_dword(&mut self, offset: usize, data: u32) {
		assert!(offset & 3 == 0);
		assert!(offset + 3 < self.len);
		unsafe { ptr::write_volatile(self.ptr.as_ptr().add(offset) as *mut u32, data) }
	}
}

fn inner_open(base: u64) -> io::Result<Mapped> {
	let path = CString::new(PHYSICAL_MEMORY)?;

	let fd = unsafe { open(path.as_ptr(), O_RDWR | O_CLOEXEC | O_SYNC) };
	if -1 == fd {
		return Err(io::Error::last_os_error());
	}
	// closes the fd on every path below; the mapping stays valid without it
	let _f = unsafe { fs::File::from_raw_fd(fd) };

	let area = unsafe {
		mmap(
			ptr::null_mut(),
			REGISTER_SPACE_SIZE,
			PROT_READ | PROT_WRITE,
			MAP_SHARED,
			fd,
			base as libc::off_t,
		)
	};

	if area as usize == !0usize {
		return Err(io::Error::last_os_error());
	}
	match ptr::NonNull::new(area as *mut u8) {
		None => Err(io::Error::new(io::ErrorKind::Other, "mmap returned NULL")),
		Some(area) => Ok(Mapped {
			ptr: area,
			len: REGISTER_SPACE_SIZE,
			base,
		}),
	}
}
