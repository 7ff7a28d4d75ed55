use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::io::{
	FromRawFd,
};
use std::ptr;

use libc::{
	MAP_SHARED,
	O_CLOEXEC,
	O_RDWR,
	O_SYNC,
	PROT_READ,
	PROT_WRITE,
	c_void,
	mmap,
	munmap,
	off_t,
	open,
};

use super::RegisterSpace;

#[derive(Debug)]
pub struct Mapped {
	ptr: ptr::NonNull<u8>, // u8 instead of void for easier offset operations
	len: usize,
	base: usize, // physical address of `ptr`
}

impl Drop for Mapped {
	fn drop(&mut self) {
		unsafe {
			let res = munmap(
				self.ptr.as_ptr() as *mut c_void,
				self.len,
			);
			if 0 != res {
				panic!("munmap failed: {}", io::Error::last_os_error());
			}
		}
	}
}

impl Mapped {
	fn locate(&self, address: usize, width: usize) -> *mut u8 {
		assert!(address >= self.base, "register 0x{:08x} below mapped window", address);
		let offset = address - self.base;
		assert!(offset & (width - 1) == 0);
		assert!(offset + width <= self.len, "register 0x{:08x} above mapped window", address);
		unsafe { self.ptr.as_ptr().add(offset) }
	}
}

impl RegisterSpace for Mapped {
	fn read_byte(&mut self, address: usize) -> u8 {
		unsafe { ptr::read_volatile(self.locate(address, 1)) }
	}

	fn read_dword(&mut self, address: usize) -> u32 {
		u32::from_le(unsafe { ptr::read_volatile(self.locate(address, 4) as *const u32) })
	}

	fn write_dword(&mut self, address: usize, data: u32) {
		unsafe { ptr::write_volatile(self.locate(address, 4) as *mut u32, data.to_le()) }
	}
}

// TODO: exclusive open / file locking?
pub fn inner_open(path: &str, base: usize, len: usize) -> io::Result<Mapped> {
	let path = CString::new(path)?;

	let fd = unsafe { open(path.as_ptr(), O_RDWR | O_CLOEXEC | O_SYNC) };
	if -1 == fd {
		return Err(io::Error::last_os_error());
	}
	// now get fd managed to prevent resource leak
	let _f = unsafe { fs::File::from_raw_fd(fd) };

	let area = unsafe {
		mmap(
			ptr::null_mut(),
			len,
			PROT_READ | PROT_WRITE,
			MAP_SHARED,
			fd,
			base as off_t,
		)
	};

	if area as usize == !0usize {
		return Err(io::Error::last_os_error());
	}
	match ptr::NonNull::new(area as *mut u8) {
		None => panic!("mmap shouldn't return NULL ever"),
		Some(area) => {
			debug!("mapped EEPROM registers 0x{:08x}..0x{:08x}", base, base + len);
			Ok(Mapped{
				ptr: area,
				len,
				base,
			})
		},
	}
}
