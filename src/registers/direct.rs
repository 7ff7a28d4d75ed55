use std::ptr;

use super::{
	RegisterMap,
	RegisterSpace,
};

/// Register bank accessed in place, at its absolute addresses.
///
/// This is how the driver talks to the EEPROM when running on the
/// microcontroller itself (no MMU, registers visible at their physical
/// address).
#[derive(Debug)]
pub struct Direct {
	registers: RegisterMap,
}

impl Direct {
	/// # Safety
	///
	/// Every address in `registers` must be a valid, suitably aligned
	/// register (or memory) location for the lifetime of the returned value,
	/// and nothing else may access them concurrently.
	pub unsafe fn new(registers: RegisterMap) -> Self {
		Direct { registers }
	}

	fn locate(&self, address: usize, width: usize) -> usize {
		assert!(self.registers.register_at(address).is_some(), "access to unmapped EEPROM register 0x{:08x}", address);
		assert!(address & (width - 1) == 0);
		address
	}
}

impl RegisterSpace for Direct {
	fn read_byte(&mut self, address: usize) -> u8 {
		unsafe { ptr::read_volatile(self.locate(address, 1) as *const u8) }
	}

	fn read_dword(&mut self, address: usize) -> u32 {
		u32::from_le(unsafe { ptr::read_volatile(self.locate(address, 4) as *const u32) })
	}

	fn write_dword(&mut self, address: usize, data: u32) {
		unsafe { ptr::write_volatile(self.locate(address, 4) as *mut u32, data.to_le()) }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::eeprom::{
		Config,
		Controller,
	};

	// register map laid over plain memory, one dword per register
	fn map_over(bank: &mut [u32; 9]) -> RegisterMap {
		let base = bank.as_mut_ptr() as usize;
		RegisterMap {
			command: base,
			address: base + 4,
			write_data: base + 8,
			read_data: base + 12,
			wait_state: base + 16,
			clock_divider: base + 20,
			power_down: base + 24,
			status: base + 28,
			status_clear: base + 32,
		}
	}

	#[test]
	fn accesses_absolute_addresses() {
		let mut bank = [0u32; 9];
		let map = map_over(&mut bank);
		let mut direct = unsafe { Direct::new(map) };

		direct.write_dword(map.address, 0x1234_5678);
		assert_eq!(direct.read_dword(map.address), 0x1234_5678);
		// registers are little-endian; the byte access sees the lowest byte
		direct.write_dword(map.read_data, 0x0000_01a5);
		assert_eq!(direct.read_byte(map.read_data), 0xa5);

		drop(direct);
		assert_eq!(u32::from_le(bank[1]), 0x1234_5678);
		assert_eq!(bank[0], 0);
	}

	#[test]
	fn controller_initializes_in_place() {
		let mut bank = [0xffff_ffffu32; 9];
		let map = map_over(&mut bank);
		let space = unsafe { Direct::new(map) };
		let c = Controller::with_config(space, Config {
			registers: map,
			..Config::default()
		});
		drop(c);

		assert_eq!(u32::from_le(bank[6]), 0); // power down
		assert_eq!(u32::from_le(bank[5]), 319); // clock divider
		assert_eq!(u32::from_le(bank[4]), 0x0005_0702); // wait states
		assert_eq!(bank[0], 0xffff_ffff); // no command issued
	}

	#[test]
	#[should_panic]
	fn rejects_unmapped_address() {
		let mut bank = [0u32; 9];
		let map = map_over(&mut bank);
		let mut direct = unsafe { Direct::new(map) };
		direct.read_dword(map.status_clear + 4);
	}
}
