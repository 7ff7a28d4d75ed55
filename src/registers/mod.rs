mod direct;
mod mapped;
mod simulated;

pub use self::direct::Direct;
pub use self::simulated::{
	Access,
	SimulatedEeprom,
};

// size of the mapping granularity for the register window
const WINDOW_ALIGN: usize = 0x1000;

/// Raw access to the EEPROM register bank.
///
/// Addresses are absolute (as listed in a `RegisterMap`); implementations
/// translate them into their own window. Reads take `&mut self` because
/// reading the data register has side effects on the hardware.
pub trait RegisterSpace {
	fn read_byte(&mut self, address: usize) -> u8;
	fn read_dword(&mut self, address: usize) -> u32; // little-endian
	fn write_dword(&mut self, address: usize, data: u32); // little-endian
}

impl<'a, R: ?Sized + RegisterSpace> RegisterSpace for &'a mut R {
	fn read_byte(&mut self, address: usize) -> u8 {
		R::read_byte(*self, address)
	}
	fn read_dword(&mut self, address: usize) -> u32 {
		R::read_dword(*self, address)
	}
	fn write_dword(&mut self, address: usize, data: u32) {
		R::write_dword(*self, address, data);
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Register {
	Command,
	Address,
	WriteData,
	ReadData,
	WaitState,
	ClockDivider,
	PowerDown,
	Status,
	StatusClear,
}

impl Register {
	pub const ALL: [Register; 9] = [
		Register::Command,
		Register::Address,
		Register::WriteData,
		Register::ReadData,
		Register::WaitState,
		Register::ClockDivider,
		Register::PowerDown,
		Register::Status,
		Register::StatusClear,
	];
}

/// Absolute addresses of the EEPROM registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegisterMap {
	pub command: usize,
	pub address: usize,
	pub write_data: usize,
	pub read_data: usize,
	pub wait_state: usize,
	pub clock_divider: usize,
	pub power_down: usize,
	pub status: usize,
	pub status_clear: usize,
}

impl RegisterMap {
	/// LPC178x EEPROM controller ("EECMD" .. "INTSTATCLR")
	pub const G120: RegisterMap = RegisterMap {
		command: 0x0020_0080,
		address: 0x0020_0084,
		write_data: 0x0020_0088,
		read_data: 0x0020_008c,
		wait_state: 0x0020_0090,
		clock_divider: 0x0020_0094,
		power_down: 0x0020_0098,
		status: 0x0020_0fe0,
		status_clear: 0x0020_0fe8,
	};

	pub fn address_of(&self, register: Register) -> usize {
		match register {
			Register::Command => self.command,
			Register::Address => self.address,
			Register::WriteData => self.write_data,
			Register::ReadData => self.read_data,
			Register::WaitState => self.wait_state,
			Register::ClockDivider => self.clock_divider,
			Register::PowerDown => self.power_down,
			Register::Status => self.status,
			Register::StatusClear => self.status_clear,
		}
	}

	pub fn register_at(&self, address: usize) -> Option<Register> {
		Register::ALL.iter().cloned().find(|r| self.address_of(*r) == address)
	}

	/// page aligned `(base, len)` covering all registers
	pub fn window(&self) -> (usize, usize) {
		let addresses = Register::ALL.iter().map(|r| self.address_of(*r));
		let lowest = addresses.clone().min().unwrap_or(0);
		let highest = addresses.max().unwrap_or(0);
		let base = lowest & !(WINDOW_ALIGN - 1);
		let end = (highest + 4 + WINDOW_ALIGN - 1) & !(WINDOW_ALIGN - 1);
		(base, end - base)
	}
}

impl Default for RegisterMap {
	fn default() -> Self {
		RegisterMap::G120
	}
}

/// Map the physical register window described by `map` from `/dev/mem`.
pub fn open_dev_mem(map: &RegisterMap) -> crate::AResult<impl RegisterSpace> {
	let (base, len) = map.window();
	with_context!(("mapping EEPROM registers at 0x{:08x} (+0x{:x})", base, len), {
		Ok(mapped::inner_open("/dev/mem", base, len)?)
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn g120_window_covers_all_registers() {
		let (base, len) = RegisterMap::G120.window();
		assert_eq!(base, 0x0020_0000);
		assert_eq!(len, 0x1000);
		for r in Register::ALL.iter() {
			let address = RegisterMap::G120.address_of(*r);
			assert!(address >= base && address + 4 <= base + len, "{:?}", r);
		}
	}

	#[test]
	fn register_lookup() {
		let map = RegisterMap::default();
		assert_eq!(map.register_at(0x0020_0084), Some(Register::Address));
		assert_eq!(map.register_at(0x0020_0fe8), Some(Register::StatusClear));
		assert_eq!(map.register_at(0x0020_0000), None);
	}

	#[test]
	fn relocated_map_window() {
		let map = RegisterMap {
			command: 0x4000_1000,
			address: 0x4000_1004,
			write_data: 0x4000_1008,
			read_data: 0x4000_100c,
			wait_state: 0x4000_1010,
			clock_divider: 0x4000_1014,
			power_down: 0x4000_1018,
			status: 0x4000_2ff0,
			status_clear: 0x4000_2ff8,
		};
		assert_eq!(map.window(), (0x4000_1000, 0x2000));
	}
}
