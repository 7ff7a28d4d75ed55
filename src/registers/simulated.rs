use super::{
	Register,
	RegisterMap,
	RegisterSpace,
};
use crate::eeprom::{
	Command,
	PageAddress,
	PAGE_COUNT,
	PAGE_SIZE,
};
use crate::eeprom::regs::{
	CMD_8BITS_READ,
	CMD_8BITS_WRITE,
	CMD_ERASE_PRG_PAGE,
	STATUS_END_OF_PROG,
	STATUS_END_OF_RW,
};

const ERASED: u8 = 0xff;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
	Read(Register),
	Write(Register, u32),
}

/// Behavioural model of the EEPROM block behind its register bank.
///
/// - reads with prefetch auto-increment the offset within the current page
/// - written bytes go to a 64-byte page buffer; erase/program merges the
///   bytes written since the last program into the addressed page
/// - completion flags are raised immediately, unless stalled
pub struct SimulatedEeprom {
	registers: RegisterMap,
	cells: Vec<[u8; PAGE_SIZE as usize]>,
	page_buffer: [u8; PAGE_SIZE as usize],
	latched: u64, // bitmask of written `page_buffer` bytes
	address: PageAddress,
	command: Command,
	read_data: u8,
	status: u32,
	wait_states: u32,
	clock_divider: u32,
	power_down: u32,
	stalled: bool,
	commits: Vec<u32>,
	trace: Vec<Access>,
}

impl SimulatedEeprom {
	pub fn new(registers: RegisterMap) -> Self {
		SimulatedEeprom {
			registers,
			cells: vec![[ERASED; PAGE_SIZE as usize]; PAGE_COUNT as usize],
			page_buffer: [ERASED; PAGE_SIZE as usize],
			latched: 0,
			address: PageAddress(0),
			command: Command(0),
			read_data: ERASED,
			status: 0,
			wait_states: 0,
			clock_divider: 0,
			// EEPROM is powered down after reset
			power_down: 1,
			stalled: false,
			commits: Vec::new(),
			trace: Vec::new(),
		}
	}

	pub fn cells(&self) -> &[[u8; PAGE_SIZE as usize]] {
		&self.cells
	}

	pub fn cells_mut(&mut self) -> &mut [[u8; PAGE_SIZE as usize]] {
		&mut self.cells
	}

	/// pages hit by erase/program commands, in order
	pub fn commits(&self) -> &[u32] {
		&self.commits
	}

	pub fn trace(&self) -> &[Access] {
		&self.trace
	}

	pub fn take_trace(&mut self) -> Vec<Access> {
		std::mem::replace(&mut self.trace, Vec::new())
	}

	/// stalled hardware never raises a completion flag
	pub fn set_stalled(&mut self, stalled: bool) {
		self.stalled = stalled;
	}

	pub fn is_powered(&self) -> bool {
		0 == self.power_down
	}

	pub fn clock_divider(&self) -> u32 {
		self.clock_divider
	}

	pub fn wait_states(&self) -> u32 {
		self.wait_states
	}

	fn register(&self, address: usize) -> Register {
		match self.registers.register_at(address) {
			Some(r) => r,
			None => panic!("access to unmapped EEPROM register 0x{:08x}", address),
		}
	}

	fn complete(&mut self, flag: u32) {
		if !self.stalled {
			self.status |= flag;
		}
	}

	fn cell(&self, address: PageAddress) -> u8 {
		match self.cells.get(address.page() as usize) {
			Some(page) => page[address.offset() as usize],
			None => ERASED,
		}
	}

	fn advance(&mut self) {
		let next = (self.address.offset() + 1) % PAGE_SIZE;
		self.address = PageAddress::new(self.address.page(), next);
	}

	fn execute(&mut self, command: Command) {
		self.command = command;
		match command.opcode() {
			CMD_8BITS_READ => {
				self.read_data = self.cell(self.address);
			},
			CMD_8BITS_WRITE => (),
			CMD_ERASE_PRG_PAGE => {
				let page = self.address.page();
				let latched = self.latched;
				let page_buffer = self.page_buffer;
				if let Some(cells) = self.cells.get_mut(page as usize) {
					for (offset, cell) in cells.iter_mut().enumerate() {
						if 0 != latched & (1 << offset) {
							*cell = page_buffer[offset];
						}
					}
				}
				self.latched = 0;
				self.commits.push(page);
				self.complete(STATUS_END_OF_PROG);
			},
			_ => (),
		}
	}

	fn read_data_register(&mut self) -> u8 {
		let data = self.read_data;
		if self.command.opcode() == CMD_8BITS_READ && self.command.is_prefetch() {
			self.advance();
			self.read_data = self.cell(self.address);
		}
		self.complete(STATUS_END_OF_RW);
		data
	}

	fn write_data_register(&mut self, data: u8) {
		if self.command.opcode() != CMD_8BITS_WRITE {
			return;
		}
		let offset = self.address.offset();
		self.page_buffer[offset as usize] = data;
		self.latched |= 1 << offset;
		self.advance();
		self.complete(STATUS_END_OF_RW);
	}
}

impl RegisterSpace for SimulatedEeprom {
	fn read_byte(&mut self, address: usize) -> u8 {
		match self.register(address) {
			Register::ReadData => {
				self.trace.push(Access::Read(Register::ReadData));
				self.read_data_register()
			},
			_ => self.read_dword(address) as u8,
		}
	}

	fn read_dword(&mut self, address: usize) -> u32 {
		let register = self.register(address);
		self.trace.push(Access::Read(register));
		match register {
			Register::Command => self.command.0,
			Register::Address => self.address.0,
			Register::ReadData => self.read_data_register() as u32,
			Register::WaitState => self.wait_states,
			Register::ClockDivider => self.clock_divider,
			Register::PowerDown => self.power_down,
			Register::Status => self.status,
			Register::WriteData | Register::StatusClear => 0, // write only
		}
	}

	fn write_dword(&mut self, address: usize, data: u32) {
		let register = self.register(address);
		self.trace.push(Access::Write(register, data));
		match register {
			Register::Command => self.execute(Command(data)),
			Register::Address => self.address = PageAddress(data & 0xfff),
			Register::WriteData => self.write_data_register(data as u8),
			Register::ReadData | Register::Status => (), // read only
			Register::WaitState => self.wait_states = data & 0x00ff_ffff,
			Register::ClockDivider => self.clock_divider = data & 0xffff,
			Register::PowerDown => self.power_down = data & 1,
			Register::StatusClear => self.status &= !data,
		}
	}
}
