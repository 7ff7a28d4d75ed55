/* LPC178x on-chip EEPROM, as found on the GHI G120 module */

/* Chip documentation: UM10470, chapter 37 "EEPROM memory" */

use std::hint;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

use crate::registers::{
	Register,
	RegisterMap,
	RegisterSpace,
};

mod error;
pub(crate) mod regs;
mod timing;

pub use self::error::EepromError;
pub use self::regs::{
	Command,
	PageAddress,
	Status,
	WaitStates,
};
pub use self::timing::Timing;

use self::regs::{
	STATUS_END_OF_PROG,
	STATUS_END_OF_RW,
};

pub const PAGE_SIZE: u32 = 64;
pub const PAGE_COUNT: u32 = 63;
pub const CAPACITY: u32 = PAGE_SIZE * PAGE_COUNT;
pub const DEFAULT_CLOCK_SPEED: u32 = 120_000_000;
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

const LAST_PAGE: u32 = PAGE_COUNT - 1;
const LAST_OFFSET: u32 = PAGE_SIZE - 1;
// upper bound of `page * offset + size` accepted by `read`
const READ_LIMIT: u64 = 4096;
// busy polls before starting to yield the thread
const SPIN_POLLS: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
	pub registers: RegisterMap,
	pub clock_speed: u32,
	/// `None` polls forever
	pub poll_timeout: Option<Duration>,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			registers: RegisterMap::G120,
			clock_speed: DEFAULT_CLOCK_SPEED,
			poll_timeout: Some(DEFAULT_POLL_TIMEOUT),
		}
	}
}

fn check_page(page: u32) -> Result<(), EepromError> {
	if page > LAST_PAGE {
		return Err(EepromError::PageOutOfRange { page, max: LAST_PAGE });
	}
	Ok(())
}

fn check_offset(offset: u32) -> Result<(), EepromError> {
	if offset > LAST_OFFSET {
		return Err(EepromError::OffsetOutOfRange { offset, max: LAST_OFFSET });
	}
	Ok(())
}

/// Driver for the EEPROM block.
///
/// Every operation takes `&mut self`; share a controller between threads
/// only behind a lock held for the whole call.
pub struct Controller<S: RegisterSpace> {
	space: S,
	registers: RegisterMap,
	timing: Timing,
	poll_timeout: Option<Duration>,
}

impl<S: RegisterSpace> Controller<S> {
	/// G120 registers and default poll timeout, system clock at `speed` Hz.
	pub fn new(space: S, speed: u32) -> Self {
		Controller::with_config(space, Config {
			clock_speed: speed,
			..Config::default()
		})
	}

	/// Same as `new` with the 120 MHz G120 system clock.
	pub fn g120(space: S) -> Self {
		Controller::with_config(space, Config::default())
	}

	/// Powers the EEPROM up and programs clock divider and wait states.
	pub fn with_config(space: S, config: Config) -> Self {
		let mut controller = Controller {
			space,
			registers: config.registers,
			timing: Timing::from_clock_speed(config.clock_speed),
			poll_timeout: config.poll_timeout,
		};
		debug!("EEPROM init: {} Hz, clock divider {}, wait states {:?}",
			config.clock_speed,
			controller.timing.clock_divider,
			controller.timing.wait_states,
		);
		controller.write_register(Register::PowerDown, 0);
		controller.write_register(Register::ClockDivider, controller.timing.clock_divider);
		controller.write_register(Register::WaitState, controller.timing.wait_states.0);
		controller
	}

	pub fn timing(&self) -> Timing {
		self.timing
	}

	pub fn registers(&self) -> &S {
		&self.space
	}

	pub fn registers_mut(&mut self) -> &mut S {
		&mut self.space
	}

	pub fn into_inner(self) -> S {
		self.space
	}

	fn write_register(&mut self, register: Register, value: u32) {
		trace!("EEPROM {:?} <- 0x{:08x}", register, value);
		self.space.write_dword(self.registers.address_of(register), value);
	}

	fn read_status(&mut self) -> Status {
		Status(self.space.read_dword(self.registers.status))
	}

	fn clear_status(&mut self, mask: u32) {
		self.write_register(Register::StatusClear, mask);
	}

	fn set_address(&mut self, page: u32, offset: u32) {
		self.write_register(Register::Address, PageAddress::new(page, offset).0);
	}

	fn issue(&mut self, command: Command) {
		trace!("EEPROM command {:?}", command);
		self.write_register(Register::Command, command.0);
	}

	/// returns once all bits of `mask` are set in the status register;
	/// returns error when the poll timeout elapses first
	fn wait_for_status(&mut self, mask: u32) -> Result<(), EepromError> {
		let start = Instant::now();
		let mut polls = 0u32;
		loop {
			if self.read_status().contains(mask) {
				return Ok(());
			}
			if let Some(timeout) = self.poll_timeout {
				let waited = start.elapsed();
				if waited >= timeout {
					error!("EEPROM timeout: status {:?}, waiting for 0x{:08x}", self.read_status(), mask);
					return Err(EepromError::Timeout { mask, waited });
				}
			}
			if polls < SPIN_POLLS {
				polls += 1;
				hint::spin_loop();
			} else {
				thread::yield_now();
			}
		}
	}

	fn start_read(&mut self, page: u32, offset: u32) {
		self.set_address(page, offset);
		self.issue(Command::read_prefetch());
	}

	fn start_write(&mut self, page: u32, offset: u32) {
		self.set_address(page, offset);
		self.issue(Command::write());
	}

	// erase the page and program it from the page buffer
	fn program_page(&mut self, page: u32) -> Result<(), EepromError> {
		debug!("EEPROM program page {}", page);
		self.clear_status(STATUS_END_OF_PROG);
		self.set_address(page, 0);
		self.issue(Command::erase_program());
		self.wait_for_status(STATUS_END_OF_PROG)
	}

	/// Read `size` bytes starting at `offset` within `page`, continuing on
	/// the following pages.
	///
	/// `page * offset + size` must not exceed 4096; this is a coarse limit,
	/// reads may run past the last page.
	pub fn read(&mut self, page: u32, offset: u32, size: u32) -> Result<Vec<u8>, EepromError> {
		check_page(page)?;
		check_offset(offset)?;
		if (page * offset) as u64 + size as u64 > READ_LIMIT {
			return Err(EepromError::SizeOutOfRange { page, offset, size });
		}

		let (mut page, mut offset) = (page, offset);
		let mut buf = Vec::with_capacity(size as usize);

		self.start_read(page, offset);
		for _ in 0..size {
			self.clear_status(STATUS_END_OF_RW);
			buf.push(self.space.read_byte(self.registers.read_data));
			self.wait_for_status(STATUS_END_OF_RW)?;

			offset += 1;
			if offset < PAGE_SIZE { continue; }

			page += 1;
			offset = 0;
			self.start_read(page, offset);
		}

		Ok(buf)
	}

	/// Write `data` starting at `offset` within `page`.
	///
	/// A page is erased and programmed once its last byte was written. If
	/// `data` ends within a page, those bytes stay in the page buffer until a
	/// later write fills the page, or `commit_page` is called.
	///
	/// Unlike `read` the total size isn't checked.
	pub fn write<'a, D>(&mut self, page: u32, offset: u32, data: D) -> Result<(), EepromError>
	where
		D: Into<Option<&'a [u8]>>,
	{
		let data = data.into().ok_or(EepromError::MissingData)?;
		check_page(page)?;
		check_offset(offset)?;
		if (page * PAGE_SIZE + offset) as u64 + data.len() as u64 > CAPACITY as u64 {
			warn!("EEPROM write of {} bytes at page {} offset {} runs past the last page", data.len(), page, offset);
		}

		let (mut page, mut offset) = (page, offset);
		let mut pending = 0usize;

		self.start_write(page, offset);
		for &b in data {
			self.clear_status(STATUS_END_OF_RW);
			self.write_register(Register::WriteData, b as u32);
			self.wait_for_status(STATUS_END_OF_RW)?;

			offset += 1;
			pending += 1;
			if offset < PAGE_SIZE { continue; }

			self.program_page(page)?;
			pending = 0;

			page += 1;
			offset = 0;
			self.start_write(page, offset);
		}

		if pending > 0 {
			debug!("EEPROM page {}: {} byte(s) left uncommitted in page buffer", page, pending);
		}

		Ok(())
	}

	/// Erase and program `page` from the current page buffer content.
	pub fn commit_page(&mut self, page: u32) -> Result<(), EepromError> {
		check_page(page)?;
		self.program_page(page)
	}
}
