use std::fmt;

// EECMD
const CMD_OPCODE_MASK:    u32 = 0x0000_0007;
pub const CMD_8BITS_READ:     u32 = 0;
pub const CMD_8BITS_WRITE:    u32 = 3;
pub const CMD_ERASE_PRG_PAGE: u32 = 6;
pub const CMD_RDPREFETCH:     u32 = 1 << 3;

// INTSTAT / INTSTATCLR
pub const STATUS_END_OF_RW:   u32 = 1 << 26;
pub const STATUS_END_OF_PROG: u32 = 1 << 28;

// EEADDR
const ADDRESS_OFFSET_MASK: u32 = 0x3f;
const ADDRESS_PAGE_MASK:   u32 = 0x3f;
const ADDRESS_PAGE_SHIFT:  u8 = 6;

/// Value of the address register: page and offset within the page.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageAddress(pub u32);

impl PageAddress {
	pub fn new(page: u32, offset: u32) -> Self {
		PageAddress(
			(page & ADDRESS_PAGE_MASK) << ADDRESS_PAGE_SHIFT
			| (offset & ADDRESS_OFFSET_MASK)
		)
	}

	pub fn page(&self) -> u32 {
		(self.0 >> ADDRESS_PAGE_SHIFT) & ADDRESS_PAGE_MASK
	}

	pub fn offset(&self) -> u32 {
		self.0 & ADDRESS_OFFSET_MASK
	}
}

impl fmt::Debug for PageAddress {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:03x} (page: {}, offset: {})", self.0, self.page(), self.offset())
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Command(pub u32);

impl Command {
	pub fn read_prefetch() -> Self {
		Command(CMD_8BITS_READ | CMD_RDPREFETCH)
	}

	pub fn write() -> Self {
		Command(CMD_8BITS_WRITE)
	}

	pub fn erase_program() -> Self {
		Command(CMD_ERASE_PRG_PAGE)
	}

	pub fn opcode(&self) -> u32 {
		self.0 & CMD_OPCODE_MASK
	}

	pub fn is_prefetch(&self) -> bool {
		0 != self.0 & CMD_RDPREFETCH
	}
}

impl fmt::Debug for Command {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:x} (", self.0)?;
		match self.opcode() {
			CMD_8BITS_READ => write!(f, "READ8")?,
			CMD_8BITS_WRITE => write!(f, "WRITE8")?,
			CMD_ERASE_PRG_PAGE => write!(f, "ERASE/PROGRAM")?,
			op => write!(f, "opcode {}", op)?,
		}
		if self.is_prefetch() { write!(f, " [PREFETCH]")?; }
		write!(f, ")")
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Status(pub u32);

impl Status {
	pub fn contains(&self, mask: u32) -> bool {
		self.0 & mask == mask
	}

	pub fn is_end_of_rw(&self) -> bool {
		self.contains(STATUS_END_OF_RW)
	}

	pub fn is_end_of_prog(&self) -> bool {
		self.contains(STATUS_END_OF_PROG)
	}
}

impl fmt::Debug for Status {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:08x}", self.0)?;
		if self.is_end_of_rw() { write!(f, " [END_OF_RW]")?; }
		if self.is_end_of_prog() { write!(f, " [END_OF_PROG]")?; }
		Ok(())
	}
}

/// Value of the wait state register: three phase lengths in clock cycles.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaitStates(pub u32);

impl WaitStates {
	pub fn new(phase1: u8, phase2: u8, phase3: u8) -> Self {
		WaitStates(
			phase1 as u32
			| (phase2 as u32) << 8
			| (phase3 as u32) << 16
		)
	}

	pub fn phase1(&self) -> u8 {
		self.0 as u8
	}

	pub fn phase2(&self) -> u8 {
		(self.0 >> 8) as u8
	}

	pub fn phase3(&self) -> u8 {
		(self.0 >> 16) as u8
	}
}

impl fmt::Debug for WaitStates {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f,
			"0x{:06x} (phase1: {}, phase2: {}, phase3: {})",
			self.0,
			self.phase1(),
			self.phase2(),
			self.phase3(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn address_packing() {
		let a = PageAddress::new(5, 10);
		assert_eq!(a.0, 330);
		assert_eq!(a.0, (5 & 0x3f) << 6 | (10 & 0x3f));
		assert_eq!((a.page(), a.offset()), (5, 10));

		assert_eq!(PageAddress::new(62, 63).0, 0xfbf);
		// out of range values are masked, not carried into the page
		assert_eq!(PageAddress::new(64, 64).0, 0);
	}

	#[test]
	fn command_encoding() {
		assert_eq!(Command::read_prefetch().0, 0b1000);
		assert!(Command::read_prefetch().is_prefetch());
		assert_eq!(Command::read_prefetch().opcode(), CMD_8BITS_READ);
		assert_eq!(Command::write().0, 3);
		assert_eq!(Command::erase_program().0, 6);
		assert_eq!(format!("{:?}", Command::read_prefetch()), "0x8 (READ8 [PREFETCH])");
	}

	#[test]
	fn status_flags() {
		let s = Status(STATUS_END_OF_RW | 0x1);
		assert!(s.is_end_of_rw());
		assert!(!s.is_end_of_prog());
		assert!(Status(0x1400_0000).contains(STATUS_END_OF_RW | STATUS_END_OF_PROG));
	}

	#[test]
	fn wait_state_packing() {
		let w = WaitStates::new(2, 7, 5);
		assert_eq!(w.0, 0x05_07_02);
		assert_eq!((w.phase1(), w.phase2(), w.phase3()), (2, 7, 5));
	}
}
