use std::fmt;

use crate::eeprom::{
	Controller,
	EepromError,
	PAGE_SIZE,
};
use crate::registers::RegisterSpace;

pub const SETTINGS_PAGE: u32 = 0;

/// Two integers stored little-endian at the start of the settings page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Settings {
	pub property1: i32,
	pub property2: i32,
}

fn read_i32(buf: &[u8]) -> i32 {
	let mut word = [0u8; 4];
	word.copy_from_slice(buf);
	i32::from_le_bytes(word)
}

impl Settings {
	/// `None` if `buf` is shorter than the two properties
	pub fn decode(buf: &[u8]) -> Option<Self> {
		Some(Settings {
			property1: read_i32(buf.get(0..4)?),
			property2: read_i32(buf.get(4..8)?),
		})
	}

	/// full page image, zero padded
	pub fn encode(&self) -> [u8; PAGE_SIZE as usize] {
		let mut page = [0u8; PAGE_SIZE as usize];
		page[0..4].copy_from_slice(&self.property1.to_le_bytes());
		page[4..8].copy_from_slice(&self.property2.to_le_bytes());
		page
	}

	pub fn load<S: RegisterSpace>(eeprom: &mut Controller<S>) -> Result<Self, EepromError> {
		let page = eeprom.read(SETTINGS_PAGE, 0, PAGE_SIZE)?;
		Settings::decode(&page).ok_or(EepromError::SizeOutOfRange {
			page: SETTINGS_PAGE,
			offset: 0,
			size: page.len() as u32,
		})
	}

	// writing the whole page makes sure it gets committed
	pub fn save<S: RegisterSpace>(&self, eeprom: &mut Controller<S>) -> Result<(), EepromError> {
		let page = self.encode();
		eeprom.write(SETTINGS_PAGE, 0, &page[..])
	}
}

impl fmt::Display for Settings {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "property1: {}, property2: {}", self.property1, self.property2)
	}
}
