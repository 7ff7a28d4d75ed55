use failure::Fail;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Fail)]
pub enum EepromError {
	#[fail(display = "page {} out of range (0..={})", page, max)]
	PageOutOfRange { page: u32, max: u32 },

	#[fail(display = "offset {} out of range (0..={})", offset, max)]
	OffsetOutOfRange { offset: u32, max: u32 },

	#[fail(display = "size {} at page {} offset {} exceeds the EEPROM", size, page, offset)]
	SizeOutOfRange { page: u32, offset: u32, size: u32 },

	#[fail(display = "no data to write")]
	MissingData,

	#[fail(display = "EEPROM timeout after {:?} waiting for status 0x{:08x}", waited, mask)]
	Timeout { mask: u32, waited: Duration },
}

impl EepromError {
	/// whether the request was rejected because of an argument bound
	pub fn is_range_error(&self) -> bool {
		match self {
			EepromError::PageOutOfRange { .. }
			| EepromError::OffsetOutOfRange { .. }
			| EepromError::SizeOutOfRange { .. } => true,
			_ => false,
		}
	}
}
