use super::regs::WaitStates;

// EEPROM clock runs at (nominal) 375 kHz
const EEPROM_CLOCK: u32 = 375_000;

// minimum phase durations, in permille of a microsecond (i.e. nanoseconds)
const PHASE1_NS: u32 = 15;
const PHASE2_NS: u32 = 55;
const PHASE3_NS: u32 = 35;

/// Clock divider and wait states derived from the system clock speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Timing {
	pub clock_divider: u32,
	pub wait_states: WaitStates,
}

fn phase(speed_mhz: u32, nanos: u32) -> u8 {
	(speed_mhz * nanos / 1000 + 1) as u8
}

impl Timing {
	pub fn from_clock_speed(speed: u32) -> Self {
		let speed_mhz = speed / 1_000_000;
		Timing {
			clock_divider: (speed / EEPROM_CLOCK).saturating_sub(1),
			wait_states: WaitStates::new(
				phase(speed_mhz, PHASE1_NS),
				phase(speed_mhz, PHASE2_NS),
				phase(speed_mhz, PHASE3_NS),
			),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn g120_default_clock() {
		let t = Timing::from_clock_speed(120_000_000);
		assert_eq!(t.clock_divider, 319);
		assert_eq!(t.wait_states.phase1(), 2);
		assert_eq!(t.wait_states.phase2(), 7);
		assert_eq!(t.wait_states.phase3(), 5);
		assert_eq!(t.wait_states.0, 0x0005_0702);
	}

	#[test]
	fn other_clocks() {
		let t = Timing::from_clock_speed(72_000_000);
		assert_eq!(t.clock_divider, 191);
		assert_eq!(t.wait_states, WaitStates::new(2, 4, 3));

		// sub-MHz clocks still get one cycle per phase
		let t = Timing::from_clock_speed(375_000);
		assert_eq!(t.clock_divider, 0);
		assert_eq!(t.wait_states, WaitStates::new(1, 1, 1));
	}
}
