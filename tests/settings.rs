use g120_eeprom::registers::{
	RegisterMap,
	SimulatedEeprom,
};
use g120_eeprom::settings::Settings;
use g120_eeprom::{
	Controller,
	PAGE_SIZE,
};

#[test]
fn save_then_load() {
	let mut eeprom = Controller::new(SimulatedEeprom::new(RegisterMap::G120), 120_000_000);

	// blank EEPROM
	let settings = Settings::load(&mut eeprom).unwrap();
	assert_eq!(settings, Settings { property1: -1, property2: -1 });

	let settings = Settings { property1: 100, property2: 200 };
	settings.save(&mut eeprom).unwrap();
	assert_eq!(eeprom.registers().commits(), &[0][..]);

	let buf = eeprom.read(0, 0, 8).unwrap();
	assert_eq!(buf, vec![100, 0, 0, 0, 200, 0, 0, 0]);
	assert_eq!(Settings::load(&mut eeprom).unwrap(), settings);

	// survives re-initialization
	let sim = eeprom.into_inner();
	let mut eeprom = Controller::new(sim, 120_000_000);
	assert_eq!(Settings::load(&mut eeprom).unwrap(), settings);
}

#[test]
fn settings_leave_other_pages_alone() {
	let mut eeprom = Controller::new(SimulatedEeprom::new(RegisterMap::G120), 120_000_000);
	let data: Vec<u8> = (0..PAGE_SIZE as u8).collect();
	eeprom.write(1, 0, &data[..]).unwrap();

	Settings { property1: 1, property2: 2 }.save(&mut eeprom).unwrap();
	assert_eq!(eeprom.read(1, 0, PAGE_SIZE).unwrap(), data);
}
