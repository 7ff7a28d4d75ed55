#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate g120_eeprom;
use g120_eeprom::*;

use std::process::exit;
use std::time::Duration;

use g120_eeprom::eeprom::DEFAULT_CLOCK_SPEED;
use g120_eeprom::registers::{
	self,
	RegisterSpace,
	SimulatedEeprom,
};
use g120_eeprom::settings::Settings;

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid paramater {}: {}", name, e);
		e.context(msg).into()
	})
}

fn parse_hex(data: &str) -> AResult<Vec<u8>> {
	let data: String = data.chars().filter(|c| !c.is_whitespace() && *c != ':').collect();
	ensure!(data.len() % 2 == 0, "hex data needs an even number of digits");
	let mut result = Vec::with_capacity(data.len() / 2);
	for i in (0..data.len()).step_by(2) {
		let digits = data.get(i..i + 2).ok_or_else(|| format_err!("invalid hex data"))?;
		result.push(u8::from_str_radix(digits, 16)?);
	}
	Ok(result)
}

fn hexdump(page: u32, offset: u32, data: &[u8]) {
	let start = page * PAGE_SIZE + offset;
	for (i, line) in data.chunks(16).enumerate() {
		let address = start + (i as u32) * 16;
		let bytes: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
		println!("{:02}:{:02}  {}", address / PAGE_SIZE, address % PAGE_SIZE, bytes.join(" "));
	}
}

fn run<S: RegisterSpace>(eeprom: &mut Controller<S>, matches: &clap::ArgMatches) -> AResult<()> {
	match matches.subcommand() {
		("read", Some(sub_m)) => {
			let page: u32 = get_param(sub_m, "PAGE")?;
			let offset: u32 = get_param(sub_m, "OFFSET")?;
			let size: u32 = get_param(sub_m, "SIZE")?;
			let data = eeprom.read(page, offset, size)?;
			hexdump(page, offset, &data);
		},
		("write", Some(sub_m)) => {
			let page: u32 = get_param(sub_m, "PAGE")?;
			let offset: u32 = get_param(sub_m, "OFFSET")?;
			let data = parse_hex(sub_m.value_of("DATA").unwrap_or(""))?;
			eeprom.write(page, offset, &data[..])?;
			let end = page * PAGE_SIZE + offset + data.len() as u32;
			if end % PAGE_SIZE != 0 {
				let last_page = end / PAGE_SIZE;
				if sub_m.is_present("commit") {
					eeprom.commit_page(last_page)?;
				} else {
					warn!("page {} not committed (use --commit)", last_page);
				}
			}
			info!("wrote {} bytes", data.len());
		},
		("settings", Some(sub_m)) => match sub_m.subcommand() {
			("show", _) => {
				println!("{}", Settings::load(eeprom)?);
			},
			("save", Some(save_m)) => {
				let settings = Settings {
					property1: get_param(save_m, "PROPERTY1")?,
					property2: get_param(save_m, "PROPERTY2")?,
				};
				let previous = Settings::load(eeprom)?;
				info!("previous settings: {}", previous);
				settings.save(eeprom)?;
				info!("saved settings: {}", settings);
			},
			_ => bail!("missing settings subcommand"),
		},
		_ => bail!("missing subcommand"),
	}
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(setting: clap::AppSettings::SubcommandRequiredElseHelp)
		(@arg dev_mem: --("dev-mem") "Access the EEPROM registers through /dev/mem (default: simulated blank EEPROM)")
		(@arg speed: --speed +takes_value "System clock speed in Hz (default: 120000000)")
		(@arg timeout: --timeout +takes_value "Status poll timeout in milliseconds, 0 waits forever (default: 100)")
		(@subcommand read =>
			(about: "Read bytes and print a hex dump")
			(@arg PAGE: +required "Page (0-62)")
			(@arg OFFSET: +required "Offset in page (0-63)")
			(@arg SIZE: +required "Number of bytes")
		)
		(@subcommand write =>
			(about: "Write hex encoded bytes")
			(@arg commit: --commit "Also commit a trailing partial page")
			(@arg PAGE: +required "Page (0-62)")
			(@arg OFFSET: +required "Offset in page (0-63)")
			(@arg DATA: +required "Hex encoded data")
		)
		(@subcommand settings =>
			(about: "Settings block in page 0")
			(setting: clap::AppSettings::SubcommandRequiredElseHelp)
			(@subcommand show =>
				(about: "Show stored settings")
			)
			(@subcommand save =>
				(about: "Store new settings")
				(setting: clap::AppSettings::AllowNegativeNumbers)
				(@arg PROPERTY1: +required "First property (32-bit integer)")
				(@arg PROPERTY2: +required "Second property (32-bit integer)")
			)
		)
	).get_matches();

	let mut config = Config::default();
	if matches.is_present("speed") {
		config.clock_speed = get_param(&matches, "speed")?;
	}
	if matches.is_present("timeout") {
		let ms: u64 = get_param(&matches, "timeout")?;
		config.poll_timeout = if 0 == ms { None } else { Some(Duration::from_millis(ms)) };
	}
	debug!("EEPROM clock {} Hz (G120 default: {} Hz)", config.clock_speed, DEFAULT_CLOCK_SPEED);

	if matches.is_present("dev_mem") {
		let space = registers::open_dev_mem(&config.registers)?;
		let mut eeprom = Controller::with_config(space, config);
		run(&mut eeprom, &matches)
	} else {
		info!("using simulated EEPROM (pass --dev-mem for the hardware registers)");
		let mut eeprom = Controller::with_config(SimulatedEeprom::new(config.registers), config);
		run(&mut eeprom, &matches)
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}

#[cfg(test)]
mod tests {
	use super::parse_hex;

	#[test]
	fn hex_input() {
		assert_eq!(parse_hex("64000000c8000000").unwrap(), vec![100, 0, 0, 0, 200, 0, 0, 0]);
		assert_eq!(parse_hex("de:ad be:EF").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
		assert!(parse_hex("abc").is_err());
		assert!(parse_hex("zz").is_err());
	}
}
