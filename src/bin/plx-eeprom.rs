#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate plx_eeprom;
use plx_eeprom::*;

use std::fs;
use std::io::{
	self,
	Read,
	Write,
};
use std::process::exit;

const STDIO: &str = "-";

fn open_input(name: &str) -> AResult<fs::File> {
	fs::File::open(name).map_err(|e| format_err!("Can't open {}: {}", name, e))
}

fn create_output(name: &str) -> AResult<fs::File> {
	fs::OpenOptions::new()
		.write(true)
		.create(true)
		.truncate(true)
		.open(name)
		.map_err(|e| format_err!("Can't open {}: {}", name, e))
}

fn raw_read(base: u64, file: &str) -> AResult<()> {
	let mut eeprom = plx::Eeprom::new(mem::Mapped::open(base)?);

	let len = if file == STDIO {
		let stdout = io::stdout();
		let mut out = stdout.lock();
		plx::dump(&mut eeprom, &mut out)?
	} else {
		let mut out = io::BufWriter::new(create_output(file)?);
		let len = plx::dump(&mut eeprom, &mut out)?;
		out.flush()?;
		len
	};
	info!("{} bytes read from EEPROM", len);

	Ok(())
}

fn raw_write(base: u64, file: &str, unlock: Option<&plx::UnlockSequence>) -> AResult<()> {
	let mut eeprom = plx::Eeprom::new(mem::Mapped::open(base)?);

	let count = if file == STDIO {
		let stdin = io::stdin();
		let mut source = stdin.lock();
		plx::restore(&mut eeprom, &mut source, unlock)?
	} else {
		let mut source = io::BufReader::new(open_input(file)?);
		plx::restore(&mut eeprom, &mut source, unlock)?
	};
	println!("{} dwords written", count);

	Ok(())
}

fn print_records(records: &[image::ConfigRecord]) -> AResult<()> {
	let stdout = io::stdout();
	let mut out = stdout.lock();
	image::render(records, &mut out)?;
	out.flush()?;
	Ok(())
}

fn print_live(base: u64) -> AResult<()> {
	let mut eeprom = plx::Eeprom::new(mem::Mapped::open(base)?);

	if let Some(records) = image::read_live(&mut eeprom)? {
		print_records(&records)?;
	}

	Ok(())
}

fn print_file(file: &str) -> AResult<()> {
	let mut data = Vec::new();
	if file == STDIO {
		io::stdin().read_to_end(&mut data)?;
	} else {
		open_input(file)?.read_to_end(&mut data).map_err(|e| format_err!("Can't read {}: {}", file, e))?;
	}

	let records = image::decode_file(&data)?;
	print_records(&records)
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@arg base: -b --base +takes_value "Physical base address of the switch registers (0x.. hex, 0.. octal)")
		(@arg read: -r --read "Dump raw EEPROM content into FILE")
		(@arg write: -w --write "Write raw EEPROM content from FILE (verifies every dword)")
		(@arg file: -f --file +takes_value "EEPROM image file, '-' for stdin/stdout")
	)
	.arg(clap::Arg::with_name("skip-unlock")
		.long("skip-unlock")
		.help("Don't send the One Stop Systems unlock sequence before writing")
	)
	.get_matches();

	let base = match matches.value_of("base") {
		Some(b) => Some(mem::parse_base_address(b)?),
		None => None,
	};
	let file = matches.value_of("file");
	let read = matches.is_present("read");
	let write = matches.is_present("write");
	let unlock = if matches.is_present("skip-unlock") {
		None
	} else {
		Some(&plx::ONE_STOP_SYSTEMS_UNLOCK)
	};

	if read || write {
		ensure!(!(read && write), "--read and --write are mutually exclusive");
		let base = base.ok_or_else(|| format_err!("Base address not specified"))?;
		let file = file.ok_or_else(|| format_err!("File name not specified"))?;
		if read {
			raw_read(base, file)
		} else {
			raw_write(base, file, unlock)
		}
	} else if let Some(base) = base {
		print_live(base)
	} else if let Some(file) = file {
		print_file(file)
	} else {
		bail!("Neither base address nor file name specified")
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
