use clap::{Parser as ClapParser, ValueEnum};
use std::{collections::HashSet, process, thread};

use log::trace;
use wordint::{Int, Protection, RegionCreateInfo, ReserveError, ReservedRegion};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Integers to encode, decimal or 0x/0o/0b prefixed
    #[arg(allow_negative_numbers = true, help = "Integers to encode")]
    values: Vec<String>,

    /// Access rights of the reserved region
    #[arg(long, value_enum, default_value_t = ProtectionArg::None)]
    protection: ProtectionArg,

    /// Race this many threads on region initialization
    #[arg(long, help = "Initialize the region from N threads at once")]
    threads: Option<usize>,
}

#[derive(ValueEnum, Debug, Copy, Clone)]
enum ProtectionArg {
    None,
    Read,
}

impl From<ProtectionArg> for Protection {
    fn from(arg: ProtectionArg) -> Self {
        match arg {
            ProtectionArg::None => Protection::None,
            ProtectionArg::Read => Protection::Read,
        }
    }
}

fn install_racing(
    threads: usize,
    info: RegionCreateInfo,
) -> Result<&'static ReservedRegion, ReserveError> {
    let handles: Vec<_> = (0..threads.max(1))
        .map(|_| {
            let info = info.clone();
            thread::spawn(move || ReservedRegion::install(info).map(|r| r.base()))
        })
        .collect();

    let outcomes: HashSet<_> = handles
        .into_iter()
        .filter_map(|handle| handle.join().ok())
        .collect();
    println!(
        "{} threads observed {} distinct outcome(s)",
        threads.max(1),
        outcomes.len()
    );
    ReservedRegion::install(info)
}

fn describe(value: &Int, region: Option<&ReservedRegion>) {
    let tagged = value.as_tagged();
    match (tagged.get(), region) {
        ((x, None), Some(region)) if tagged.is_inline() => println!(
            "{value}: small {x} at base + {:#x}",
            tagged.addr() - region.base()
        ),
        ((x, None), _) => println!("{value}: small {x}, boxed fallback"),
        ((_, Some(big)), _) => println!("{value}: big integer, {} bits, boxed", big.bits()),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let info = RegionCreateInfo {
        protection: Some(cli.protection.into()),
    };
    let region = match cli.threads {
        Some(threads) => install_racing(threads, info),
        None => ReservedRegion::install(info),
    };
    match &region {
        Ok(region) => println!(
            "region: base {:#x}, {:#x} bytes, {:?}",
            region.base(),
            region.size(),
            region.settings().protection()
        ),
        Err(err) => println!("region unavailable: {err}"),
    }

    for text in &cli.values {
        let value: Int = match text.parse() {
            Ok(value) => value,
            Err(err) => {
                eprintln!("{err}");
                process::exit(1);
            }
        };
        trace!("parsed {text:?} as {value:?}");
        describe(&value, region.as_ref().ok().copied());
    }
}
