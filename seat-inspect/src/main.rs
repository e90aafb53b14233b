use std::env::args;
use std::io::Write;
use std::process::exit;

use gumdrop::Options;
use log::error;

use crate::cli_opts::CliStart;
use crate::console::Console;
use crate::error::InspectError;
use crate::report::Report;

mod cli_opts;
mod console;
mod error;
mod format;
mod journal;
mod props;
mod report;
mod seat;
mod session;
mod units;
mod user;

fn main() {
    let mut logger = env_logger::Builder::new();
    logger
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();

    // `-nc` is the historical spelling of `--nocolour`
    let args: Vec<String> = args()
        .skip(1)
        .map(|arg| {
            if arg == "-nc" {
                "--nocolour".to_owned()
            } else {
                arg
            }
        })
        .collect();

    let parsed = match CliStart::parse_args_default(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            println!("Error: {}", err);
            exit(1);
        }
    };

    if parsed.help {
        println!("Usage: seat-inspect [OPTIONS]");
        println!();
        println!("{}", CliStart::usage());
        return;
    }
    if parsed.version {
        println!("seat-inspect v{}", env!("CARGO_PKG_VERSION"));
        println!(" seat-dbus v{}", seat_dbus::VERSION);
        return;
    }
    if parsed.nocolour {
        colored::control::set_override(false);
    }

    let console = Console::new(parsed.verbose);
    let mut report = match Report::new(console) {
        Ok(report) => report,
        Err(err) => fail(&err),
    };
    if let Err(err) = report.run() {
        fail(&err);
    }
}

fn fail(err: &InspectError) -> ! {
    error!("{}", err);
    exit(1);
}
