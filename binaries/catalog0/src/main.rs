use {
    catalog0::cmd::{self, Error as InspectError},
    clap::{arg, Command},
    snafu::prelude::*,
    std::{env, path::PathBuf, process},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("the `CATALOG0_SNAPSHOT` environment variable is unset, you can pass a argument with `-f` to config"))]
    NoSnapshotFile,

    Inspect {
        #[snafu(backtrace)]
        source: InspectError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

const CATALOG0_SNAPSHOT: &str = "CATALOG0_SNAPSHOT";

const INSPECT: &str = "inspect";

fn cli() -> Command {
    let pkg_name = env!("CARGO_PKG_NAME");

    Command::new(pkg_name)
        .bin_name(pkg_name)
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .subcommand(
            Command::new(INSPECT)
                .about("print a summary of every table in a catalog snapshot")
                .arg(arg!(-f --file <PATH> "snapshot file")),
        )
}

fn main() {
    env_logger::init();

    if let Err(err) = try_main() {
        eprintln!("{}", err);
        process::exit(2);
    }
}

fn try_main() -> Result<()> {
    let matches = cli().get_matches();
    match matches.subcommand() {
        Some((INSPECT, sub_matches)) => {
            let file = match sub_matches.get_one::<String>("file") {
                Some(file) => file.into(),
                None => env::var(CATALOG0_SNAPSHOT).map_err(|_| Error::NoSnapshotFile)?,
            };

            for line in cmd::inspect(&PathBuf::from(file)).context(InspectSnafu)? {
                println!("{}", line);
            }
        }
        _ => unreachable!(),
    }

    Ok(())
}
