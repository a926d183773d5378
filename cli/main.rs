mod commands;
pub mod flags;

use commands::*;
use structopt::StructOpt;
use tracing::{error, log};

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "brisk",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "Resolve build graphs and compute the link arguments of Rust targets"
)]
struct Brisk {
    #[structopt(subcommand, help = "the command to run")]
    cmd: Command,
}

impl Brisk {
    fn run(self) -> Result<(), anyhow::Error> {
        human_panic::setup_panic!(Metadata {
            name: "brisk".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            authors: "Leandro Ostera <leandro@warp.build>".into(),
            homepage: "https://warp.build".into(),
        });

        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .format_timestamp_micros()
            .format_module_path(false)
            .parse_env("BRISK_LOG")
            .try_init()?;

        let result = self.cmd.run();

        if let Err(ref err) = result {
            error!("{:?}", &err);
        };

        result
    }
}

#[derive(StructOpt, Debug, Clone)]
enum Command {
    Resolve(ResolveCommand),
    Check(CheckCommand),
}

impl Command {
    fn run(self) -> Result<(), anyhow::Error> {
        match self {
            Command::Resolve(x) => x.run(),
            Command::Check(x) => x.run(),
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    Brisk::from_args().run()
}
