use brisk_core::{ConfigError, ResolverConfig};
use std::convert::TryFrom;
use structopt::StructOpt;

#[derive(Default, Debug, Clone, Copy, StructOpt)]
pub struct Flags {
    #[structopt(
        help = r"The amount of threads to use to declare items into the build graph.",
        short = "w",
        long = "max-workers"
    )]
    pub(crate) max_workers: Option<usize>,

    #[structopt(
        help = r"Reject targets that do not name the toolchain they are built with.",
        long = "require-toolchains"
    )]
    pub(crate) require_toolchains: bool,
}

impl TryFrom<Flags> for ResolverConfig {
    type Error = ConfigError;

    fn try_from(flags: Flags) -> Result<Self, Self::Error> {
        ResolverConfig::builder()
            .max_workers(flags.max_workers.unwrap_or_else(num_cpus::get))
            .require_toolchains(flags.require_toolchains)
            .build()
    }
}
