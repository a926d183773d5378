use super::*;
use brisk_core::graph::GraphError;
use brisk_core::SessionError;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "check",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "Check that every item of a build description resolves",
)]
pub struct CheckCommand {
    #[structopt(
        help = r"The build description to check.

Defaults to the closest Brisk.json walking upwards from the current directory.
",
        parse(from_os_str)
    )]
    file: Option<PathBuf>,

    #[structopt(flatten)]
    flags: Flags,
}

impl CheckCommand {
    pub fn run(self) -> Result<(), anyhow::Error> {
        let path = description_path(self.file)?;
        let session = BuildSession::new(ResolverConfig::try_from(self.flags)?);
        session.load(&path)?;

        match session.finish() {
            Ok(resolved) => {
                let graph = resolved.graph();
                let rust_targets = graph
                    .targets()
                    .filter(|(t, _)| t.source_types_used().rust_source_used())
                    .count();
                println!(
                    "{}: {} items resolved ({} Rust targets)",
                    path.display(),
                    graph.len(),
                    rust_targets
                );
                Ok(())
            }
            Err(SessionError::Graph(GraphError::Unresolved(report))) => {
                eprint!("{}", report);
                Err(anyhow::anyhow!(
                    "{} could not be resolved: {} missing, {} cycles",
                    path.display(),
                    report.missing.len(),
                    report.cycles.len()
                ))
            }
            Err(err) => Err(err.into()),
        }
    }
}
