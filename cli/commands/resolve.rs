use super::*;
use brisk_core::model::Label;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "resolve",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "Resolve a build description and print the link arguments of its Rust targets",
)]
pub struct ResolveCommand {
    #[structopt(
        help = r"The build description to resolve.

Defaults to the closest Brisk.json walking upwards from the current directory.
",
        parse(from_os_str)
    )]
    file: Option<PathBuf>,

    #[structopt(
        help = r"Only print the arguments of this target.

Example: //base:base
",
        long = "target"
    )]
    target: Option<Label>,

    #[structopt(help = r"Print the arguments as JSON.", long = "json")]
    json: bool,

    #[structopt(flatten)]
    flags: Flags,
}

impl ResolveCommand {
    pub fn run(self) -> Result<(), anyhow::Error> {
        let path = description_path(self.file)?;
        let session = resolve_file(&path, self.flags)?;

        let args = match &self.target {
            Some(target) => vec![session.link_args(target)?],
            None => session.link_args_for_all()?,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&args)?);
            return Ok(());
        }

        for (idx, arg) in args.iter().enumerate() {
            if idx > 0 {
                println!();
            }
            print!("{}", arg);
        }

        Ok(())
    }
}
