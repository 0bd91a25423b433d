use std::path::PathBuf;

use clap::Args;
use datamatic_codegen::Engine;
use datamatic_core::{Banner, CommentBanner, NoBanner};
use datamatic_spec::Spec;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops::{self, GenerateOptions},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to the component spec
    #[arg(short, long, default_value = "components.json")]
    pub spec: PathBuf,

    /// Directory searched recursively for .dm. templates
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Print the expanded files instead of writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Do not prepend the generated-file banner
    #[arg(long)]
    pub no_banner: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let spec = Spec::from_file(&self.spec).unwrap_or_exit();
        let engine = Engine::with_builtins().unwrap_or_exit();
        engine.validate(&spec).unwrap_or_exit();

        let banner: &dyn Banner = if self.no_banner {
            &NoBanner
        } else {
            &CommentBanner
        };

        let report = ops::generate(
            &engine,
            &spec,
            GenerateOptions {
                root: &self.dir,
                banner,
                dry_run: self.dry_run,
            },
        )?;
        report.render(&mut TerminalOutput::new());

        Ok(())
    }
}
