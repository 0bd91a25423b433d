use std::path::PathBuf;

use clap::Args;
use datamatic_codegen::Engine;
use datamatic_spec::Spec;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to the component spec
    #[arg(short, long, default_value = "components.json")]
    pub spec: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let spec = Spec::from_file(&self.spec).unwrap_or_exit();
        let engine = Engine::with_builtins().unwrap_or_exit();
        engine.validate(&spec).unwrap_or_exit();

        ops::check(&spec, &self.spec).render(&mut TerminalOutput::new());
        Ok(())
    }
}
