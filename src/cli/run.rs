//! Run command: the full fetch-then-process pipeline

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use super::fetch::{Cli, FetchArgs};
use super::{CliError, ProcessArgs};

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Fetch stage arguments
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Output JSONL dataset path
    #[arg(long, default_value = "issue_dataset.jsonl")]
    pub output: PathBuf,
}

impl RunArgs {
    /// Execute fetch then process in sequence.
    ///
    /// The processing stage only runs when every collection completed; a
    /// partial fetch keeps its checkpoints and the pipeline can simply be
    /// re-run later.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        info!("pipeline stage 1/2: fetch");
        self.fetch.execute(cli).await?;

        info!("pipeline stage 2/2: process");
        let process = ProcessArgs {
            output: self.output.clone(),
        };
        process.execute(cli)?;

        println!("Pipeline complete: dataset at {}", self.output.display());
        Ok(())
    }
}
