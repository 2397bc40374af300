//! Process command implementation

use crate::processor::Processor;
use clap::Parser;
use std::path::PathBuf;

use super::fetch::Cli;
use super::CliError;

/// Arguments for the process command
#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Output JSONL dataset path
    #[arg(long, default_value = "issue_dataset.jsonl")]
    pub output: PathBuf,
}

impl ProcessArgs {
    /// Execute the process command.
    pub fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let processor = Processor::new(&cli.data_dir, &self.output);
        let report = processor.process()?;

        println!(
            "Processed {} issue(s) from {} file(s) into {}",
            report.issues_seen - report.duplicates,
            report.files_read,
            self.output.display()
        );
        println!("  Records written: {}", report.records_written);
        println!("  Duplicates dropped: {}", report.duplicates);
        if report.corrupt_files > 0 {
            println!("  Corrupt files skipped: {}", report.corrupt_files);
        }

        Ok(())
    }
}
