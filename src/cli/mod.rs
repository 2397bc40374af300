//! CLI command implementations

pub mod error;
pub mod fetch;
pub mod process;
pub mod run;
pub mod validate;

pub use error::CliError;
pub use fetch::{Cli, Commands, FetchArgs};
pub use process::ProcessArgs;
pub use run::RunArgs;
pub use validate::{ValidateCommand, ValidateTarget};
