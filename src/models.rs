use clap::error::ErrorKind;
use clap::{ArgAction, Parser};

use crate::error::EXIT_FAILURE;

/// Command line arguments.
///
/// The original tool's `-v` short flag is kept for `--version`, so clap's
/// default `-V` is disabled.
#[derive(Parser, Debug)]
#[command(
    name = "neoget",
    version,
    about = "Installer for the Intel graphics compute runtime",
    long_about = "Installs the requested release of the Intel graphics compute \
                  runtime and graphics compiler from their release pages.",
    disable_version_flag = true
)]
pub struct Args {
    /// Compute runtime release to install (defaults to the latest release)
    pub runtime_version: Option<String>,

    /// Graphics compiler release to install (defaults to the latest release)
    pub compiler_version: Option<String>,

    /// Print version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

impl Args {
    /// Requested version per configured repository, in repository order.
    /// `None` entries default to "latest" in the pipeline.
    pub fn requested_versions(&self) -> Vec<Option<String>> {
        vec![self.runtime_version.clone(), self.compiler_version.clone()]
    }
}

/// Exit code for a clap parse outcome: help and version displays are normal
/// terminations, everything else is a usage error.
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_FAILURE,
    }
}
