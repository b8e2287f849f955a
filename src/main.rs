use std::process;

use clap::Parser;

use neoget::config::Config;
use neoget::interrupt::InterruptFlag;
use neoget::models::{self, Args};
use neoget::status::{StatusReporter, TerminalReporter};
use neoget::{error, pipeline};

fn main() {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version displays are successes; everything else is a
            // usage error.
            let code = models::parse_error_exit_code(&err);
            let _ = err.print();
            process::exit(code);
        }
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("neoget: {err:#}");
            process::exit(error::EXIT_FAILURE);
        }
    };

    let interrupt = match InterruptFlag::install() {
        Ok(flag) => flag,
        Err(err) => {
            eprintln!("neoget: {err:#}");
            process::exit(error::EXIT_FAILURE);
        }
    };

    let mut reporter = TerminalReporter::stdout(config.debug);
    if let Err(err) = pipeline::run(
        &config,
        &args.requested_versions(),
        &mut reporter,
        &interrupt,
    ) {
        if error::is_interrupted(&err) {
            reporter.warn("Interrupted.");
        } else {
            // Step failures were already reported where they happened; keep
            // the full chain available for troubleshooting.
            log::debug!("pipeline failed: {err:?}");
        }
        process::exit(error::exit_code(&err));
    }
}
