use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::{Config, LATEST};
use crate::download;
use crate::install;
use crate::interrupt::InterruptFlag;
use crate::release;
use crate::scrape;
use crate::status::StatusReporter;
use crate::verify;

/// The whole installer run: per repository fetch the release page, extract
/// the asset list and download each asset, then verify and install the lot.
/// Errors are reported where they occur and propagate to the caller, which
/// owns the process exit code.
pub fn run(
    config: &Config,
    versions: &[Option<String>],
    reporter: &mut dyn StatusReporter,
    interrupt: &InterruptFlag,
) -> Result<()> {
    let work_dir = prepare_work_dir(config, reporter)?;
    reporter.debug(&format!("work directory: {}", work_dir.display()));

    for (index, repo) in config.repos.iter().enumerate() {
        interrupt.check()?;

        let requested = versions.get(index).cloned().flatten();
        let version = requested.as_deref().unwrap_or(LATEST);

        let page = release::fetch_release_page(repo, version, reporter)?;
        let urls = scrape::locate_assets(&page, repo, &config.selector, reporter)?;

        for url in &urls {
            interrupt.check()?;
            download::fetch_asset(url, &work_dir, reporter, interrupt)?;
        }
    }

    verify::verify_assets(&work_dir, reporter, interrupt)?;
    install::install_assets(&work_dir, reporter, interrupt)?;

    reporter.success("All packages installed.");
    Ok(())
}

/// The directory owning this run's downloads: the configured override, or a
/// fresh pid-scoped temp directory. Never cleaned up by the program.
fn prepare_work_dir(config: &Config, reporter: &mut dyn StatusReporter) -> Result<PathBuf> {
    let work_dir = match &config.work_dir {
        Some(dir) => dir.clone(),
        None => std::env::temp_dir().join(format!("neoget-{}", std::process::id())),
    };

    if let Err(err) = fs::create_dir_all(&work_dir) {
        reporter.fail();
        reporter.info(&format!(
            "Could not create work directory {}: {err}",
            work_dir.display()
        ));
        return Err(err)
            .with_context(|| format!("failed to create work directory {}", work_dir.display()));
    }

    Ok(work_dir)
}
