use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;

use crate::error;
use crate::interrupt::InterruptFlag;
use crate::runner;
use crate::status::StatusReporter;
use crate::utils::files_with_extension;

const PACKAGE_MANAGER: &str = "apt-get";

/// Install every downloaded package in the work directory via the host
/// package manager, elevating with sudo unless already running as root.
pub fn install_assets(
    work_dir: &Path,
    reporter: &mut dyn StatusReporter,
    interrupt: &InterruptFlag,
) -> Result<()> {
    let packages = files_with_extension(work_dir, "deb")?;
    if packages.is_empty() {
        reporter.warn("No packages to install.");
        return Ok(());
    }

    reporter.begin(&format!("Installing {} packages...", packages.len()));

    let command = install_command(work_dir, &packages, needs_elevation());
    match runner::run_streamed(command, reporter, interrupt) {
        Ok(()) => {
            reporter.ok();
            Ok(())
        }
        Err(err) => {
            reporter.fail();
            if !error::is_interrupted(&err) {
                reporter.info("Package installation failed.");
            }
            Err(err)
        }
    }
}

fn install_command(work_dir: &Path, packages: &[PathBuf], elevate: bool) -> Command {
    let mut command = if elevate {
        let mut sudo = Command::new("sudo");
        sudo.arg(PACKAGE_MANAGER);
        sudo
    } else {
        Command::new(PACKAGE_MANAGER)
    };
    command.arg("install").arg("--yes");
    for package in packages {
        if let Some(name) = package.file_name() {
            // A path-like argument makes apt treat it as a local file rather
            // than a package name.
            command.arg(Path::new(".").join(name));
        }
    }
    command.current_dir(work_dir);
    command
}

#[cfg(unix)]
fn needs_elevation() -> bool {
    !nix::unistd::Uid::effective().is_root()
}

#[cfg(not(unix))]
fn needs_elevation() -> bool {
    false
}
