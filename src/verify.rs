use std::path::Path;
use std::process::Command;

use anyhow::Result;

use crate::crypto;
use crate::error;
use crate::interrupt::InterruptFlag;
use crate::runner;
use crate::status::StatusReporter;
use crate::utils::files_with_extension;

const CHECKSUM_TOOL: &str = "sha256sum";

/// Verify every `*.sum` manifest in the work directory against the files
/// beside it. Prefers the external checksum tool; verifies natively when the
/// tool is not on PATH.
pub fn verify_assets(
    work_dir: &Path,
    reporter: &mut dyn StatusReporter,
    interrupt: &InterruptFlag,
) -> Result<()> {
    let manifests = files_with_extension(work_dir, "sum")?;
    if manifests.is_empty() {
        reporter.warn("No checksum manifests found; skipping verification.");
        return Ok(());
    }

    reporter.begin("Verifying checksums...");

    let result = if which::which(CHECKSUM_TOOL).is_ok() {
        let mut command = Command::new(CHECKSUM_TOOL);
        command.arg("--check");
        for manifest in &manifests {
            if let Some(name) = manifest.file_name() {
                command.arg(name);
            }
        }
        command.current_dir(work_dir);
        runner::run_streamed(command, reporter, interrupt)
    } else {
        log::warn!("{CHECKSUM_TOOL} not found on PATH, verifying natively");
        crypto::verify_manifests(work_dir, &manifests, reporter, interrupt)
    };

    match result {
        Ok(()) => {
            reporter.ok();
            Ok(())
        }
        Err(err) => {
            reporter.fail();
            if !error::is_interrupted(&err) {
                reporter.info("Checksum verification failed.");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::testing::{Event, RecordingReporter};
    use std::fs;

    #[test]
    fn skips_when_no_manifests_exist() {
        let dir = tempfile::tempdir().unwrap();
        let mut reporter = RecordingReporter::new();
        verify_assets(dir.path(), &mut reporter, &InterruptFlag::new()).unwrap();
        assert!(matches!(reporter.events.as_slice(), [Event::Warn(_)]));
    }

    #[test]
    fn passes_for_a_valid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.deb"), b"hello").unwrap();
        let digest = crypto::file_sha256(&dir.path().join("hello.deb")).unwrap();
        fs::write(dir.path().join("ws.sum"), format!("{digest}  hello.deb\n")).unwrap();

        let mut reporter = RecordingReporter::new();
        verify_assets(dir.path(), &mut reporter, &InterruptFlag::new()).unwrap();
        assert_eq!(reporter.events.first(), Some(&Event::Begin("Verifying checksums...".to_string())));
        assert_eq!(reporter.events.last(), Some(&Event::Ok));
    }

    #[test]
    fn fails_for_a_tampered_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.deb"), b"hello").unwrap();
        let digest = crypto::file_sha256(&dir.path().join("hello.deb")).unwrap();
        fs::write(dir.path().join("ws.sum"), format!("{digest}  hello.deb\n")).unwrap();
        fs::write(dir.path().join("hello.deb"), b"tampered").unwrap();

        let mut reporter = RecordingReporter::new();
        let result = verify_assets(dir.path(), &mut reporter, &InterruptFlag::new());
        assert!(result.is_err());
        assert!(reporter.has_fail());
    }
}
