use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::interrupt::InterruptFlag;
use crate::status::StatusReporter;

/// Compute the SHA-256 digest of a file as a lowercase hex string.
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).with_context(|| {
        format!(
            "Failed to open file for checksum verification: {}",
            path.display()
        )
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).with_context(|| {
            format!(
                "Failed to read file for checksum verification: {}",
                path.display()
            )
        })?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// One `<digest> <file>` entry of a checksum manifest.
#[derive(Debug, PartialEq, Eq)]
pub struct SumEntry {
    pub digest: String,
    pub file_name: String,
}

/// Parse one manifest line in the `sha256sum` output format, including the
/// `*` binary-mode marker.
pub fn parse_sum_line(line: &str) -> Option<SumEntry> {
    static LINE: OnceLock<Regex> = OnceLock::new();
    let pattern = LINE.get_or_init(|| {
        Regex::new(r"^([0-9a-fA-F]{64})\s+\*?(.+)$").expect("hardcoded sum-line pattern")
    });
    let captures = pattern.captures(line.trim())?;
    Some(SumEntry {
        digest: captures[1].to_lowercase(),
        file_name: captures[2].to_string(),
    })
}

/// Native verification of the `*.sum` manifests in the work directory, used
/// when the external checksum tool is not available. Emits one
/// `name: OK`/`name: FAILED` line per entry, mirroring the tool's output.
pub fn verify_manifests(
    work_dir: &Path,
    manifests: &[PathBuf],
    reporter: &mut dyn StatusReporter,
    interrupt: &InterruptFlag,
) -> Result<()> {
    for manifest in manifests {
        let content = fs::read_to_string(manifest)
            .with_context(|| format!("Failed to read checksum manifest: {}", manifest.display()))?;

        for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
            interrupt.check()?;
            let entry = parse_sum_line(line).ok_or_else(|| {
                anyhow!(
                    "malformed checksum line in {}: {line:?}",
                    manifest.display()
                )
            })?;

            let digest = file_sha256(&work_dir.join(&entry.file_name))?;
            if digest == entry.digest {
                reporter.sub_line(&format!("{}: OK", entry.file_name));
            } else {
                reporter.sub_line(&format!("{}: FAILED", entry.file_name));
                bail!("checksum mismatch for {}", entry.file_name);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::testing::{Event, RecordingReporter};

    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn hashes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.deb");
        fs::write(&path, b"hello").unwrap();
        assert_eq!(file_sha256(&path).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn parses_sum_line_formats() {
        let entry = parse_sum_line(&format!("{HELLO_SHA256}  hello.deb")).unwrap();
        assert_eq!(entry.file_name, "hello.deb");
        assert_eq!(entry.digest, HELLO_SHA256);

        // Binary-mode marker and uppercase digests are accepted.
        let entry = parse_sum_line(&format!("{} *hello.deb", HELLO_SHA256.to_uppercase())).unwrap();
        assert_eq!(entry.file_name, "hello.deb");
        assert_eq!(entry.digest, HELLO_SHA256);

        assert!(parse_sum_line("not a sum line").is_none());
        assert!(parse_sum_line("deadbeef  short-digest.deb").is_none());
    }

    #[test]
    fn verifies_a_matching_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.deb"), b"hello").unwrap();
        let manifest = dir.path().join("ws.sum");
        fs::write(&manifest, format!("{HELLO_SHA256}  hello.deb\n")).unwrap();

        let mut reporter = RecordingReporter::new();
        verify_manifests(
            dir.path(),
            &[manifest],
            &mut reporter,
            &InterruptFlag::new(),
        )
        .unwrap();
        assert_eq!(reporter.events, vec![Event::Sub("hello.deb: OK".to_string())]);
    }

    #[test]
    fn mismatch_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.deb"), b"tampered").unwrap();
        let manifest = dir.path().join("ws.sum");
        fs::write(&manifest, format!("{HELLO_SHA256}  hello.deb\n")).unwrap();

        let mut reporter = RecordingReporter::new();
        let err = verify_manifests(
            dir.path(),
            &[manifest],
            &mut reporter,
            &InterruptFlag::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
        assert_eq!(
            reporter.events,
            vec![Event::Sub("hello.deb: FAILED".to_string())]
        );
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("ws.sum");
        fs::write(&manifest, "garbage\n").unwrap();

        let mut reporter = RecordingReporter::new();
        let err = verify_manifests(
            dir.path(),
            &[manifest],
            &mut reporter,
            &InterruptFlag::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("malformed checksum line"));
    }
}
