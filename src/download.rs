use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error;
use crate::interrupt::InterruptFlag;
use crate::release::{USER_AGENT, short_reason};
use crate::status::StatusReporter;
use crate::utils::filename_from_url;

const CHUNK_SIZE: usize = 64 * 1024;

/// Stream one asset into the work directory, named after the URL's final
/// path segment, with a progress bar sized by the declared content length.
pub fn fetch_asset(
    url: &str,
    dir: &Path,
    reporter: &mut dyn StatusReporter,
    interrupt: &InterruptFlag,
) -> Result<PathBuf> {
    let name = filename_from_url(url);
    reporter.begin(&format!("Downloading {name}..."));
    log::debug!("GET {url}");

    let response = match ureq::get(url).set("User-Agent", USER_AGENT).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(404, _)) => {
            reporter.fail();
            reporter.info("Asset not found.");
            bail!("asset not found: {url}");
        }
        Err(ureq::Error::Status(code, _)) => {
            reporter.fail();
            reporter.info(&format!("Status code: {code}"));
            bail!("unexpected status {code} for {url}");
        }
        Err(err) => {
            reporter.fail();
            reporter.info(&format!("Encountered {}", short_reason(&err)));
            return Err(err).with_context(|| format!("failed to download {url}"));
        }
    };

    let total = response
        .header("Content-Length")
        .and_then(|value| value.parse::<u64>().ok());
    let dest = dir.join(&name);

    match stream_to_file(response.into_reader(), &dest, total, interrupt) {
        Ok(written) => {
            log::debug!("wrote {written} bytes to {}", dest.display());
            reporter.ok();
            Ok(dest)
        }
        Err(err) => {
            reporter.fail();
            if !error::is_interrupted(&err) {
                reporter.info(&format!("Encountered {err:#}"));
            }
            Err(err).with_context(|| format!("failed to download {url}"))
        }
    }
}

/// Copy a response body to `dest` in bounded chunks, polling the interrupt
/// flag between chunks. The progress line is cleared on every exit path so a
/// resolution can rewrite the status line above it.
pub(crate) fn stream_to_file(
    mut reader: impl Read,
    dest: &Path,
    total: Option<u64>,
    interrupt: &InterruptFlag,
) -> Result<u64> {
    let mut file = fs::File::create(dest)
        .with_context(|| format!("Failed to create file: {}", dest.display()))?;

    let bar = progress_bar(total);
    let result = copy_chunks(&mut reader, &mut file, &bar, interrupt);
    bar.finish_and_clear();

    let written = result?;
    file.sync_all()
        .with_context(|| format!("Failed to sync file: {}", dest.display()))?;
    Ok(written)
}

fn copy_chunks(
    reader: &mut impl Read,
    file: &mut fs::File,
    bar: &ProgressBar,
    interrupt: &InterruptFlag,
) -> Result<u64> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    loop {
        interrupt.check()?;
        let count = reader
            .read(&mut buffer)
            .with_context(|| "Transfer aborted mid-download")?;
        if count == 0 {
            break;
        }
        file.write_all(&buffer[..count])
            .with_context(|| "Failed to write downloaded data")?;
        written += count as u64;
        bar.set_position(written);
    }
    Ok(written)
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(length) => {
            let bar = ProgressBar::new(length);
            bar.set_style(
                ProgressStyle::with_template(
                    "  {bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_bytes_with_declared_length() {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..150_000u32).map(|i| (i % 251) as u8).collect();
        let dest = dir.path().join("intel-opencl_20.20.16699_amd64.deb");

        let written = stream_to_file(
            Cursor::new(data.clone()),
            &dest,
            Some(data.len() as u64),
            &InterruptFlag::new(),
        )
        .unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), data);
    }

    #[test]
    fn works_without_a_declared_length() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.deb");
        let written =
            stream_to_file(Cursor::new(b"payload".to_vec()), &dest, None, &InterruptFlag::new())
                .unwrap();
        assert_eq!(written, 7);
    }

    #[test]
    fn raised_interrupt_stops_the_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.deb");
        let interrupt = InterruptFlag::new();
        interrupt.raise();

        let err =
            stream_to_file(Cursor::new(vec![0u8; 1024]), &dest, Some(1024), &interrupt).unwrap_err();
        assert!(error::is_interrupted(&err));
    }
}
