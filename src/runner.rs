use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::Error;
use crate::interrupt::InterruptFlag;
use crate::status::StatusReporter;

/// Run an external command, streaming its combined stdout/stderr to the
/// reporter line-by-line so the pending status line stays pinned above the
/// scrolling output. A raised interrupt kills the child; a non-zero exit maps
/// to [`Error::CommandFailed`].
pub fn run_streamed(
    mut command: Command,
    reporter: &mut dyn StatusReporter,
    interrupt: &InterruptFlag,
) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    log::debug!("running {command:?}");

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to run {program}"))?;

    // The reader threads own the pipes; the channel closes when both hit EOF,
    // which happens when the child exits.
    let (sender, receiver) = mpsc::channel::<String>();
    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, sender.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, sender.clone());
    }
    drop(sender);

    loop {
        if interrupt.is_raised() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Interrupted.into());
        }
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => reporter.sub_line(&line),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for {program}"))?;
    if !status.success() {
        return Err(Error::CommandFailed { program, status }.into());
    }
    Ok(())
}

fn forward_lines(stream: impl Read + Send + 'static, sender: Sender<String>) {
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(Result::ok) {
            if sender.send(line).is_err() {
                break;
            }
        }
    });
}
