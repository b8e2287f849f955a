use std::process::ExitStatus;

use thiserror::Error;

/// Exit code for any reported failure (network, HTTP, verification,
/// installation, bad arguments).
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for a user interrupt, kept distinct from ordinary failure.
pub const EXIT_INTERRUPTED: i32 = 2;

/// Typed errors the exit-code policy needs to distinguish. Everything else
/// travels as a plain `anyhow` chain.
#[derive(Debug, Error)]
pub enum Error {
    #[error("interrupted by user")]
    Interrupted,
    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: ExitStatus },
}

/// True when the chain bottoms out in a user interrupt.
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<Error>(), Some(Error::Interrupted))
}

/// Map a pipeline error to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if is_interrupted(err) {
        EXIT_INTERRUPTED
    } else {
        EXIT_FAILURE
    }
}
