use std::io::{self, Write};

use owo_colors::OwoColorize;

/// Single-line step reporting: a step begins as a pending `[    ]` line and
/// is later resolved in place to `[ OK ]` or `[FAIL]`. Output from external
/// commands scrolls below the pending line via [`StatusReporter::sub_line`];
/// the resolution rewrites the pinned line above it.
///
/// The pipeline only talks to this trait, never to escape sequences, so tests
/// can capture an event log instead of terminal bytes.
pub trait StatusReporter {
    /// Print a pending status line for a step that is about to block.
    fn begin(&mut self, message: &str);
    /// Resolve the pending line as successful.
    fn ok(&mut self);
    /// Resolve the pending line as failed.
    fn fail(&mut self);
    /// Print an informational line (failure reasons, resolved versions).
    fn info(&mut self, message: &str);
    fn warn(&mut self, message: &str);
    /// Print a diagnostic line; emitted only when debug output is enabled.
    fn debug(&mut self, message: &str);
    /// Print one line of external-command output below the pending line.
    fn sub_line(&mut self, line: &str);
    /// Print a standalone success line (the final "all done" message).
    fn success(&mut self, message: &str);
}

const TAG_EMPTY: &str = "    ";
const TAG_OK: &str = " OK ";
const TAG_FAIL: &str = "FAIL";
const TAG_INFO: &str = "INFO";
const TAG_WARN: &str = "WARN";
const TAG_DBUG: &str = "DBUG";

/// Reporter that renders to a terminal with ANSI colors and cursor movement.
pub struct TerminalReporter<W: Write> {
    out: W,
    debug: bool,
    /// Lines between the unresolved pending line and the cursor, inclusive.
    pending: Option<usize>,
}

impl TerminalReporter<io::Stdout> {
    pub fn stdout(debug: bool) -> Self {
        Self::new(io::stdout(), debug)
    }
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W, debug: bool) -> Self {
        Self {
            out,
            debug,
            pending: None,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, tag: String, message: &str) {
        if message.is_empty() {
            let _ = writeln!(self.out, "[{tag}]");
        } else {
            let _ = writeln!(self.out, "[{tag}] {message}");
        }
        let _ = self.out.flush();
        if let Some(n) = self.pending.as_mut() {
            *n += 1;
        }
    }

    /// Rewrite the tag of the pending line, `n` lines above the cursor, then
    /// put the cursor back where it was.
    fn resolve(&mut self, tag: String) {
        match self.pending.take() {
            Some(n) => {
                let _ = write!(self.out, "\x1b[{n}F[{tag}]\x1b[{n}E");
                let _ = self.out.flush();
            }
            // Nothing pending: degrade to a standalone line.
            None => self.line(tag, ""),
        }
    }
}

impl<W: Write> StatusReporter for TerminalReporter<W> {
    fn begin(&mut self, message: &str) {
        let _ = writeln!(self.out, "[{TAG_EMPTY}] {message}");
        let _ = self.out.flush();
        self.pending = Some(1);
    }

    fn ok(&mut self) {
        self.resolve(TAG_OK.bright_green().to_string());
    }

    fn fail(&mut self) {
        self.resolve(TAG_FAIL.bright_red().to_string());
    }

    fn info(&mut self, message: &str) {
        self.line(TAG_INFO.cyan().to_string(), message);
    }

    fn warn(&mut self, message: &str) {
        self.line(TAG_WARN.yellow().to_string(), message);
    }

    fn debug(&mut self, message: &str) {
        if self.debug {
            self.line(TAG_DBUG.magenta().to_string(), message);
        }
    }

    fn sub_line(&mut self, line: &str) {
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
        if let Some(n) = self.pending.as_mut() {
            *n += 1;
        }
    }

    fn success(&mut self, message: &str) {
        self.line(TAG_OK.bright_green().to_string(), message);
    }
}
