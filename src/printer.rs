use anyhow::Result;
use std::fmt;
use std::io::{self, Write};
use tracing::debug;

use crate::system_prompt::PromptSource;

// ANSI escape codes
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

pub const STATUS_LINE: &str = "\u{1f504} Generating system prompt...";
pub const OPENING_BANNER: &str =
    "\u{2b50}\u{fe0f}\u{2b50}\u{fe0f}\u{2b50}\u{fe0f}=== SYSTEM PROMPT ===\u{2b50}\u{fe0f}\u{2b50}\u{fe0f}\u{2b50}\u{fe0f}";
pub const CLOSING_BANNER: &str =
    "\u{26d4}\u{fe0f}\u{26d4}\u{fe0f}\u{26d4}\u{fe0f}=== END SYSTEM PROMPT ===\u{26d4}\u{fe0f}\u{26d4}\u{fe0f}\u{26d4}\u{fe0f}";
pub const FAILURE_LABEL: &str = "Error generating system prompt:";
pub const OUTPUT_FAILURE_LABEL: &str = "Error writing system prompt:";

/// Writing to the output sink failed (e.g. a closed pipe)
#[derive(Debug)]
pub struct OutputError(io::Error);

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to write to stdout")
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Print the status line, wait for the prompt, then print it between the banners.
///
/// A failed `construct` is returned as-is; only the status line has been
/// written to `out` by then. Write failures come back as [`OutputError`].
pub async fn run<W: Write>(source: &dyn PromptSource, out: &mut W) -> Result<()> {
    writeln!(out, "{}\n", STATUS_LINE)
        .and_then(|_| out.flush())
        .map_err(OutputError)?;

    let prompt = source.construct().await?;
    debug!("System prompt is {} bytes", prompt.len());

    let framed = format!(
        "{YELLOW}{OPENING_BANNER}\n{RESET}\n{prompt}\n\n{YELLOW}{CLOSING_BANNER}{RESET}\n"
    );
    out.write_all(framed.as_bytes())
        .and_then(|_| out.flush())
        .map_err(OutputError)?;

    Ok(())
}

/// Write the failure line, with the whole cause chain
pub fn report_failure<W: Write>(err: &anyhow::Error, out: &mut W) {
    let label = match err.downcast_ref::<OutputError>() {
        Some(_) => OUTPUT_FAILURE_LABEL,
        None => FAILURE_LABEL,
    };
    // nothing left to do if stderr itself is gone
    let _ = writeln!(out, "{} {:#}", label, err);
}
