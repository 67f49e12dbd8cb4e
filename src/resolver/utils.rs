// Helper functions for external process invocation

use std::fmt;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Why a child process produced no output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Program could not be started
    Spawn(String),
    /// Pipes or wait failed
    Io(String),
    /// Child was killed after the deadline
    TimedOut(Duration),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(msg) => write!(f, "{}", msg),
            Self::Io(msg) => write!(f, "{}", msg),
            Self::TimedOut(d) => write!(f, "Timed out after {}s", d.as_secs()),
        }
    }
}

impl std::error::Error for CommandError {}

/// Run `program` and collect its output. `limit` bounds the whole run, pipe
/// draining included: a grandchild holding stdout open cannot stretch it.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    limit: Duration,
) -> Result<Output, CommandError> {
    let child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| CommandError::Spawn(format!("Failed to start {}: {}", program, e)))?;

    // On expiry the future is dropped with the child inside; kill_on_drop reaps it
    match timeout(limit, child.wait_with_output()).await {
        Ok(result) => {
            result.map_err(|e| CommandError::Io(format!("Failed to collect {} output: {}", program, e)))
        }
        Err(_) => {
            log::debug!("[Command] {} exceeded {:?}, killed", program, limit);
            Err(CommandError::TimedOut(limit))
        }
    }
}
