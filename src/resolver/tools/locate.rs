// Locating yt-dlp and a Python interpreter that can import it

use std::time::Duration;
use tokio::sync::OnceCell;

use crate::resolver::utils::run_output_with_timeout;

/// Budget for each `--version` / import / `which` check
const DETECT_TIMEOUT: Duration = Duration::from_secs(5);

/// What was found on this machine; probed once per process
#[derive(Debug, Clone)]
pub struct ToolDiscovery {
    pub python: String,
    pub python_has_ytdlp: bool,
    pub ytdlp: String,
}

lazy_static::lazy_static! {
    static ref DISCOVERY: OnceCell<ToolDiscovery> = OnceCell::new();
}

/// Cached discovery of the default interpreter and yt-dlp binary
pub async fn discover() -> &'static ToolDiscovery {
    DISCOVERY
        .get_or_init(|| async {
            let python = find_python().await;
            let python_has_ytdlp = python_has_ytdlp(&python).await;
            let ytdlp = find_ytdlp().await;
            log::debug!(
                "[Locate] python: {} (yt_dlp: {}), binary: {}",
                python,
                python_has_ytdlp,
                ytdlp
            );
            ToolDiscovery {
                python,
                python_has_ytdlp,
                ytdlp,
            }
        })
        .await
}

/// Exit status of a short check; false on spawn failure or timeout
async fn command_succeeds(program: &str, args: &[&str], limit: Duration) -> bool {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    match run_output_with_timeout(program, &args, limit).await {
        Ok(output) => output.status.success(),
        Err(e) => {
            log::debug!("[Locate] {} {:?}: {}", program, args, e);
            false
        }
    }
}

/// Find yt-dlp executable in common paths
pub async fn find_ytdlp() -> String {
    let common_paths = [
        "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
        "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
        "/usr/bin/yt-dlp",          // System installation
    ];

    if let Some(path) = common_paths
        .iter()
        .find(|p| std::path::Path::new(p).exists())
    {
        return path.to_string();
    }

    if let Some(path) = which("yt-dlp").await {
        return path;
    }

    // Last resort: hope it's in PATH
    "yt-dlp".to_string()
}

/// First interpreter among the usual candidates that answers `--version`
pub async fn find_python() -> String {
    let candidates = ["python3", "/opt/homebrew/bin/python3", "/usr/local/bin/python3", "python"];

    for cmd in candidates {
        if command_succeeds(cmd, &["--version"], DETECT_TIMEOUT).await {
            return cmd.to_string();
        }
    }

    "python3".to_string()
}

/// Check if `python_cmd` can import the yt_dlp module
pub async fn python_has_ytdlp(python_cmd: &str) -> bool {
    command_succeeds(python_cmd, &["-c", "import yt_dlp"], DETECT_TIMEOUT).await
}

async fn which(binary: &str) -> Option<String> {
    let output = run_output_with_timeout("which", &[binary.to_string()], DETECT_TIMEOUT)
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8(output.stdout).ok()?;
    let trimmed = path.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
