// yt-dlp as the enumeration and per-item title capability
//
// Python mode runs `python3 -m yt_dlp`, CLI mode the native binary. Auto picks
// Python when the module imports, otherwise the binary.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use super::locate::{discover, python_has_ytdlp};
use crate::resolver::config::{ResolverConfig, ToolMode};
use crate::resolver::errors::ResolveError;
use crate::resolver::traits::MediaTool;
use crate::resolver::utils::{run_output_with_timeout, CommandError};

pub struct YtDlpTool {
    program: String,
    /// Arguments placed before any yt-dlp flag (`-m yt_dlp` in Python mode)
    prefix_args: Vec<String>,
    mode: ToolMode,
    cookies_path: Option<PathBuf>,
    proxy: Option<String>,
    probe_timeout: Duration,
    title_timeout: Duration,
}

impl YtDlpTool {
    /// Pick the invocation for `config`. Machine discovery is cached per
    /// process; an explicit interpreter is checked on every call.
    pub async fn new(config: &ResolverConfig) -> Self {
        let python = match (config.tool_mode, config.python_cmd.as_deref()) {
            (ToolMode::Cli, _) => None,
            (_, Some(cmd)) => Some((cmd.to_string(), python_has_ytdlp(cmd).await)),
            (_, None) => {
                let found = discover().await;
                Some((found.python.clone(), found.python_has_ytdlp))
            }
        };

        let mode = match (config.tool_mode, &python) {
            (ToolMode::Auto, Some((_, true))) => ToolMode::Python,
            (ToolMode::Auto, _) => {
                log::debug!("[YtDlp] Python module yt_dlp not importable, using binary");
                ToolMode::Cli
            }
            (explicit, _) => explicit,
        };

        let (program, prefix_args) = match (mode, python) {
            (ToolMode::Python, Some((py, _))) => {
                (py, vec!["-m".to_string(), "yt_dlp".to_string()])
            }
            _ => {
                let binary = match &config.ytdlp_path {
                    Some(path) => path.clone(),
                    None => discover().await.ytdlp.clone(),
                };
                (binary, Vec::new())
            }
        };

        log::info!("[YtDlp] Using {} mode: {} {}", mode, program, prefix_args.join(" "));
        Self::with_program(program, prefix_args, mode, config)
    }

    /// Tool bound to an explicit program, no discovery
    pub fn with_program(
        program: impl Into<String>,
        prefix_args: Vec<String>,
        mode: ToolMode,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            program: program.into(),
            prefix_args,
            mode,
            cookies_path: config.existing_cookies_path().cloned(),
            proxy: config.proxy.clone(),
            probe_timeout: config.probe_timeout,
            title_timeout: config.title_timeout,
        }
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Build command arguments
    fn build_args(&self, flags: &[&str], url: &str) -> Vec<String> {
        let mut args = self.prefix_args.clone();
        args.extend(flags.iter().map(|f| f.to_string()));
        args.push("--no-warnings".to_string());

        if let Some(path) = &self.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.to_string_lossy().to_string());
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl MediaTool for YtDlpTool {
    fn name(&self) -> &'static str {
        match self.mode {
            ToolMode::Python => "python-yt-dlp",
            _ => "cli-yt-dlp",
        }
    }

    async fn list_flat(&self, url: &str) -> Result<String, ResolveError> {
        let args = self.build_args(&["--flat-playlist", "--dump-json"], url);
        log::debug!("[YtDlp] Running: {} {}", self.program, args.join(" "));

        let output = run_output_with_timeout(&self.program, &args, self.probe_timeout)
            .await
            .map_err(|e| match e {
                CommandError::TimedOut(_) => ResolveError::ProbeTimeout,
                CommandError::Spawn(msg) => ResolveError::ToolNotFound(msg),
                CommandError::Io(msg) => ResolveError::ProbeFailure(msg),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            if stderr.trim().is_empty() {
                return Err(ResolveError::ProbeFailure(format!(
                    "{} exited with {}",
                    self.name(),
                    output.status
                )));
            }
            return Err(ResolveError::from(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn query_title(&self, url: &str) -> Result<String, ResolveError> {
        let args = self.build_args(&["--get-title", "--no-playlist"], url);

        let output = run_output_with_timeout(&self.program, &args, self.title_timeout)
            .await
            .map_err(|e| match e {
                CommandError::Spawn(msg) => ResolveError::ToolNotFound(msg),
                other => ResolveError::PerItemQueryFailure(format!("{}: {}", url, other)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::PerItemQueryFailure(format!(
                "{}: {}",
                url,
                stderr.trim()
            )));
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ResolveError::PerItemQueryFailure(format!("{}: empty title", url)))
    }
}
