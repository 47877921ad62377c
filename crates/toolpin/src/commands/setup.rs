//! `toolpin setup` - install, expose on PATH, verify, run
//!
//! The tool's executable directory is appended to the `GITHUB_PATH` file when
//! one is configured, so later automation steps see it. For this process the
//! directory is prepended to a private copy of `PATH` that is used both to
//! locate the tool and as the `PATH` of every child spawned here.

use anyhow::Result;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use toolpin_core::ToolpinError;

use crate::context::Context;

/// Outcome of the user's command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Passed,
    Failed,
}

impl CommandStatus {
    pub fn from_exit(status: ExitStatus) -> Self {
        if status.success() {
            CommandStatus::Passed
        } else {
            CommandStatus::Failed
        }
    }
}

/// Options of `toolpin setup`
pub struct SetupOptions {
    pub version: String,
    pub install_only: bool,
    pub command: Option<String>,
    pub args: Option<String>,
}

/// Execute `toolpin setup <version>`
pub fn execute_setup(ctx: &Context, options: SetupOptions) -> Result<()> {
    let tool = ctx.settings.tool.as_str();

    if options.version.trim().is_empty() {
        return Err(ToolpinError::VersionMissing.into());
    }
    if options.install_only {
        log::info!("Install only: no command will be run");
    }

    log::info!("Setting up {} version \"{}\"", tool, options.version);
    let (spec, result) = ctx.install(&options.version)?;

    log::info!("Adding {} binary to PATH", tool);
    let exec_dir = executable_dir(result.path());
    if let Some(github_path) = &ctx.settings.github_path {
        append_github_path(github_path, &exec_dir)?;
    }
    let search_path = prepend_to_path(&exec_dir, std::env::var_os("PATH"))?;

    let current_dir = std::env::current_dir()?;
    let binary = which::which_in(tool, Some(&search_path), current_dir).map_err(|_| {
        ToolpinError::ToolNotOnPath {
            tool: tool.to_string(),
        }
    })?;

    log::info!("Successfully setup {} version {}", tool, spec);
    let version_output = Command::new(&binary)
        .arg("--version")
        .env("PATH", &search_path)
        .output()?;
    log::info!("{}", String::from_utf8_lossy(&version_output.stdout).trim_end());

    if options.install_only {
        return Ok(());
    }

    let command = options
        .command
        .filter(|c| !c.trim().is_empty())
        .ok_or(ToolpinError::CommandMissing)?;

    let args = split_args(options.args.as_deref());
    if args.is_empty() {
        log::warn!("no args were provided");
    }

    log::debug!("Running {} {} {}", binary.display(), command, args.join(" "));
    let status = Command::new(&binary)
        .arg(&command)
        .args(&args)
        .env("PATH", &search_path)
        .status()?;

    match CommandStatus::from_exit(status) {
        CommandStatus::Passed => Ok(()),
        CommandStatus::Failed => Err(ToolpinError::CommandFailed {
            command: std::iter::once(command.as_str())
                .chain(args.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" "),
            status: status.to_string(),
        }
        .into()),
    }
}

/// Windows archives put the executable at the top; others under `bin/`
pub fn executable_dir(install_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        install_dir.to_path_buf()
    } else {
        install_dir.join("bin")
    }
}

/// One directory per line, as the automation host expects
fn append_github_path(file: &Path, dir: &Path) -> Result<()> {
    let mut handle = OpenOptions::new().create(true).append(true).open(file)?;
    writeln!(handle, "{}", dir.display())?;
    Ok(())
}

fn prepend_to_path(dir: &Path, current: Option<OsString>) -> Result<OsString> {
    let existing: Vec<PathBuf> = current
        .map(|p| std::env::split_paths(&p).collect())
        .unwrap_or_default();

    std::env::join_paths(std::iter::once(dir.to_path_buf()).chain(existing))
        .map_err(|e| ToolpinError::Generic(format!("invalid PATH entry: {}", e)).into())
}

fn split_args(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
