use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolpinError {
    // Input errors
    #[error("VERSION_MISSING: a version was not provided")]
    VersionMissing,

    #[error("COMMAND_MISSING: a command was not provided")]
    CommandMissing,

    // Config errors
    #[error("CONFIG_PARSE_ERROR: {0}")]
    ConfigParseError(String),

    #[error("CONFIG_INVALID: failed to parse {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalidValue { field: String, reason: String },

    // Install errors
    #[error("{0}")]
    Install(String),

    // Post-install errors
    #[error("TOOL_NOT_ON_PATH: {tool} was not found on PATH")]
    ToolNotOnPath { tool: String },

    #[error("COMMAND_FAILED: `{command}` exited with {status}")]
    CommandFailed { command: String, status: String },

    // IO errors
    #[error("IO_ERROR: {0}")]
    IoError(#[from] std::io::Error),

    // Uncaught faults
    #[error("INTERNAL_ERROR: Internal error")]
    Internal,

    // Generic errors
    #[error("{0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, ToolpinError>;
