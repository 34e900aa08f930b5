//! CLI-specific error types and exit code mapping

use logcheck_core::error::LogCheckError;
use logcheck_scanner::LogScannerError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The scan completed and reported errors.
    #[error("found {0} error line(s) in scanned logs")]
    ErrorsFound(usize),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logcheck-core.
    #[error("{0}")]
    Core(#[from] LogCheckError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                         |
    /// |------|---------------------------------|
    /// | 0    | Success, no errors found        |
    /// | 1    | General / command error         |
    /// | 2    | Configuration error             |
    /// | 4    | Scan found error lines          |
    /// | 10   | IO error                        |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Core(e) if e.is_config() => 2,
            Self::ErrorsFound(_) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<LogScannerError> for CliError {
    fn from(e: LogScannerError) -> Self {
        if e.is_config_error() {
            Self::Config(e.to_string())
        } else {
            Self::Command(e.to_string())
        }
    }
}
