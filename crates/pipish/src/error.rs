//! Error and status types for the pipish engine.
//!
//! Commands report their outcome as an [`ExecStatus`]: a UNIX-style exit
//! code plus an optional [`PipeError`]. The two are kept consistent by
//! [`Pipe::run_command`](crate::Pipe::run_command), which normalizes in
//! both directions: an error with code 0 becomes code 1, and a non-zero
//! code with no error gets a synthesized [`PipeError::NonZeroStatusCode`].

use thiserror::Error;

/// Status code reported by a command that completed successfully.
pub const STATUS_OKAY: i32 = 0;

/// Generic failure status code, for commands that have nothing more
/// specific to say.
pub const STATUS_NOT_OKAY: i32 = 1;

/// Errors that commands and the engine itself can produce.
///
/// These are data-level outcomes, not panics. They clone cheaply so that
/// the pipe can hand them out while retaining the recorded status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipeError {
    /// A command reported a non-zero status code without its own error.
    #[error("command exited with non-zero status code {0}")]
    NonZeroStatusCode(i32),

    /// A range spec (e.g. for `cut_fields`) could not be parsed.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// A regular expression failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// Two parallel argument lists have incompatible lengths.
    #[error("mismatched inputs: {left} has {left_len} entries, {right} has {right_len}")]
    MismatchedInputs {
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },

    /// Channel contents could not be parsed as an integer.
    #[error("not a number: {0}")]
    NotANumber(String),

    /// An underlying I/O operation failed.
    #[error("{0}")]
    Io(String),
}

impl From<std::io::Error> for PipeError {
    fn from(err: std::io::Error) -> Self {
        PipeError::Io(err.to_string())
    }
}

impl From<regex::Error> for PipeError {
    fn from(err: regex::Error) -> Self {
        PipeError::InvalidPattern(err.to_string())
    }
}

/// The outcome of running one command: an exit code plus an optional error.
///
/// `code == 0` means success. A correct command never returns an error
/// together with code 0; the engine normalizes that case anyway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecStatus {
    /// Exit code. 0 means success.
    pub code: i32,
    /// Error detail, if the command failed.
    pub err: Option<PipeError>,
}

impl ExecStatus {
    /// A successful outcome.
    pub fn ok() -> Self {
        Self::default()
    }

    /// An outcome with the given status code and no error detail.
    pub fn code(code: i32) -> Self {
        Self { code, err: None }
    }

    /// A failed outcome with the generic failure code.
    pub fn failed(err: impl Into<PipeError>) -> Self {
        Self {
            code: STATUS_NOT_OKAY,
            err: Some(err.into()),
        }
    }

    /// A failed outcome with a specific status code.
    pub fn failed_with_code(code: i32, err: impl Into<PipeError>) -> Self {
        Self {
            code,
            err: Some(err.into()),
        }
    }

    /// True if the command succeeded (code 0).
    pub fn is_ok(&self) -> bool {
        self.code == STATUS_OKAY
    }

    /// The status as a `(code, error)` pair, cloning the error detail.
    pub fn as_pair(&self) -> (i32, Option<PipeError>) {
        (self.code, self.err.clone())
    }
}
