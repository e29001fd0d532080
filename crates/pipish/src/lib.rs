//! pipish: shell-style pipelines and lists, in-process.
//!
//! This crate provides:
//!
//! - **Pipe**: Per-run stdin/stdout/stderr channels, environment, status
//! - **Channel**: The in-memory line-oriented buffer behind each stream
//! - **Sequence**: Executable step lists with `|` (pipeline) and `;` (list)
//!   semantics, chosen by a [`Controller`]
//! - **Logic**: `&&`, `||` and `if` combinators over nested sequences
//! - **StepOption**: Paired setup/teardown actions for per-step redirection
//! - **Builtins**: echo/grep/cut/sort and friends, ready to drop into a
//!   sequence
//! - **Env**: `$VAR` expansion, positional parameters, scoped variables
//! - **Shopt**: `bash -x`-style tracing, scoped to one sequence
//!
//! ```
//! use pipish::builtins::{cut_fields, echo};
//! use pipish::Sequence;
//!
//! let mut seq = Sequence::pipeline(vec![
//!     echo("one two three four five six seven"),
//!     cut_fields("2-4,6"),
//! ]);
//! assert_eq!(seq.exec().string(), "two three four six\n");
//! ```

pub mod builtins;
pub mod channel;
pub mod env;
pub mod error;
pub mod logic;
pub mod params;
pub mod pipe;
pub mod range;
pub mod sequence;
pub mod shopt;
pub mod step;

pub use channel::Channel;
pub use env::{Env, Frame};
pub use error::{ExecStatus, PipeError, STATUS_NOT_OKAY, STATUS_OKAY};
pub use logic::{and_then, if_else, if_then, or_else};
pub use params::{params_from_env, set_params_in_env};
pub use pipe::{noop, Command, OutputTarget, Pipe, PipeContext};
pub use range::{parse_range_spec, Range, RANGE_MAX};
pub use sequence::{Controller, Sequence};
pub use shopt::{Shopt, TraceSink};
pub use step::{SequenceStep, StepOption};
