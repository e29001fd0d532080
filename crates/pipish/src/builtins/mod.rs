//! The builtin commands: sources, filters, sinks, tests and redirects.
//!
//! Builtins are plain functions returning a [`SequenceStep`](crate::SequenceStep)
//! (or, for redirects, a [`StepOption`](crate::StepOption)), so user code
//! composes them directly:
//!
//! ```
//! use pipish::builtins::{echo_slice, grep, count_lines};
//! use pipish::Sequence;
//!
//! let mut seq = Sequence::pipeline(vec![
//!     echo_slice(vec!["apple", "banana", "cherry"]),
//!     grep("an"),
//!     count_lines(),
//! ]);
//! assert_eq!(seq.exec().parse_int().unwrap(), 1);
//! ```

pub mod filters;
pub mod predicates;
pub mod redirects;
pub mod sinks;
pub mod sources;

pub use filters::{
    basename, count_lines, count_words, cut_fields, dirname, drop_empty_lines,
    grep, grep_v, head, run_pipeline, sort_lines, strip_extension,
    swap_extensions, tail, tr, trim_whitespace, uniq,
};
pub use predicates::{test_empty, test_filepath_exists, test_not_empty};
pub use redirects::{
    append_stdout_to_file, redirect_stderr_to_channel, redirect_stderr_to_devnull,
    redirect_stderr_to_stdout, redirect_stdout_to_channel,
    redirect_stdout_to_devnull, redirect_stdout_to_stderr,
};
pub use sinks::{
    append_to_file, rm_file, to_stderr, to_stdout, truncate_file, write_to_file,
};
pub use sources::{
    cat_file, echo, echo_args, echo_slice, echo_to_stderr, exec_external,
    list_files, return_status,
};
