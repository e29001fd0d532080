//! Sink builtins: steps that consume output and send it somewhere else.
//!
//! A sink reads its input with [`Pipe::read_sink_line`]: from stdin when
//! it sits inside a pipeline, and from the pipe's accumulated stdout when
//! it sits inside a list.

use std::fs::{self, OpenOptions};
use std::io::Write;

use crate::error::ExecStatus;
use crate::pipe::Pipe;
use crate::step::SequenceStep;

/// Copy the sink's input to the process's own stdout.
pub fn to_stdout() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("ToStdout()"));
        let mut out = std::io::stdout();
        while let Some(line) = p.read_sink_line() {
            if let Err(err) = writeln!(out, "{}", line) {
                return ExecStatus::failed(err);
            }
        }
        ExecStatus::ok()
    })
}

/// Copy the sink's input to the process's own stderr.
pub fn to_stderr() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("ToStderr()"));
        let mut out = std::io::stderr();
        while let Some(line) = p.read_sink_line() {
            if let Err(err) = writeln!(out, "{}", line) {
                return ExecStatus::failed(err);
            }
        }
        ExecStatus::ok()
    })
}

/// Write the sink's input to a file, replacing any existing contents.
pub fn write_to_file(filename: impl Into<String>) -> SequenceStep {
    file_sink("WriteToFile", filename.into(), false)
}

/// Append the sink's input to a file, creating it if needed.
pub fn append_to_file(filename: impl Into<String>) -> SequenceStep {
    file_sink("AppendToFile", filename.into(), true)
}

fn file_sink(name: &'static str, filename: String, append: bool) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("{}({:?})", name, filename));
        let expanded = p.expand(&filename);
        p.tracef(format_args!("=> {}({:?})", name, expanded));

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&expanded);
        let mut file = match file {
            Ok(file) => file,
            Err(err) => return ExecStatus::failed(err),
        };

        while let Some(line) = p.read_sink_line() {
            p.shopt().trace_output("file", &line);
            if let Err(err) = writeln!(file, "{}", line) {
                return ExecStatus::failed(err);
            }
        }
        ExecStatus::ok()
    })
}

/// Empty a file, creating it if needed, like `> file`.
///
/// The sink's input is not consumed.
pub fn truncate_file(filename: impl Into<String>) -> SequenceStep {
    let filename = filename.into();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("TruncateFile({:?})", filename));
        let expanded = p.expand(&filename);
        p.tracef(format_args!("=> TruncateFile({:?})", expanded));

        match fs::write(&expanded, "") {
            Ok(()) => ExecStatus::ok(),
            Err(err) => ExecStatus::failed(err),
        }
    })
}

/// Delete a file, like `rm file`.
pub fn rm_file(filename: impl Into<String>) -> SequenceStep {
    let filename = filename.into();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("RmFile({:?})", filename));
        let expanded = p.expand(&filename);
        p.tracef(format_args!("=> RmFile({:?})", expanded));

        match fs::remove_file(&expanded) {
            Ok(()) => ExecStatus::ok(),
            Err(err) => ExecStatus::failed(err),
        }
    })
}
