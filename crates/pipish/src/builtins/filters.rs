//! Filter builtins: steps that read stdin and write transformed stdout.

use std::path::Path;

use regex::Regex;

use crate::error::{ExecStatus, PipeError};
use crate::params::params_from_env;
use crate::pipe::Pipe;
use crate::range::parse_range_spec;
use crate::sequence::Sequence;
use crate::step::SequenceStep;

/// Count the lines on stdin and write the total, like `wc -l`.
pub fn count_lines() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("CountLines()"));
        let mut count = 0u64;
        while p.stdin.read_line().is_some() {
            count += 1;
        }
        p.write_stdout_line(&count.to_string());
        ExecStatus::ok()
    })
}

/// Count the whitespace-separated words on stdin, like `wc -w`.
pub fn count_words() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("CountWords()"));
        let mut count = 0usize;
        while let Some(line) = p.stdin.read_line() {
            count += line.split_whitespace().count();
        }
        p.write_stdout_line(&count.to_string());
        ExecStatus::ok()
    })
}

/// Select whitespace-separated fields from every line, like `cut -f`.
///
/// The spec is a comma-separated list of 1-indexed ranges (`"2-4,6"`).
/// Fields are emitted once per range that selects them, joined by a
/// single space.
pub fn cut_fields(spec: impl Into<String>) -> SequenceStep {
    let spec = spec.into();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("CutFields({:?})", spec));
        let expanded = p.expand(&spec);
        p.tracef(format_args!("=> CutFields({:?})", expanded));

        let ranges = match parse_range_spec(&expanded) {
            Ok(ranges) => ranges,
            Err(err) => return ExecStatus::failed(err),
        };

        while let Some(line) = p.stdin.read_line() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let mut selected = Vec::new();
            for range in &ranges {
                for (i, field) in fields.iter().enumerate() {
                    if range.contains(i + 1) {
                        selected.push(*field);
                    }
                }
            }
            let selected = selected.join(" ");
            p.trace_stdout_line(&selected);
            p.write_stdout_line(&selected);
        }
        ExecStatus::ok()
    })
}

/// Keep only the lines that match a regular expression.
pub fn grep(pattern: impl Into<String>) -> SequenceStep {
    grep_filter("Grep", pattern.into(), true)
}

/// Keep only the lines that do NOT match a regular expression.
pub fn grep_v(pattern: impl Into<String>) -> SequenceStep {
    grep_filter("GrepV", pattern.into(), false)
}

fn grep_filter(name: &'static str, pattern: String, keep_matches: bool) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("{}({:?})", name, pattern));
        let expanded = p.expand(&pattern);
        p.tracef(format_args!("=> {}({:?})", name, expanded));

        let re = match Regex::new(&expanded) {
            Ok(re) => re,
            Err(err) => return ExecStatus::failed(err),
        };

        while let Some(line) = p.stdin.read_line() {
            if re.is_match(&line) == keep_matches {
                p.trace_stdout_line(&line);
                p.write_stdout_line(&line);
            }
        }
        ExecStatus::ok()
    })
}

/// Pass through the first `n` lines of stdin, like `head -n`.
pub fn head(n: usize) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("Head({})", n));
        let mut seen = 0usize;
        while seen < n {
            let Some(line) = p.stdin.read_line() else {
                break;
            };
            p.write_stdout_line(&line);
            seen += 1;
        }
        ExecStatus::ok()
    })
}

/// Pass through the last `n` lines of stdin, like `tail -n`.
///
/// When `n` is zero, nothing is passed through.
pub fn tail(n: usize) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("Tail({})", n));
        let lines = p.stdin.take_lines();
        if n == 0 {
            return ExecStatus::ok();
        }
        let skip = lines.len().saturating_sub(n);
        for line in &lines[skip..] {
            p.write_stdout_line(line);
        }
        ExecStatus::ok()
    })
}

/// Replace strings in every line, like `tr`.
///
/// Each occurrence of `from[i]` is replaced by `to[i]`. As a special
/// case, a single `to` entry is applied to every `from` entry; any other
/// length mismatch is an error.
pub fn tr<S: Into<String>>(from: Vec<S>, to: Vec<S>) -> SequenceStep {
    let from: Vec<String> = from.into_iter().map(Into::into).collect();
    let to: Vec<String> = to.into_iter().map(Into::into).collect();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("Tr({:?}, {:?})", from, to));

        let to = match broadcast("from", &from, "to", &to) {
            Ok(to) => to,
            Err(err) => return ExecStatus::failed(err),
        };

        while let Some(line) = p.stdin.read_line() {
            let mut line = line;
            for (old, new) in from.iter().zip(to.iter()) {
                line = line.replace(old.as_str(), new);
            }
            p.write_stdout_line(&line);
        }
        ExecStatus::ok()
    })
}

/// Remove leading and trailing whitespace from every line.
pub fn trim_whitespace() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("TrimWhitespace()"));
        while let Some(line) = p.stdin.read_line() {
            p.write_stdout_line(line.trim());
        }
        ExecStatus::ok()
    })
}

/// Sort the lines of stdin lexically, like `sort`.
pub fn sort_lines() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("Sort()"));
        let mut lines = p.stdin.take_lines();
        lines.sort();
        for line in lines {
            p.write_stdout_line(&line);
        }
        ExecStatus::ok()
    })
}

/// Drop adjacent duplicate lines, like `uniq`.
pub fn uniq() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("Uniq()"));
        let mut previous: Option<String> = None;
        while let Some(line) = p.stdin.read_line() {
            if previous.as_deref() != Some(line.as_str()) {
                p.write_stdout_line(&line);
                previous = Some(line);
            }
        }
        ExecStatus::ok()
    })
}

/// Drop the lines that contain only whitespace.
pub fn drop_empty_lines() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("DropEmptyLines()"));
        while let Some(line) = p.stdin.read_line() {
            if !line.trim().is_empty() {
                p.write_stdout_line(&line);
            }
        }
        ExecStatus::ok()
    })
}

/// Treat every line as a filepath and keep only its final element.
///
/// Blank lines are preserved as blank lines.
pub fn basename() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("Basename()"));
        while let Some(line) = p.stdin.read_line() {
            if line.trim().is_empty() {
                p.write_stdout_line("");
                continue;
            }
            let base = Path::new(&line)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| line.clone());
            p.trace_stdout_line(&base);
            p.write_stdout_line(&base);
        }
        ExecStatus::ok()
    })
}

/// Treat every line as a filepath and keep only its parent directory.
///
/// A path with no parent maps to `.`; blank lines are preserved.
pub fn dirname() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("Dirname()"));
        while let Some(line) = p.stdin.read_line() {
            if line.trim().is_empty() {
                p.write_stdout_line("");
                continue;
            }
            let dir = match Path::new(&line).parent() {
                Some(parent) if !parent.as_os_str().is_empty() => {
                    parent.display().to_string()
                }
                Some(_) => ".".to_string(),
                None => line.clone(),
            };
            p.write_stdout_line(&dir);
        }
        ExecStatus::ok()
    })
}

/// Treat every line as a filepath and remove its extension, if any.
pub fn strip_extension() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("StripExtension()"));
        while let Some(line) = p.stdin.read_line() {
            let ext = file_extension(&line);
            let stripped = line.strip_suffix(&ext).unwrap_or(&line);
            p.trace_stdout_line(stripped);
            p.write_stdout_line(stripped);
        }
        ExecStatus::ok()
    })
}

/// Treat every line as a filepath and swap one extension for another.
///
/// Each extension in `old` maps to the corresponding entry in `new`; a
/// single `new` entry is applied to every `old` extension. Extensions
/// include the leading dot (`".txt"`). Lines whose extension matches
/// nothing pass through unchanged, and each line is swapped at most once.
pub fn swap_extensions<S: Into<String>>(old: Vec<S>, new: Vec<S>) -> SequenceStep {
    let old: Vec<String> = old.into_iter().map(Into::into).collect();
    let new: Vec<String> = new.into_iter().map(Into::into).collect();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("SwapExtensions({:?}, {:?})", old, new));

        let new = match broadcast("old", &old, "new", &new) {
            Ok(new) => new,
            Err(err) => return ExecStatus::failed(err),
        };

        while let Some(line) = p.stdin.read_line() {
            let ext = file_extension(&line);
            let mut swapped = false;
            for (i, candidate) in old.iter().enumerate() {
                if ext == *candidate {
                    let stem = line.strip_suffix(&ext).unwrap_or(&line);
                    p.write_stdout_line(&format!("{}{}", stem, new[i]));
                    swapped = true;
                    break;
                }
            }
            if !swapped {
                p.write_stdout_line(&line);
            }
        }
        ExecStatus::ok()
    })
}

/// Run another sequence as a single step of this one.
///
/// The nested sequence reads this step's stdin, inherits the calling
/// pipe's positional parameters and shell options, and its stdout is
/// copied back as this step's output. Use it to build reusable
/// pipelines.
pub fn run_pipeline(mut seq: Sequence) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("RunPipeline()"));

        seq.set_shopt(p.shopt().clone());
        seq.new_pipe();
        seq.pipe_mut()
            .set_stdin_from_string(p.stdin.take_remaining());

        let params = params_from_env(p.env());
        seq.set_params(&params);
        seq.run_controller();

        p.write_stdout(&seq.string());
        p.write_stderr(&seq.stderr_string());

        let (code, err) = seq.status_error();
        ExecStatus { code, err }
    })
}

/// The filepath extension of `line`, leading dot included, or `""`.
fn file_extension(line: &str) -> String {
    match Path::new(line).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => String::new(),
    }
}

/// Pair `left` with `right`, repeating a single `right` entry to match.
fn broadcast(
    left_name: &str,
    left: &[String],
    right_name: &str,
    right: &[String],
) -> Result<Vec<String>, PipeError> {
    if left.len() > 1 && right.len() == 1 {
        return Ok(vec![right[0].clone(); left.len()]);
    }
    if left.len() != right.len() {
        return Err(PipeError::MismatchedInputs {
            left: left_name.to_string(),
            left_len: left.len(),
            right: right_name.to_string(),
            right_len: right.len(),
        });
    }
    Ok(right.to_vec())
}
