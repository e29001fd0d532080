//! Source builtins: steps that produce output without reading stdin.

use std::fs;
use std::io::Write;
use std::process::{Command as OsCommand, Stdio};

use crate::error::{ExecStatus, PipeError, STATUS_NOT_OKAY};
use crate::params::params_from_env;
use crate::pipe::Pipe;
use crate::step::SequenceStep;

/// Write a string to the pipe's stdout, expanding `$VAR` references.
///
/// A trailing newline is appended only if the expanded string does not
/// already end with one.
pub fn echo(input: impl Into<String>) -> SequenceStep {
    let input = input.into();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("Echo({:?})", input));
        let expanded = p.expand(&input);
        p.tracef(format_args!("=> Echo({:?})", expanded));

        for line in expanded.trim_end_matches('\n').split('\n') {
            p.trace_stdout_line(line);
        }
        p.write_stdout(&expanded);
        if !expanded.ends_with('\n') {
            p.write_stdout("\n");
        }
        ExecStatus::ok()
    })
}

/// Write a string to the pipe's stderr, expanding `$VAR` references.
pub fn echo_to_stderr(input: impl Into<String>) -> SequenceStep {
    let input = input.into();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("EchoToStderr({:?})", input));
        let expanded = p.expand(&input);
        p.tracef(format_args!("=> EchoToStderr({:?})", expanded));

        for line in expanded.trim_end_matches('\n').split('\n') {
            p.trace_stderr_line(line);
        }
        p.write_stderr(&expanded);
        if !expanded.ends_with('\n') {
            p.write_stderr("\n");
        }
        ExecStatus::ok()
    })
}

/// Write the sequence's positional parameters to stdout, one per line.
///
/// Only `$1..$N` are written; the program name (`$0`) is not.
pub fn echo_args() -> SequenceStep {
    SequenceStep::new(|p: &mut Pipe| {
        p.tracef(format_args!("EchoArgs()"));
        for param in params_from_env(p.env()) {
            p.trace_stdout_line(&param);
            p.write_stdout_line(&param);
        }
        ExecStatus::ok()
    })
}

/// Write a slice of strings to stdout, one line per entry, expanding
/// `$VAR` references in each.
pub fn echo_slice<S: Into<String>>(input: Vec<S>) -> SequenceStep {
    let input: Vec<String> = input.into_iter().map(Into::into).collect();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("EchoSlice({:?})", input));
        for line in &input {
            let expanded = p.expand(line);
            p.trace_stdout_line(expanded.trim_end_matches('\n'));
            p.write_stdout(&expanded);
            if !expanded.ends_with('\n') {
                p.write_stdout("\n");
            }
        }
        ExecStatus::ok()
    })
}

/// Write the contents of a file to the pipe's stdout, like `cat file`.
pub fn cat_file(filename: impl Into<String>) -> SequenceStep {
    let filename = filename.into();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("CatFile({:?})", filename));
        let expanded = p.expand(&filename);
        p.tracef(format_args!("=> CatFile({:?})", expanded));

        match fs::read_to_string(&expanded) {
            Ok(contents) => {
                p.write_stdout(&contents);
                ExecStatus::ok()
            }
            Err(err) => ExecStatus::failed(err),
        }
    })
}

/// Write a directory listing to stdout, like `ls -1 path`.
///
/// A file lists as itself; a folder lists its entries, sorted, with the
/// folder path included.
pub fn list_files(path: impl Into<String>) -> SequenceStep {
    let path = path.into();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("ListFiles({:?})", path));
        let expanded = p.expand(&path);
        p.tracef(format_args!("=> ListFiles({:?})", expanded));

        let meta = match fs::metadata(&expanded) {
            Ok(meta) => meta,
            Err(err) => return ExecStatus::failed(err),
        };

        if !meta.is_dir() {
            p.write_stdout_line(&expanded);
            return ExecStatus::ok();
        }

        let entries = match fs::read_dir(&expanded) {
            Ok(entries) => entries,
            Err(err) => return ExecStatus::failed(err),
        };
        let mut names = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => names.push(entry.path().display().to_string()),
                Err(err) => return ExecStatus::failed(err),
            }
        }
        names.sort();
        for name in names {
            p.write_stdout_line(&name);
        }
        ExecStatus::ok()
    })
}

/// Finish with the given status code, like `return N` in a shell
/// function.
pub fn return_status(code: i32) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("Return({})", code));
        ExecStatus::code(code)
    })
}

/// Run an operating system command, wiring the pipe's channels to it.
///
/// Remaining stdin is fed to the process; its stdout and stderr are
/// copied into the pipe, and its exit code becomes the step's status.
pub fn exec_external<S: Into<String>>(args: Vec<S>) -> SequenceStep {
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("Exec({:?})", args));
        let expanded: Vec<String> = args.iter().map(|a| p.expand(a)).collect();
        p.tracef(format_args!("=> Exec({:?})", expanded));

        let Some((program, rest)) = expanded.split_first() else {
            return ExecStatus::failed(PipeError::Io(
                "no command given".to_string(),
            ));
        };

        match spawn_and_wait(p, program, rest) {
            Ok(status) => status,
            Err(err) => ExecStatus::failed(err),
        }
    })
}

fn spawn_and_wait(
    p: &mut Pipe,
    program: &str,
    args: &[String],
) -> Result<ExecStatus, PipeError> {
    let mut child = OsCommand::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        let input = p.stdin.take_remaining();
        stdin.write_all(input.as_bytes())?;
        // closes the child's stdin so it can finish reading
        drop(stdin);
    }

    let output = child.wait_with_output()?;
    p.write_stdout(&String::from_utf8_lossy(&output.stdout));
    p.write_stderr(&String::from_utf8_lossy(&output.stderr));

    // a None exit code means the process was killed by a signal
    let code = output.status.code().unwrap_or(STATUS_NOT_OKAY);
    Ok(ExecStatus::code(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Sequence;

    #[test]
    fn echo_appends_a_newline_when_missing() {
        let mut seq = Sequence::pipeline(vec![echo("hello world")]);
        assert_eq!(seq.exec().string(), "hello world\n");
    }

    #[test]
    fn echo_keeps_an_existing_newline() {
        let mut seq = Sequence::pipeline(vec![echo("hello world\n")]);
        assert_eq!(seq.exec().string(), "hello world\n");
    }

    #[test]
    fn echo_expands_variables() {
        let mut seq = Sequence::pipeline(vec![echo("$1, $2!")]);
        assert_eq!(seq.exec_params(&["hello", "world"]).string(), "hello, world!\n");
    }

    #[test]
    fn echo_to_stderr_leaves_stdout_empty() {
        let mut seq = Sequence::pipeline(vec![echo_to_stderr("oops")]);
        seq.exec();
        assert_eq!(seq.string(), "");
        assert_eq!(seq.stderr_string(), "oops\n");
    }

    #[test]
    fn echo_args_writes_one_param_per_line() {
        let mut seq = Sequence::pipeline(vec![echo_args()]);
        assert_eq!(seq.exec_params(&["one", "two"]).string(), "one\ntwo\n");
    }

    #[test]
    fn echo_args_with_no_params_writes_nothing() {
        let mut seq = Sequence::pipeline(vec![echo_args()]);
        assert_eq!(seq.exec().string(), "");
    }

    #[test]
    fn echo_slice_writes_each_entry_as_a_line() {
        let mut seq = Sequence::pipeline(vec![echo_slice(vec!["a", "b", "c"])]);
        assert_eq!(seq.exec().string(), "a\nb\nc\n");
    }

    #[test]
    fn cat_file_copies_the_file_contents() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "line one").unwrap();
        writeln!(file, "line two").unwrap();

        let mut seq =
            Sequence::pipeline(vec![cat_file(file.path().display().to_string())]);
        assert_eq!(seq.exec().string(), "line one\nline two\n");
    }

    #[test]
    fn cat_file_reports_a_missing_file() {
        let mut seq = Sequence::pipeline(vec![cat_file("/does/not/exist")]);
        seq.exec();
        assert!(!seq.okay());
        assert!(matches!(seq.error(), Some(PipeError::Io(_))));
    }

    #[test]
    fn list_files_lists_a_folder_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();

        let mut seq =
            Sequence::pipeline(vec![list_files(dir.path().display().to_string())]);
        seq.exec();
        let lines = seq.strings();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("a.txt"));
        assert!(lines[1].ends_with("b.txt"));
    }

    #[test]
    fn list_files_lists_a_single_file_as_itself() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().display().to_string();
        let mut seq = Sequence::pipeline(vec![list_files(path.clone())]);
        assert_eq!(seq.exec().trimmed_string(), path);
    }

    #[test]
    fn return_status_sets_the_code() {
        let mut seq = Sequence::pipeline(vec![return_status(100)]);
        seq.exec();
        assert_eq!(seq.status_code(), 100);
        assert!(seq.error().is_some());
    }

    #[test]
    fn return_zero_is_success() {
        let mut seq = Sequence::pipeline(vec![return_status(0)]);
        assert!(seq.exec().okay());
    }

    #[cfg(unix)]
    #[test]
    fn exec_external_captures_output_and_status() {
        let mut seq = Sequence::pipeline(vec![exec_external(vec!["true"])]);
        assert!(seq.exec().okay());

        let mut seq = Sequence::pipeline(vec![exec_external(vec!["false"])]);
        seq.exec();
        assert_eq!(seq.status_code(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn exec_external_feeds_stdin_to_the_process() {
        let mut seq = Sequence::pipeline(vec![
            echo("via the pipe"),
            exec_external(vec!["cat"]),
        ]);
        assert_eq!(seq.exec().string(), "via the pipe\n");
    }

    #[test]
    fn exec_external_with_no_args_fails() {
        let mut seq = Sequence::pipeline(vec![exec_external(Vec::<String>::new())]);
        seq.exec();
        assert!(!seq.okay());
    }
}
