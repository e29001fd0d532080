//! Redirection step options.
//!
//! Each of these returns a [`StepOption`] whose setup pushes a new output
//! target onto the pipe's redirect stack and whose teardown pops it
//! again, so the redirect applies to exactly one step, like `2>&1` on a
//! single command.

use std::cell::RefCell;
use std::fs::OpenOptions;
use std::rc::Rc;

use crate::channel::Channel;
use crate::error::ExecStatus;
use crate::pipe::{OutputTarget, Pipe};
use crate::step::StepOption;

/// Send the step's stdout to stderr, like `1>&2`.
pub fn redirect_stdout_to_stderr() -> StepOption {
    StepOption::new(
        |p: &mut Pipe| {
            p.tracef(format_args!("RedirectStdoutToStderr()"));
            p.push_stdout(OutputTarget::Stderr);
            ExecStatus::ok()
        },
        |p: &mut Pipe| {
            p.pop_stdout();
            ExecStatus::ok()
        },
    )
}

/// Send the step's stderr to stdout, like `2>&1`.
pub fn redirect_stderr_to_stdout() -> StepOption {
    StepOption::new(
        |p: &mut Pipe| {
            p.tracef(format_args!("RedirectStderrToStdout()"));
            p.push_stderr(OutputTarget::Stdout);
            ExecStatus::ok()
        },
        |p: &mut Pipe| {
            p.pop_stderr();
            ExecStatus::ok()
        },
    )
}

/// Discard the step's stdout, like `1>/dev/null`.
pub fn redirect_stdout_to_devnull() -> StepOption {
    StepOption::new(
        |p: &mut Pipe| {
            p.tracef(format_args!("RedirectStdoutToDevNull()"));
            p.push_stdout(OutputTarget::Null);
            ExecStatus::ok()
        },
        |p: &mut Pipe| {
            p.pop_stdout();
            ExecStatus::ok()
        },
    )
}

/// Discard the step's stderr, like `2>/dev/null`.
pub fn redirect_stderr_to_devnull() -> StepOption {
    StepOption::new(
        |p: &mut Pipe| {
            p.tracef(format_args!("RedirectStderrToDevNull()"));
            p.push_stderr(OutputTarget::Null);
            ExecStatus::ok()
        },
        |p: &mut Pipe| {
            p.pop_stderr();
            ExecStatus::ok()
        },
    )
}

/// Capture the step's stdout in a caller-owned channel.
pub fn redirect_stdout_to_channel(ch: Rc<RefCell<Channel>>) -> StepOption {
    let captured = ch.clone();
    StepOption::new(
        move |p: &mut Pipe| {
            p.tracef(format_args!("RedirectStdoutToChannel()"));
            p.push_stdout(OutputTarget::Channel(captured.clone()));
            ExecStatus::ok()
        },
        |p: &mut Pipe| {
            p.pop_stdout();
            ExecStatus::ok()
        },
    )
}

/// Capture the step's stderr in a caller-owned channel.
pub fn redirect_stderr_to_channel(ch: Rc<RefCell<Channel>>) -> StepOption {
    let captured = ch.clone();
    StepOption::new(
        move |p: &mut Pipe| {
            p.tracef(format_args!("RedirectStderrToChannel()"));
            p.push_stderr(OutputTarget::Channel(captured.clone()));
            ExecStatus::ok()
        },
        |p: &mut Pipe| {
            p.pop_stderr();
            ExecStatus::ok()
        },
    )
}

/// Append the step's stdout to a file, like `>> file`.
///
/// The file is opened (and created if needed) during setup; a failure to
/// open it fails the step before its command runs. The file is closed
/// again during teardown.
pub fn append_stdout_to_file(filename: impl Into<String>) -> StepOption {
    let filename = filename.into();
    StepOption::new(
        move |p: &mut Pipe| {
            p.tracef(format_args!("AppendStdoutToFile({:?})", filename));
            let expanded = p.expand(&filename);
            p.tracef(format_args!("=> AppendStdoutToFile({:?})", expanded));

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&expanded);
            match file {
                Ok(file) => {
                    p.push_stdout(OutputTarget::Writer(Box::new(file)));
                    ExecStatus::ok()
                }
                Err(err) => ExecStatus::failed(err),
            }
        },
        |p: &mut Pipe| {
            // dropping the writer closes the file
            p.pop_stdout();
            ExecStatus::ok()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::sources::{echo, echo_to_stderr};
    use crate::sequence::Sequence;

    #[test]
    fn stdout_to_stderr_diverts_one_step() {
        let mut seq = Sequence::pipeline(vec![
            echo("diverted").with_option(redirect_stdout_to_stderr()),
        ]);
        seq.exec();
        assert_eq!(seq.string(), "");
        assert_eq!(seq.stderr_string(), "diverted\n");
    }

    #[test]
    fn stderr_to_stdout_diverts_one_step() {
        let mut seq = Sequence::pipeline(vec![
            echo_to_stderr("diverted").with_option(redirect_stderr_to_stdout()),
        ]);
        seq.exec();
        assert_eq!(seq.string(), "diverted\n");
        assert_eq!(seq.stderr_string(), "");
    }

    #[test]
    fn devnull_discards_output() {
        let mut seq = Sequence::pipeline(vec![
            echo("gone").with_option(redirect_stdout_to_devnull()),
        ]);
        seq.exec();
        assert_eq!(seq.string(), "");
    }

    #[test]
    fn the_redirect_ends_with_the_step() {
        let mut seq = Sequence::list(vec![
            echo("quiet").with_option(redirect_stdout_to_devnull()),
            echo("loud"),
        ]);
        seq.exec();
        assert_eq!(seq.string(), "loud\n");
    }

    #[test]
    fn stdout_to_channel_captures_one_steps_output() {
        let captured = Rc::new(RefCell::new(Channel::new()));
        let mut seq = Sequence::list(vec![
            echo("captured").with_option(redirect_stdout_to_channel(captured.clone())),
            echo("normal"),
        ]);
        seq.exec();
        assert_eq!(captured.borrow().string(), "captured\n");
        assert_eq!(seq.string(), "normal\n");
    }

    #[test]
    fn append_stdout_to_file_appends_one_steps_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt").display().to_string();
        std::fs::write(&path, "existing\n").unwrap();

        let mut seq = Sequence::list(vec![
            echo("appended").with_option(append_stdout_to_file(path.clone())),
        ]);
        assert!(seq.exec().okay());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "existing\nappended\n"
        );
    }

    #[test]
    fn append_stdout_to_file_fails_in_setup_on_a_bad_path() {
        let mut seq = Sequence::list(vec![
            echo("never written").with_option(append_stdout_to_file("/no/such/dir/f")),
        ]);
        seq.exec();
        assert!(!seq.okay());
        assert_eq!(seq.string(), "");
    }
}
