//! Sequence steps and their setup/teardown options.
//!
//! A [`SequenceStep`] is one unit of work in a sequence: a command plus
//! zero or more [`StepOption`]s. Options wrap the command in paired
//! setup/teardown actions, which is how per-step redirection works:
//! setup diverts an output stream, teardown restores it.

use crate::error::{ExecStatus, PipeError};
use crate::pipe::{noop, Command, Pipe};

/// A paired setup/teardown action applied around one step.
///
/// Setup runs before the step's command. Teardown runs after it, even
/// when setup or the command failed, so partially-applied setup is
/// always unwound.
pub struct StepOption {
    setup: Box<dyn Command>,
    teardown: Box<dyn Command>,
}

impl StepOption {
    /// Create an option from a setup and a teardown command.
    pub fn new(setup: impl Command + 'static, teardown: impl Command + 'static) -> Self {
        Self {
            setup: Box::new(setup),
            teardown: Box::new(teardown),
        }
    }

    /// An option with only a setup phase; teardown is a no-op.
    pub fn setup_only(setup: impl Command + 'static) -> Self {
        Self::new(setup, noop)
    }

    /// An option with only a teardown phase; setup is a no-op.
    pub fn teardown_only(teardown: impl Command + 'static) -> Self {
        Self::new(noop, teardown)
    }
}

/// Run each option's setup command in order, through the pipe.
///
/// Stops at the first failure and returns it; later setups do not run.
/// The caller is still expected to apply the teardown phases so that
/// whatever setup did manage to happen gets unwound.
pub fn apply_setup_phases(pipe: &mut Pipe, opts: &mut [StepOption]) -> ExecStatus {
    for opt in opts.iter_mut() {
        pipe.run_command(opt.setup.as_mut());
        if let Some(err) = pipe.error() {
            return ExecStatus {
                code: pipe.status_code(),
                err: Some(err.clone()),
            };
        }
    }
    ExecStatus::ok()
}

/// Run each option's teardown command in reverse order.
///
/// Teardowns run directly, not through [`Pipe::run_command`], so cleanup
/// cannot clobber the status the step recorded. A failing teardown does
/// not stop the ones that follow: every teardown gets its chance to run.
pub fn apply_teardown_phases(pipe: &mut Pipe, opts: &mut [StepOption]) {
    for opt in opts.iter_mut().rev() {
        let _ = opt.teardown.run(pipe);
    }
}

/// One runnable step: a command plus the options applied around it.
pub struct SequenceStep {
    command: Box<dyn Command>,
    opts: Vec<StepOption>,
}

impl SequenceStep {
    /// Create a step from a command (a closure or any [`Command`] value).
    pub fn new(command: impl Command + 'static) -> Self {
        Self {
            command: Box::new(command),
            opts: Vec::new(),
        }
    }

    /// Attach a setup/teardown option to this step.
    pub fn with_option(mut self, opt: StepOption) -> Self {
        self.opts.push(opt);
        self
    }

    /// Run this step against the given pipe.
    ///
    /// Setup phases run first; if any of them fails the command itself is
    /// skipped. Teardown phases always run afterwards, in reverse order.
    /// Returns the pipe's resulting `(code, error)` pair.
    pub fn run_step(&mut self, pipe: &mut Pipe) -> (i32, Option<PipeError>) {
        let setup = apply_setup_phases(pipe, &mut self.opts);

        if setup.is_ok() {
            pipe.run_command(self.command.as_mut());
        }

        apply_teardown_phases(pipe, &mut self.opts);

        pipe.status_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{STATUS_NOT_OKAY, STATUS_OKAY};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_option(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> StepOption {
        let setup_log = log.clone();
        let teardown_log = log.clone();
        StepOption::new(
            move |_p: &mut Pipe| {
                setup_log.borrow_mut().push(match tag {
                    "a" => "setup a",
                    _ => "setup b",
                });
                ExecStatus::ok()
            },
            move |_p: &mut Pipe| {
                teardown_log.borrow_mut().push(match tag {
                    "a" => "teardown a",
                    _ => "teardown b",
                });
                ExecStatus::ok()
            },
        )
    }

    #[test]
    fn runs_setup_command_teardown_in_order() {
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let cmd_log = log.clone();

        let mut step = SequenceStep::new(move |_p: &mut Pipe| {
            cmd_log.borrow_mut().push("command");
            ExecStatus::ok()
        })
        .with_option(recording_option(&log, "a"))
        .with_option(recording_option(&log, "b"));

        let mut pipe = Pipe::new();
        let (code, err) = step.run_step(&mut pipe);

        assert_eq!(code, STATUS_OKAY);
        assert!(err.is_none());
        // teardown runs in reverse order of setup
        assert_eq!(
            *log.borrow(),
            vec!["setup a", "setup b", "command", "teardown b", "teardown a"]
        );
    }

    #[test]
    fn setup_failure_skips_the_command_but_not_teardown() {
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let cmd_log = log.clone();
        let teardown_log = log.clone();

        let failing_opt = StepOption::new(
            |_p: &mut Pipe| ExecStatus::code(STATUS_NOT_OKAY),
            move |_p: &mut Pipe| {
                teardown_log.borrow_mut().push("teardown");
                ExecStatus::ok()
            },
        );

        let mut step = SequenceStep::new(move |_p: &mut Pipe| {
            cmd_log.borrow_mut().push("command");
            ExecStatus::ok()
        })
        .with_option(failing_opt);

        let mut pipe = Pipe::new();
        let (code, err) = step.run_step(&mut pipe);

        assert_eq!(code, STATUS_NOT_OKAY);
        assert!(err.is_some());
        assert_eq!(*log.borrow(), vec!["teardown"]);
    }

    #[test]
    fn later_setups_do_not_run_after_a_failure() {
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let first_log = log.clone();
        let second_log = log.clone();

        let first = StepOption::setup_only(move |_p: &mut Pipe| {
            first_log.borrow_mut().push("first setup");
            ExecStatus::code(STATUS_NOT_OKAY)
        });
        let second = StepOption::setup_only(move |_p: &mut Pipe| {
            second_log.borrow_mut().push("second setup");
            ExecStatus::ok()
        });

        let mut pipe = Pipe::new();
        apply_setup_phases(&mut pipe, &mut [first, second]);

        assert_eq!(*log.borrow(), vec!["first setup"]);
    }

    #[test]
    fn failing_teardown_does_not_stop_the_others() {
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let first_log = log.clone();
        let second_log = log.clone();

        let first = StepOption::teardown_only(move |_p: &mut Pipe| {
            first_log.borrow_mut().push("first teardown");
            ExecStatus::ok()
        });
        let second = StepOption::teardown_only(move |_p: &mut Pipe| {
            second_log.borrow_mut().push("second teardown");
            ExecStatus::code(STATUS_NOT_OKAY)
        });

        let mut pipe = Pipe::new();
        apply_teardown_phases(&mut pipe, &mut [first, second]);

        // reverse order, and the failure in "second" does not stop "first"
        assert_eq!(*log.borrow(), vec!["second teardown", "first teardown"]);
        // teardown bypasses run_command, so the pipe status is untouched
        assert!(pipe.okay());
    }

    #[test]
    fn teardown_cannot_clobber_the_recorded_status() {
        let opt = StepOption::teardown_only(|_p: &mut Pipe| ExecStatus::code(99));
        let mut step =
            SequenceStep::new(|_p: &mut Pipe| ExecStatus::code(3)).with_option(opt);

        let mut pipe = Pipe::new();
        let (code, _err) = step.run_step(&mut pipe);
        assert_eq!(code, 3);
    }
}
