//! Sequences of steps and the controllers that drive them.
//!
//! A [`Sequence`] owns a list of [`SequenceStep`]s and a [`Controller`]
//! that decides how output and failures flow between them:
//!
//! * [`Controller::Pipeline`] emulates `cmd1 | cmd2 | ...`: each step's
//!   stdout becomes the next step's stdin, and the first failure stops
//!   the run.
//! * [`Controller::List`] emulates `cmd1 ; cmd2 ; ...`: every step runs
//!   against the same pipe, regardless of earlier failures.
//!
//! Every call to [`Sequence::exec`] builds a fresh [`Pipe`] over the
//! sequence's local variables, so a sequence can be executed repeatedly
//! and still start from clean channels each time.

use std::io::Write;

use crate::env::{Env, Frame};
use crate::error::PipeError;
use crate::params::set_params_in_env;
use crate::pipe::{Pipe, PipeContext};
use crate::shopt::Shopt;
use crate::step::SequenceStep;

/// How a sequence moves data and failures between its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    /// Shell `|` semantics: chained channels, stop on first failure.
    Pipeline,
    /// Shell `;` semantics: shared pipe, keep going after failures.
    List,
}

/// An executable list of steps.
pub struct Sequence {
    pipe: Pipe,
    steps: Vec<SequenceStep>,
    controller: Controller,
    local_vars: Frame,
    shopt: Shopt,
}

impl Sequence {
    /// Build a pipeline: steps chained stdout-to-stdin, stopping at the
    /// first failure.
    pub fn pipeline(steps: Vec<SequenceStep>) -> Self {
        Self::with_controller(Controller::Pipeline, steps)
    }

    /// Build a list: steps sharing one pipe, all of them always run.
    pub fn list(steps: Vec<SequenceStep>) -> Self {
        Self::with_controller(Controller::List, steps)
    }

    fn with_controller(controller: Controller, steps: Vec<SequenceStep>) -> Self {
        let local_vars = Frame::default();
        {
            let program = std::env::args().next().unwrap_or_default();
            let mut vars = local_vars.borrow_mut();
            vars.insert("$".to_string(), std::process::id().to_string());
            vars.insert("0".to_string(), program.clone());
            vars.insert("-".to_string(), program);
        }
        let mut seq = Self {
            pipe: Pipe::new(),
            steps,
            controller,
            local_vars,
            shopt: Shopt::new(),
        };
        seq.new_pipe();
        seq
    }

    // ------------------------------------------------------------------
    // configuration

    /// The sequence's shell options, for enabling or disabling tracing.
    pub fn shopt_mut(&mut self) -> &mut Shopt {
        &mut self.shopt
    }

    pub(crate) fn set_shopt(&mut self, shopt: Shopt) {
        self.shopt = shopt;
    }

    /// Bind positional parameters (`$1..$N`, `$#`, `$*`, `$@`) into the
    /// sequence's local variables. Replaces any previous binding.
    pub fn set_params<S: AsRef<str>>(&mut self, params: &[S]) -> &mut Self {
        let env = Env::overlay(self.local_vars.clone());
        set_params_in_env(&env, params);
        self
    }

    // ------------------------------------------------------------------
    // execution

    /// Run the sequence from a fresh pipe.
    ///
    /// The outcome is left on the sequence: inspect it with
    /// [`Sequence::okay`], [`Sequence::string`] and friends.
    pub fn exec(&mut self) -> &mut Self {
        self.new_pipe();
        self.run_controller();
        self
    }

    /// Bind positional parameters, then run the sequence.
    pub fn exec_params<S: AsRef<str>>(&mut self, params: &[S]) -> &mut Self {
        self.set_params(params);
        self.exec()
    }

    /// Replace the sequence's pipe with a fresh one that overlays the
    /// sequence's local variables and carries its shell options.
    pub(crate) fn new_pipe(&mut self) {
        let mut pipe = Pipe::with_env(Env::overlay(self.local_vars.clone()));
        pipe.set_shopt(self.shopt.clone());
        self.pipe = pipe;
    }

    pub(crate) fn pipe_mut(&mut self) -> &mut Pipe {
        &mut self.pipe
    }

    /// Drive the steps using the sequence's controller. Assumes the pipe
    /// has already been prepared.
    pub(crate) fn run_controller(&mut self) {
        match self.controller {
            Controller::Pipeline => self.run_pipeline_controller(),
            Controller::List => self.run_list_controller(),
        }
    }

    fn run_pipeline_controller(&mut self) {
        let Self { pipe, steps, .. } = self;
        pipe.set_context(PipeContext::Pipeline);
        for (i, step) in steps.iter_mut().enumerate() {
            // rotate channels: last step's stdout becomes this stdin
            if i > 0 {
                let contents = pipe.stdout().string().to_string();
                pipe.set_stdin_from_string(contents);
                pipe.new_stdout();
                pipe.new_stderr();
            }

            let (code, err) = step.run_step(pipe);
            if let Some(err) = err {
                pipe.tracef(format_args!("status code: {}", code));
                pipe.tracef(format_args!("error: {}", err));
                return;
            }
        }
    }

    fn run_list_controller(&mut self) {
        let Self { pipe, steps, .. } = self;
        pipe.set_context(PipeContext::List);
        for step in steps.iter_mut() {
            let (code, err) = step.run_step(pipe);
            if let Some(err) = err {
                pipe.tracef(format_args!("status code: {}", code));
                pipe.tracef(format_args!("error: {}", err));
            }
        }
    }

    // ------------------------------------------------------------------
    // results

    /// The stdout produced by the last run.
    pub fn string(&self) -> String {
        self.pipe.stdout().string().to_string()
    }

    /// The last run's stdout with leading and trailing whitespace removed.
    pub fn trimmed_string(&self) -> String {
        self.pipe.stdout().trimmed_string().to_string()
    }

    /// The last run's stdout, split into lines.
    pub fn strings(&self) -> Vec<String> {
        self.pipe.stdout().strings()
    }

    /// The last run's stdout as raw bytes.
    pub fn bytes(&self) -> Vec<u8> {
        self.pipe.stdout().bytes().to_vec()
    }

    /// The last run's stdout parsed as a single integer.
    pub fn parse_int(&self) -> Result<i64, PipeError> {
        self.pipe.stdout().parse_int()
    }

    /// The stderr produced by the last run.
    pub fn stderr_string(&self) -> String {
        self.pipe.stderr().string().to_string()
    }

    /// The status code recorded by the last run.
    pub fn status_code(&self) -> i32 {
        self.pipe.status_code()
    }

    /// The error recorded by the last run, if any.
    pub fn error(&self) -> Option<&PipeError> {
        self.pipe.error()
    }

    /// The last run's outcome as a `(code, error)` pair.
    pub fn status_error(&self) -> (i32, Option<PipeError>) {
        self.pipe.status_error()
    }

    /// True if the last run succeeded (or the sequence has not run yet).
    pub fn okay(&self) -> bool {
        self.pipe.okay()
    }

    /// Copy the last run's stdout and stderr to the process's own
    /// stdout and stderr.
    pub fn flush(&self) {
        let _ = std::io::stdout().write_all(self.pipe.stdout().bytes());
        let _ = std::io::stderr().write_all(self.pipe.stderr().bytes());
    }
}

impl Default for Sequence {
    /// An empty list; executing it succeeds and produces no output.
    fn default() -> Self {
        Self::list(Vec::new())
    }
}
