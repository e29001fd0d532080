//! The pipe: per-run I/O channels, environment, and status.
//!
//! A [`Pipe`] is what every command operates on. It owns three channels
//! (stdin, stdout, stderr), an [`Env`], LIFO redirect stacks for both
//! output streams, and the status recorded by the last command. A fresh
//! pipe is created every time a sequence executes; nothing survives from
//! one run to the next.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::channel::Channel;
use crate::env::Env;
use crate::error::{ExecStatus, PipeError, STATUS_NOT_OKAY, STATUS_OKAY};
use crate::shopt::Shopt;

/// One unit of work: anything that can run against a pipe.
///
/// Status codes follow UNIX convention: 0 is success, anything else is
/// failure. A command should never report a non-nil error with code 0;
/// [`Pipe::run_command`] normalizes that case regardless.
pub trait Command {
    /// Run the command against the given pipe.
    fn run(&mut self, pipe: &mut Pipe) -> ExecStatus;
}

impl<F> Command for F
where
    F: FnMut(&mut Pipe) -> ExecStatus,
{
    fn run(&mut self, pipe: &mut Pipe) -> ExecStatus {
        self(pipe)
    }
}

/// A command that does nothing and reports success.
pub fn noop(_pipe: &mut Pipe) -> ExecStatus {
    ExecStatus::ok()
}

/// Where writes to an output stream currently land.
///
/// Redirection installs a new target and pushes the old one onto the
/// stream's redirect stack; un-redirection pops it back.
pub enum OutputTarget {
    /// The pipe's own stdout buffer.
    Stdout,
    /// The pipe's own stderr buffer.
    Stderr,
    /// A caller-supplied channel, e.g. for capturing output.
    Channel(Rc<RefCell<Channel>>),
    /// An arbitrary writer, e.g. an open file. Dropped (and therefore
    /// closed) when popped off the redirect stack.
    Writer(Box<dyn Write>),
    /// Discard everything, like `/dev/null`.
    Null,
}

impl std::fmt::Debug for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "Stdout"),
            OutputTarget::Stderr => write!(f, "Stderr"),
            OutputTarget::Channel(_) => write!(f, "Channel(..)"),
            OutputTarget::Writer(_) => write!(f, "Writer(..)"),
            OutputTarget::Null => write!(f, "Null"),
        }
    }
}

/// Whether a pipe is being driven with pipeline or list semantics.
///
/// Sinks care about the difference: in a pipeline their input arrives on
/// stdin, but in a list the steps share one pipe, so the output written
/// so far sits in the pipe's own stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipeContext {
    /// Steps are chained; input arrives on stdin.
    Pipeline,
    /// Steps share the pipe; accumulated output sits in stdout.
    #[default]
    List,
}

/// The per-run container every step reads from and writes to.
#[derive(Debug)]
pub struct Pipe {
    /// Input channel, read line by line by filters.
    pub stdin: Channel,
    stdout: Channel,
    stderr: Channel,
    stdout_target: OutputTarget,
    stderr_target: OutputTarget,
    stdout_stack: Vec<OutputTarget>,
    stderr_stack: Vec<OutputTarget>,
    env: Env,
    status: ExecStatus,
    shopt: Shopt,
    context: PipeContext,
}

impl Pipe {
    /// Create an empty pipe with its own environment.
    pub fn new() -> Self {
        Self::with_env(Env::new())
    }

    /// Create an empty pipe that uses the given environment.
    pub fn with_env(env: Env) -> Self {
        Self {
            stdin: Channel::new(),
            stdout: Channel::new(),
            stderr: Channel::new(),
            stdout_target: OutputTarget::Stdout,
            stderr_target: OutputTarget::Stderr,
            stdout_stack: Vec::new(),
            stderr_stack: Vec::new(),
            env,
            status: ExecStatus::ok(),
            shopt: Shopt::new(),
            context: PipeContext::default(),
        }
    }

    /// How this pipe is currently being driven.
    pub fn context(&self) -> PipeContext {
        self.context
    }

    pub(crate) fn set_context(&mut self, context: PipeContext) {
        self.context = context;
    }

    // ------------------------------------------------------------------
    // running commands

    /// Run a command, recording its status on the pipe.
    ///
    /// The recorded status is normalized so that code and error are never
    /// inconsistent: an error with code 0 becomes code 1, and a non-zero
    /// code with no error gets a synthesized
    /// [`PipeError::NonZeroStatusCode`].
    pub fn run_command(&mut self, cmd: &mut dyn Command) {
        let mut status = cmd.run(self);
        if status.err.is_some() && status.code == STATUS_OKAY {
            status.code = STATUS_NOT_OKAY;
        }
        if status.code != STATUS_OKAY && status.err.is_none() {
            status.err = Some(PipeError::NonZeroStatusCode(status.code));
        }
        self.status = status;
    }

    /// The status code recorded by the last command.
    pub fn status_code(&self) -> i32 {
        self.status.code
    }

    /// The error recorded by the last command, if any.
    pub fn error(&self) -> Option<&PipeError> {
        self.status.err.as_ref()
    }

    /// The recorded status as a `(code, error)` pair.
    pub fn status_error(&self) -> (i32, Option<PipeError>) {
        self.status.as_pair()
    }

    /// True if the last command succeeded (or nothing has run yet).
    pub fn okay(&self) -> bool {
        self.status.is_ok()
    }

    // ------------------------------------------------------------------
    // output streams and redirection

    /// Write text to wherever stdout currently points.
    pub fn write_stdout(&mut self, text: &str) {
        match &mut self.stdout_target {
            OutputTarget::Stdout => self.stdout.write_str(text),
            OutputTarget::Stderr => self.stderr.write_str(text),
            OutputTarget::Channel(ch) => ch.borrow_mut().write_str(text),
            OutputTarget::Writer(w) => {
                let _ = w.write_all(text.as_bytes());
            }
            OutputTarget::Null => {}
        }
    }

    /// Write one line (newline appended) to the current stdout target.
    pub fn write_stdout_line(&mut self, line: &str) {
        self.write_stdout(line);
        self.write_stdout("\n");
    }

    /// Write text to wherever stderr currently points.
    pub fn write_stderr(&mut self, text: &str) {
        match &mut self.stderr_target {
            OutputTarget::Stdout => self.stdout.write_str(text),
            OutputTarget::Stderr => self.stderr.write_str(text),
            OutputTarget::Channel(ch) => ch.borrow_mut().write_str(text),
            OutputTarget::Writer(w) => {
                let _ = w.write_all(text.as_bytes());
            }
            OutputTarget::Null => {}
        }
    }

    /// Write one line (newline appended) to the current stderr target.
    pub fn write_stderr_line(&mut self, line: &str) {
        self.write_stderr(line);
        self.write_stderr("\n");
    }

    /// Redirect stdout: push the current target and install a new one.
    pub fn push_stdout(&mut self, target: OutputTarget) {
        let old = std::mem::replace(&mut self.stdout_target, target);
        self.stdout_stack.push(old);
    }

    /// Undo the most recent stdout redirect, discarding the installed
    /// target. A no-op if nothing was pushed.
    pub fn pop_stdout(&mut self) {
        if let Some(target) = self.stdout_stack.pop() {
            self.stdout_target = target;
        }
    }

    /// Redirect stderr: push the current target and install a new one.
    pub fn push_stderr(&mut self, target: OutputTarget) {
        let old = std::mem::replace(&mut self.stderr_target, target);
        self.stderr_stack.push(old);
    }

    /// Undo the most recent stderr redirect. A no-op if nothing was
    /// pushed.
    pub fn pop_stderr(&mut self) {
        if let Some(target) = self.stderr_stack.pop() {
            self.stderr_target = target;
        }
    }

    /// The pipe's own stdout buffer, regardless of redirection.
    pub fn stdout(&self) -> &Channel {
        &self.stdout
    }

    /// The pipe's own stderr buffer, regardless of redirection.
    pub fn stderr(&self) -> &Channel {
        &self.stderr
    }

    /// Copy all remaining stdin lines to stdout, making a step behave as
    /// a pass-through.
    pub fn drain_stdin_to_stdout(&mut self) {
        while let Some(line) = self.stdin.read_line() {
            self.write_stdout_line(&line);
        }
    }

    /// Read the next line of input for a sink: stdin inside a pipeline,
    /// the pipe's accumulated stdout inside a list.
    pub fn read_sink_line(&mut self) -> Option<String> {
        match self.context {
            PipeContext::Pipeline => self.stdin.read_line(),
            PipeContext::List => self.stdout.read_line(),
        }
    }

    // ------------------------------------------------------------------
    // channel rotation (used by the pipeline controller)

    /// Replace stdin with the given contents.
    pub fn set_stdin_from_string(&mut self, contents: impl Into<String>) {
        self.stdin = Channel::from_string(contents);
    }

    /// Install a fresh, empty stdout buffer.
    pub fn new_stdout(&mut self) {
        self.stdout = Channel::new();
    }

    /// Install a fresh, empty stderr buffer.
    pub fn new_stderr(&mut self) {
        self.stderr = Channel::new();
    }

    // ------------------------------------------------------------------
    // environment

    /// The pipe's environment.
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Expand `$NAME` / `${NAME}` references using the pipe's environment.
    pub fn expand(&self, template: &str) -> String {
        self.env.expand(template)
    }

    /// Set a variable in the environment's innermost scope.
    pub fn setvar(&self, name: impl Into<String>, value: impl Into<String>) {
        self.env.set(name, value);
    }

    /// Read a variable; unset variables read as `""`.
    pub fn getvar(&self, name: &str) -> String {
        self.env.get(name)
    }

    // ------------------------------------------------------------------
    // tracing

    /// The pipe's shell options (trace configuration).
    pub fn shopt(&self) -> &Shopt {
        &self.shopt
    }

    pub(crate) fn set_shopt(&mut self, shopt: Shopt) {
        self.shopt = shopt;
    }

    /// Write one `+ `-prefixed trace line.
    pub fn tracef(&self, args: std::fmt::Arguments<'_>) {
        self.shopt.tracef(args);
    }

    /// Trace a line as it is written to stdout (`+ p.Stdout> ...`).
    pub fn trace_stdout_line(&self, line: &str) {
        self.shopt.trace_output("p.Stdout", line);
    }

    /// Trace a line as it is written to stderr (`+ p.Stderr> ...`).
    pub fn trace_stderr_line(&self, line: &str) {
        self.shopt.trace_output("p.Stderr", line);
    }
}

impl Default for Pipe {
    fn default() -> Self {
        Self::new()
    }
}
