//! Shell options: scoped trace configuration.
//!
//! The engine's debugging output mimics `bash -x`: each traced event is a
//! line starting with `+ `, written to an injectable sink. Unlike a global
//! flag, a [`Shopt`] is an explicit value owned by a sequence and copied
//! into every pipe it creates, so tracing can be turned on for one
//! sequence without affecting any other.
//!
//! Every trace line is also emitted through the `tracing` crate at TRACE
//! level, so a subscriber picks the same events up without a sink.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

/// A shared trace sink.
pub type TraceSink = Rc<RefCell<dyn Write>>;

/// Per-sequence shell options.
///
/// Clones share the underlying sink, which is how a sequence hands its
/// trace configuration down to its pipe and to nested sequences.
#[derive(Clone, Default)]
pub struct Shopt {
    trace: Option<TraceSink>,
}

impl Shopt {
    /// Create options with tracing disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send trace output to the given sink.
    pub fn enable_trace(&mut self, sink: TraceSink) {
        self.trace = Some(sink);
    }

    /// Stop producing trace output.
    pub fn disable_trace(&mut self) {
        self.trace = None;
    }

    /// True if a trace sink is currently installed.
    pub fn is_trace_enabled(&self) -> bool {
        self.trace.is_some()
    }

    /// Write one trace line, prefixed with `+ `.
    pub fn tracef(&self, args: fmt::Arguments<'_>) {
        tracing::trace!("{}", args);
        if let Some(sink) = &self.trace {
            let _ = writeln!(sink.borrow_mut(), "+ {}", args);
        }
    }

    /// Trace a line written to some output destination, e.g.
    /// `+ p.Stdout> hello world`.
    pub fn trace_output(&self, dest: &str, line: &str) {
        if self.trace.is_some() {
            self.tracef(format_args!("{}> {}", dest, line));
        } else {
            tracing::trace!("{}> {}", dest, line);
        }
    }
}

impl fmt::Debug for Shopt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shopt")
            .field("trace_enabled", &self.is_trace_enabled())
            .finish()
    }
}
