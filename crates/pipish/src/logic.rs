//! Logic combinators: `&&`, `||` and `if` emulation.
//!
//! Each combinator wraps a nested [`Sequence`] in a [`SequenceStep`], so
//! sequences compose: a pipeline can appear as one step of a list, guarded
//! by the outcome of the steps before it.
//!
//! A nested sequence starts from an empty stdin. It inherits the calling
//! pipe's positional parameters and shell options, and when it runs, its
//! stdout and stderr are copied back into the calling pipe.

use crate::error::ExecStatus;
use crate::params::params_from_env;
use crate::pipe::Pipe;
use crate::sequence::Sequence;
use crate::step::SequenceStep;

/// Execute the sequence only if the previous command succeeded.
///
/// Emulates `list1 && command`. When the previous command failed, the
/// sequence is skipped and the failure is passed through untouched.
pub fn and_then(mut seq: Sequence) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        let (code, err) = p.status_error();
        if let Some(err) = err {
            p.tracef(format_args!("And(): not executing the given sequence"));

            // keep the output of the sequence so far
            p.drain_stdin_to_stdout();

            return ExecStatus {
                code,
                err: Some(err),
            };
        }

        p.tracef(format_args!("And(): executing the given sequence"));
        exec_nested(&mut seq, p)
    })
}

/// Execute the sequence only if the previous command failed.
///
/// Emulates `list1 || command`. When the previous command succeeded, the
/// sequence is skipped and remaining stdin is passed through to stdout.
pub fn or_else(mut seq: Sequence) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        let (code, err) = p.status_error();
        if err.is_none() {
            p.tracef(format_args!("Or(): not executing the given sequence"));

            // keep the output of the sequence so far
            p.drain_stdin_to_stdout();

            return ExecStatus { code, err };
        }

        p.tracef(format_args!("Or(): executing the given sequence"));
        exec_nested(&mut seq, p)
    })
}

/// Execute the body if (and only if) the expr completes without an error.
///
/// Emulates `if expr ; then body ; fi`. The expr always runs and its
/// output is always copied into the calling pipe; when it fails, its
/// failure becomes the step's outcome.
pub fn if_then(mut expr: Sequence, mut body: Sequence) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        let status = exec_nested(&mut expr, p);
        if status.err.is_some() {
            return status;
        }
        exec_nested(&mut body, p)
    })
}

/// Execute the body if the expr succeeds, otherwise the else-body.
///
/// Emulates `if expr ; then body ; else elseBody ; fi`. Whichever branch
/// runs decides the step's outcome.
pub fn if_else(
    mut expr: Sequence,
    mut body: Sequence,
    mut else_body: Sequence,
) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        let status = exec_nested(&mut expr, p);
        if status.err.is_some() {
            return exec_nested(&mut else_body, p);
        }
        exec_nested(&mut body, p)
    })
}

/// Run a nested sequence with the calling pipe's parameters and shell
/// options, then copy its output back into the calling pipe.
fn exec_nested(seq: &mut Sequence, p: &mut Pipe) -> ExecStatus {
    let params = params_from_env(p.env());
    seq.set_params(&params);
    seq.set_shopt(p.shopt().clone());
    seq.exec();

    p.write_stdout(&seq.string());
    p.write_stderr(&seq.stderr_string());

    let (code, err) = seq.status_error();
    ExecStatus { code, err }
}
