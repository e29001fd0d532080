//! Test builtins: predicates for use with `if_then` / `if_else`.
//!
//! Each one expands its argument and succeeds or fails like the UNIX
//! `test` command: the outcome is the status code, and no output is
//! written.

use std::fs;

use crate::error::{ExecStatus, STATUS_NOT_OKAY};
use crate::pipe::Pipe;
use crate::step::SequenceStep;

/// Succeed if the expanded input is the empty string, like `test -z`.
pub fn test_empty(input: impl Into<String>) -> SequenceStep {
    let input = input.into();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("TestEmpty({:?})", input));
        let expanded = p.expand(&input);
        p.tracef(format_args!("=> TestEmpty({:?})", expanded));

        if expanded.is_empty() {
            ExecStatus::ok()
        } else {
            ExecStatus::code(STATUS_NOT_OKAY)
        }
    })
}

/// Succeed if the expanded input is not empty, like `test -n`.
pub fn test_not_empty(input: impl Into<String>) -> SequenceStep {
    let input = input.into();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("TestNotEmpty({:?})", input));
        let expanded = p.expand(&input);
        p.tracef(format_args!("=> TestNotEmpty({:?})", expanded));

        if expanded.is_empty() {
            ExecStatus::code(STATUS_NOT_OKAY)
        } else {
            ExecStatus::ok()
        }
    })
}

/// Succeed if the expanded path exists, like `test -e`.
pub fn test_filepath_exists(path: impl Into<String>) -> SequenceStep {
    let path = path.into();
    SequenceStep::new(move |p: &mut Pipe| {
        p.tracef(format_args!("TestFilepathExists({:?})", path));
        let expanded = p.expand(&path);
        p.tracef(format_args!("=> TestFilepathExists({:?})", expanded));

        match fs::metadata(&expanded) {
            Ok(_) => ExecStatus::ok(),
            Err(err) => ExecStatus::failed(err),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::sources::echo;
    use crate::logic::if_else;
    use crate::sequence::Sequence;

    #[test]
    fn test_empty_succeeds_on_an_empty_string() {
        let mut seq = Sequence::pipeline(vec![test_empty("")]);
        assert!(seq.exec().okay());
    }

    #[test]
    fn test_empty_fails_on_a_non_empty_string() {
        let mut seq = Sequence::pipeline(vec![test_empty("something")]);
        assert!(!seq.exec().okay());
    }

    #[test]
    fn test_empty_checks_the_expanded_value() {
        // $1 is unset, so the expansion is empty
        let mut seq = Sequence::pipeline(vec![test_empty("$1")]);
        assert!(seq.exec().okay());
        assert!(!seq.exec_params(&["bound"]).okay());
    }

    #[test]
    fn test_not_empty_is_the_dual() {
        let mut seq = Sequence::pipeline(vec![test_not_empty("something")]);
        assert!(seq.exec().okay());

        let mut seq = Sequence::pipeline(vec![test_not_empty("")]);
        assert!(!seq.exec().okay());
    }

    #[test]
    fn test_filepath_exists_checks_the_filesystem() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().display().to_string();

        let mut seq = Sequence::pipeline(vec![test_filepath_exists(path)]);
        assert!(seq.exec().okay());

        let mut seq = Sequence::pipeline(vec![test_filepath_exists("/does/not/exist")]);
        assert!(!seq.exec().okay());
    }

    #[test]
    fn predicates_drive_if_else() {
        let mut seq = Sequence::list(vec![if_else(
            Sequence::pipeline(vec![test_empty("$1")]),
            Sequence::pipeline(vec![echo("no argument")]),
            Sequence::pipeline(vec![echo("got $1")]),
        )]);
        assert_eq!(seq.exec().string(), "no argument\n");
        assert_eq!(seq.exec_params(&["hello"]).string(), "got hello\n");
    }
}
