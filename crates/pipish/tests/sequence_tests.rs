//! End-to-end tests for pipelines, lists and combinators.

use pipish::builtins::{
    count_lines, cut_fields, echo, echo_slice, redirect_stdout_to_stderr,
    return_status,
};
use pipish::{and_then, or_else, ExecStatus, Pipe, Sequence, SequenceStep};

fn write_lines(lines: &'static str) -> SequenceStep {
    SequenceStep::new(move |p: &mut Pipe| {
        p.write_stdout(lines);
        ExecStatus::ok()
    })
}

#[test]
fn pipeline_feeds_count_lines() {
    let mut seq = Sequence::pipeline(vec![write_lines("one\ntwo\n"), count_lines()]);
    assert_eq!(seq.exec().string(), "2\n");
}

#[test]
fn pipeline_short_circuits_on_failure() {
    let mut seq = Sequence::pipeline(vec![
        echo("step one"),
        SequenceStep::new(|p: &mut Pipe| {
            p.write_stdout_line("step two");
            ExecStatus::code(9)
        }),
        echo("step three"),
    ]);
    seq.exec();

    assert_eq!(seq.status_code(), 9);
    // the failing step's own stdout is the final output; the step after
    // it never ran
    assert_eq!(seq.string(), "step two\n");
}

#[test]
fn list_runs_every_step_and_reports_the_last() {
    let mut seq = Sequence::list(vec![
        echo("first"),
        return_status(5),
        echo("third"),
    ]);
    seq.exec();

    // all three steps ran, and the last one's success is the final status
    assert_eq!(seq.string(), "first\nthird\n");
    assert!(seq.okay());
}

#[test]
fn list_with_a_failing_last_step_reports_that_failure() {
    let mut seq = Sequence::list(vec![return_status(5), return_status(7)]);
    seq.exec();
    assert_eq!(seq.status_code(), 7);
}

#[test]
fn and_after_a_failure_is_a_pass_through() {
    let mut seq = Sequence::list(vec![
        return_status(100),
        and_then(Sequence::pipeline(vec![echo("X")])),
    ]);
    seq.exec();

    assert_eq!(seq.status_code(), 100);
    assert_eq!(seq.string(), "");
}

#[test]
fn or_after_a_success_is_a_pass_through() {
    let mut seq = Sequence::list(vec![
        return_status(0),
        or_else(Sequence::pipeline(vec![echo("X")])),
    ]);
    seq.exec();

    assert_eq!(seq.status_code(), 0);
    assert!(seq.okay());
    assert_eq!(seq.string(), "");
}

#[test]
fn or_after_a_failure_runs_and_adopts_the_result() {
    let mut seq = Sequence::list(vec![
        return_status(1),
        or_else(Sequence::pipeline(vec![echo("X")])),
    ]);
    seq.exec();

    assert!(seq.okay());
    assert_eq!(seq.string(), "X\n");
}

#[test]
fn cut_fields_scenario() {
    let mut seq = Sequence::pipeline(vec![
        echo("one two three four five six seven"),
        cut_fields("2-4,6"),
    ]);
    assert_eq!(seq.exec().string(), "two three four six\n");
}

#[test]
fn redirect_option_is_undone_by_teardown() {
    let mut seq = Sequence::pipeline(vec![
        echo("hi").with_option(redirect_stdout_to_stderr()),
    ]);
    seq.exec();

    assert_eq!(seq.string(), "");
    assert_eq!(seq.stderr_string(), "hi\n");
}

#[test]
fn parameter_rebinding_leaves_no_residue() {
    let mut seq = Sequence::pipeline(vec![echo("#=$# 1=$1 2=$2 3=$3 *=$*")]);
    seq.exec_params(&["a", "b", "c"]);
    assert_eq!(seq.string(), "#=3 1=a 2=b 3=c *=a b c\n");

    seq.exec_params(&["x", "y"]);
    assert_eq!(seq.string(), "#=2 1=x 2=y 3= *=x y\n");
}

#[test]
fn pipelines_nest_inside_lists() {
    let mut seq = Sequence::list(vec![
        echo("hello world"),
        and_then(Sequence::pipeline(vec![
            echo_slice(vec!["b", "a"]),
            pipish::builtins::sort_lines(),
        ])),
    ]);
    seq.exec();
    assert_eq!(seq.string(), "hello world\na\nb\n");
}

#[test]
fn a_sequence_can_be_executed_repeatedly() {
    let mut seq = Sequence::pipeline(vec![echo("again"), count_lines()]);
    assert_eq!(seq.exec().string(), "1\n");
    assert_eq!(seq.exec().string(), "1\n");
}
