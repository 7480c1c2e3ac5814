//! Discovery against a fake interpreter.

#![cfg(unix)]

mod common;

use common::{FakeTree, RUNNER_SCRIPT};
use scriptest::{HarnessError, TestOptions, discover};

#[test]
fn test_listing_yields_two_cases_per_entry_in_order() {
    let tree = FakeTree::standard();
    let cases = discover(&tree.config()).unwrap();

    let summary: Vec<(String, TestOptions, bool, String)> = cases
        .iter()
        .map(|c| {
            (
                c.path().file_name().unwrap().to_string_lossy().into_owned(),
                c.options(),
                c.is_skipped(),
                c.skip_reason().to_string(),
            )
        })
        .collect();

    let runnable = |name: &str, options| (name.to_string(), options, false, String::new());
    let skipped = |name: &str, options| (name.to_string(), options, true, "reason text".to_string());
    assert_eq!(
        summary,
        vec![
            runnable("a.lua", TestOptions::None),
            runnable("a.lua", TestOptions::WithOverflow),
            skipped("b.lua", TestOptions::None),
            skipped("b.lua", TestOptions::WithOverflow),
            runnable("c.lua", TestOptions::None),
            runnable("c.lua", TestOptions::WithOverflow),
        ]
    );
}

#[test]
fn test_paths_are_absolute_under_runner_dir() {
    let tree = FakeTree::standard();
    let cases = discover(&tree.config()).unwrap();
    for case in &cases {
        assert!(case.path().is_absolute());
        assert_eq!(case.path().parent().unwrap(), tree.runner_dir());
    }
    assert_eq!(cases[0].category(), "test");
    assert_eq!(cases[1].category(), "WithOverflow");
    assert_eq!(cases[1].display_name(), "WithOverflow.a");
}

#[test]
fn test_report_mirrors_listing() {
    let tree = FakeTree::standard();
    discover(&tree.config()).unwrap();
    assert_eq!(tree.report(), "a.lua\n-b.lua reason text\nc.lua\n");

    // A second run truncates rather than appends.
    discover(&tree.config()).unwrap();
    assert_eq!(tree.report(), "a.lua\n-b.lua reason text\nc.lua\n");
}

#[test]
fn test_runner_flags_are_forwarded() {
    let tree = FakeTree::with_runner(
        r#"
printf '%s\n' "$@" > args.txt
exit 0
"#,
    );
    let config = tree.config().with_runner_flags("+fold -jit");
    assert!(discover(&config).unwrap().is_empty());

    let args = std::fs::read_to_string(tree.runner_dir().join("args.txt")).unwrap();
    assert_eq!(args, "+fold\n-jit\n--list\n");
}

#[test]
fn test_empty_listing_is_valid() {
    let tree = FakeTree::with_runner("exit 0\n");
    let cases = discover(&tree.config()).unwrap();
    assert!(cases.is_empty());
    assert_eq!(tree.report(), "");
}

#[test]
fn test_failing_listing_carries_stderr() {
    let tree = FakeTree::with_runner(
        r#"
echo 'a.lua'
echo 'test.lua:1: unknown flag +bogus' >&2
exit 3
"#,
    );
    let err = discover(&tree.config()).unwrap_err();
    match &err {
        HarnessError::Discovery { exit_code, stderr } => {
            assert_eq!(*exit_code, 3);
            assert!(stderr.contains("unknown flag +bogus"));
        }
        other => panic!("expected discovery error, got {:?}", other),
    }
    assert!(err.is_fatal());
    assert!(err.to_string().contains("unknown flag +bogus"));
    assert_eq!(tree.report(), "a.lua\ntest.lua:1: unknown flag +bogus\n\n");
}

#[test]
fn test_stderr_noise_does_not_fail_successful_listing() {
    let tree = FakeTree::with_runner(
        r#"
echo 'warning: jit disabled' >&2
echo 'a.lua'
exit 0
"#,
    );
    let cases = discover(&tree.config()).unwrap();
    assert_eq!(cases.len(), 2);
}

#[test]
fn test_malformed_skip_line_is_fatal() {
    let tree = FakeTree::with_runner("echo '-b.lua'\n");
    let err = discover(&tree.config()).unwrap_err();
    assert!(matches!(err, HarnessError::Listing(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_missing_interpreter() {
    let tree = FakeTree::with_runner(RUNNER_SCRIPT);
    let config = tree.config().with_interpreter(tree.root().join("bin/luajit"));
    let err = discover(&config).unwrap_err();
    assert!(matches!(err, HarnessError::Spawn { .. }));
}

#[test]
fn test_large_stderr_does_not_block_listing() {
    let tree = FakeTree::with_runner(
        r#"
yes 'noise on stderr' | head -n 50000 >&2
yes 'x.lua' | head -n 20000
exit 0
"#,
    );
    let cases = discover(&tree.config()).unwrap();
    assert_eq!(cases.len(), 40_000);
}

#[test]
fn test_failing_listing_is_reported_before_parsing() {
    let tree = FakeTree::with_runner("echo '-b.lua'\necho 'boom' >&2\nexit 1\n");
    let err = discover(&tree.config()).unwrap_err();
    assert!(matches!(err, HarnessError::Discovery { exit_code: 1, .. }));
    assert_eq!(tree.report(), "-b.lua\nboom\n\n");
}
