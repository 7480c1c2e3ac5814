//! Property-based tests for the listing protocol, case expansion and the overflow transform
//!
//! These tests use proptest to check invariants across many randomly generated inputs.

use std::path::Path;

use proptest::prelude::*;
use scriptest::{TestCase, TestOptions, parse_listing_line};
use scriptest_core::synthesize_overflow;
use scriptest_core::overflow::overflow_prelude;

// =============================================================================
// Listing Properties
// =============================================================================

/// A path token as the runner prints it: no spaces, never starting with the skip marker.
fn listed_path() -> impl Strategy<Value = String> {
    "[a-z_/]{1,12}\\.lua"
}

proptest! {
    /// Property: a line without the skip marker is a runnable path, verbatim
    #[test]
    fn unmarked_lines_are_runnable(line in "[a-zA-Z0-9_./ ]{1,40}") {
        let parsed = parse_listing_line(&line).unwrap();
        prop_assert!(!parsed.skipped);
        prop_assert_eq!(parsed.path, line);
        prop_assert_eq!(parsed.skip_reason, "");
    }

    /// Property: the reason is everything after the first space, spaces included
    #[test]
    fn skip_reason_keeps_everything_after_first_space(
        path in listed_path(),
        reason in "[a-zA-Z0-9 ()]{0,30}",
    ) {
        let line = format!("-{} {}", path, reason);
        let parsed = parse_listing_line(&line).unwrap();
        prop_assert!(parsed.skipped);
        prop_assert_eq!(parsed.path, path);
        prop_assert_eq!(parsed.skip_reason, reason);
    }

    /// Property: a skipped line always names a path
    #[test]
    fn skip_without_path_is_rejected(reason in "[a-z ]{0,20}") {
        let line = format!("- {}", reason);
        prop_assert!(parse_listing_line(&line).is_err());
    }

    /// Property: a skip marker with no separator is always rejected
    #[test]
    fn skip_without_separator_is_rejected(path in listed_path()) {
        let line = format!("-{}", path);
        prop_assert!(parse_listing_line(&line).is_err());
    }
}

// =============================================================================
// Case Expansion Properties
// =============================================================================

proptest! {
    /// Property: every listing line expands to a plain case followed by its overflow variant
    #[test]
    fn expansion_yields_plain_then_overflow(
        path in listed_path(),
        skipped in any::<bool>(),
    ) {
        let line = if skipped { format!("-{} because", path) } else { path.clone() };
        let listing = parse_listing_line(&line).unwrap();
        let [plain, overflow]: [TestCase; 2] =
            TestCase::expand(&listing, Path::new("/src/tests/test"), Path::new("/src/tests"));

        prop_assert_eq!(plain.options(), TestOptions::None);
        prop_assert_eq!(overflow.options(), TestOptions::WithOverflow);
        prop_assert_eq!(plain.path(), overflow.path());
        prop_assert!(plain.path().is_absolute());
        prop_assert_eq!(plain.is_skipped(), skipped);
        prop_assert_eq!(overflow.is_skipped(), skipped);
        prop_assert_eq!(overflow.category(), "WithOverflow");
        prop_assert_eq!(
            overflow.display_name().to_string(),
            format!("WithOverflow.{}", plain.display_name())
        );
    }
}

// =============================================================================
// Overflow Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Property: the synthesized script is the fixed prelude followed by the original bytes
    #[test]
    fn overflow_preserves_source_bytes(source in proptest::collection::vec(any::<u8>(), 0..512)) {
        let prelude = overflow_prelude();
        let script = synthesize_overflow(&source);
        prop_assert_eq!(script.len(), prelude.len() + source.len());
        prop_assert_eq!(&script[..prelude.len()], prelude.as_bytes());
        prop_assert_eq!(&script[prelude.len()..], &source[..]);
    }
}
