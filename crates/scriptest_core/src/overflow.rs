//! Overflow fixture transformation.
//!
//! An overflow fixture is the original test script with a huge table literal declared in front of it. Parsing
//! and holding that literal pushes the interpreter's constant and stack limits before the test body runs.

/// Number of empty tables in the injected literal (2^17).
pub const OVERFLOW_ELEMENTS: usize = 1 << 17;

/// Opening of the injected declaration.
pub const OVERFLOW_HEAD: &str = "local __overflow={";

/// One element of the injected literal.
pub const OVERFLOW_ELEMENT: &str = "{},";

/// Closing of the injected declaration, including the statement terminator.
pub const OVERFLOW_TAIL: &str = "};";

/// Build the declaration that precedes the original script.
pub fn overflow_prelude() -> String {
    let mut prelude =
        String::with_capacity(OVERFLOW_HEAD.len() + OVERFLOW_ELEMENT.len() * OVERFLOW_ELEMENTS + OVERFLOW_TAIL.len());
    prelude.push_str(OVERFLOW_HEAD);
    for _ in 0..OVERFLOW_ELEMENTS {
        prelude.push_str(OVERFLOW_ELEMENT);
    }
    prelude.push_str(OVERFLOW_TAIL);
    prelude
}

/// Prepend the overflow declaration to a script.
///
/// ## Parameters
/// - `source`: the original script bytes; they are copied verbatim after the prelude.
///
/// ## Returns
/// - (`Vec<u8>`): prelude followed by `source`.
///
/// ## Notes
/// - The result depends only on `source`; the original is never touched.
pub fn synthesize_overflow(source: &[u8]) -> Vec<u8> {
    let prelude = overflow_prelude();
    let mut out = Vec::with_capacity(prelude.len() + source.len());
    out.extend_from_slice(prelude.as_bytes());
    out.extend_from_slice(source);
    out
}
