//! Pure building blocks for the scriptest harness.
//!
//! This crate holds the parts of the harness that do not spawn processes or load libraries:
//! - the `--list` line protocol ([`listing`]),
//! - the test case model and its naming rules ([`case`]),
//! - the overflow fixture transformation ([`overflow`]),
//! - lexical path helpers ([`paths`]).
//!
//! ## Notes
//!
//! - No process spawning and no global state. File reads and writes belong to the `scriptest` crate.

pub mod case;
pub mod listing;
pub mod overflow;
pub mod paths;

pub use case::{TestCase, TestOptions};
pub use listing::{ListingError, ListingLine, parse_listing_line};
pub use overflow::{OVERFLOW_ELEMENTS, synthesize_overflow};
