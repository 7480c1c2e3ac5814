//! Harness version information.
//!
//! The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time. Prefer this constant over
//! repeating `env!("CARGO_PKG_VERSION")`.

/// The scriptest version string (for example, `0.1.0`).
pub const SCRIPTEST_VERSION: &str = env!("CARGO_PKG_VERSION");
