//! Built-in test cases
//!
//! These exercise the harness through its own public surface and double as
//! usage examples: one case of plain tests over the assertion helpers, one
//! case of incremental tests spanning host frames.

pub mod assert_checks;
pub mod frame_checks;

pub use assert_checks::AssertionChecks;
pub use frame_checks::FrameChecks;
