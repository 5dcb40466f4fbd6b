//! frametest - an in-engine unit-testing harness for Bevy apps
//!
//! Tests run inside the host's frame loop rather than as a standalone
//! process. Plain tests complete within one frame; incremental tests yield
//! control back to the host once per frame, so they can wait on state that
//! only changes over multiple frames (physics, animation, asynchronous
//! loads) without blocking the main loop.
//!
//! To run tests: create a [`TestSuite`], `add` the test cases to it, and
//! start it with `run`. The suite reports totals through its reporter and
//! releases itself when done.

pub mod assert;
pub mod cases;
pub mod entry;
pub mod harness;

pub use assert::{AssertResult, AssertionError};
pub use cases::{AssertionChecks, FrameChecks};
pub use entry::{
    HostRunning, OperationalError, builtin_suite, register_builtin_cases, start_builtin_tests,
    start_suite,
};
pub use harness::{
    ActiveRun, HarnessPlugin, JsonReporter, LogReporter, RegistrationError, Reporter, RunTotals,
    StepOutcome, TestCase, TestError, TestKind, TestMethod, TestOutcome, TestRecord, TestStep,
    TestSuite, drive_tests,
};
