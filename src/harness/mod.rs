//! Test discovery and frame-driven execution
//!
//! The harness runs inside the host's frame loop. A [`TestSuite`] owns the
//! registered cases; once started, the [`HarnessPlugin`] driver advances
//! the run by one suspension point per `Update` tick, so incremental tests
//! can wait on state that only changes across frames without blocking the
//! host.

pub mod case;
pub mod driver;
pub mod report;
pub mod suite;

pub use case::{StepOutcome, TestCase, TestError, TestKind, TestMethod, TestOutcome, TestStep};
pub use driver::{ActiveRun, HarnessPlugin, drive_tests};
pub use report::{JsonReporter, LogReporter, Reporter, RunTotals, TestRecord};
pub use suite::{RegistrationError, TestSuite};
