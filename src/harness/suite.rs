//! Suite registration and type erasure over concrete case types

use std::fmt;

use bevy::prelude::*;

use super::case::{StepOutcome, TestBody, TestCase, TestError, TestMethod, TestOutcome, TestStep};
use super::driver::ActiveRun;
use super::report::{LogReporter, Reporter};

/// Error raised synchronously by [`TestSuite::add`] for a case whose
/// registration list is unusable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationError {
    pub case: &'static str,
    pub method: &'static str,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "test case '{}' registers method '{}' more than once",
            self.case, self.method
        )
    }
}

impl std::error::Error for RegistrationError {}

/// What [`RunnableCase::begin`] did with the body
pub(crate) enum BeginOutcome {
    /// A plain body ran to completion with this outcome
    Completed(TestOutcome),
    /// An incremental body is now current; drive it with `advance`
    Stepping,
}

/// Object-safe view over a registered case and its discovered methods
pub(crate) trait RunnableCase: Send + Sync {
    fn case_name(&self) -> &'static str;
    fn method_count(&self) -> usize;
    fn method_name(&self, index: usize) -> &'static str;
    fn set_up(&mut self) -> TestOutcome;
    fn tear_down(&mut self) -> TestOutcome;
    /// Start the body at `index`: plain bodies run to completion,
    /// incremental bodies leave a stepper current
    fn begin(&mut self, index: usize) -> BeginOutcome;
    /// Advance the current stepper by one step
    fn advance(&mut self) -> Result<StepOutcome, TestError>;
}

struct Registered<C: TestCase> {
    case: C,
    methods: Vec<TestMethod<C>>,
    current: Option<Box<dyn TestStep<C>>>,
}

impl<C: TestCase> RunnableCase for Registered<C> {
    fn case_name(&self) -> &'static str {
        self.case.name()
    }

    fn method_count(&self) -> usize {
        self.methods.len()
    }

    fn method_name(&self, index: usize) -> &'static str {
        self.methods[index].name()
    }

    fn set_up(&mut self) -> TestOutcome {
        self.case.set_up()
    }

    fn tear_down(&mut self) -> TestOutcome {
        self.current = None;
        self.case.tear_down()
    }

    fn begin(&mut self, index: usize) -> BeginOutcome {
        match self.methods[index].body {
            TestBody::Plain(body) => BeginOutcome::Completed(body(&mut self.case)),
            TestBody::Incremental(body) => {
                self.current = Some(body(&mut self.case));
                BeginOutcome::Stepping
            }
        }
    }

    fn advance(&mut self) -> Result<StepOutcome, TestError> {
        match self.current.as_mut() {
            Some(stepper) => stepper.step(&mut self.case),
            // Driven past its end; report done rather than loop forever
            None => Ok(StepOutcome::Done),
        }
    }
}

/// Owns an ordered collection of test cases and starts the frame-driven run.
///
/// Registration order is execution order. A suite is single-use: [`run`]
/// consumes it, and completion is observed through the reporter hooks,
/// never through a return value or a blocking wait.
///
/// [`run`]: TestSuite::run
pub struct TestSuite {
    cases: Vec<Box<dyn RunnableCase>>,
    reporter: Box<dyn Reporter>,
}

impl TestSuite {
    /// Suite with the default log-only reporter
    pub fn new() -> Self {
        Self::with_reporter(Box::new(LogReporter::default()))
    }

    /// Suite with a custom reporter
    pub fn with_reporter(reporter: Box<dyn Reporter>) -> Self {
        Self {
            cases: Vec::new(),
            reporter,
        }
    }

    /// Register a test case.
    ///
    /// The case's method list is discovered here, once, and stays fixed for
    /// the run. Fails when the list declares two methods under the same
    /// name, which would make failure attribution ambiguous.
    pub fn add<C: TestCase>(&mut self, case: C) -> Result<(), RegistrationError> {
        let methods = C::tests();
        for (index, method) in methods.iter().enumerate() {
            if methods[..index].iter().any(|m| m.name() == method.name()) {
                return Err(RegistrationError {
                    case: case.name(),
                    method: method.name(),
                });
            }
        }
        self.cases.push(Box::new(Registered {
            case,
            methods,
            current: None,
        }));
        Ok(())
    }

    /// Number of test methods discovered across all registered cases
    pub fn discovered(&self) -> usize {
        self.cases.iter().map(|case| case.method_count()).sum()
    }

    /// Start the run.
    ///
    /// Returns immediately: execution is driven by the [`HarnessPlugin`]
    /// system from the next frame on, one suspension interval per frame,
    /// and the run's resources are released once totals have been reported.
    ///
    /// [`HarnessPlugin`]: super::driver::HarnessPlugin
    pub fn run(self, commands: &mut Commands) {
        commands.insert_resource(ActiveRun::new(self));
    }

    pub(crate) fn into_parts(self) -> (Vec<Box<dyn RunnableCase>>, Box<dyn Reporter>) {
        (self.cases, self.reporter)
    }
}

impl Default for TestSuite {
    fn default() -> Self {
        Self::new()
    }
}
