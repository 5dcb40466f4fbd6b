//! Test case contract: lifecycle hooks and method registration

use std::fmt;

use crate::assert::AssertionError;

/// Why a test method failed
#[derive(Debug, Clone)]
pub enum TestError {
    /// An assertion in setup, body, or teardown did not hold
    Assertion(AssertionError),
    /// Setup, body, or teardown panicked
    Panicked(String),
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestError::Assertion(err) => write!(f, "{}", err),
            TestError::Panicked(msg) => write!(f, "panicked: {}", msg),
        }
    }
}

impl From<AssertionError> for TestError {
    fn from(err: AssertionError) -> Self {
        TestError::Assertion(err)
    }
}

/// Outcome of one phase (setup, plain body, teardown) of a test method
pub type TestOutcome = Result<(), TestError>;

/// Classification of a registered test method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    /// Runs to completion within a single host frame
    Plain,
    /// Driven one step per host frame until it reports done
    Incremental,
}

/// Signal returned by one advancement of an incremental body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Suspend until the next host frame, then step again
    Yield,
    /// The body has finished
    Done,
}

/// A resumable multi-frame test body.
///
/// The runner calls `step` once per host frame. State that must survive
/// between steps lives either on the stepper itself (a capturing closure
/// works) or on the case fixture, which is passed back in on every step.
pub trait TestStep<C>: Send + Sync {
    fn step(&mut self, case: &mut C) -> Result<StepOutcome, TestError>;
}

impl<C, F> TestStep<C> for F
where
    F: FnMut(&mut C) -> Result<StepOutcome, TestError> + Send + Sync,
{
    fn step(&mut self, case: &mut C) -> Result<StepOutcome, TestError> {
        self(case)
    }
}

pub(crate) enum TestBody<C> {
    Plain(fn(&mut C) -> TestOutcome),
    Incremental(fn(&mut C) -> Box<dyn TestStep<C>>),
}

/// A registered unit of work on a test case: name, classification, and body.
/// Immutable once discovered.
pub struct TestMethod<C> {
    name: &'static str,
    pub(crate) body: TestBody<C>,
}

impl<C> TestMethod<C> {
    /// Register a single-frame test body
    pub fn plain(name: &'static str, body: fn(&mut C) -> TestOutcome) -> Self {
        Self {
            name,
            body: TestBody::Plain(body),
        }
    }

    /// Register a multi-step body driven once per host frame
    pub fn incremental(name: &'static str, body: fn(&mut C) -> Box<dyn TestStep<C>>) -> Self {
        Self {
            name,
            body: TestBody::Incremental(body),
        }
    }

    /// Name used in failure reports
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TestKind {
        match self.body {
            TestBody::Plain(_) => TestKind::Plain,
            TestBody::Incremental(_) => TestKind::Incremental,
        }
    }
}

/// A unit of related tests with setup/teardown bracketing.
///
/// `set_up` runs before every registered method and `tear_down` after it,
/// even when setup or the body failed. An error from either hook fails the
/// current method only, never the whole run.
///
/// Tests should not leave state behind in the host world unless it is a
/// throw-away world nobody minds polluting.
pub trait TestCase: Send + Sync + 'static {
    /// Name used in reports to qualify this case's methods
    fn name(&self) -> &'static str;

    /// Runs before every test method on this case
    fn set_up(&mut self) -> TestOutcome {
        Ok(())
    }

    /// Runs after every test method on this case, regardless of its outcome
    fn tear_down(&mut self) -> TestOutcome {
        Ok(())
    }

    /// The closed, ordered list of test methods this case exposes.
    ///
    /// List order is execution order. The list is read once, at
    /// registration, and stays fixed for the run.
    fn tests() -> Vec<TestMethod<Self>>
    where
        Self: Sized;
}
