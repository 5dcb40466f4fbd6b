//! Host-level command for launching test runs
//!
//! The host inserts [`HostRunning`] once its frame loop is live; starting a
//! suite before that fails, since nothing would ever drive it. Mirrors the
//! rule that in-engine tests can only run while the engine is actually
//! ticking.

use bevy::prelude::*;
use std::fmt;

use crate::cases::{AssertionChecks, FrameChecks};
use crate::harness::{ActiveRun, RegistrationError, TestSuite};

/// Marker resource the host inserts once its frame loop is live
#[derive(Resource)]
pub struct HostRunning;

/// Error starting a run from the host command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationalError {
    /// The host frame loop is not running yet
    HostNotRunning,
    /// A previous run has not finished
    RunInProgress,
    /// A case failed to register
    Registration(RegistrationError),
}

impl fmt::Display for OperationalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationalError::HostNotRunning => {
                write!(f, "the host frame loop must be running before starting tests")
            }
            OperationalError::RunInProgress => {
                write!(f, "a test run is already in progress")
            }
            OperationalError::Registration(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for OperationalError {}

impl From<RegistrationError> for OperationalError {
    fn from(err: RegistrationError) -> Self {
        OperationalError::Registration(err)
    }
}

/// Register the built-in cases on an existing suite
pub fn register_builtin_cases(suite: &mut TestSuite) -> Result<(), RegistrationError> {
    suite.add(AssertionChecks)?;
    suite.add(FrameChecks::default())?;
    Ok(())
}

/// Build a suite holding the built-in cases and the default reporter
pub fn builtin_suite() -> Result<TestSuite, RegistrationError> {
    let mut suite = TestSuite::new();
    register_builtin_cases(&mut suite)?;
    Ok(suite)
}

/// Start an already-populated suite, subject to the host-state checks
pub fn start_suite(world: &mut World, suite: TestSuite) -> Result<(), OperationalError> {
    if !world.contains_resource::<HostRunning>() {
        return Err(OperationalError::HostNotRunning);
    }
    if world.contains_resource::<ActiveRun>() {
        return Err(OperationalError::RunInProgress);
    }
    world.insert_resource(ActiveRun::new(suite));
    Ok(())
}

/// Instantiate the built-in suite and start it on the given world
pub fn start_builtin_tests(world: &mut World) -> Result<(), OperationalError> {
    let suite = builtin_suite()?;
    start_suite(world, suite)
}
