//! Frame-driven execution of a suite
//!
//! [`ActiveRun`] holds the run's state machine between frames and exists
//! for exactly the duration of one run. The [`drive_tests`] system advances
//! it by one suspension interval per `Update` tick, the way the host would
//! resume a coroutine once per frame: a plain test costs one frame, an
//! incremental body costs one frame per advancement plus a settle frame
//! after teardown. No error raised by a case ever aborts the run; it is
//! caught at the phase it occurred in, attributed to the current method,
//! and the run moves on.

use bevy::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use super::case::{StepOutcome, TestError};
use super::report::{Reporter, RunTotals};
use super::suite::{BeginOutcome, RunnableCase, TestSuite};

/// Where the run resumes on its next frame
enum Phase {
    /// Start the next discovered method
    NextMethod,
    /// An incremental body is current; advance it one step
    Stepping,
    /// The body finished last frame; teardown, count, settle
    WindDown,
}

/// Whether the run needs more frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameResult {
    Suspended,
    Finished,
}

/// Resource present while a suite run is in flight.
///
/// Inserted by [`TestSuite::run`], removed by [`drive_tests`] once totals
/// have been reported. Hosts can gate their own systems on its presence.
#[derive(Resource)]
pub struct ActiveRun {
    cases: Vec<Box<dyn RunnableCase>>,
    reporter: Box<dyn Reporter>,
    started: Instant,
    case_index: usize,
    method_index: usize,
    phase: Phase,
    method_failed: bool,
    passed: u32,
    failed: u32,
}

impl ActiveRun {
    pub(crate) fn new(suite: TestSuite) -> Self {
        let (cases, reporter) = suite.into_parts();
        Self {
            cases,
            reporter,
            started: Instant::now(),
            case_index: 0,
            method_index: 0,
            phase: Phase::NextMethod,
            method_failed: false,
            passed: 0,
            failed: 0,
        }
    }

    /// Advance to the next suspension point.
    ///
    /// Returns [`FrameResult::Finished`] once all methods have an outcome
    /// and totals have been reported; every other return consumes exactly
    /// one host frame.
    fn advance_frame(&mut self) -> FrameResult {
        match self.phase {
            Phase::NextMethod => self.begin_next_method(),
            Phase::Stepping => {
                self.step_current();
                FrameResult::Suspended
            }
            Phase::WindDown => {
                self.finish_method();
                FrameResult::Suspended
            }
        }
    }

    fn begin_next_method(&mut self) -> FrameResult {
        while self.case_index < self.cases.len()
            && self.method_index >= self.cases[self.case_index].method_count()
        {
            self.case_index += 1;
            self.method_index = 0;
        }
        if self.case_index >= self.cases.len() {
            let totals = RunTotals {
                passed: self.passed,
                failed: self.failed,
                elapsed_secs: self.started.elapsed().as_secs_f32(),
            };
            self.reporter.total(&totals);
            return FrameResult::Finished;
        }

        self.method_failed = false;

        let set_up = {
            let slot = &mut self.cases[self.case_index];
            guard(|| slot.set_up())
        };
        if let Err(err) = set_up {
            // Setup failure skips the body but still charges a teardown
            self.record_failure(err);
            self.finish_method();
            return FrameResult::Suspended;
        }

        let index = self.method_index;
        let begun = {
            let slot = &mut self.cases[self.case_index];
            guard(|| Ok(slot.begin(index)))
        };
        match begun {
            Ok(BeginOutcome::Completed(Ok(()))) => self.finish_method(),
            Ok(BeginOutcome::Completed(Err(err))) => {
                self.record_failure(err);
                self.finish_method();
            }
            // First advancement happens in the same frame as setup
            Ok(BeginOutcome::Stepping) => {
                self.phase = Phase::Stepping;
                self.step_current();
            }
            Err(err) => {
                self.record_failure(err);
                self.finish_method();
            }
        }
        FrameResult::Suspended
    }

    fn step_current(&mut self) {
        let stepped = {
            let slot = &mut self.cases[self.case_index];
            guard(|| slot.advance())
        };
        match stepped {
            Ok(StepOutcome::Yield) => {}
            // The final advancement still costs a frame before teardown
            Ok(StepOutcome::Done) => self.phase = Phase::WindDown,
            Err(err) => {
                // Stop advancing; teardown runs in this same frame
                self.record_failure(err);
                self.finish_method();
            }
        }
    }

    /// Teardown, count the outcome, and line up the next method. The frame
    /// this runs in is the per-method settle suspension.
    fn finish_method(&mut self) {
        let torn_down = {
            let slot = &mut self.cases[self.case_index];
            guard(|| slot.tear_down())
        };
        if let Err(err) = torn_down {
            // Teardown errors override a prior success
            self.record_failure(err);
        }

        if self.method_failed {
            self.failed += 1;
        } else {
            self.passed += 1;
            let case = self.cases[self.case_index].case_name();
            let method = self.cases[self.case_index].method_name(self.method_index);
            self.reporter.success(case, method);
        }

        self.method_index += 1;
        self.phase = Phase::NextMethod;
    }

    fn record_failure(&mut self, error: TestError) {
        self.method_failed = true;
        let case = self.cases[self.case_index].case_name();
        let method = self.cases[self.case_index].method_name(self.method_index);
        self.reporter.failure(case, method, &error);
    }
}

/// Catch both returned errors and panics from a case's code
fn guard<T>(f: impl FnOnce() -> Result<T, TestError>) -> Result<T, TestError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(TestError::Panicked(panic_text(payload))),
    }
}

fn panic_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// System that advances the active run by one suspension interval per frame
pub fn drive_tests(mut commands: Commands, mut run: ResMut<ActiveRun>) {
    if run.advance_frame() == FrameResult::Finished {
        commands.remove_resource::<ActiveRun>();
    }
}

/// Adds the frame driver to the host app
pub struct HarnessPlugin;

impl Plugin for HarnessPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, drive_tests.run_if(resource_exists::<ActiveRun>));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;
    use crate::harness::case::{TestCase, TestMethod, TestOutcome};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn log(log: &Log, entry: impl Into<String>) {
        log.lock().unwrap().push(entry.into());
    }

    #[derive(Clone, Default)]
    struct Recording {
        events: Log,
        totals: Arc<Mutex<Option<RunTotals>>>,
    }

    impl Recording {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn totals(&self) -> RunTotals {
            self.totals.lock().unwrap().clone().expect("run not finished")
        }
    }

    impl Reporter for Recording {
        fn success(&mut self, case: &str, method: &str) {
            log(&self.events, format!("pass {}::{}", case, method));
        }

        fn failure(&mut self, case: &str, method: &str, error: &TestError) {
            log(&self.events, format!("fail {}::{}: {}", case, method, error));
        }

        fn total(&mut self, totals: &RunTotals) {
            *self.totals.lock().unwrap() = Some(totals.clone());
        }
    }

    /// Drive a run to completion outside any app, counting consumed frames
    fn drive(suite: TestSuite) -> u32 {
        let mut run = ActiveRun::new(suite);
        let mut frames = 0;
        while run.advance_frame() == FrameResult::Suspended {
            frames += 1;
            assert!(frames < 1000, "runaway test run");
        }
        frames
    }

    fn recording_suite() -> (TestSuite, Recording) {
        let recording = Recording::default();
        let suite = TestSuite::with_reporter(Box::new(recording.clone()));
        (suite, recording)
    }

    struct NoTests;

    impl TestCase for NoTests {
        fn name(&self) -> &'static str {
            "no_tests"
        }

        fn tests() -> Vec<TestMethod<Self>> {
            Vec::new()
        }
    }

    #[test]
    fn test_zero_discovered_methods_still_reports_totals() {
        let (mut suite, recording) = recording_suite();
        suite.add(NoTests).unwrap();

        let frames = drive(suite);

        assert_eq!(frames, 0);
        let totals = recording.totals();
        assert_eq!(totals.passed, 0);
        assert_eq!(totals.failed, 0);
        assert!(recording.events().is_empty());
    }

    struct Bracketed {
        trace: Log,
    }

    impl TestCase for Bracketed {
        fn name(&self) -> &'static str {
            "bracketed"
        }

        fn set_up(&mut self) -> TestOutcome {
            log(&self.trace, "set_up");
            Ok(())
        }

        fn tear_down(&mut self) -> TestOutcome {
            log(&self.trace, "tear_down");
            Ok(())
        }

        fn tests() -> Vec<TestMethod<Self>> {
            vec![TestMethod::plain("fails_body", |case| {
                log(&case.trace, "body");
                assert::is_true(false, "#AT1")?;
                Ok(())
            })]
        }
    }

    #[test]
    fn test_body_failure_still_runs_teardown_once() {
        let (mut suite, recording) = recording_suite();
        let trace: Log = Log::default();
        suite.add(Bracketed { trace: trace.clone() }).unwrap();

        let frames = drive(suite);

        assert_eq!(frames, 1);
        assert_eq!(
            trace.lock().unwrap().clone(),
            vec!["set_up", "body", "tear_down"]
        );
        let totals = recording.totals();
        assert_eq!((totals.passed, totals.failed), (0, 1));
        let events = recording.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].contains("fail bracketed::fails_body"));
        assert!(events[0].contains("#AT1"));
    }

    struct SetUpFails {
        trace: Log,
    }

    impl TestCase for SetUpFails {
        fn name(&self) -> &'static str {
            "set_up_fails"
        }

        fn set_up(&mut self) -> TestOutcome {
            log(&self.trace, "set_up");
            Err(assert::AssertionError::new("#SU1").into())
        }

        fn tear_down(&mut self) -> TestOutcome {
            log(&self.trace, "tear_down");
            Ok(())
        }

        fn tests() -> Vec<TestMethod<Self>> {
            vec![TestMethod::plain("never_runs", |case| {
                log(&case.trace, "body");
                Ok(())
            })]
        }
    }

    #[test]
    fn test_setup_failure_skips_body_but_counts_once() {
        let (mut suite, recording) = recording_suite();
        let trace: Log = Log::default();
        suite.add(SetUpFails { trace: trace.clone() }).unwrap();

        drive(suite);

        assert_eq!(trace.lock().unwrap().clone(), vec!["set_up", "tear_down"]);
        let totals = recording.totals();
        assert_eq!((totals.passed, totals.failed), (0, 1));
    }

    struct TearDownFails;

    impl TestCase for TearDownFails {
        fn name(&self) -> &'static str {
            "tear_down_fails"
        }

        fn tear_down(&mut self) -> TestOutcome {
            Err(assert::AssertionError::new("#TD1").into())
        }

        fn tests() -> Vec<TestMethod<Self>> {
            vec![TestMethod::plain("clean_body", |_| Ok(()))]
        }
    }

    #[test]
    fn test_teardown_failure_overrides_body_success() {
        let (mut suite, recording) = recording_suite();
        suite.add(TearDownFails).unwrap();

        drive(suite);

        let totals = recording.totals();
        assert_eq!((totals.passed, totals.failed), (0, 1));
        assert!(recording.events()[0].contains("#TD1"));
    }

    #[derive(Default)]
    struct Counting {
        counter: u32,
        advancements: Arc<Mutex<u32>>,
    }

    impl TestCase for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn set_up(&mut self) -> TestOutcome {
            self.counter = 0;
            Ok(())
        }

        fn tests() -> Vec<TestMethod<Self>> {
            vec![TestMethod::incremental("five_yields", |_case| {
                Box::new(|case: &mut Counting| -> Result<StepOutcome, TestError> {
                    *case.advancements.lock().unwrap() += 1;
                    if case.counter < 5 {
                        case.counter += 1;
                        Ok(StepOutcome::Yield)
                    } else {
                        assert::is_equal(&case.counter, &5, "#YL1")?;
                        Ok(StepOutcome::Done)
                    }
                })
            })]
        }
    }

    #[test]
    fn test_incremental_body_costs_one_frame_per_advancement() {
        let (mut suite, recording) = recording_suite();
        let advancements = Arc::new(Mutex::new(0));
        suite
            .add(Counting {
                counter: 0,
                advancements: advancements.clone(),
            })
            .unwrap();

        let frames = drive(suite);

        // 5 yields => 6 advancements, each costing a frame, plus the settle
        // frame after teardown
        assert_eq!(*advancements.lock().unwrap(), 6);
        assert_eq!(frames, 7);
        let totals = recording.totals();
        assert_eq!((totals.passed, totals.failed), (1, 0));
    }

    struct YieldsThenFails;

    impl TestCase for YieldsThenFails {
        fn name(&self) -> &'static str {
            "yields_then_fails"
        }

        fn tests() -> Vec<TestMethod<Self>> {
            vec![TestMethod::incremental("fails_midway", |_case| {
                let mut steps = 0u32;
                Box::new(move |_case: &mut YieldsThenFails| -> Result<StepOutcome, TestError> {
                    steps += 1;
                    if steps < 3 {
                        Ok(StepOutcome::Yield)
                    } else {
                        assert::is_true(false, "#MW1")?;
                        Ok(StepOutcome::Done)
                    }
                })
            })]
        }
    }

    #[test]
    fn test_incremental_failure_stops_advancing() {
        let (mut suite, recording) = recording_suite();
        suite.add(YieldsThenFails).unwrap();

        // Frames: two yields, then the failing advancement shares its frame
        // with teardown
        let frames = drive(suite);

        assert_eq!(frames, 3);
        let totals = recording.totals();
        assert_eq!((totals.passed, totals.failed), (0, 1));
        assert!(recording.events()[0].contains("#MW1"));
    }

    struct Panics;

    impl TestCase for Panics {
        fn name(&self) -> &'static str {
            "panics"
        }

        fn tests() -> Vec<TestMethod<Self>> {
            vec![
                TestMethod::plain("blows_up", |_| panic!("boom")),
                TestMethod::plain("still_runs", |_| Ok(())),
            ]
        }
    }

    #[test]
    fn test_panic_becomes_failure_and_run_continues() {
        let (mut suite, recording) = recording_suite();
        suite.add(Panics).unwrap();

        drive(suite);

        let totals = recording.totals();
        assert_eq!((totals.passed, totals.failed), (1, 1));
        let events = recording.events();
        assert!(events[0].contains("panicked: boom"));
        assert!(events[1].contains("pass panics::still_runs"));
    }

    struct Named(&'static str);

    impl TestCase for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn tests() -> Vec<TestMethod<Self>> {
            vec![TestMethod::plain("only", |_| Ok(()))]
        }
    }

    #[test]
    fn test_cases_run_in_registration_order() {
        let (mut suite, recording) = recording_suite();
        suite.add(Named("first_case")).unwrap();
        suite.add(NoTests).unwrap();
        suite.add(Named("second_case")).unwrap();

        drive(suite);

        assert_eq!(
            recording.events(),
            vec!["pass first_case::only", "pass second_case::only"]
        );
    }

    #[test]
    fn test_outcomes_sum_to_discovered_methods() {
        let (mut suite, recording) = recording_suite();
        suite.add(Panics).unwrap();
        suite.add(TearDownFails).unwrap();
        suite.add(Named("one_more")).unwrap();
        let discovered = suite.discovered() as u32;

        drive(suite);

        let totals = recording.totals();
        assert_eq!(totals.total(), discovered);
    }

    #[test]
    fn test_run_drives_through_a_bevy_app() {
        let (mut suite, recording) = recording_suite();
        suite.add(Named("in_app")).unwrap();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(HarnessPlugin);
        app.world_mut().insert_resource(ActiveRun::new(suite));

        let mut updates = 0;
        while app.world().get_resource::<ActiveRun>().is_some() {
            app.update();
            updates += 1;
            assert!(updates < 100, "run never finished");
        }

        let totals = recording.totals();
        assert_eq!((totals.passed, totals.failed), (1, 0));
    }
}
