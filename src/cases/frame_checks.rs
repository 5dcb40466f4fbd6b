//! Incremental tests that span host frames

use crate::assert;
use crate::harness::{StepOutcome, TestCase, TestError, TestMethod, TestOutcome, TestStep};

/// Exercises the incremental driving path: multi-frame bodies, state held
/// across yields, and setup bracketing between methods
#[derive(Debug, Default)]
pub struct FrameChecks {
    counter: u32,
}

fn count_five_frames(_case: &mut FrameChecks) -> Box<dyn TestStep<FrameChecks>> {
    Box::new(|case: &mut FrameChecks| -> Result<StepOutcome, TestError> {
        if case.counter < 5 {
            case.counter += 1;
            Ok(StepOutcome::Yield)
        } else {
            assert::is_equal(&case.counter, &5, "#YL1")?;
            Ok(StepOutcome::Done)
        }
    })
}

fn hold_state_across_yields(_case: &mut FrameChecks) -> Box<dyn TestStep<FrameChecks>> {
    // State captured on the stepper itself, not on the fixture
    let mut waited = 0u32;
    Box::new(move |case: &mut FrameChecks| -> Result<StepOutcome, TestError> {
        waited += 1;
        if waited < 3 {
            Ok(StepOutcome::Yield)
        } else {
            assert::is_equal(&waited, &3, "#HS1")?;
            assert::is_equal(&case.counter, &0, "#HS2")?;
            Ok(StepOutcome::Done)
        }
    })
}

impl TestCase for FrameChecks {
    fn name(&self) -> &'static str {
        "frame_checks"
    }

    fn set_up(&mut self) -> TestOutcome {
        self.counter = 0;
        Ok(())
    }

    fn tests() -> Vec<TestMethod<Self>> {
        vec![
            TestMethod::incremental("yield_loop_counts_frames", count_five_frames),
            TestMethod::incremental("stepper_state_survives_yields", hold_state_across_yields),
            // Runs after the yield loop left counter at 5; set_up must have
            // reset it
            TestMethod::plain("set_up_resets_the_fixture", |case| {
                assert::is_equal(&case.counter, &0, "#SR1")?;
                Ok(())
            }),
        ]
    }
}
