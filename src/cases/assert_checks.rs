//! Plain tests covering the assertion helpers

use crate::assert::{self, AssertionError};
use crate::harness::{TestCase, TestMethod};

/// Exercises every assertion helper, including the expect-failure wrapper
#[derive(Debug, Default)]
pub struct AssertionChecks;

impl TestCase for AssertionChecks {
    fn name(&self) -> &'static str {
        "assertion_checks"
    }

    fn tests() -> Vec<TestMethod<Self>> {
        vec![
            TestMethod::plain("is_true_rejects_false", |_| {
                assert::fails(|| assert::is_true(false, "#AT1"), "#AT2")?;
                Ok(())
            }),
            TestMethod::plain("is_false_rejects_true", |_| {
                assert::fails(|| assert::is_false(true, "#AF1"), "#AF2")?;
                Ok(())
            }),
            TestMethod::plain("fails_flags_a_passing_check", |_| {
                let wrapped = assert::fails(|| Ok(()), "#TNE1");
                assert::is_true(wrapped.is_err(), "#TNE2")?;
                Ok(())
            }),
            TestMethod::plain("fails_accepts_a_failing_check", |_| {
                assert::fails(|| Err(AssertionError::new("#TEE1")), "#TEE2")?;
                Ok(())
            }),
            TestMethod::plain("is_equal_checks", |_| {
                assert::fails(|| assert::is_equal(&5, &3, "#AIE1"), "#AIE2")?;
                assert::is_equal(&"foo", &"foo", "#AIE3")?;
                Ok(())
            }),
            TestMethod::plain("is_not_equal_checks", |_| {
                assert::fails(|| assert::is_not_equal(&3, &3, "#AINE1"), "#AINE2")?;
                assert::is_not_equal(&"foo", &"bar", "#AINE3")?;
                Ok(())
            }),
            TestMethod::plain("almost_equal_checks", |_| {
                assert::fails(|| assert::almost_equal(0.3564539877, 0.3564439, "#AAE1"), "#AAE2")?;
                assert::almost_equal(5.647468794654856, 5.647468794654819, "#AAE3")?;
                Ok(())
            }),
            TestMethod::plain("not_almost_equal_checks", |_| {
                assert::fails(
                    || assert::not_almost_equal(0.456489465465465, 0.456489465465465, "#ANAE1"),
                    "#ANAE2",
                )?;
                assert::not_almost_equal(5.546546541657, 5.546536541657, "#ANAE3")?;
                Ok(())
            }),
            TestMethod::plain("is_type_checks", |_| {
                let value = AssertionError::new("sample");
                assert::is_type::<AssertionError>(&value, "#ATY1")?;
                assert::fails(|| assert::is_type::<u32>(&value, "#ATY2"), "#ATY3")?;
                Ok(())
            }),
        ]
    }
}
