//! Assertion helpers for harness tests
//!
//! Every check returns a `Result` so test bodies can chain them with `?`.
//! A failed check carries only its message; the runner attributes it to
//! whichever test method was executing when it surfaced.

use std::any::Any;
use std::fmt;

/// Error raised when an assertion does not hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionError {
    pub message: String,
}

impl AssertionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for AssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "assertion failed: {}", self.message)
    }
}

impl std::error::Error for AssertionError {}

/// Result of a single assertion
pub type AssertResult = Result<(), AssertionError>;

/// Fail with the given message unless the condition holds
pub fn is_true(condition: bool, msg: &str) -> AssertResult {
    if condition {
        Ok(())
    } else {
        Err(AssertionError::new(msg))
    }
}

/// Fail with the given message if the condition holds
pub fn is_false(condition: bool, msg: &str) -> AssertResult {
    is_true(!condition, msg)
}

/// Fail unless the two values compare equal
pub fn is_equal<T: PartialEq + fmt::Debug>(left: &T, right: &T, msg: &str) -> AssertResult {
    if left == right {
        Ok(())
    } else {
        Err(AssertionError::new(format!(
            "{} (left: {:?}, right: {:?})",
            msg, left, right
        )))
    }
}

/// Fail if the two values compare equal
pub fn is_not_equal<T: PartialEq + fmt::Debug>(left: &T, right: &T, msg: &str) -> AssertResult {
    if left != right {
        Ok(())
    } else {
        Err(AssertionError::new(format!("{} (both: {:?})", msg, left)))
    }
}

/// Round to 7 decimal places, the tolerance used by the almost-equal checks
fn round7(value: f64) -> f64 {
    (value * 1e7).round() / 1e7
}

/// Fail unless the two values are equal within 7 decimal places
pub fn almost_equal(left: f64, right: f64, msg: &str) -> AssertResult {
    if round7(left) == round7(right) {
        Ok(())
    } else {
        Err(AssertionError::new(format!(
            "{} (left: {}, right: {})",
            msg, left, right
        )))
    }
}

/// Fail if the two values are equal within 7 decimal places
pub fn not_almost_equal(left: f64, right: f64, msg: &str) -> AssertResult {
    if round7(left) != round7(right) {
        Ok(())
    } else {
        Err(AssertionError::new(format!("{} (both round to {})", msg, round7(left))))
    }
}

/// Expect the inner check to fail; passes exactly when it does
pub fn fails<F>(task: F, msg: &str) -> AssertResult
where
    F: FnOnce() -> AssertResult,
{
    match task() {
        Err(_) => Ok(()),
        Ok(()) => Err(AssertionError::new(msg)),
    }
}

/// Fail unless the value's concrete type is `T`
pub fn is_type<T: Any>(value: &dyn Any, msg: &str) -> AssertResult {
    if value.is::<T>() {
        Ok(())
    } else {
        Err(AssertionError::new(msg))
    }
}
