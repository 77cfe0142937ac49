//! Property definitions and the result of evaluating one.

use std::fmt;

/// Outcome of evaluating a property against one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    /// The input satisfied the property
    Success,
    /// The input violated the property, with an explanation
    Failure(String),
}

impl TestResult {
    /// Shorthand for [`TestResult::Failure`]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// `Success` when `condition` holds, otherwise `Failure(message)`
    pub fn check(condition: bool, message: impl Into<String>) -> Self {
        if condition {
            Self::Success
        } else {
            Self::failure(message)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The failure message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure(message) => Some(message),
        }
    }
}

impl From<bool> for TestResult {
    fn from(passed: bool) -> Self {
        Self::check(passed, "Property returned false")
    }
}

impl<E: fmt::Display> From<Result<(), E>> for TestResult {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(error) => Self::failure(error.to_string()),
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure(message) => write!(f, "failure: {}", message),
        }
    }
}

/// A decision function over testable values
///
/// Properties are expected to be pure. The engine calls them synchronously
/// and may call them many times on the same value while shrinking.
pub trait Property<T> {
    /// Evaluate the property for `input`
    fn test(&self, input: &T) -> TestResult;
}

impl<T, F, R> Property<T> for F
where
    F: Fn(&T) -> R,
    R: Into<TestResult>,
{
    fn test(&self, input: &T) -> TestResult {
        self(input).into()
    }
}
