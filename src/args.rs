use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::ErrorKind;

/// Options for a repeat task.
///
/// `timeout` of `None` loops until success, error or abort. A zero `timeout`
/// runs exactly one iteration. Anything else is a wall-clock budget measured
/// from task start.
#[derive(Debug, Default)]
pub struct RepeatArgs {
    /// Error kinds treated as an unsuccessful iteration instead of failing
    /// the whole task.
    pub ignore_errors: Vec<ErrorKind>,
    pub timeout: Option<Duration>,
    /// How long a check has to hold continuously before it counts.
    pub threshold: Option<Duration>,
    /// Failure text attached to the unsuccessful-repeat error.
    pub message: Option<FailureMessage>,
    /// Task identity, generated if omitted.
    pub id: Option<String>,
    /// On a single-shot miss, settle with no value instead of failing.
    pub ignore_loop_error: bool,
}

type LazyMessage = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = String> + Send>> + Send>;

/// Failure text, either fixed up front or computed when the task fails.
pub enum FailureMessage {
    Static(String),
    Lazy(LazyMessage),
}

impl FailureMessage {
    /// Compute the message only when the task actually fails.
    pub fn lazy<F, Fut>(message: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = String> + Send + 'static,
    {
        Self::Lazy(Box::new(move || Box::pin(message())))
    }

    pub(crate) async fn resolve(self) -> String {
        match self {
            Self::Static(text) => text,
            Self::Lazy(message) => message().await,
        }
    }
}

impl From<&str> for FailureMessage {
    fn from(text: &str) -> Self {
        Self::Static(text.to_owned())
    }
}

impl From<String> for FailureMessage {
    fn from(text: String) -> Self {
        Self::Static(text)
    }
}

impl fmt::Debug for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}
