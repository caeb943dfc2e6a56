use thiserror::Error;

/// Failures a repeat task can settle with.
#[derive(Debug, Error)]
pub enum RepeatError {
    /// Generic failure raised by a poll closure.
    #[error("{0}")]
    Failure(String),
    /// Internal signal used to unwind an aborted task.
    #[error("repeat task exited")]
    Exit,
    /// The task ran out of budget before the check succeeded.
    #[error("unsuccessful repeat: {0}")]
    Unsuccessful(String),
}

impl RepeatError {
    /// Generic failure with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Failure(_) => ErrorKind::Failure,
            Self::Exit => ErrorKind::Exit,
            Self::Unsuccessful(_) => ErrorKind::Unsuccessful,
        }
    }
}

/// Flat error discriminant, usable in [`crate::RepeatArgs::ignore_errors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Failure,
    Exit,
    Unsuccessful,
}
