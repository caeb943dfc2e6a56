use std::time::Duration;

use crate::error::RepeatError;

/// Whether a poll iteration finished the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Done,
    Undone,
}

/// Explicit result of a single poll iteration.
///
/// Returning this from a poll closure opts into explicit loop signaling:
/// the engine follows `status` instead of inspecting the value, and `delay`
/// overrides the scheduling of the next iteration.
#[derive(Debug, Clone)]
pub struct LoopResult<T> {
    pub status: LoopStatus,
    pub value: Option<T>,
    pub delay: Option<Duration>,
}

impl<T> LoopResult<T> {
    /// Finish the loop, settling with `value`.
    pub fn done(value: T) -> Self {
        Self {
            status: LoopStatus::Done,
            value: Some(value),
            delay: None,
        }
    }

    /// Keep looping.
    pub fn undone() -> Self {
        Self {
            status: LoopStatus::Undone,
            value: None,
            delay: None,
        }
    }

    /// Wait at least `delay` before the next iteration.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Conversion from a poll closure's return value into a [`LoopResult`].
///
/// The closure's return type fixes the signaling mode for the whole task:
/// `bool` and `Option` signal implicitly (a present value means done),
/// [`LoopResult`] signals explicitly, and `Result` wraps any of them for
/// fallible polls.
pub trait IntoLoopResult {
    /// Value the task settles with.
    type Value;

    /// Whether this return type opts into explicit loop signaling.
    const EXPLICIT: bool;

    fn into_loop_result(self) -> Result<LoopResult<Self::Value>, RepeatError>;
}

impl IntoLoopResult for bool {
    type Value = bool;

    const EXPLICIT: bool = false;

    fn into_loop_result(self) -> Result<LoopResult<bool>, RepeatError> {
        Ok(if self {
            LoopResult::done(true)
        } else {
            LoopResult::undone()
        })
    }
}

impl<T> IntoLoopResult for Option<T> {
    type Value = T;

    const EXPLICIT: bool = false;

    fn into_loop_result(self) -> Result<LoopResult<T>, RepeatError> {
        Ok(match self {
            Some(value) => LoopResult::done(value),
            None => LoopResult::undone(),
        })
    }
}

impl<T> IntoLoopResult for LoopResult<T> {
    type Value = T;

    const EXPLICIT: bool = true;

    fn into_loop_result(self) -> Result<LoopResult<T>, RepeatError> {
        Ok(self)
    }
}

impl<O> IntoLoopResult for Result<O, RepeatError>
where
    O: IntoLoopResult,
{
    type Value = O::Value;

    const EXPLICIT: bool = O::EXPLICIT;

    fn into_loop_result(self) -> Result<LoopResult<O::Value>, RepeatError> {
        self.and_then(O::into_loop_result)
    }
}
