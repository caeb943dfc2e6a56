//! Poll an asynchronous check until it succeeds, stabilizes, times out or
//! gets aborted.

mod args;
mod error;
mod manager;
mod outcome;
mod repeat;
mod threshold;

pub use args::{FailureMessage, RepeatArgs};
pub use error::{ErrorKind, RepeatError};
pub use manager::RepeatManager;
pub use outcome::{IntoLoopResult, LoopResult, LoopStatus};
pub use repeat::{repeat, Abort, Repeat, RepeatHandle, STABILITY_POLL_INTERVAL};
pub use threshold::Threshold;
