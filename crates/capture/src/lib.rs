// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hush-capture: run a unit of work with stdout, stderr and `tracing` output
//! redirected into memory, and hand back the text alongside the result.
//!
//! ```no_run
//! let captured = hush_capture::capture(|| {
//!     println!("test");
//!     42
//! })?;
//! assert_eq!(captured.output(), "test");
//! assert_eq!(captured.value().as_ref().ok(), Some(&42));
//! # Ok::<(), hush_capture::CaptureError>(())
//! ```

mod capture;
pub mod color;
mod error;
mod logging;
mod options;
mod outcome;
mod panic;
mod policy;
pub mod streams;
mod trace;

pub use capture::Capture;
pub use error::{CaptureError, ConfigError};
pub use options::{CaptureOptions, LogOptions};
pub use outcome::{Captured, Failure, PanicPayload};
pub use policy::{Kind, RethrowPolicy, RethrowSetting};
pub use streams::{MemoryStreams, ProcessStreams, Redirection, SharedBuffer, StreamWriter, Streams};
pub use trace::{Frame, Trace};

/// Run `work` against the process streams with default options.
///
/// Panics raised by `work` propagate to the caller after the streams are
/// restored.
pub fn capture<T, F>(work: F) -> Result<Captured<T>, CaptureError>
where
    F: FnOnce() -> T,
{
    Capture::new().run(work)
}

/// Like [`capture`], for work that reports failure through `Result`.
pub fn try_capture<T, E, F>(work: F) -> Result<Captured<T, E>, CaptureError<E>>
where
    E: 'static,
    F: FnOnce() -> Result<T, E>,
{
    Capture::new().try_run(work)
}
