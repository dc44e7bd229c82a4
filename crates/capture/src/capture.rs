// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The run-and-capture operation.

use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};

use crate::color::ColorScope;
use crate::error::CaptureError;
use crate::logging;
use crate::options::CaptureOptions;
use crate::outcome::{Captured, Failure, PanicPayload};
use crate::panic::PanicScope;
use crate::policy::RethrowSetting;
use crate::streams::{ProcessStreams, Redirection, Streams};
use crate::trace::Trace;

/// Runs work with its output redirected into memory.
///
/// ```no_run
/// use hush_capture::{Capture, RethrowPolicy};
///
/// let captured = Capture::new()
///     .rethrow(RethrowPolicy::None)
///     .run(|| -> u32 { panic!("boom") })?;
/// assert!(!captured.succeeded());
/// # Ok::<(), hush_capture::CaptureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Capture<S = ProcessStreams> {
    streams: S,
    options: CaptureOptions,
}

impl Capture {
    /// Capture the real process stdout and stderr.
    pub fn new() -> Self {
        Self::with_streams(ProcessStreams)
    }
}

impl Default for Capture {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Streams> Capture<S> {
    pub fn with_streams(streams: S) -> Self {
        Self {
            streams,
            options: CaptureOptions::default(),
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, options: CaptureOptions) -> Self {
        self.options = options;
        self
    }

    /// Set which failures propagate. Accepts a [`RethrowPolicy`](crate::RethrowPolicy),
    /// a flag, a sentinel name, or kinds; checked when the capture runs.
    pub fn rethrow(mut self, setting: impl Into<RethrowSetting>) -> Self {
        self.options.rethrow = setting.into();
        self
    }

    pub fn preserve_formatting(mut self, enabled: bool) -> Self {
        self.options.preserve_formatting = enabled;
        self
    }

    /// Whether `tracing` events are routed into the capture.
    pub fn capture_logs(mut self, enabled: bool) -> Self {
        self.options.logs.capture = enabled;
        self
    }

    /// `EnvFilter` directive for captured log lines.
    pub fn log_filter(mut self, directive: impl Into<String>) -> Self {
        self.options.logs.filter = Some(directive.into());
        self
    }

    pub fn streams(&self) -> &S {
        &self.streams
    }

    /// Run infallible work. Panics are its only failures.
    pub fn run<T, F>(&self, work: F) -> Result<Captured<T>, CaptureError>
    where
        F: FnOnce() -> T,
    {
        self.try_run(|| Ok::<T, Infallible>(work()))
    }

    /// Run work that reports failure through `Result`.
    ///
    /// Invalid options are reported before `work` is called. Failures the
    /// rethrow policy propagates leave after the streams are restored:
    /// panics keep unwinding, errors come back as [`CaptureError::Failed`].
    /// They propagate even if the output could not be collected, in which
    /// case their output is empty.
    pub fn try_run<T, E, F>(&self, work: F) -> Result<Captured<T, E>, CaptureError<E>>
    where
        E: 'static,
        F: FnOnce() -> Result<T, E>,
    {
        let resolved = self.options.resolve().inspect_err(|err| {
            tracing::debug!(%err, "rejected capture options");
        })?;
        let formatting = resolved.preserve_formatting && self.streams.supports_formatting();

        let panics = PanicScope::enter();
        let redirection = self
            .streams
            .redirect(formatting)
            .map_err(CaptureError::Redirect)?;
        let outcome = {
            let _color = ColorScope::enter(formatting);
            let writer = redirection.log_writer();
            logging::with_sink(resolved.log_filter, writer, formatting, || {
                panic::catch_unwind(AssertUnwindSafe(work))
            })
        };
        let finished = redirection.finish();

        let failure = match outcome {
            Ok(Ok(value)) => {
                let bytes = finished.map_err(CaptureError::Redirect)?;
                tracing::trace!(bytes = bytes.len(), "capture succeeded");
                return Ok(Captured::success(value, decode(&bytes)));
            }
            Ok(Err(error)) => Failure::Error(error),
            Err(payload) => Failure::Panic(PanicPayload::new(payload)),
        };
        let propagate = resolved
            .rethrow
            .propagates(|kind| failure.matches(kind));
        let output = match finished {
            Ok(bytes) => decode(&bytes),
            Err(err) if propagate => {
                tracing::warn!(%err, "output of failed work was lost");
                String::new()
            }
            Err(err) => return Err(CaptureError::Redirect(err)),
        };
        tracing::debug!(
            panic = failure.is_panic(),
            propagate,
            bytes = output.len(),
            "captured work failed"
        );

        match failure {
            Failure::Panic(payload) => {
                let record = panics.take_record();
                if propagate {
                    panics.propagate(payload, record);
                }
                Ok(Captured::failure(Failure::Panic(payload), output, record.trace))
            }
            Failure::Error(error) if propagate => Err(CaptureError::Failed { error, output }),
            Failure::Error(error) => Ok(Captured::failure(
                Failure::Error(error),
                output,
                Trace::empty(),
            )),
        }
    }
}

/// Decode captured bytes, dropping one trailing line terminator.
fn decode(bytes: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.ends_with("\r\n") {
        text.truncate(text.len() - 2);
    } else if text.ends_with('\n') {
        text.pop();
    }
    text
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
