// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stack traces recorded at the point a failure was raised.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

/// Function prefixes of the frames sitting above the raise site while a
/// panic hook runs: backtrace capture, this crate's hook, and the unwinder.
const PANIC_MACHINERY: &[&str] = &[
    "std::backtrace",
    "std::panicking::",
    "core::panicking::",
    "std::panic::panic_any",
    "rust_begin_unwind",
    "__rustc::rust_begin_unwind",
    "std::sys::backtrace::",
    "std::sys_common::backtrace::",
    "hush_capture::trace::",
    "hush_capture::panic::",
    "<alloc::boxed::Box<F,A> as core::ops::function::Fn<Args>>::call",
];

/// One frame of a [`Trace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Demangled symbol, or `<unknown>` when symbols are unavailable.
    pub function: String,
    /// `file:line:column`, when debug info is present.
    pub location: Option<String>,
}

/// Frames captured where a failure was raised, innermost first.
///
/// Empty for successful captures and for failures the runtime keeps no
/// trace for (returned `Err` values).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    frames: Vec<Frame>,
}

impl Trace {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the current stack, regardless of `RUST_BACKTRACE`.
    pub fn capture() -> Self {
        Self::from_backtrace(&Backtrace::force_capture())
    }

    pub fn from_backtrace(backtrace: &Backtrace) -> Self {
        match backtrace.status() {
            BacktraceStatus::Captured => Self::parse(&backtrace.to_string()),
            _ => Self::empty(),
        }
    }

    /// Capture the current stack from inside a panic hook, dropping the
    /// frames that belong to the hook and the unwinding machinery.
    pub(crate) fn at_panic() -> Self {
        let mut trace = Self::capture();
        trace.strip_panic_machinery();
        trace
    }

    /// Parse the rendered form of a [`Backtrace`].
    ///
    /// Frame lines look like `  12: path::to::function`, optionally followed
    /// by `at file.rs:10:5`. Anything else (notes, blank lines) is ignored.
    pub(crate) fn parse(text: &str) -> Self {
        let mut frames: Vec<Frame> = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if let Some((index, function)) = line.split_once(": ") {
                if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) {
                    frames.push(Frame {
                        function: function.trim().to_string(),
                        location: None,
                    });
                    continue;
                }
            }
            if let Some(location) = line.strip_prefix("at ") {
                if let Some(frame) = frames.last_mut() {
                    if frame.location.is_none() {
                        frame.location = Some(location.trim().to_string());
                    }
                }
            }
        }
        Self { frames }
    }

    fn strip_panic_machinery(&mut self) {
        let raise_site = self.frames.iter().position(|frame| {
            !PANIC_MACHINERY
                .iter()
                .any(|prefix| frame.function.starts_with(prefix))
        });
        if let Some(index) = raise_site {
            self.frames.drain(..index);
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, frame) in self.frames.iter().enumerate() {
            writeln!(f, "{index:>4}: {}", frame.function)?;
            if let Some(location) = &frame.location {
                writeln!(f, "             at {location}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "trace_tests.rs"]
mod tests;
