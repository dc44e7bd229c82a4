// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Formatting-capability negotiation for writers that emit ANSI escapes.
//!
//! Inside a capture the redirected streams are pipes or buffers, so a TTY
//! check would always say no. The capture publishes the sink's capability
//! for its thread instead; writers that ask [`should_colorize`] before
//! emitting escapes get the right answer in both places.

use std::cell::Cell;
use std::io::IsTerminal;

thread_local! {
    static OVERRIDE: Cell<Option<bool>> = const { Cell::new(None) };
}

/// Determine if color output should be enabled.
///
/// Priority: an active capture's setting → `NO_COLOR=1` disables →
/// `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    OVERRIDE.with(Cell::get).unwrap_or_else(stream_colorize)
}

/// Whether the process streams, left alone, accept color.
pub(crate) fn stream_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Publishes a capture's formatting capability on this thread until dropped.
pub(crate) struct ColorScope {
    previous: Option<bool>,
}

impl ColorScope {
    pub(crate) fn enter(enabled: bool) -> Self {
        let previous = OVERRIDE.with(|cell| cell.replace(Some(enabled)));
        Self { previous }
    }
}

impl Drop for ColorScope {
    fn drop(&mut self) {
        OVERRIDE.with(|cell| cell.set(self.previous));
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
