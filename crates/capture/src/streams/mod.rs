// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output targets a capture redirects.
//!
//! [`ProcessStreams`] swaps the real stdout/stderr descriptors;
//! [`MemoryStreams`] is an in-process stand-in whose writers are handed to
//! the work explicitly, for tests and for hosts that route output themselves.

mod memory;
mod process;

pub use memory::{MemoryRedirection, MemoryStreams, SharedBuffer, StreamWriter};
pub use process::{ProcessRedirection, ProcessStreams};

use std::io;

use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Current stdout/stderr targets that can be pointed at a sink.
pub trait Streams {
    type Redirection: Redirection;

    /// Whether the current targets accept formatting escapes.
    fn supports_formatting(&self) -> bool;

    /// Save the current targets and point stdout and stderr at a fresh sink.
    ///
    /// `formatting` is the capability the sink reports to writers.
    fn redirect(&self, formatting: bool) -> io::Result<Self::Redirection>;
}

/// An active redirection. Dropping it restores the saved targets.
pub trait Redirection {
    /// Writer for log lines, interleaved with stderr.
    fn log_writer(&self) -> BoxMakeWriter;

    /// Restore the saved targets and return every byte the sink received.
    fn finish(self) -> io::Result<Vec<u8>>;
}
