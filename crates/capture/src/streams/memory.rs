// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process output targets.

use std::io::{self, Write};
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use super::{Redirection, Streams};

/// Growable byte buffer shared by every clone.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    /// Contents decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.bytes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }

    /// Remove and return the contents.
    pub fn take(&self) -> Vec<u8> {
        mem::take(&mut *self.bytes.lock())
    }

    fn same(&self, other: &SharedBuffer) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Target {
    buffer: SharedBuffer,
    formatting: bool,
}

#[derive(Debug, Clone)]
struct Targets {
    stdout: Target,
    stderr: Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Stdout,
    Stderr,
}

/// Stdout/stderr handles living in memory.
///
/// Work writes through [`stdout`](Self::stdout) and [`stderr`](Self::stderr);
/// outside a capture those land in the console buffers.
#[derive(Debug, Clone)]
pub struct MemoryStreams {
    targets: Arc<Mutex<Targets>>,
    console_stdout: SharedBuffer,
    console_stderr: SharedBuffer,
}

impl MemoryStreams {
    pub fn new() -> Self {
        Self::with_formatting(false)
    }

    /// Streams whose console targets report `formatting` capability.
    pub fn with_formatting(formatting: bool) -> Self {
        let console_stdout = SharedBuffer::new();
        let console_stderr = SharedBuffer::new();
        let targets = Targets {
            stdout: Target {
                buffer: console_stdout.clone(),
                formatting,
            },
            stderr: Target {
                buffer: console_stderr.clone(),
                formatting,
            },
        };
        Self {
            targets: Arc::new(Mutex::new(targets)),
            console_stdout,
            console_stderr,
        }
    }

    pub fn stdout(&self) -> StreamWriter {
        StreamWriter {
            targets: Arc::clone(&self.targets),
            channel: Channel::Stdout,
        }
    }

    pub fn stderr(&self) -> StreamWriter {
        StreamWriter {
            targets: Arc::clone(&self.targets),
            channel: Channel::Stderr,
        }
    }

    /// Everything that reached the original stdout target.
    pub fn console_stdout(&self) -> String {
        self.console_stdout.text()
    }

    /// Everything that reached the original stderr target.
    pub fn console_stderr(&self) -> String {
        self.console_stderr.text()
    }

    /// True while any capture has these streams pointed away from the console.
    pub fn is_redirected(&self) -> bool {
        let targets = self.targets.lock();
        !(targets.stdout.buffer.same(&self.console_stdout)
            && targets.stderr.buffer.same(&self.console_stderr))
    }
}

impl Default for MemoryStreams {
    fn default() -> Self {
        Self::new()
    }
}

impl Streams for MemoryStreams {
    type Redirection = MemoryRedirection;

    fn supports_formatting(&self) -> bool {
        self.targets.lock().stdout.formatting
    }

    fn redirect(&self, formatting: bool) -> io::Result<MemoryRedirection> {
        let sink = SharedBuffer::new();
        let target = Target {
            buffer: sink.clone(),
            formatting,
        };
        let saved = {
            let mut targets = self.targets.lock();
            mem::replace(
                &mut *targets,
                Targets {
                    stdout: target.clone(),
                    stderr: target,
                },
            )
        };
        Ok(MemoryRedirection {
            targets: Arc::clone(&self.targets),
            saved: Some(saved),
            sink,
        })
    }
}

/// A writer bound to one channel of a [`MemoryStreams`].
///
/// Each write goes to whatever target the channel points at right then.
#[derive(Debug, Clone)]
pub struct StreamWriter {
    targets: Arc<Mutex<Targets>>,
    channel: Channel,
}

impl StreamWriter {
    fn target(&self) -> Target {
        let targets = self.targets.lock();
        match self.channel {
            Channel::Stdout => targets.stdout.clone(),
            Channel::Stderr => targets.stderr.clone(),
        }
    }

    /// Whether the current target accepts formatting escapes.
    pub fn supports_formatting(&self) -> bool {
        self.target().formatting
    }
}

impl Write for StreamWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self.target().buffer;
        buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Active in-memory redirection; see [`MemoryStreams`].
#[derive(Debug)]
pub struct MemoryRedirection {
    targets: Arc<Mutex<Targets>>,
    saved: Option<Targets>,
    sink: SharedBuffer,
}

impl MemoryRedirection {
    fn restore(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self.targets.lock() = saved;
        }
    }
}

impl Redirection for MemoryRedirection {
    fn log_writer(&self) -> BoxMakeWriter {
        let sink = self.sink.clone();
        BoxMakeWriter::new(move || sink.clone())
    }

    fn finish(mut self) -> io::Result<Vec<u8>> {
        self.restore();
        Ok(self.sink.take())
    }
}

impl Drop for MemoryRedirection {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
