// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor-level redirection of the process's stdout and stderr.
//!
//! Both descriptors are pointed at the write end of a pipe. A drain thread
//! reads the other end into memory for the whole call, so the work can
//! write any amount without filling the pipe and blocking.
//!
//! Ordering follows the order bytes reach the descriptors. `print!` goes
//! through std's line-buffered stdout, so text without a newline reaches
//! descriptor 1 at the next newline or flush; log lines and panic reports
//! flush stdout before they are written. A raw `eprint!` does not, so
//! work that mixes unterminated `print!` with `eprint!` should flush stdout
//! first, as it would for a terminal.

use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd, OwnedFd};
use std::thread::{self, JoinHandle};

use nix::unistd;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use super::{Redirection, Streams};
use crate::color;

/// The real stdout/stderr of this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessStreams;

impl Streams for ProcessStreams {
    type Redirection = ProcessRedirection;

    fn supports_formatting(&self) -> bool {
        color::stream_colorize()
    }

    fn redirect(&self, _formatting: bool) -> io::Result<ProcessRedirection> {
        // Bytes buffered before the call belong to the previous target.
        io::stdout().flush()?;
        io::stderr().flush()?;

        let saved = SavedTargets {
            stdout: io::stdout().as_fd().try_clone_to_owned()?,
            stderr: io::stderr().as_fd().try_clone_to_owned()?,
        };
        let (reader, writer) = sink_pipe()?;
        let drain = thread::Builder::new()
            .name("hush-drain".to_string())
            .spawn(move || drain_pipe(File::from(reader)))?;

        tracing::trace!("redirecting process streams");
        let mut redirection = ProcessRedirection {
            saved: Some(saved),
            writer: Some(writer),
            drain: Some(drain),
        };
        redirection.attach()?;
        Ok(redirection)
    }
}

/// Pipe whose own ends are not inherited by child processes. Children still
/// see the sink through descriptors 1 and 2, which `dup2` leaves inheritable.
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
fn sink_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    Ok(unistd::pipe2(nix::fcntl::OFlag::O_CLOEXEC)?)
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
fn sink_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    use nix::fcntl::{fcntl, FcntlArg, FdFlag};

    let (reader, writer) = unistd::pipe()?;
    for fd in [&reader, &writer] {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    }
    Ok((reader, writer))
}

fn drain_pipe(mut reader: File) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[derive(Debug)]
struct SavedTargets {
    stdout: OwnedFd,
    stderr: OwnedFd,
}

/// Active descriptor redirection; see [`ProcessStreams`].
#[derive(Debug)]
pub struct ProcessRedirection {
    saved: Option<SavedTargets>,
    writer: Option<OwnedFd>,
    drain: Option<JoinHandle<io::Result<Vec<u8>>>>,
}

impl ProcessRedirection {
    fn attach(&mut self) -> io::Result<()> {
        let Some(writer) = &self.writer else {
            return Ok(());
        };
        unistd::dup2(writer.as_raw_fd(), io::stdout().as_raw_fd())?;
        unistd::dup2(writer.as_raw_fd(), io::stderr().as_raw_fd())?;
        Ok(())
    }

    /// Point both descriptors back at the saved targets.
    ///
    /// Fails only when a descriptor could not be reattached. The drain is
    /// then detached instead of joined, since the pipe may never close.
    fn restore(&mut self) -> io::Result<()> {
        let Some(saved) = self.saved.take() else {
            return Ok(());
        };
        if let Err(err) = io::stdout().flush() {
            tracing::warn!(%err, "could not flush stdout into the capture");
        }
        let stdout = unistd::dup2(saved.stdout.as_raw_fd(), io::stdout().as_raw_fd());
        let stderr = unistd::dup2(saved.stderr.as_raw_fd(), io::stderr().as_raw_fd());
        // The sink's own descriptor is the last write end once 1 and 2 are
        // back; closing it lets the drain see end-of-stream.
        self.writer = None;
        if let Err(errno) = stdout.and(stderr) {
            self.drain = None;
            return Err(errno.into());
        }
        Ok(())
    }

    fn collect(&mut self) -> io::Result<Vec<u8>> {
        match self.drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| io::Error::other("output drain thread panicked"))?,
            None => Ok(Vec::new()),
        }
    }
}

impl Redirection for ProcessRedirection {
    fn log_writer(&self) -> BoxMakeWriter {
        BoxMakeWriter::new(|| {
            // Keep a pending partial stdout line ahead of the log line.
            let _ = io::stdout().flush();
            io::stderr()
        })
    }

    fn finish(mut self) -> io::Result<Vec<u8>> {
        self.restore()?;
        let bytes = self.collect()?;
        tracing::trace!(bytes = bytes.len(), "restored process streams");
        Ok(bytes)
    }
}

impl Drop for ProcessRedirection {
    fn drop(&mut self) {
        if self.restore().is_ok() {
            let _ = self.collect();
        }
    }
}
