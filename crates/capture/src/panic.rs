// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Panic hook that records raise-site traces for active captures.
//!
//! The hook is installed once per process and chains to whatever hook was
//! present before. Threads with no capture in progress see the previous hook
//! unchanged; a thread inside a capture has its panics recorded here and
//! not printed, since the capture either returns the failure or re-raises it.

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::panic;
use std::sync::Once;

use crate::outcome::PanicPayload;
use crate::trace::Trace;

static INSTALL: Once = Once::new();

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST: RefCell<Option<PanicRecord>> = const { RefCell::new(None) };
}

/// What the hook saw for the most recent panic on this thread.
#[derive(Debug, Default)]
pub(crate) struct PanicRecord {
    pub(crate) trace: Trace,
    /// The hook's rendering: `panicked at file:line:col:\nmessage`.
    pub(crate) report: String,
}

fn install() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }
            let record = PanicRecord {
                trace: Trace::at_panic(),
                report: info.to_string(),
            };
            LAST.with(|last| *last.borrow_mut() = Some(record));
        }));
    });
}

/// Marks the current thread as capturing for as long as it lives.
pub(crate) struct PanicScope {
    _private: (),
}

impl PanicScope {
    pub(crate) fn enter() -> Self {
        install();
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        LAST.with(|last| last.borrow_mut().take());
        Self { _private: () }
    }

    /// Take the record of the panic that just unwound into this scope.
    pub(crate) fn take_record(&self) -> PanicRecord {
        LAST.with(|last| last.borrow_mut().take()).unwrap_or_default()
    }

    /// Leave the scope and continue unwinding with `payload`.
    ///
    /// An enclosing capture gets the record back so it can report the same
    /// trace. Leaving the outermost capture prints the report to the
    /// restored stderr, as the default hook would have.
    pub(crate) fn propagate(self, payload: PanicPayload, record: PanicRecord) -> ! {
        drop(self);
        if DEPTH.with(Cell::get) > 0 {
            LAST.with(|last| *last.borrow_mut() = Some(record));
        } else {
            let thread = std::thread::current();
            let backtrace = std::env::var("RUST_BACKTRACE").ok();
            let report = render_report(
                thread.name().unwrap_or("<unnamed>"),
                &record,
                backtrace.as_deref(),
            );
            let _ = io::stdout().flush();
            let _ = io::stderr().write_all(report.as_bytes());
            tracing::debug!(frames = record.trace.len(), "re-raising captured panic");
        }
        panic::resume_unwind(payload.into_inner())
    }
}

/// The default hook's report for a panic on `thread`, given the
/// `RUST_BACKTRACE` setting.
fn render_report(thread: &str, record: &PanicRecord, backtrace: Option<&str>) -> String {
    let mut report = format!("thread '{thread}' {}\n", record.report);
    match backtrace {
        Some(setting) if setting != "0" => {
            report.push_str("stack backtrace:\n");
            report.push_str(&record.trace.to_string());
        }
        _ => report.push_str(
            "note: run with `RUST_BACKTRACE=1` environment variable to display a backtrace\n",
        ),
    }
    report
}

impl Drop for PanicScope {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

#[cfg(test)]
#[path = "panic_tests.rs"]
mod tests;
