// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner and helpers shared by the capture specs.

use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::fs::MetadataExt;
use std::panic;
use std::process::ExitCode;

pub use hush_capture::{
    capture, try_capture, Capture, CaptureError, ConfigError, Kind, RethrowPolicy,
};

/// One named scenario.
pub struct Spec {
    pub name: &'static str,
    pub run: fn(),
}

/// Run every spec in order on the main thread and report like libtest.
pub fn run_all(groups: &[&[Spec]]) -> ExitCode {
    let specs: Vec<&Spec> = groups.iter().flat_map(|group| group.iter()).collect();
    println!("\nrunning {} specs", specs.len());

    let mut failed = Vec::new();
    for spec in &specs {
        let passed = panic::catch_unwind(spec.run).is_ok();
        println!("test {} ... {}", spec.name, if passed { "ok" } else { "FAILED" });
        if !passed {
            failed.push(spec.name);
        }
    }

    if !failed.is_empty() {
        println!("\nfailures:");
        for name in &failed {
            println!("    {name}");
        }
    }
    let status = if failed.is_empty() { "ok" } else { "FAILED" };
    println!(
        "\ntest result: {status}. {} passed; {} failed\n",
        specs.len() - failed.len(),
        failed.len()
    );
    let _ = io::stdout().flush();

    if failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Device and inode behind stdout and stderr right now.
pub fn stream_identity() -> [(u64, u64); 2] {
    [identity(io::stdout().as_fd()), identity(io::stderr().as_fd())]
}

fn identity(fd: BorrowedFd<'_>) -> (u64, u64) {
    let file = File::from(fd.try_clone_to_owned().unwrap());
    let meta = file.metadata().unwrap();
    (meta.dev(), meta.ino())
}
