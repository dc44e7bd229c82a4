// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What ends up in the captured text.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use similar_asserts::assert_eq;

use crate::prelude::*;

pub const SPECS: &[Spec] = &[
    Spec { name: "output::captures_printed_text_and_value", run: captures_printed_text_and_value },
    Spec { name: "output::silent_work_is_empty", run: silent_work_is_empty },
    Spec { name: "output::interleaves_stdout_and_stderr", run: interleaves_stdout_and_stderr },
    Spec { name: "output::flushed_partial_line_precedes_stderr", run: flushed_partial_line_precedes_stderr },
    Spec { name: "output::excludes_text_outside_the_call", run: excludes_text_outside_the_call },
    Spec { name: "output::keeps_inner_trailing_newlines", run: keeps_inner_trailing_newlines },
    Spec { name: "output::decodes_invalid_utf8_lossily", run: decodes_invalid_utf8_lossily },
    Spec { name: "output::captures_large_unterminated_output", run: captures_large_unterminated_output },
    Spec { name: "output::captures_child_processes", run: captures_child_processes },
    Spec { name: "output::silenced_children_do_not_hold_the_capture", run: silenced_children_do_not_hold_the_capture },
    Spec { name: "output::restores_stream_identity", run: restores_stream_identity },
    Spec { name: "output::leaves_environment_untouched", run: leaves_environment_untouched },
    Spec { name: "output::repeats_identically", run: repeats_identically },
    Spec { name: "output::nests", run: nests },
];

fn captures_printed_text_and_value() {
    let captured = capture(|| {
        println!("test");
        42
    })
    .unwrap();
    assert_eq!(captured.output(), "test");
    assert_eq!(captured.into_value().ok(), Some(42));
}

fn silent_work_is_empty() {
    let captured = capture(|| ()).unwrap();
    assert_eq!(captured.output(), "");
    assert!(captured.succeeded());
}

fn interleaves_stdout_and_stderr() {
    let captured = capture(|| {
        println!("a");
        eprintln!("b");
        println!("c");
    })
    .unwrap();
    assert_eq!(captured.output(), "a\nb\nc");
}

fn flushed_partial_line_precedes_stderr() {
    let captured = capture(|| {
        print!("a");
        io::stdout().flush().unwrap();
        eprint!("b");
    })
    .unwrap();
    assert_eq!(captured.output(), "ab");
}

fn excludes_text_outside_the_call() {
    println!("printed before the capture");
    let captured = capture(|| println!("during")).unwrap();
    eprintln!("printed after the capture");
    assert_eq!(captured.output(), "during");
}

fn keeps_inner_trailing_newlines() {
    let captured = capture(|| print!("line\n\n")).unwrap();
    assert_eq!(captured.output(), "line\n");
}

fn decodes_invalid_utf8_lossily() {
    let captured = capture(|| io::stdout().write_all(b"a\xffb\n").unwrap()).unwrap();
    assert_eq!(captured.output(), "a\u{fffd}b");
}

fn captures_large_unterminated_output() {
    const CHUNK: [u8; 80] = [b'x'; 80];
    const REPEATS: usize = 1 << 20;
    let captured = capture(|| {
        let mut out = io::stdout().lock();
        for _ in 0..REPEATS {
            out.write_all(&CHUNK).unwrap();
        }
    })
    .unwrap();
    assert_eq!(captured.output().len(), CHUNK.len() * REPEATS);
    assert!(captured.output().bytes().all(|b| b == b'x'));
}

fn captures_child_processes() {
    let captured = capture(|| {
        Command::new("sh")
            .args(["-c", "echo from child; echo to stderr >&2"])
            .status()
            .unwrap()
    })
    .unwrap();
    assert!(captured.value().as_ref().is_ok_and(|status| status.success()));
    assert_eq!(captured.output(), "from child\nto stderr");
}

fn silenced_children_do_not_hold_the_capture() {
    let started = Instant::now();
    let mut child = capture(|| {
        Command::new("sleep")
            .arg("5")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap()
    })
    .unwrap()
    .into_value()
    .unwrap();
    let elapsed = started.elapsed();
    let _ = child.kill();
    let _ = child.wait();
    assert!(elapsed < Duration::from_secs(3), "capture waited {elapsed:?}");
}

fn restores_stream_identity() {
    let before = stream_identity();
    let inside = capture(stream_identity).unwrap().into_value().unwrap();
    assert_ne!(inside, before);
    assert_eq!(stream_identity(), before);
}

fn leaves_environment_untouched() {
    let before: BTreeMap<_, _> = std::env::vars_os().collect();
    capture(|| println!("env")).unwrap();
    let after: BTreeMap<_, _> = std::env::vars_os().collect();
    assert!(before == after, "environment changed");
}

fn repeats_identically() {
    let first = capture(|| println!("same")).unwrap().into_output();
    let second = capture(|| println!("same")).unwrap().into_output();
    assert_eq!(first, second);
}

fn nests() {
    let outer = capture(|| {
        println!("a");
        let inner = capture(|| eprintln!("b")).unwrap();
        println!("c");
        inner.into_output()
    })
    .unwrap();
    assert_eq!(outer.output(), "a\nc");
    assert_eq!(outer.into_value().ok().as_deref(), Some("b"));
}
