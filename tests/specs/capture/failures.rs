// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Panics, errors and rejected options.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use similar_asserts::assert_eq;

use crate::prelude::*;

pub const SPECS: &[Spec] = &[
    Spec { name: "failures::suppressed_panic_is_returned", run: suppressed_panic_is_returned },
    Spec { name: "failures::default_policy_reraises_panics", run: default_policy_reraises_panics },
    Spec { name: "failures::listed_kinds_propagate", run: listed_kinds_propagate },
    Spec { name: "failures::propagated_errors_keep_output", run: propagated_errors_keep_output },
    Spec { name: "failures::captured_errors_keep_output", run: captured_errors_keep_output },
    Spec { name: "failures::invalid_policy_never_runs_work", run: invalid_policy_never_runs_work },
    Spec { name: "failures::options_load_from_toml", run: options_load_from_toml },
];

fn suppressed_panic_is_returned() {
    let captured = Capture::new()
        .rethrow("none")
        .run(|| -> u32 { panic!("boom") })
        .unwrap();
    assert!(!captured.succeeded());
    assert_eq!(captured.output(), "");
    let failure = captured.value().as_ref().unwrap_err();
    assert_eq!(failure.panic().and_then(|payload| payload.message()), Some("boom"));
    assert!(!captured.trace().is_empty());
}

fn default_policy_reraises_panics() {
    let before = stream_identity();
    let escaped = panic::catch_unwind(|| {
        capture(|| -> u32 {
            println!("partial");
            panic!("boom")
        })
    });
    let payload = escaped.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>().copied(), Some("boom"));
    assert_eq!(stream_identity(), before);
}

#[derive(Debug)]
struct Fatal;

fn listed_kinds_propagate() {
    let capture = Capture::new().rethrow([Kind::of::<Fatal>()]);

    let captured = capture.run(|| -> u32 { panic!("minor") }).unwrap();
    assert!(!captured.succeeded());

    let escaped = panic::catch_unwind(AssertUnwindSafe(|| {
        capture.run(|| -> u32 { panic::panic_any(Fatal) })
    }));
    assert!(escaped.unwrap_err().is::<Fatal>());
}

fn propagated_errors_keep_output() {
    let err = try_capture(|| {
        eprintln!("tried");
        Err::<u32, _>("refused")
    })
    .unwrap_err();
    match err {
        CaptureError::Failed { error, output } => {
            assert_eq!(error, "refused");
            assert_eq!(output, "tried");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

fn captured_errors_keep_output() {
    let captured = Capture::new()
        .rethrow(RethrowPolicy::only([Kind::Panic]))
        .try_run(|| {
            println!("tried");
            Err::<u32, _>("refused")
        })
        .unwrap();
    assert_eq!(captured.output(), "tried");
    let failure = captured.value().as_ref().unwrap_err();
    assert_eq!(failure.error(), Some(&"refused"));
    assert!(captured.trace().is_empty());
}

fn invalid_policy_never_runs_work() {
    let before = stream_identity();
    let called = Cell::new(false);
    let err = Capture::new()
        .rethrow("sometimes")
        .run(|| called.set(true))
        .unwrap_err();
    assert_eq!(
        err.config(),
        Some(&ConfigError::UnknownRethrow("sometimes".to_string()))
    );
    assert!(!called.get());
    assert_eq!(stream_identity(), before);
}

fn options_load_from_toml() {
    let options = hush_capture::CaptureOptions::from_toml(
        r#"
rethrow = "none"

[logs]
capture = false
"#,
    )
    .unwrap();
    let captured = Capture::new()
        .options(options)
        .run(|| -> u32 {
            tracing::error!("not captured");
            println!("printed");
            panic!("kept")
        })
        .unwrap();
    assert_eq!(captured.output(), "printed");
    assert!(!captured.succeeded());
}
