// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped `tracing` subscriber that writes log lines into a capture's sink.

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

/// Filter used when neither the options nor `RUST_LOG` name one.
pub(crate) const DEFAULT_FILTER: &str = "info";

/// Pick the filter directive: explicit option, then `RUST_LOG`, then
/// [`DEFAULT_FILTER`].
pub(crate) fn directive(explicit: Option<&str>) -> String {
    if let Some(filter) = explicit {
        return filter.to_string();
    }
    match std::env::var("RUST_LOG") {
        Ok(filter) if !filter.trim().is_empty() => filter,
        _ => DEFAULT_FILTER.to_string(),
    }
}

pub(crate) fn parse_filter(directive: &str) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_new(directive).map_err(|e| ConfigError::LogFilter {
        filter: directive.to_string(),
        message: e.to_string(),
    })
}

/// Run `f` with a default subscriber that writes to `writer`.
///
/// Lines carry no timestamp or target so captured output is reproducible.
/// With no filter, `f` runs under whatever subscriber is already in effect.
pub(crate) fn with_sink<R>(
    filter: Option<EnvFilter>,
    writer: BoxMakeWriter,
    ansi: bool,
    f: impl FnOnce() -> R,
) -> R {
    let Some(filter) = filter else {
        return f();
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
