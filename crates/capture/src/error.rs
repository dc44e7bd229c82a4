// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for capture configuration and execution.

use std::convert::Infallible;
use thiserror::Error;

/// Malformed capture options. Always reported before the work runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A rethrow value that is neither a sentinel nor a known kind.
    #[error("unrecognized rethrow policy `{0}` (expected true, false, \"all\", \"none\" or a kind)")]
    UnknownRethrow(String),

    /// An entry in a rethrow kind list that names no known kind.
    #[error("unknown failure kind `{0}` (expected \"panic\" or \"error\")")]
    UnknownKind(String),

    /// The log filter directive could not be parsed.
    #[error("invalid log filter `{filter}`: {message}")]
    LogFilter { filter: String, message: String },

    /// Options text could not be deserialized.
    #[error("invalid capture options: {0}")]
    Parse(String),
}

/// Errors returned by [`Capture::run`](crate::Capture::run) and
/// [`Capture::try_run`](crate::Capture::try_run).
#[derive(Debug, Error)]
pub enum CaptureError<E = Infallible> {
    /// The options were rejected; the work was never invoked.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The output streams could not be redirected or restored.
    #[error("stream redirection failed: {0}")]
    Redirect(#[source] std::io::Error),

    /// The work returned an error that the rethrow policy propagates.
    #[error("{error}")]
    Failed {
        error: E,
        /// Output written before the work failed.
        output: String,
    },
}

impl<E> CaptureError<E> {
    /// Returns the propagated work error, if this is one.
    pub fn into_failed(self) -> Option<E> {
        match self {
            CaptureError::Failed { error, .. } => Some(error),
            CaptureError::Config(_) | CaptureError::Redirect(_) => None,
        }
    }

    /// Returns the configuration error, if this is one.
    pub fn config(&self) -> Option<&ConfigError> {
        match self {
            CaptureError::Config(err) => Some(err),
            CaptureError::Redirect(_) | CaptureError::Failed { .. } => None,
        }
    }
}
