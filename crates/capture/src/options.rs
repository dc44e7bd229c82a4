// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capture options and their validation.
//!
//! Options may be built in code or loaded from TOML:
//!
//! ```toml
//! rethrow = ["panic"]
//! preserve_formatting = true
//!
//! [logs]
//! filter = "debug"
//! ```

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::logging;
use crate::policy::{RethrowPolicy, RethrowSetting};

/// Options for one capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureOptions {
    /// Which failures propagate instead of being captured.
    pub rethrow: RethrowSetting,
    /// Keep formatting escapes when the original streams support them.
    pub preserve_formatting: bool,
    pub logs: LogOptions,
}

/// How `tracing` output is routed during a capture.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogOptions {
    /// Install a scoped subscriber writing into the capture.
    pub capture: bool,
    /// `EnvFilter` directive; falls back to `RUST_LOG`, then `info`.
    pub filter: Option<String>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            capture: true,
            filter: None,
        }
    }
}

/// Options checked and converted for a single run.
pub(crate) struct Resolved {
    pub(crate) rethrow: RethrowPolicy,
    pub(crate) preserve_formatting: bool,
    pub(crate) log_filter: Option<EnvFilter>,
}

impl CaptureOptions {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.message().to_string()))
    }

    /// Check every option without running anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve().map(|_| ())
    }

    pub(crate) fn resolve(&self) -> Result<Resolved, ConfigError> {
        let rethrow = self.rethrow.resolve()?;
        let log_filter = if self.logs.capture {
            let directive = logging::directive(self.logs.filter.as_deref());
            Some(logging::parse_filter(&directive)?)
        } else {
            None
        };
        Ok(Resolved {
            rethrow,
            preserve_formatting: self.preserve_formatting,
            log_filter,
        })
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
