// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rethrow policy: which failures escape a capture and which are packaged
//! into the result.
//!
//! Configuration accepts several shapes, all resolved into a single
//! [`RethrowPolicy`] before any work runs:
//!
//! ```toml
//! rethrow = true                 # propagate everything
//! rethrow = "none"               # capture everything
//! rethrow = "panic"              # propagate panics only
//! rethrow = ["panic", "error"]   # propagate the listed kinds
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// A class of failure a policy can match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Any panic, whatever its payload.
    Panic,
    /// Any `Err` returned by the work.
    Error,
    /// An `Err` of this exact type, or a panic carrying this payload type.
    Type { id: TypeId, name: &'static str },
}

impl Kind {
    pub fn of<T: Any>() -> Self {
        Kind::Type {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Look up a kind by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "panic" => Some(Kind::Panic),
            "error" => Some(Kind::Error),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::Panic => "panic",
            Kind::Error => "error",
            Kind::Type { name, .. } => *name,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which failures propagate out of a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RethrowPolicy {
    /// Every failure propagates; capture is transparent to failures.
    #[default]
    All,
    /// Every failure is captured into the result.
    None,
    /// Failures matching one of the kinds propagate; the rest are captured.
    Only(HashSet<Kind>),
}

impl RethrowPolicy {
    pub fn only(kinds: impl IntoIterator<Item = Kind>) -> Self {
        RethrowPolicy::Only(kinds.into_iter().collect())
    }

    /// Whether a failure matching `matches` should propagate.
    pub(crate) fn propagates(&self, matches: impl Fn(&Kind) -> bool) -> bool {
        match self {
            RethrowPolicy::All => true,
            RethrowPolicy::None => false,
            RethrowPolicy::Only(kinds) => kinds.iter().any(matches),
        }
    }
}

/// A rethrow value as supplied by a caller or a config file.
///
/// Every accepted shape resolves to a [`RethrowPolicy`]; values that do not
/// (an unknown sentinel, an unknown kind name) are rejected with a
/// [`ConfigError`] when the capture starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RethrowSetting {
    /// `true` propagates everything, `false` captures everything.
    Flag(bool),
    /// `"all"`, `"none"`, or a single kind name.
    Name(String),
    /// A list of kind names.
    Names(Vec<String>),
    Kinds(Vec<Kind>),
    Policy(RethrowPolicy),
}

impl RethrowSetting {
    pub fn resolve(&self) -> Result<RethrowPolicy, ConfigError> {
        match self {
            RethrowSetting::Flag(true) => Ok(RethrowPolicy::All),
            RethrowSetting::Flag(false) => Ok(RethrowPolicy::None),
            RethrowSetting::Name(name) => match name.as_str() {
                "all" => Ok(RethrowPolicy::All),
                "none" => Ok(RethrowPolicy::None),
                other => Kind::from_name(other)
                    .map(|kind| RethrowPolicy::only([kind]))
                    .ok_or_else(|| ConfigError::UnknownRethrow(other.to_string())),
            },
            RethrowSetting::Names(names) => names
                .iter()
                .map(|name| {
                    Kind::from_name(name).ok_or_else(|| ConfigError::UnknownKind(name.clone()))
                })
                .collect::<Result<HashSet<_>, _>>()
                .map(RethrowPolicy::Only),
            RethrowSetting::Kinds(kinds) => Ok(RethrowPolicy::only(kinds.iter().copied())),
            RethrowSetting::Policy(policy) => Ok(policy.clone()),
        }
    }
}

impl Default for RethrowSetting {
    fn default() -> Self {
        RethrowSetting::Policy(RethrowPolicy::All)
    }
}

impl From<bool> for RethrowSetting {
    fn from(flag: bool) -> Self {
        RethrowSetting::Flag(flag)
    }
}

impl From<&str> for RethrowSetting {
    fn from(name: &str) -> Self {
        RethrowSetting::Name(name.to_string())
    }
}

impl From<String> for RethrowSetting {
    fn from(name: String) -> Self {
        RethrowSetting::Name(name)
    }
}

impl From<Kind> for RethrowSetting {
    fn from(kind: Kind) -> Self {
        RethrowSetting::Kinds(vec![kind])
    }
}

impl From<Vec<Kind>> for RethrowSetting {
    fn from(kinds: Vec<Kind>) -> Self {
        RethrowSetting::Kinds(kinds)
    }
}

impl<const N: usize> From<[Kind; N]> for RethrowSetting {
    fn from(kinds: [Kind; N]) -> Self {
        RethrowSetting::Kinds(kinds.to_vec())
    }
}

impl From<RethrowPolicy> for RethrowSetting {
    fn from(policy: RethrowPolicy) -> Self {
        RethrowSetting::Policy(policy)
    }
}

impl<'de> Deserialize<'de> for RethrowSetting {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Flag(bool),
            Name(String),
            Names(Vec<String>),
        }

        match Helper::deserialize(deserializer)? {
            Helper::Flag(flag) => Ok(RethrowSetting::Flag(flag)),
            Helper::Name(name) => Ok(RethrowSetting::Name(name)),
            Helper::Names(names) => Ok(RethrowSetting::Names(names)),
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
