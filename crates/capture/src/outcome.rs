// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured outcome of one capture.

use std::any::{Any, TypeId};
use std::convert::Infallible;
use std::fmt;

use crate::policy::Kind;
use crate::trace::Trace;

/// The payload of a panic raised by captured work.
pub struct PanicPayload(Box<dyn Any + Send + 'static>);

impl PanicPayload {
    pub fn new(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self(payload)
    }

    /// The panic message, for `panic!` with a literal or format string.
    pub fn message(&self) -> Option<&str> {
        if let Some(message) = self.0.downcast_ref::<&'static str>() {
            return Some(*message);
        }
        self.0.downcast_ref::<String>().map(String::as_str)
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Unwrap for `std::panic::resume_unwind`.
    pub fn into_inner(self) -> Box<dyn Any + Send + 'static> {
        self.0
    }

    fn payload_type_id(&self) -> TypeId {
        (*self.0).type_id()
    }
}

impl fmt::Debug for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => f.debug_tuple("PanicPayload").field(&message).finish(),
            None => f.write_str("PanicPayload(<non-string payload>)"),
        }
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message().unwrap_or("Box<dyn Any>"))
    }
}

/// A failure raised by captured work.
#[derive(Debug)]
pub enum Failure<E> {
    /// The work returned `Err`.
    Error(E),
    /// The work panicked.
    Panic(PanicPayload),
}

impl<E: 'static> Failure<E> {
    /// Whether this failure belongs to `kind`.
    pub fn matches(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Failure::Panic(_), Kind::Panic) | (Failure::Error(_), Kind::Error) => true,
            (Failure::Panic(payload), Kind::Type { id, .. }) => payload.payload_type_id() == *id,
            (Failure::Error(_), Kind::Type { id, .. }) => TypeId::of::<E>() == *id,
            (Failure::Panic(_), Kind::Error) | (Failure::Error(_), Kind::Panic) => false,
        }
    }
}

impl<E> Failure<E> {
    pub fn is_panic(&self) -> bool {
        matches!(self, Failure::Panic(_))
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Failure::Error(error) => Some(error),
            Failure::Panic(_) => None,
        }
    }

    pub fn panic(&self) -> Option<&PanicPayload> {
        match self {
            Failure::Panic(payload) => Some(payload),
            Failure::Error(_) => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Error(error) => error.fmt(f),
            Failure::Panic(payload) => write!(f, "panicked: {payload}"),
        }
    }
}

/// What a capture observed: the work's value or failure, the text it
/// printed, and the trace of the failure if there was one.
#[derive(Debug)]
pub struct Captured<T, E = Infallible> {
    value: Result<T, Failure<E>>,
    output: String,
    trace: Trace,
}

impl<T, E> Captured<T, E> {
    pub(crate) fn success(value: T, output: String) -> Self {
        Self {
            value: Ok(value),
            output,
            trace: Trace::empty(),
        }
    }

    pub(crate) fn failure(failure: Failure<E>, output: String, trace: Trace) -> Self {
        Self {
            value: Err(failure),
            output,
            trace,
        }
    }

    /// True if the work completed without a failure.
    pub fn succeeded(&self) -> bool {
        self.value.is_ok()
    }

    pub fn value(&self) -> &Result<T, Failure<E>> {
        &self.value
    }

    /// Everything written to stdout and stderr during the call, minus one
    /// trailing line terminator.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn into_value(self) -> Result<T, Failure<E>> {
        self.value
    }

    pub fn into_output(self) -> String {
        self.output
    }

    pub fn into_parts(self) -> (Result<T, Failure<E>>, String, Trace) {
        (self.value, self.output, self.trace)
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
