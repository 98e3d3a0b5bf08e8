//! Error types for Tideflow.
//!
//! The crate uses one typed error enum, [`Error`], and the crate-wide
//! [`Result`] alias. Errors are never caught inside the core: a failing
//! processor unwinds through the stream graph to the caller of
//! `add_event`, and batch collection operations propagate the same way.
//!
//! Non-fatal anomalies (a non-numeric value under linear interpolation, a
//! suppressed negative rate) are reported with a `tracing` warning and a
//! null at the affected field instead of an error.

use crate::key::KeyKind;
use thiserror::Error;

/// The error type for all fallible Tideflow operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation requires a specific key variant (e.g. alignment needs
    /// `Time`-keyed events) but received another.
    #[error("operation `{op}` requires {expected} keys, found {actual}")]
    InvalidKeyKind {
        /// The operation that rejected the key.
        op: &'static str,
        /// The key variant the operation requires.
        expected: KeyKind,
        /// A description of what was found instead.
        actual: String,
    },

    /// An index string did not match the duration or calendar grammar.
    #[error("malformed index string `{0}`")]
    MalformedIndexString(String),

    /// A duration literal had an unrecognized unit or a missing numeric part.
    #[error("invalid duration string `{0}`")]
    InvalidDurationString(String),

    /// An alignment method name outside the recognized set. Only reachable
    /// through dynamic construction (string parsing).
    #[error("unknown alignment method `{0}`")]
    UnknownAlignmentMethod(String),

    /// A fill method name outside the recognized set. Only reachable
    /// through dynamic construction (string parsing).
    #[error("unknown fill method `{0}`")]
    UnknownFillMethod(String),

    /// An aggregation spec that cannot be interpreted (empty, or with a
    /// duplicate or empty output field).
    #[error("invalid aggregation spec: {0}")]
    AggregationSpec(String),

    /// A percentile rank outside `[0, 100]`.
    #[error("percentile {0} is out of range 0..=100")]
    OutOfRangePercentile(f64),

    /// A processor field spec that violates the processor's constraints
    /// (e.g. linear fill accepts exactly one field path).
    #[error("invalid field spec: {0}")]
    InvalidFieldSpec(String),

    /// A wire-format document that cannot be decoded into events.
    #[error("malformed wire document: {0}")]
    MalformedWire(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
