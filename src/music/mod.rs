// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch, interval, and scale primitives.
//!
//! Everything in this module is an immutable value type: a pitch never
//! changes spelling once constructed, and intervals are derived on
//! demand rather than stored.

pub mod interval;
pub mod pitch;
pub mod scale;

use thiserror::Error;

/// Errors produced by the pitch/interval layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MusicError {
    /// Input string does not match the scientific pitch grammar
    /// (letter, up to two matching accidentals, octave number).
    #[error("malformed pitch spelling: {0:?}")]
    MalformedPitch(String),

    /// Quality/size combination absent from the interval tables.
    #[error("undefined interval: {0}")]
    UndefinedInterval(String),

    /// A scale walk was requested from a pitch whose spelling is not
    /// a member of the scale.
    #[error("pitch class {0} is not in the scale")]
    PitchNotInScale(String),
}
