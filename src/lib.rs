// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! CANTUS - a cantus firmus generator.
//!
//! Generates melodic lines that satisfy the constraints of 16th-century
//! species-counterpoint pedagogy: bounded length, a single climax note,
//! a controlled leap/step ratio, balanced direction, and a stepwise 2-1
//! cadence back to the tonic.
//!
//! Generation is a heuristic best-first search over partial melodies.
//! Each partial line is scored, placed on a priority-queue frontier, and
//! expanded through a rule engine that knows which next notes are legal
//! given the melodic history so far.

pub mod config;
pub mod melody;
pub mod music;
pub mod search;

pub use melody::line::MelodicLine;
pub use melody::rules::continuations;
pub use music::interval::{Interval, Quality};
pub use music::pitch::{Letter, Pitch, PitchClass};
pub use music::scale::{Mode, Scale};
pub use music::MusicError;
pub use search::builder::{BuilderOptions, CantusFirmusBuilder, Composition};
