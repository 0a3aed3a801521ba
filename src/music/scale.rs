// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scales as stepping alphabets.
//!
//! A scale here is an ordered, cyclic sequence of authored pitch-class
//! spellings anchored on a tonic. It carries no octave information;
//! diatonic stepping walks the sequence and handles octave crossings
//! itself (see [`crate::music::pitch::Pitch::step_up`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::interval::{Interval, Quality};
use super::pitch::{Pitch, PitchClass};
use super::MusicError;

const WHOLE: Interval = Interval::new(Quality::Major, 2);
const HALF: Interval = Interval::new(Quality::Minor, 2);

/// The modes a scale can be derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    Minor,
    Dorian,
}

impl Mode {
    /// The six named steps between consecutive degrees.
    pub fn steps(self) -> [Interval; 6] {
        match self {
            Mode::Major => [WHOLE, WHOLE, HALF, WHOLE, WHOLE, WHOLE],
            Mode::Minor => [WHOLE, HALF, WHOLE, WHOLE, HALF, WHOLE],
            Mode::Dorian => [WHOLE, HALF, WHOLE, WHOLE, WHOLE, HALF],
        }
    }

    /// Parse a mode name from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" | "ionian" => Some(Mode::Major),
            "minor" | "aeolian" => Some(Mode::Minor),
            "dorian" => Some(Mode::Dorian),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
            Mode::Dorian => "dorian",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A seven-degree scale: the unique pitch-class spellings in order,
/// tonic first.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    classes: Vec<PitchClass>,
}

impl Scale {
    /// Derive a scale from a tonic and a mode.
    pub fn new(tonic: PitchClass, mode: Mode) -> Result<Self, MusicError> {
        Self::from_steps(tonic, &mode.steps())
    }

    /// Derive a scale by walking an arbitrary step pattern up from the
    /// tonic, collecting the spelling each step lands on.
    pub fn from_steps(tonic: PitchClass, steps: &[Interval]) -> Result<Self, MusicError> {
        let mut cursor = Pitch::new(tonic, 4);
        let mut classes = vec![tonic];
        for step in steps {
            cursor = cursor.apply_interval_up(*step)?;
            classes.push(cursor.class());
        }
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[PitchClass] {
        &self.classes
    }

    pub fn tonic(&self) -> PitchClass {
        self.classes[0]
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, class: PitchClass) -> bool {
        self.classes.contains(&class)
    }

    /// Index of a spelling within the scale, if present. Matching is
    /// by exact spelling: D minor contains Bb, not A#.
    pub fn position_of(&self, class: PitchClass) -> Option<usize> {
        self.classes.iter().position(|&c| c == class)
    }

    /// The spelling at a 1-based scale degree.
    pub fn degree(&self, degree: usize) -> Option<PitchClass> {
        if degree == 0 || degree > self.classes.len() {
            return None;
        }
        Some(self.classes[degree - 1])
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, class) in self.classes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", class)?;
        }
        write!(f, "]")
    }
}
