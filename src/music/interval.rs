// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Interval naming and arithmetic.
//!
//! An interval is a derived relationship between two pitches: a
//! 1-based generic size (diatonic distance counting both endpoints)
//! plus a quality. Qualities come from fixed, finite tables keyed by
//! the simple size (1-7) and the semitone span mod 12; combinations
//! outside the tables are undefined and surface as errors.

use std::fmt;

use super::pitch::Pitch;
use super::MusicError;

/// Interval quality classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    Diminished,
    Minor,
    Major,
    Perfect,
    Augmented,
}

impl Quality {
    /// Single-letter symbol used in interval names.
    pub fn symbol(self) -> char {
        match self {
            Quality::Diminished => 'd',
            Quality::Minor => 'm',
            Quality::Major => 'M',
            Quality::Perfect => 'P',
            Quality::Augmented => 'A',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'd' => Some(Quality::Diminished),
            'm' => Some(Quality::Minor),
            'M' => Some(Quality::Major),
            'P' => Some(Quality::Perfect),
            'A' => Some(Quality::Augmented),
            _ => None,
        }
    }

    /// Quality of a simple interval spanning the given semitones
    /// (mod 12). The augmented seventh is keyed at 0 because its 12
    /// semitones wrap, and the unison row carries an 11 entry so that
    /// diminished octaves reduce onto it.
    pub fn from_span(simple_size: u32, semitones_mod_12: u32) -> Option<Self> {
        use Quality::*;
        match (simple_size, semitones_mod_12) {
            (1, 0) => Some(Perfect),
            (1, 1) => Some(Augmented),
            (1, 11) => Some(Diminished),
            (2, 0) => Some(Diminished),
            (2, 1) => Some(Minor),
            (2, 2) => Some(Major),
            (2, 3) => Some(Augmented),
            (3, 2) => Some(Diminished),
            (3, 3) => Some(Minor),
            (3, 4) => Some(Major),
            (3, 5) => Some(Augmented),
            (4, 4) => Some(Diminished),
            (4, 5) => Some(Perfect),
            (4, 6) => Some(Augmented),
            (5, 6) => Some(Diminished),
            (5, 7) => Some(Perfect),
            (5, 8) => Some(Augmented),
            (6, 7) => Some(Diminished),
            (6, 8) => Some(Minor),
            (6, 9) => Some(Major),
            (6, 10) => Some(Augmented),
            (7, 9) => Some(Diminished),
            (7, 10) => Some(Minor),
            (7, 11) => Some(Major),
            (7, 0) => Some(Augmented),
            _ => None,
        }
    }

    /// Semitone span of this quality at a simple size (1-7). The
    /// diminished unison is -1 (only ever reached by reduction from a
    /// diminished octave) and the augmented seventh is a full 12.
    pub fn simple_semitones(self, simple_size: u32) -> Option<i32> {
        use Quality::*;
        match (self, simple_size) {
            (Diminished, 1) => Some(-1),
            (Perfect, 1) => Some(0),
            (Augmented, 1) => Some(1),
            (Diminished, 2) => Some(0),
            (Minor, 2) => Some(1),
            (Major, 2) => Some(2),
            (Augmented, 2) => Some(3),
            (Diminished, 3) => Some(2),
            (Minor, 3) => Some(3),
            (Major, 3) => Some(4),
            (Augmented, 3) => Some(5),
            (Diminished, 4) => Some(4),
            (Perfect, 4) => Some(5),
            (Augmented, 4) => Some(6),
            (Diminished, 5) => Some(6),
            (Perfect, 5) => Some(7),
            (Augmented, 5) => Some(8),
            (Diminished, 6) => Some(7),
            (Minor, 6) => Some(8),
            (Major, 6) => Some(9),
            (Augmented, 6) => Some(10),
            (Diminished, 7) => Some(9),
            (Minor, 7) => Some(10),
            (Major, 7) => Some(11),
            (Augmented, 7) => Some(12),
            _ => None,
        }
    }
}

/// A named interval: quality plus 1-based generic size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    quality: Quality,
    size: u32,
}

impl Interval {
    pub const fn new(quality: Quality, size: u32) -> Self {
        Self { quality, size }
    }

    pub fn quality(self) -> Quality {
        self.quality
    }

    pub fn size(self) -> u32 {
        self.size
    }

    pub fn simple_size(self) -> u32 {
        simple_size_of(self.size)
    }

    /// Parse an interval name such as `M2`, `P5`, `d7`, `m10`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let quality = Quality::from_symbol(chars.next()?)?;
        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let size: u32 = digits.parse().ok()?;
        if size == 0 {
            return None;
        }
        Some(Interval::new(quality, size))
    }

    /// Name the interval between two pitches. Order-independent;
    /// equal pitches give a perfect unison. Spellings whose span is
    /// not in the quality table cannot be named.
    pub fn between(a: Pitch, b: Pitch) -> Result<Interval, MusicError> {
        if a == b {
            return Ok(Interval::new(Quality::Perfect, 1));
        }
        let size = generic_size(a, b);
        let semitones = a.semitones_to(b) % 12;
        let quality = Quality::from_span(simple_size_of(size), semitones).ok_or_else(|| {
            MusicError::UndefinedInterval(format!(
                "{} to {} (size {}, {} semitones)",
                a,
                b,
                size,
                a.semitones_to(b)
            ))
        })?;
        Ok(Interval::new(quality, size))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.quality.symbol(), self.size)
    }
}

/// Generic diatonic distance between two pitches, counting both
/// endpoints (unison = 1), independent of accidentals. Octave
/// wraparound across letter boundaries is included.
pub fn generic_size(a: Pitch, b: Pitch) -> u32 {
    if a == b {
        return 1;
    }
    let (lower, higher) = if a.is_lower(b) { (a, b) } else { (b, a) };
    let span = higher.diatonic_position() - lower.diatonic_position() + 1;
    span.max(0) as u32
}

/// Reduce a generic size to its simple form (1-7).
pub fn simple_size_of(size: u32) -> u32 {
    if size == 0 {
        0
    } else {
        (size - 1) % 7 + 1
    }
}
