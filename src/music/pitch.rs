// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch spelling and diatonic stepping.
//!
//! A [`Pitch`] is an exact spelling: letter, accidental count, octave.
//! Spelling is preserved as authored - `F#4` and `Gb4` sound the same
//! but are different values. Equality and hashing follow the spelling;
//! enharmonic comparison goes through the absolute semitone number.

use std::fmt;
use std::str::FromStr;

use super::interval::{simple_size_of, Interval};
use super::scale::Scale;
use super::MusicError;

/// The seven natural note letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// All letters in cyclic order starting from C.
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Semitone offset of the natural letter above C.
    pub fn semitone_base(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// Position within the C..B cycle (C = 0).
    pub fn index(self) -> usize {
        match self {
            Letter::C => 0,
            Letter::D => 1,
            Letter::E => 2,
            Letter::F => 3,
            Letter::G => 4,
            Letter::A => 5,
            Letter::B => 6,
        }
    }

    /// Parse a single letter character (uppercase only).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        };
        write!(f, "{}", c)
    }
}

/// A pitch class spelling: letter plus signed accidental count
/// (negative = flats, positive = sharps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitchClass {
    letter: Letter,
    accidental: i8,
}

impl PitchClass {
    pub fn new(letter: Letter, accidental: i8) -> Self {
        Self { letter, accidental }
    }

    /// Natural spelling of a letter.
    pub fn natural(letter: Letter) -> Self {
        Self::new(letter, 0)
    }

    pub fn letter(self) -> Letter {
        self.letter
    }

    pub fn accidental(self) -> i8 {
        self.accidental
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter)?;
        if self.accidental > 0 {
            for _ in 0..self.accidental {
                write!(f, "#")?;
            }
        } else {
            for _ in 0..-self.accidental {
                write!(f, "b")?;
            }
        }
        Ok(())
    }
}

/// Natural spellings of the seven letters, the stepping alphabet used
/// when no scale is supplied.
pub const NATURALS: [PitchClass; 7] = [
    PitchClass { letter: Letter::C, accidental: 0 },
    PitchClass { letter: Letter::D, accidental: 0 },
    PitchClass { letter: Letter::E, accidental: 0 },
    PitchClass { letter: Letter::F, accidental: 0 },
    PitchClass { letter: Letter::G, accidental: 0 },
    PitchClass { letter: Letter::A, accidental: 0 },
    PitchClass { letter: Letter::B, accidental: 0 },
];

/// An immutable pitch: spelling plus octave.
///
/// The canonical string form is scientific pitch notation: `C4`, `F#3`,
/// `Bb5`, `F##3`. Equality is by exact spelling; use
/// [`Pitch::is_enharmonic`] to compare sounding pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    class: PitchClass,
    octave: u8,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: u8) -> Self {
        Self { class, octave }
    }

    pub fn class(self) -> PitchClass {
        self.class
    }

    pub fn letter(self) -> Letter {
        self.class.letter()
    }

    pub fn accidental(self) -> i8 {
        self.class.accidental()
    }

    pub fn octave(self) -> u8 {
        self.octave
    }

    /// Absolute semitone number (MIDI convention: C4 = 60).
    pub fn midi(self) -> i32 {
        self.class.letter().semitone_base()
            + 12 * (self.octave as i32 + 1)
            + self.class.accidental() as i32
    }

    /// True if both pitches sound the same regardless of spelling.
    pub fn is_enharmonic(self, other: Pitch) -> bool {
        self.midi() == other.midi()
    }

    pub fn is_lower(self, other: Pitch) -> bool {
        self.midi() < other.midi()
    }

    pub fn is_higher(self, other: Pitch) -> bool {
        self.midi() > other.midi()
    }

    /// True if both pitches share the same spelled pitch class,
    /// octave ignored.
    pub fn is_same_class(self, other: Pitch) -> bool {
        self.class == other.class
    }

    /// Unsigned semitone distance to another pitch.
    pub fn semitones_to(self, other: Pitch) -> u32 {
        (self.midi() - other.midi()).unsigned_abs()
    }

    /// Position on the diatonic staff line grid (letter steps from C0).
    pub(crate) fn diatonic_position(self) -> i32 {
        self.octave as i32 * 7 + self.class.letter().index() as i32
    }

    /// Step up by a generic interval size through the scale's cyclic
    /// spelling sequence (size 1 = no motion, 2 = next step, ...).
    ///
    /// With a scale, the walk is anchored at this pitch's exact class
    /// and each landing takes the scale entry's authored accidental.
    /// Without one, natural letters are used and only this pitch's
    /// letter anchors the walk. The octave increments whenever an
    /// ascending walk lands on a class spelled with the letter C.
    pub fn step_up(self, size: u32, scale: Option<&Scale>) -> Result<Pitch, MusicError> {
        self.step(size, scale, true)
    }

    /// Step down by a generic interval size; the mirror of
    /// [`Pitch::step_up`], decrementing the octave on landing on a
    /// class spelled with the letter B.
    pub fn step_down(self, size: u32, scale: Option<&Scale>) -> Result<Pitch, MusicError> {
        self.step(size, scale, false)
    }

    fn step(self, size: u32, scale: Option<&Scale>, upward: bool) -> Result<Pitch, MusicError> {
        if size == 0 {
            return Err(MusicError::UndefinedInterval("generic size 0".to_string()));
        }
        let octave_change = ((size - 1) / 7) as i32;
        let steps = (size - 1) % 7;

        let (classes, start): (&[PitchClass], usize) = match scale {
            Some(scale) => {
                let start = scale
                    .position_of(self.class)
                    .ok_or_else(|| MusicError::PitchNotInScale(self.class.to_string()))?;
                (scale.classes(), start)
            }
            None => (&NATURALS, self.class.letter().index()),
        };

        let mut octave = if upward {
            self.octave as i32 + octave_change
        } else {
            self.octave as i32 - octave_change
        };
        let mut cur = start;
        for _ in 0..steps {
            if upward {
                cur = (cur + 1) % classes.len();
                if classes[cur].letter() == Letter::C {
                    octave += 1;
                }
            } else {
                cur = if cur == 0 { classes.len() - 1 } else { cur - 1 };
                if classes[cur].letter() == Letter::B {
                    octave -= 1;
                }
            }
        }

        let octave = u8::try_from(octave)
            .map_err(|_| MusicError::MalformedPitch(format!("{}{}", classes[cur], octave)))?;
        Ok(Pitch::new(classes[cur], octave))
    }

    /// Apply a named interval upward, respelling the result so the
    /// named quality is exact: the generic step fixes the letter, and
    /// the accidental absorbs the difference between the semitones the
    /// step produced and the semitones the interval demands.
    pub fn apply_interval_up(self, interval: Interval) -> Result<Pitch, MusicError> {
        let stepped = self.step_up(interval.size(), None)?;
        let adjust = self.interval_adjustment(interval, stepped)?;
        Ok(stepped.with_accidental_offset(adjust))
    }

    /// Apply a named interval downward. The accidental correction is
    /// mirrored: a downward step that falls short of the named
    /// interval is widened with flats rather than sharps.
    pub fn apply_interval_down(self, interval: Interval) -> Result<Pitch, MusicError> {
        let stepped = self.step_down(interval.size(), None)?;
        let adjust = self.interval_adjustment(interval, stepped)?;
        Ok(stepped.with_accidental_offset(-adjust))
    }

    fn interval_adjustment(self, interval: Interval, stepped: Pitch) -> Result<i32, MusicError> {
        let octave_change = ((interval.size() - 1) / 7) as i32;
        let simple = simple_size_of(interval.size());
        let goal = interval
            .quality()
            .simple_semitones(simple)
            .ok_or_else(|| MusicError::UndefinedInterval(interval.to_string()))?
            + octave_change * 12;
        let produced = self.semitones_to(stepped) as i32;
        Ok(goal - produced)
    }

    fn with_accidental_offset(self, offset: i32) -> Pitch {
        let accidental = self.class.accidental() as i32 + offset;
        Pitch::new(PitchClass::new(self.class.letter(), accidental as i8), self.octave)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.octave)
    }
}

impl FromStr for Pitch {
    type Err = MusicError;

    /// Parse scientific pitch notation: a capital letter, up to two
    /// accidentals of one kind, and an octave number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MusicError::MalformedPitch(s.to_string());
        let mut chars = s.chars().peekable();

        let letter = chars
            .next()
            .and_then(Letter::from_char)
            .ok_or_else(malformed)?;

        let mut accidental: i8 = 0;
        if let Some(&mark) = chars.peek() {
            if mark == '#' || mark == 'b' {
                while chars.peek() == Some(&mark) {
                    chars.next();
                    accidental += if mark == '#' { 1 } else { -1 };
                    if accidental.unsigned_abs() > 2 {
                        return Err(malformed());
                    }
                }
            }
        }

        let digits: String = chars.collect();
        if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let octave: u8 = digits.parse().map_err(|_| malformed())?;

        Ok(Pitch::new(PitchClass::new(letter, accidental), octave))
    }
}
