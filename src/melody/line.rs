// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Melodic line analysis and heuristic ranking.
//!
//! A [`MelodicLine`] is an append-only sequence of pitches plus the
//! scale it is built from. Lines never mutate: extending one produces
//! a new line, so a line can sit on the search frontier while its
//! extensions are explored independently.
//!
//! All statistics are derived on demand from the pitch sequence. The
//! scalar `rank` orders frontier exploration during search - higher is
//! better. It rewards length, pitch variety, and irregular phrase
//! shapes, and penalizes leap-heavy or unbalanced writing.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::music::interval::{generic_size, Interval, Quality};
use crate::music::pitch::Pitch;
use crate::music::scale::Scale;

use super::rules::{is_melodic_consonance, MAX_LENGTH, MAX_RANGE, MIN_LENGTH};

const MAJOR_SEVENTH: Interval = Interval::new(Quality::Major, 7);

/// Occurrence statistics over the distinct pitches of a line.
#[derive(Debug, Clone)]
pub struct PitchStats {
    /// Weight per distinct pitch (occurrence counts, possibly with
    /// leap-arrival and climax bonuses added).
    pub weights: HashMap<Pitch, f64>,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

/// Count/mean/spread of melodic outline lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStats {
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

/// Counts of strictly-up, strictly-down, and tied adjacent steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionStats {
    pub up: usize,
    pub down: usize,
    pub tied: usize,
}

/// An immutable melodic line under construction or analysis.
#[derive(Debug, Clone)]
pub struct MelodicLine {
    pitches: Vec<Pitch>,
    scale: Arc<Scale>,
    leading_tone: Option<Pitch>,
    rank: f64,
}

impl MelodicLine {
    /// Create a line from pitches and the scale they are drawn from.
    /// The leading tone (a major seventh above the first pitch) and
    /// the rank are fixed at construction.
    pub fn new(pitches: Vec<Pitch>, scale: Arc<Scale>) -> Self {
        let leading_tone = pitches
            .first()
            .and_then(|p| p.apply_interval_up(MAJOR_SEVENTH).ok());
        let mut line = Self {
            pitches,
            scale,
            leading_tone,
            rank: 0.0,
        };
        if line.len() > 1 {
            line.rank = line.compute_rank();
        }
        line
    }

    /// A new line with one pitch appended; self is untouched.
    pub fn extend(&self, pitch: Pitch) -> Self {
        let mut pitches = self.pitches.clone();
        pitches.push(pitch);
        Self::new(pitches, Arc::clone(&self.scale))
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    /// The pitch a major seventh above the line's first note. Leaping
    /// onto it is forbidden by the continuation rules.
    pub fn leading_tone(&self) -> Option<Pitch> {
        self.leading_tone
    }

    /// Heuristic score for frontier ordering; 0 for lines of one note
    /// or fewer.
    pub fn rank(&self) -> f64 {
        self.rank
    }

    /// Pitches sorted low to high. Stable: enharmonic pitches keep
    /// their order of appearance.
    pub fn sorted(&self) -> Vec<Pitch> {
        let mut sorted = self.pitches.clone();
        sorted.sort_by_key(|p| p.midi());
        sorted
    }

    pub fn lowest(&self) -> Option<Pitch> {
        self.sorted().first().copied()
    }

    pub fn highest(&self) -> Option<Pitch> {
        self.sorted().last().copied()
    }

    /// Interval between the extremes, when nameable.
    pub fn range(&self) -> Option<Interval> {
        let low = self.lowest()?;
        let high = self.highest()?;
        Interval::between(low, high).ok()
    }

    /// Index of the first occurrence of the highest pitch.
    pub fn climax_index(&self) -> Option<usize> {
        let high = self.highest()?;
        self.pitches.iter().position(|&p| p == high)
    }

    /// Distinct pitches by exact spelling and octave, low to high.
    /// Enharmonic respellings count as distinct.
    pub fn unique_pitches(&self) -> Vec<Pitch> {
        let mut sorted = self.sorted();
        sorted.dedup();
        sorted
    }

    /// Number of adjacent motions larger than a third.
    pub fn leap_count(&self) -> usize {
        self.pitches
            .windows(2)
            .filter(|w| generic_size(w[0], w[1]) > 3)
            .count()
    }

    /// Occurrence count per distinct pitch, with mean and spread
    /// computed across the distinct pitches.
    pub fn pitch_frequency(&self) -> PitchStats {
        let mut weights: HashMap<Pitch, f64> = HashMap::new();
        for &pitch in &self.pitches {
            *weights.entry(pitch).or_insert(0.0) += 1.0;
        }
        Self::distribution(weights)
    }

    /// Like [`MelodicLine::pitch_frequency`], but arrival points of
    /// leaps get a bonus of `sqrt(size) - 1.75`, and once the line is
    /// eight notes long the highest pitch gets +1 (as does the lowest,
    /// if it sits below the opening note). Mean and spread are
    /// recomputed after the bonuses.
    pub fn pitch_weights(&self) -> PitchStats {
        let mut weights = self.pitch_frequency().weights;
        for window in self.pitches.windows(2) {
            let size = generic_size(window[0], window[1]);
            if size > 3 {
                if let Some(weight) = weights.get_mut(&window[1]) {
                    *weight += (size as f64).sqrt() - 1.75;
                }
            }
        }
        if self.len() >= 8 {
            if let (Some(low), Some(high)) = (self.lowest(), self.highest()) {
                if let Some(weight) = weights.get_mut(&high) {
                    *weight += 1.0;
                }
                if low.is_lower(self.pitches[0]) {
                    if let Some(weight) = weights.get_mut(&low) {
                        *weight += 1.0;
                    }
                }
            }
        }
        Self::distribution(weights)
    }

    fn distribution(weights: HashMap<Pitch, f64>) -> PitchStats {
        if weights.is_empty() {
            return PitchStats {
                weights,
                mean: 0.0,
                variance: 0.0,
                std_dev: 0.0,
            };
        }
        let count = weights.len() as f64;
        let total: f64 = weights.values().sum();
        let mean = total / count;
        let variance = weights.values().map(|w| (w - mean).powi(2)).sum::<f64>() / count;
        PitchStats {
            weights,
            mean,
            variance,
            std_dev: variance.sqrt(),
        }
    }

    /// Split the line into maximal runs of non-reversing motion. A
    /// direction change at index i puts that pitch in both the closing
    /// and the opening outline. Direction is "this pitch is lower than
    /// the next": a tied step compares as not-lower, the same as
    /// descending, and that asymmetry is part of the melody grammar -
    /// ties extend a descending run but break an ascending one.
    pub fn melodic_outlines(&self) -> Vec<&[Pitch]> {
        let pitches = &self.pitches;
        if pitches.is_empty() {
            return Vec::new();
        }
        if pitches.len() == 1 {
            return vec![&pitches[..]];
        }
        let mut bounds = vec![0usize];
        let mut previous = pitches[0].is_lower(pitches[1]);
        for i in 2..pitches.len() {
            let direction = pitches[i - 1].is_lower(pitches[i]);
            if direction != previous {
                bounds.push(i - 1);
                bounds.push(i - 1);
                previous = direction;
            }
        }
        bounds.push(pitches.len() - 1);
        bounds
            .chunks(2)
            .map(|pair| &pitches[pair[0]..=pair[1]])
            .collect()
    }

    /// Count, mean, and spread of the outline lengths.
    pub fn outline_shape_stats(&self) -> ShapeStats {
        let outlines = self.melodic_outlines();
        let count = outlines.len();
        if count == 0 {
            return ShapeStats {
                count: 0,
                mean: 0.0,
                variance: 0.0,
                std_dev: 0.0,
            };
        }
        let total: usize = outlines.iter().map(|o| o.len()).sum();
        let mean = total as f64 / count as f64;
        let variance = outlines
            .iter()
            .map(|o| (o.len() as f64 - mean).powi(2))
            .sum::<f64>()
            / count as f64;
        ShapeStats {
            count,
            mean,
            variance,
            std_dev: variance.sqrt(),
        }
    }

    /// Generic interval size -> occurrence count over adjacent pairs.
    pub fn interval_histogram(&self) -> HashMap<u32, usize> {
        let mut histogram = HashMap::new();
        for window in self.pitches.windows(2) {
            *histogram.entry(generic_size(window[0], window[1])).or_insert(0) += 1;
        }
        histogram
    }

    /// Adjacent-step direction counts; enharmonic ties count as tied.
    pub fn direction_stats(&self) -> DirectionStats {
        let mut stats = DirectionStats {
            up: 0,
            down: 0,
            tied: 0,
        };
        for window in self.pitches.windows(2) {
            if window[1].is_lower(window[0]) {
                stats.down += 1;
            } else if window[1].is_higher(window[0]) {
                stats.up += 1;
            } else {
                stats.tied += 1;
            }
        }
        stats
    }

    // The nine-term heuristic. Only called for lines of two or more
    // notes; shorter lines are pinned to rank 0.
    fn compute_rank(&self) -> f64 {
        let length = self.len();
        let lf = length as f64;
        let mut score = 0.0;

        // Longer lines explore first; variety and irregular phrase
        // lengths are rewarded.
        score += lf * 0.1;
        score += self.unique_pitches().len() as f64;
        score += 6.0 * self.outline_shape_stats().std_dev;

        if length > 6 {
            score -= self.pitch_weights().std_dev;
        }

        // 2-4 leaps is the comfortable band for an 8-16 note line.
        let leaps = self.leap_count();
        if leaps > 4 {
            score -= (leaps - 4) as f64;
        } else if length >= 5 {
            let deduction = leaps as f64 - lf / 4.0;
            if deduction < 0.0 {
                score += deduction;
            }
        }

        let histogram = self.interval_histogram();
        if length > 5 {
            // Seconds should make up at least ~54% of the motion.
            let desired = (lf - 1.0) / 1.85;
            let seconds = histogram.get(&2).copied().unwrap_or(0) as f64;
            if seconds < desired {
                score -= desired - seconds;
            }
        }
        if let Some(&octaves) = histogram.get(&8) {
            score -= octaves as f64 - 1.0;
        }

        if let (Some(low), Some(high)) = (self.lowest(), self.highest()) {
            let range_size = generic_size(low, high);
            if (range_size as usize) < length && length > 5 {
                score -= range_size as f64 - self.unique_pitches().len() as f64;
            }
        }

        if length > 6 {
            let directions = self.direction_stats();
            let off_balance = (directions.up as f64 - directions.down as f64).abs() - 2.0;
            score -= off_balance * (lf / 8.0);
        }

        score
    }

    /// Check a finished (or hand-written) line against the cantus
    /// firmus rulebook. Returns one message per violation; an empty
    /// list means the line is clean.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let pitches = &self.pitches;
        if pitches.is_empty() {
            violations.push("line is empty".to_string());
            return violations;
        }

        let first = pitches[0];
        let last = pitches[pitches.len() - 1];
        if first != last {
            violations.push(format!(
                "must end on the tonic {} (currently ends on {})",
                first, last
            ));
        }

        if self.len() < MIN_LENGTH {
            violations.push(format!(
                "must be at least {} notes long (currently {})",
                MIN_LENGTH,
                self.len()
            ));
        }
        if self.len() > MAX_LENGTH {
            violations.push(format!(
                "cannot be more than {} notes long (currently {})",
                MAX_LENGTH,
                self.len()
            ));
        }

        if let (Some(low), Some(high)) = (self.lowest(), self.highest()) {
            if let Ok(ceiling) = low.apply_interval_up(MAX_RANGE) {
                if high.is_higher(ceiling) {
                    violations.push(format!(
                        "range cannot exceed a {} (currently {} to {})",
                        MAX_RANGE, low, high
                    ));
                }
            }
            let repeats = pitches.iter().filter(|&&p| p == high).count();
            if repeats > 1 {
                violations.push(format!(
                    "climax note {} cannot be repeated (used {} times)",
                    high, repeats
                ));
            }
        }

        for window in pitches.windows(2) {
            if !is_melodic_consonance(window[0], window[1]) {
                violations.push(format!(
                    "dissonant melodic interval from {} to {}",
                    window[0], window[1]
                ));
            }
        }

        for outline in self.melodic_outlines() {
            if outline.len() > 2 {
                let start = outline[0];
                let end = outline[outline.len() - 1];
                if !is_melodic_consonance(start, end) {
                    violations.push(format!(
                        "outline from {} to {} spans a dissonance",
                        start, end
                    ));
                }
            }
        }

        violations
    }
}

impl fmt::Display for MelodicLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, pitch) in self.pitches.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", pitch)?;
        }
        write!(f, "]")
    }
}
