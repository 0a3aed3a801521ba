// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The continuation rule engine.
//!
//! Given a melodic line, [`continuations`] computes every pitch that
//! is legal as the next note under the cantus firmus rules: melodic
//! motion must be consonant, leaps force stepwise recovery in the
//! opposite direction, a long run in one direction must turn around,
//! the span outlined by a run may not exceed an octave, and the
//! leading tone may be approached by step but never by leap.
//!
//! An empty result is not an error - it marks a dead-end branch that
//! the search simply abandons.

use crate::music::interval::{generic_size, Interval, Quality};
use crate::music::pitch::Pitch;
use crate::music::scale::Scale;
use crate::music::MusicError;

use super::line::MelodicLine;

/// Melodic intervals a cantus firmus may move (or outline) by.
pub const MELODIC_CONSONANCES: [Interval; 9] = [
    Interval::new(Quality::Minor, 2),
    Interval::new(Quality::Major, 2),
    Interval::new(Quality::Minor, 3),
    Interval::new(Quality::Major, 3),
    Interval::new(Quality::Perfect, 4),
    Interval::new(Quality::Perfect, 5),
    Interval::new(Quality::Minor, 6),
    Interval::new(Quality::Major, 6),
    Interval::new(Quality::Perfect, 8),
];

/// Shortest acceptable finished line.
pub const MIN_LENGTH: usize = 8;
/// Longest acceptable finished line.
pub const MAX_LENGTH: usize = 16;
/// Widest acceptable overall range.
pub const MAX_RANGE: Interval = Interval::new(Quality::Major, 10);

/// Octave used when seeding an empty line with the tonic.
pub const REFERENCE_OCTAVE: u8 = 4;

// Generic sizes above this are leaps and force stepwise recovery.
const LEAP_THRESHOLD: u32 = 3;
// A run of this many notes in one direction must turn around.
const FORCED_REVERSAL_NOTES: usize = 5;
// A run may not outline more than an octave.
const MAX_OUTLINE_SPAN: u32 = 8;

// Candidate generic sizes, by situation.
const OPENING_SIZES: [u32; 6] = [2, 3, 4, 5, 6, 8];
const RECOVERY_SIZES: [u32; 2] = [2, 3];
const REVERSAL_AFTER_THIRD: [u32; 3] = [2, 4, 8];
const REVERSAL_AFTER_FOURTH: [u32; 4] = [2, 3, 5, 8];

/// Direction of melodic motion. Tied steps compare as not-lower and
/// therefore read as descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    fn between(from: Pitch, to: Pitch) -> Self {
        if from.is_lower(to) {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// The maximal same-direction run ending at the last note of a line,
/// summarized for rule checks.
#[derive(Debug, Clone, Copy)]
pub struct OutlineContext {
    /// Direction the run is moving in.
    pub direction: Direction,
    /// First pitch of the run.
    pub start: Pitch,
    /// Number of notes in the run, including the last note.
    pub notes: usize,
    /// Generic size between the run's start and the last note.
    pub span: u32,
}

/// Outline context for the run ending at the line's last note.
/// `None` for lines shorter than two notes.
pub fn trailing_outline(line: &MelodicLine) -> Option<OutlineContext> {
    let pitches = line.pitches();
    let n = pitches.len();
    if n < 2 {
        return None;
    }
    let last = pitches[n - 1];
    let direction = Direction::between(pitches[n - 2], last);
    let ascending = pitches[n - 2].is_lower(last);

    let mut start_index = n - 2;
    for i in (0..n - 2).rev() {
        if pitches[i].is_lower(pitches[start_index]) != ascending {
            break;
        }
        start_index = i;
    }

    Some(OutlineContext {
        direction,
        start: pitches[start_index],
        notes: n - start_index,
        span: generic_size(last, pitches[start_index]),
    })
}

/// True if the motion between two pitches is a consonant melodic
/// interval. Spellings the interval tables cannot name are dissonant.
pub fn is_melodic_consonance(a: Pitch, b: Pitch) -> bool {
    match Interval::between(a, b) {
        Ok(interval) => MELODIC_CONSONANCES.contains(&interval),
        Err(_) => false,
    }
}

/// Every pitch that is legal as the line's next note. The result is
/// unordered; callers that care should shuffle or sort it themselves.
pub fn continuations(line: &MelodicLine) -> Vec<Pitch> {
    let scale = line.scale();
    let last = match line.pitches().last() {
        // An empty line starts on the tonic at the reference octave.
        None => return vec![Pitch::new(scale.tonic(), REFERENCE_OCTAVE)],
        Some(&pitch) => pitch,
    };

    let mut choices = Vec::new();

    // A single note may open with any consonant size in either
    // direction.
    if line.len() == 1 {
        push_candidates(&mut choices, line, last, Direction::Up, &OPENING_SIZES);
        push_candidates(&mut choices, line, last, Direction::Down, &OPENING_SIZES);
        return choices;
    }

    let previous = line.pitches()[line.len() - 2];
    let direction = Direction::between(previous, last);
    let last_size = generic_size(previous, last);

    // A leap must be recovered by step in the opposite direction.
    if last_size > LEAP_THRESHOLD {
        push_candidates(&mut choices, line, last, direction.reversed(), &RECOVERY_SIZES);
        return choices;
    }

    let outline = match trailing_outline(line) {
        Some(outline) => outline,
        None => return choices,
    };

    // Turning around must not leave a dissonant span outlined behind.
    let reversal_possible = is_melodic_consonance(last, outline.start);
    let reversal_sizes: &[u32] = match last_size {
        3 => &REVERSAL_AFTER_THIRD,
        4 => &REVERSAL_AFTER_FOURTH,
        _ => &OPENING_SIZES,
    };

    if outline.notes >= FORCED_REVERSAL_NOTES {
        // The run is long enough that reversal is mandatory; if the
        // outlined span is dissonant this branch is a dead end.
        if !reversal_possible {
            return Vec::new();
        }
        push_candidates(&mut choices, line, last, direction.reversed(), reversal_sizes);
        return choices;
    }

    if reversal_possible {
        push_candidates(&mut choices, line, last, direction.reversed(), reversal_sizes);
    }

    // Same-direction continuations: always by step, and after a second
    // also by a modest leap - unless the run has already mixed a leap
    // and a step, in which case only a third may follow.
    let mut same_direction: Vec<u32> = vec![2];
    if last_size == 2 {
        if outline.notes > 2 {
            same_direction.push(3);
        } else {
            same_direction.extend([3, 4, 5]);
        }
    }
    for &size in &same_direction {
        if outline.span + size - 1 > MAX_OUTLINE_SPAN {
            continue;
        }
        if size > 2 {
            // A same-direction leap may not land dissonant against
            // the start of the run.
            let target = match step_toward(last, size, direction, scale) {
                Ok(pitch) => pitch,
                Err(_) => continue,
            };
            if !is_melodic_consonance(outline.start, target) {
                continue;
            }
        }
        push_candidates(&mut choices, line, last, direction, &[size]);
    }

    choices
}

fn step_toward(
    from: Pitch,
    size: u32,
    direction: Direction,
    scale: &Scale,
) -> Result<Pitch, MusicError> {
    match direction {
        Direction::Up => from.step_up(size, Some(scale)),
        Direction::Down => from.step_down(size, Some(scale)),
    }
}

// Step to each candidate size, dropping leaps onto the leading tone
// and anything dissonant against the last note.
fn push_candidates(
    choices: &mut Vec<Pitch>,
    line: &MelodicLine,
    last: Pitch,
    direction: Direction,
    sizes: &[u32],
) {
    for &size in sizes {
        let candidate = match step_toward(last, size, direction, line.scale()) {
            Ok(pitch) => pitch,
            Err(_) => continue,
        };
        if size > LEAP_THRESHOLD {
            if let Some(leading_tone) = line.leading_tone() {
                if candidate.is_enharmonic(leading_tone) {
                    continue;
                }
            }
        }
        if is_melodic_consonance(last, candidate) {
            choices.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::music::scale::Mode;

    fn line(notes: &[&str], tonic: &str, mode: Mode) -> MelodicLine {
        let tonic_pitch: Pitch = format!("{}4", tonic).parse().unwrap();
        let scale = Arc::new(Scale::new(tonic_pitch.class(), mode).unwrap());
        let pitches = notes.iter().map(|s| s.parse().unwrap()).collect();
        MelodicLine::new(pitches, scale)
    }

    fn p(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_line_starts_on_tonic() {
        let next = continuations(&line(&[], "D", Mode::Minor));
        assert_eq!(next, vec![p("D4")]);
    }

    #[test]
    fn test_single_note_offers_consonances_both_ways() {
        let next = continuations(&line(&["C4"], "C", Mode::Major));
        // Sizes 2 3 4 5 6 8 in both directions, all consonant in C major
        assert_eq!(next.len(), 12);
        assert!(next.contains(&p("D4")));
        assert!(next.contains(&p("A4")));
        assert!(next.contains(&p("C5")));
        assert!(next.contains(&p("B3")));
        assert!(next.contains(&p("C3")));
        // A seventh is never offered
        assert!(!next.contains(&p("B4")));
    }

    #[test]
    fn test_tritone_spellings_are_filtered() {
        // From F4 a fourth up is B4, an augmented fourth - dissonant
        let next = continuations(&line(&["F4"], "C", Mode::Major));
        assert!(!next.contains(&p("B4")));
        // The consonant fourth below (C4) is fine
        assert!(next.contains(&p("C4")));
    }

    #[test]
    fn test_leap_forces_stepwise_recovery() {
        let next = continuations(&line(&["C4", "F4"], "C", Mode::Major));
        assert_eq!(next.len(), 2);
        assert!(next.contains(&p("E4")));
        assert!(next.contains(&p("D4")));
        // Every recovery reverses direction and moves by 2 or 3
        for &pitch in &next {
            assert!(pitch.is_lower(p("F4")));
            assert!(generic_size(p("F4"), pitch) <= 3);
        }
    }

    #[test]
    fn test_downward_leap_recovers_upward() {
        let next = continuations(&line(&["E4", "A3"], "C", Mode::Major));
        assert_eq!(next.len(), 2);
        assert!(next.contains(&p("B3")));
        assert!(next.contains(&p("C4")));
    }

    #[test]
    fn test_long_run_must_turn_around() {
        let next = continuations(&line(&["D4", "E4", "F4", "G4", "A4"], "D", Mode::Minor));
        assert!(!next.is_empty());
        for &pitch in &next {
            assert!(pitch.is_lower(p("A4")), "{} does not reverse", pitch);
        }
    }

    #[test]
    fn test_long_run_outlining_dissonance_is_dead_end() {
        // B3 up to F4 outlines a diminished fifth; after five notes a
        // reversal is mandatory, so there is nowhere to go.
        let next = continuations(&line(&["B3", "C4", "D4", "E4", "F4"], "C", Mode::Major));
        assert!(next.is_empty());
    }

    #[test]
    fn test_reversal_sizes_narrow_after_a_third() {
        // After a third, reversals move by 2, 4, or 8 only
        let next = continuations(&line(&["E4", "C4"], "C", Mode::Major));
        let upward: Vec<Pitch> = next.iter().copied().filter(|n| n.is_higher(p("C4"))).collect();
        for &pitch in &upward {
            let size = generic_size(p("C4"), pitch);
            assert!([2, 4, 8].contains(&size), "unexpected reversal size {}", size);
        }
    }

    #[test]
    fn test_no_leap_onto_leading_tone() {
        // The line starts on C4, so B4 is the leading tone. From E4 a
        // fifth up lands exactly there and must be rejected...
        let next = continuations(&line(&["C4", "E4", "D4", "E4"], "C", Mode::Major));
        assert!(!next.contains(&p("B4")));
        // ...while the leap of a fourth to A4 survives
        assert!(next.contains(&p("A4")));
    }

    #[test]
    fn test_leading_tone_by_step_is_allowed() {
        // Recovering downward from C5 steps onto B4 legally
        let next = continuations(&line(&["C4", "C5"], "C", Mode::Major));
        assert!(next.contains(&p("B4")));
        assert!(next.contains(&p("A4")));
    }

    #[test]
    fn test_same_direction_leaps_only_after_a_second() {
        // After a same-direction second with a two-note run, modest
        // leaps (3, 4, 5) may continue upward
        let next = continuations(&line(&["D4", "E4"], "D", Mode::Dorian));
        assert!(next.contains(&p("F4"))); // continue by step
        assert!(next.contains(&p("G4"))); // third
        assert!(next.contains(&p("B4"))); // fifth

        // Once the run is three notes long, only a third may follow
        let next = continuations(&line(&["D4", "E4", "F4"], "D", Mode::Dorian));
        assert!(next.contains(&p("G4")));
        assert!(next.contains(&p("A4")));
        assert!(!next.contains(&p("B4")));
        assert!(!next.contains(&p("C5")));
    }

    #[test]
    fn test_trailing_outline_tracks_run() {
        let cf = line(&["C4", "F4", "E4", "D4"], "C", Mode::Major);
        let outline = trailing_outline(&cf).unwrap();
        assert_eq!(outline.direction, Direction::Down);
        assert_eq!(outline.start, p("F4"));
        assert_eq!(outline.notes, 3);
        assert_eq!(outline.span, 3);
    }

    #[test]
    fn test_continuations_never_dissonant_with_last_note() {
        let lines = [
            line(&["D4"], "D", Mode::Minor),
            line(&["D4", "F4"], "D", Mode::Minor),
            line(&["G4", "A4", "Bb4"], "G", Mode::Minor),
            line(&["F4", "G4", "A4", "G4"], "F", Mode::Major),
        ];
        for cf in &lines {
            let last = *cf.pitches().last().unwrap();
            for &pitch in &continuations(cf) {
                assert!(
                    is_melodic_consonance(last, pitch),
                    "{} to {} is dissonant",
                    last,
                    pitch
                );
            }
        }
    }
}
