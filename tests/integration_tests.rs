// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for CANTUS
//!
//! These tests exercise the public API end to end: pitch arithmetic
//! feeding the rule engine, the rule engine feeding the search, and
//! the search producing lines that hold up under analysis.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use cantus::search::builder::BuilderOptions;
use cantus::search::trace::SearchEvent;
use cantus::{
    continuations, CantusFirmusBuilder, Interval, MelodicLine, Mode, Pitch, Scale,
};

fn p(s: &str) -> Pitch {
    s.parse().unwrap()
}

fn c_major_line(notes: &[&str]) -> MelodicLine {
    let scale = Arc::new(Scale::new(p("C4").class(), Mode::Major).unwrap());
    MelodicLine::new(notes.iter().map(|s| s.parse().unwrap()).collect(), scale)
}

/// Starting from [C4] in C major, the step up to D4 is legal, and no
/// augmented or diminished motion ever survives the consonance filter.
#[test]
fn test_c_major_continuations_from_single_note() {
    let next = continuations(&c_major_line(&["C4"]));
    assert!(next.contains(&p("D4")));

    let consonances = ["m2", "M2", "m3", "M3", "P4", "P5", "m6", "M6", "P8"];
    for &candidate in &next {
        let interval = Interval::between(p("C4"), candidate).unwrap();
        assert!(
            consonances.contains(&interval.to_string().as_str()),
            "{} is not a consonant move",
            interval
        );
    }
}

/// Two runs with the same seed and options produce identical lines.
#[test]
fn test_determinism_under_seed() {
    let opts = BuilderOptions {
        tonic: Some(p("A4")),
        mode: Some(Mode::Minor),
        goal_length: Some(14),
        ..Default::default()
    };

    let first = CantusFirmusBuilder::new(StdRng::seed_from_u64(99))
        .build(&opts)
        .unwrap();
    let second = CantusFirmusBuilder::new(StdRng::seed_from_u64(99))
        .build(&opts)
        .unwrap();

    assert_eq!(first.line.pitches(), second.line.pitches());
    assert_eq!(first.line.rank(), second.line.rank());

    // A different seed is allowed to differ (and in practice does)
    let third = CantusFirmusBuilder::new(StdRng::seed_from_u64(100))
        .build(&opts)
        .unwrap();
    let _ = third; // no assertion: both outcomes are legal
}

/// Fully random configuration still produces an analyzable line.
#[test]
fn test_default_generation_smoke() {
    let composition = CantusFirmusBuilder::new(StdRng::seed_from_u64(7))
        .build(&BuilderOptions::default())
        .unwrap();
    let line = &composition.line;
    assert!(!line.is_empty());
    assert!(line.len() <= composition.config.goal_length);
    // Every adjacent motion in a generated line is consonant
    for window in line.pitches().windows(2) {
        let interval = Interval::between(window[0], window[1]).unwrap();
        assert!(
            ["m2", "M2", "m3", "M3", "P4", "P5", "m6", "M6", "P8"]
                .contains(&interval.to_string().as_str()),
            "generated dissonance {}",
            interval
        );
    }
}

/// A completed build ends degree 2 then tonic, with the climax on its
/// chosen position and everything inside the range window.
#[test]
fn test_completed_builds_close_properly() {
    let mut closed = 0;
    for seed in 0..40 {
        let opts = BuilderOptions {
            tonic: Some(p("G4")),
            mode: Some(Mode::Major),
            goal_length: Some(12),
            ..Default::default()
        };
        let composition = CantusFirmusBuilder::new(StdRng::seed_from_u64(seed))
            .build(&opts)
            .unwrap();
        if !composition.is_complete() {
            continue;
        }
        closed += 1;

        let pitches = composition.line.pitches();
        let config = &composition.config;
        assert_eq!(pitches.len(), config.goal_length);
        assert_eq!(pitches[pitches.len() - 1], config.tonic);
        assert_eq!(pitches[pitches.len() - 2], config.supertonic);
        assert_eq!(pitches[config.climax_position], config.climax);
        for &pitch in pitches {
            assert!(!pitch.is_higher(config.max_pitch));
            assert!(!pitch.is_lower(config.min_pitch));
        }
        // The rulebook agrees with the search
        assert!(
            composition.line.validate().is_empty(),
            "violations: {:?}",
            composition.line.validate()
        );
    }
    assert!(closed > 0, "no seed in 0..40 closed a cadence");
}

/// The observer hook sees the search happen: nodes popped, candidates
/// computed, and at least one solution on a completing seed.
#[test]
fn test_observer_reports_search_progress() {
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counts {
        popped: usize,
        candidates: usize,
        accepted: usize,
        rejected: usize,
    }

    let counts = Rc::new(RefCell::new(Counts::default()));
    let handle = Rc::clone(&counts);

    let opts = BuilderOptions {
        tonic: Some(p("D4")),
        mode: Some(Mode::Dorian),
        goal_length: Some(10),
        ..Default::default()
    };
    CantusFirmusBuilder::new(StdRng::seed_from_u64(11))
        .with_observer(move |event| {
            let mut counts = handle.borrow_mut();
            match event {
                SearchEvent::NodePopped { .. } => counts.popped += 1,
                SearchEvent::Candidates { .. } => counts.candidates += 1,
                SearchEvent::CandidateAccepted { .. } => counts.accepted += 1,
                SearchEvent::CandidateRejected { .. } => counts.rejected += 1,
                SearchEvent::SolutionFound { .. } => {}
            }
        })
        .build(&opts)
        .unwrap();

    let counts = counts.borrow();
    assert!(counts.popped > 0);
    assert_eq!(counts.popped, counts.candidates);
    assert!(counts.accepted > 0);
    // Rejections depend on the drawn range window; no assertion
    let _ = counts.rejected;
}

/// A caller-supplied starting line is honored and extended in place.
#[test]
fn test_starting_line_is_extended() {
    let start = c_major_line(&["C4", "D4", "E4"]);
    let opts = BuilderOptions {
        start: Some(start),
        goal_length: Some(10),
        climax: Some(p("A4")),
        climax_position: Some(5),
        max_range: Some(8),
        ..Default::default()
    };
    let composition = CantusFirmusBuilder::new(StdRng::seed_from_u64(21))
        .build(&opts)
        .unwrap();
    assert_eq!(&composition.line.pitches()[..3], &[p("C4"), p("D4"), p("E4")]);
    assert_eq!(composition.config.tonic, p("C4"));
    assert_eq!(composition.config.supertonic, p("D4"));
}
