// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The two-phase cantus firmus search driver.
//!
//! Phase A grows the starting line until the climax pitch lands at its
//! chosen position, collecting a quota of distinct routes; Phase B
//! continues the best routes until one closes with the stepwise 2-1
//! cadence at the goal length. Both phases share the same discipline:
//! pop the highest-ranked line, ask the rule engine for legal
//! continuations, shuffle them, keep the ones inside the range window,
//! push the extended lines back.
//!
//! The search is a bounded heuristic best-effort. An exhausted
//! frontier is not an error: the driver returns the best line it was
//! holding, and callers check completeness explicitly.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::melody::line::MelodicLine;
use crate::melody::rules::{continuations, REFERENCE_OCTAVE};
use crate::music::interval::{generic_size, Interval, Quality};
use crate::music::pitch::{Letter, Pitch, PitchClass};
use crate::music::scale::{Mode, Scale};
use crate::music::MusicError;

use super::heap::MaxHeap;
use super::trace::{Observer, Phase, SearchEvent};

const MAJOR_SEVENTH: Interval = Interval::new(Quality::Major, 7);

/// Number of climax routes Phase A collects before moving on. The
/// search is deliberately a bounded sample, not an enumeration.
pub const DEFAULT_SUCCESS_QUOTA: usize = 10;

/// Caller-supplied generation options. Everything is optional; unset
/// fields are resolved to random defaults when the build starts.
#[derive(Debug, Clone, Default)]
pub struct BuilderOptions {
    /// Starting partial line. Takes precedence over `tonic`/`mode`.
    pub start: Option<MelodicLine>,
    /// Starting pitch; default draws from G4, F4, A4.
    pub tonic: Option<Pitch>,
    /// Mode the scale is derived from; default draws from the three
    /// supported modes.
    pub mode: Option<Mode>,
    /// Total note count to aim for; default draws from 8..=16.
    pub goal_length: Option<usize>,
    /// The single highest note of the finished line.
    pub climax: Option<Pitch>,
    /// Zero-based index the climax should land on.
    pub climax_position: Option<usize>,
    /// Widest allowed generic size between the climax and the lowest
    /// reachable note.
    pub max_range: Option<u32>,
}

/// The fully-resolved generation parameters a build ran with.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub goal_length: usize,
    pub climax: Pitch,
    pub climax_position: usize,
    pub max_range: u32,
    /// Candidates must stay strictly below this pitch (the climax),
    /// which keeps the climax unique.
    pub max_pitch: Pitch,
    /// Candidates must stay at or above this pitch.
    pub min_pitch: Pitch,
    pub tonic: Pitch,
    /// Scale degree 2, the penultimate note of the cadence.
    pub supertonic: Pitch,
}

/// A finished or best-effort generation result.
#[derive(Debug, Clone)]
pub struct Composition {
    pub line: MelodicLine,
    pub config: ResolvedConfig,
}

impl Composition {
    /// True if the line reached the goal length and closes with the
    /// 2-1 cadence. A false here means the frontier was exhausted and
    /// the line is the best partial result.
    pub fn is_complete(&self) -> bool {
        let pitches = self.line.pitches();
        let n = pitches.len();
        n == self.config.goal_length
            && n >= 2
            && pitches[n - 1] == self.config.tonic
            && pitches[n - 2] == self.config.supertonic
    }
}

fn rank_is_less(a: &MelodicLine, b: &MelodicLine) -> bool {
    a.rank() < b.rank()
}

fn in_window(config: &ResolvedConfig, pitch: Pitch) -> bool {
    pitch.is_lower(config.max_pitch)
        && (pitch.is_higher(config.min_pitch) || pitch == config.min_pitch)
}

/// Best-first generator for cantus firmus lines.
///
/// The random source is injected so runs are reproducible: the same
/// seed and options always produce the same line.
pub struct CantusFirmusBuilder<R: Rng> {
    rng: R,
    success_quota: usize,
    observer: Option<Observer>,
}

impl<R: Rng> CantusFirmusBuilder<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            success_quota: DEFAULT_SUCCESS_QUOTA,
            observer: None,
        }
    }

    /// Override the Phase A success quota.
    pub fn with_success_quota(mut self, quota: usize) -> Self {
        self.success_quota = quota;
        self
    }

    /// Attach a callback receiving every [`SearchEvent`].
    pub fn with_observer(mut self, observer: impl FnMut(&SearchEvent<'_>) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Run both search phases and return the finished (or best-effort)
    /// line together with the resolved configuration.
    pub fn build(&mut self, options: &BuilderOptions) -> Result<Composition, MusicError> {
        let (start, config) = self.resolve(options)?;
        debug!(
            start = %start,
            goal = config.goal_length,
            climax = %config.climax,
            position = config.climax_position,
            range = config.max_range,
            "generating cantus firmus"
        );

        let mut routes: MaxHeap<MelodicLine> = MaxHeap::new(rank_is_less);
        let line = if config.climax_position + 2 == config.goal_length {
            // The climax is contractually the penultimate note, so
            // Phase A has nothing to find.
            routes.push(start.clone());
            self.close_cadence(&config, routes, start)
        } else {
            let survivor = self.climb_to_climax(&start, &config, &mut routes);
            self.close_cadence(&config, routes, survivor)
        };

        debug!(line = %line, rank = line.rank(), "search finished");
        Ok(Composition { line, config })
    }

    fn resolve(&mut self, options: &BuilderOptions) -> Result<(MelodicLine, ResolvedConfig), MusicError> {
        let start = match &options.start {
            Some(line) => line.clone(),
            None => {
                let tonic_choices = [
                    Pitch::new(PitchClass::natural(Letter::G), REFERENCE_OCTAVE),
                    Pitch::new(PitchClass::natural(Letter::F), REFERENCE_OCTAVE),
                    Pitch::new(PitchClass::natural(Letter::A), REFERENCE_OCTAVE),
                ];
                let mode_choices = [Mode::Major, Mode::Minor, Mode::Dorian];
                let tonic = options
                    .tonic
                    .unwrap_or_else(|| tonic_choices[self.rng.gen_range(0..tonic_choices.len())]);
                let mode = options
                    .mode
                    .unwrap_or_else(|| mode_choices[self.rng.gen_range(0..mode_choices.len())]);
                let scale = Arc::new(Scale::new(tonic.class(), mode)?);
                MelodicLine::new(vec![tonic], scale)
            }
        };
        // An empty starting line is seeded the same way the rule
        // engine would seed it.
        let start = if start.is_empty() {
            let seed = Pitch::new(start.scale().tonic(), REFERENCE_OCTAVE);
            start.extend(seed)
        } else {
            start
        };
        let tonic = start.pitches()[0];

        let goal_length = options
            .goal_length
            .unwrap_or_else(|| self.rng.gen_range(8..=16));

        let (climax, pinned_position) = match options.climax {
            Some(climax) => (climax, None),
            None => {
                let min_size = 2u32;
                let max_size = if goal_length == 8 { 6 } else { 8 };
                let mut size = self.rng.gen_range(min_size..max_size);
                if size == 7 {
                    // Degree 7 is no climax if it is the leading tone;
                    // draw again from the narrower band.
                    let degree_seven = tonic.step_up(7, Some(start.scale()))?;
                    let leading_tone = tonic.apply_interval_up(MAJOR_SEVENTH)?;
                    if degree_seven.is_enharmonic(leading_tone) {
                        size = self.rng.gen_range(min_size..6);
                    }
                }
                let climax = tonic.step_up(size, Some(start.scale()))?;
                // A climax a second above the tonic can only be the
                // penultimate note.
                let pinned = if size == 2 {
                    Some(goal_length.saturating_sub(2))
                } else {
                    None
                };
                (climax, pinned)
            }
        };
        let climax_size = generic_size(tonic, climax);

        let climax_position = match options.climax_position.or(pinned_position) {
            Some(position) => position,
            None => {
                let mut start_offset = 1usize;
                let mut end_offset = 3usize;
                if climax_size >= 7 {
                    start_offset += 1;
                    end_offset += 1;
                }
                if climax_size > 4 {
                    end_offset += 1;
                }
                let span = goal_length.saturating_sub(end_offset).max(1);
                start_offset + self.rng.gen_range(0..span)
            }
        };

        let max_range = match options.max_range {
            Some(range) => range,
            None => {
                // The range must at least reach the climax, and is
                // never narrower than a fifth.
                let floor = climax_size.max(5);
                let ceiling = 10u32;
                if floor >= ceiling {
                    floor
                } else {
                    self.rng.gen_range(floor..ceiling)
                }
            }
        };

        let min_pitch = climax.step_down(max_range, Some(start.scale()))?;
        let supertonic = tonic.step_up(2, Some(start.scale()))?;

        let config = ResolvedConfig {
            goal_length,
            climax,
            climax_position,
            max_range,
            max_pitch: climax,
            min_pitch,
            tonic,
            supertonic,
        };
        Ok((start, config))
    }

    // Phase A: best-first search until a quota of lines place the
    // climax at its position. Found routes go onto `routes`; the
    // return value is the last line held, the fallback if Phase B
    // starts with an empty frontier.
    fn climb_to_climax(
        &mut self,
        start: &MelodicLine,
        config: &ResolvedConfig,
        routes: &mut MaxHeap<MelodicLine>,
    ) -> MelodicLine {
        let mut frontier: MaxHeap<MelodicLine> = MaxHeap::new(rank_is_less);
        frontier.push(start.clone());
        let mut current = start.clone();
        let mut found = 0usize;

        while found < self.success_quota {
            let Some(line) = frontier.pop() else { break };
            current = line;
            self.emit(&SearchEvent::NodePopped {
                phase: Phase::Climax,
                line: &current,
            });
            trace!(line = %current, rank = current.rank(), "expanding");

            let mut next = continuations(&current);
            self.emit(&SearchEvent::Candidates {
                phase: Phase::Climax,
                line: &current,
                candidates: &next,
            });
            if next.is_empty() {
                continue;
            }

            if current.len() == config.climax_position {
                // Only the climax itself may come next; anything else
                // makes this a dead end.
                if next.iter().any(|&pitch| pitch == config.climax) {
                    current = current.extend(config.climax);
                    self.emit(&SearchEvent::SolutionFound {
                        phase: Phase::Climax,
                        line: &current,
                    });
                    debug!(line = %current, rank = current.rank(), "reached climax");
                    routes.push(current.clone());
                    found += 1;
                }
                continue;
            }
            if current.len() > config.climax_position {
                continue;
            }

            next.shuffle(&mut self.rng);
            for &pitch in &next {
                if in_window(config, pitch) {
                    self.emit(&SearchEvent::CandidateAccepted {
                        phase: Phase::Climax,
                        pitch,
                    });
                    frontier.push(current.extend(pitch));
                } else {
                    self.emit(&SearchEvent::CandidateRejected {
                        phase: Phase::Climax,
                        pitch,
                    });
                }
            }
        }
        current
    }

    // Phase B: continue until a line of goal length closes on the
    // supertonic then the tonic. No quota; the first full cadence
    // wins, and an exhausted frontier leaves the best partial line.
    fn close_cadence(
        &mut self,
        config: &ResolvedConfig,
        mut frontier: MaxHeap<MelodicLine>,
        mut current: MelodicLine,
    ) -> MelodicLine {
        let goal_position = config.goal_length.saturating_sub(2);

        while current.len() < config.goal_length {
            let Some(line) = frontier.pop() else { break };
            current = line;
            self.emit(&SearchEvent::NodePopped {
                phase: Phase::Cadence,
                line: &current,
            });
            trace!(line = %current, rank = current.rank(), "expanding");

            let mut next = continuations(&current);
            self.emit(&SearchEvent::Candidates {
                phase: Phase::Cadence,
                line: &current,
                candidates: &next,
            });
            if next.is_empty() {
                continue;
            }

            if current.len() == goal_position {
                if next.iter().any(|&pitch| pitch == config.supertonic) {
                    current = current.extend(config.supertonic);
                    if continuations(&current)
                        .iter()
                        .any(|&pitch| pitch == config.tonic)
                    {
                        current = current.extend(config.tonic);
                        self.emit(&SearchEvent::SolutionFound {
                            phase: Phase::Cadence,
                            line: &current,
                        });
                        debug!(line = %current, rank = current.rank(), "cadence closed");
                    }
                }
                continue;
            }
            if current.len() > goal_position {
                continue;
            }

            next.shuffle(&mut self.rng);
            for &pitch in &next {
                if in_window(config, pitch) {
                    self.emit(&SearchEvent::CandidateAccepted {
                        phase: Phase::Cadence,
                        pitch,
                    });
                    frontier.push(current.extend(pitch));
                } else {
                    self.emit(&SearchEvent::CandidateRejected {
                        phase: Phase::Cadence,
                        pitch,
                    });
                }
            }
        }
        current
    }

    fn emit(&mut self, event: &SearchEvent<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn p(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    fn options(tonic: &str, mode: Mode, length: usize) -> BuilderOptions {
        BuilderOptions {
            tonic: Some(p(tonic)),
            mode: Some(mode),
            goal_length: Some(length),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolution_fills_every_field() {
        let mut builder = CantusFirmusBuilder::new(StdRng::seed_from_u64(7));
        let (start, config) = builder.resolve(&BuilderOptions::default()).unwrap();
        assert_eq!(start.len(), 1);
        assert!((8..=16).contains(&config.goal_length));
        assert!(config.climax.is_higher(config.tonic));
        assert!(config.climax_position >= 1);
        assert!(config.climax_position <= config.goal_length - 2);
        assert!(config.max_range >= 5);
        assert!(config.max_range <= 10);
        assert!(config.min_pitch.is_lower(config.max_pitch));
    }

    #[test]
    fn test_resolution_respects_explicit_options() {
        let mut builder = CantusFirmusBuilder::new(StdRng::seed_from_u64(7));
        let opts = BuilderOptions {
            tonic: Some(p("D4")),
            mode: Some(Mode::Minor),
            goal_length: Some(13),
            climax: Some(p("G4")),
            climax_position: Some(7),
            max_range: Some(6),
            ..Default::default()
        };
        let (start, config) = builder.resolve(&opts).unwrap();
        assert_eq!(start.pitches(), &[p("D4")]);
        assert_eq!(config.goal_length, 13);
        assert_eq!(config.climax, p("G4"));
        assert_eq!(config.climax_position, 7);
        assert_eq!(config.max_range, 6);
        assert_eq!(config.supertonic, p("E4"));
        // G4 down a sixth through D minor: G F E D C Bb
        assert_eq!(config.min_pitch, p("Bb3"));
    }

    #[test]
    fn test_supertonic_is_scale_degree_two() {
        let mut builder = CantusFirmusBuilder::new(StdRng::seed_from_u64(1));
        let opts = options("G4", Mode::Major, 10);
        let (_, config) = builder.resolve(&opts).unwrap();
        assert_eq!(config.supertonic, p("A4"));
    }

    #[test]
    fn test_window_bounds() {
        let config = ResolvedConfig {
            goal_length: 10,
            climax: p("G4"),
            climax_position: 4,
            max_range: 6,
            max_pitch: p("G4"),
            min_pitch: p("Bb3"),
            tonic: p("D4"),
            supertonic: p("E4"),
        };
        // Strictly below the climax, at or above the floor
        assert!(!in_window(&config, p("G4")));
        assert!(!in_window(&config, p("A4")));
        assert!(in_window(&config, p("F4")));
        assert!(in_window(&config, p("Bb3")));
        assert!(!in_window(&config, p("A3")));
    }

    #[test]
    fn test_build_is_deterministic_under_seed() {
        let opts = options("G4", Mode::Major, 12);
        let first = CantusFirmusBuilder::new(StdRng::seed_from_u64(42))
            .build(&opts)
            .unwrap();
        let second = CantusFirmusBuilder::new(StdRng::seed_from_u64(42))
            .build(&opts)
            .unwrap();
        assert_eq!(first.line.pitches(), second.line.pitches());
        assert_eq!(first.line.rank(), second.line.rank());
    }

    #[test]
    fn test_build_stays_inside_the_window() {
        let opts = options("D4", Mode::Minor, 11);
        let composition = CantusFirmusBuilder::new(StdRng::seed_from_u64(3))
            .build(&opts)
            .unwrap();
        for &pitch in composition.line.pitches() {
            assert!(!pitch.is_higher(composition.config.max_pitch));
            assert!(!pitch.is_lower(composition.config.min_pitch));
        }
    }

    #[test]
    fn test_complete_build_closes_with_cadence() {
        // Some seeds may fail to complete; that is part of the
        // contract. At least one of these should close.
        let mut closed = 0;
        for seed in 0..30 {
            let opts = options("G4", Mode::Major, 12);
            let composition = CantusFirmusBuilder::new(StdRng::seed_from_u64(seed))
                .build(&opts)
                .unwrap();
            if composition.is_complete() {
                closed += 1;
                let pitches = composition.line.pitches();
                let n = pitches.len();
                assert_eq!(n, 12);
                assert_eq!(pitches[n - 1], composition.config.tonic);
                assert_eq!(pitches[n - 2], composition.config.supertonic);
                assert_eq!(pitches[composition.config.climax_position], composition.config.climax);
            }
        }
        assert!(closed > 0, "no seed in 0..30 produced a complete line");
    }

    #[test]
    fn test_observer_sees_search_events() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let pops = Rc::new(RefCell::new(0usize));
        let pops_handle = Rc::clone(&pops);
        let opts = options("F4", Mode::Major, 10);
        CantusFirmusBuilder::new(StdRng::seed_from_u64(5))
            .with_observer(move |event| {
                if matches!(event, SearchEvent::NodePopped { .. }) {
                    *pops_handle.borrow_mut() += 1;
                }
            })
            .build(&opts)
            .unwrap();
        assert!(*pops.borrow() > 0);
    }
}
