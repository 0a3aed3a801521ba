// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Structured search observability.
//!
//! The driver emits one event per interesting moment - node popped,
//! candidates computed, candidate accepted or rejected by the range
//! window, solution found - through an optional callback. Tests can
//! assert on intermediate search behavior without scraping logs.

use crate::melody::line::MelodicLine;
use crate::music::pitch::Pitch;

/// Which of the two search phases emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Phase A: reach the climax note at its chosen position.
    Climax,
    /// Phase B: reach the stepwise 2-1 cadence at the goal length.
    Cadence,
}

/// One step of the search, as seen by an observer.
#[derive(Debug)]
pub enum SearchEvent<'a> {
    /// A line was taken off the frontier for expansion.
    NodePopped { phase: Phase, line: &'a MelodicLine },
    /// The rule engine produced this line's legal continuations.
    Candidates {
        phase: Phase,
        line: &'a MelodicLine,
        candidates: &'a [Pitch],
    },
    /// A candidate passed the range window and was pushed.
    CandidateAccepted { phase: Phase, pitch: Pitch },
    /// A candidate fell outside the range window.
    CandidateRejected { phase: Phase, pitch: Pitch },
    /// A line reached the phase goal.
    SolutionFound { phase: Phase, line: &'a MelodicLine },
}

/// Callback invoked synchronously for every [`SearchEvent`].
pub type Observer = Box<dyn FnMut(&SearchEvent<'_>)>;
