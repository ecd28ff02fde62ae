//! Core types for match analysis playback.
//!
//! This module provides the analysis aggregate (events, commentary,
//! tactical frames), the bundled fixture source and time helpers.
//! All time values are fractional seconds.

pub mod analysis;
pub mod source;
pub mod time;

// Re-export core data structures for easier access.
pub use analysis::{
    Analysis, AnalysisError, AnalysisId, EventKind, MatchEvent, PlayerPosition, Point,
    TacticalFrame, Team,
};
pub use source::{generate_analysis, match_fixture, AnalysisSource, FixtureSource};
pub use time::{Seconds, ZERO};
