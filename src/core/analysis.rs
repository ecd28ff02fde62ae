//! Match analysis aggregate: events, commentary and tactical frames.
//!
//! An [`Analysis`] is built once per upload and never mutated afterwards.
//! Hosts share it as `Arc<Analysis>`.

use std::fmt;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::time::Seconds;
use crate::timeline::TimeIndex;

/// Error type for loading analyses
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Malformed analysis data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid analysis duration: {0}")]
    InvalidDuration(Seconds),
}

/// Opaque identifier handed out when an analysis completes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisId(pub String);

impl AnalysisId {
    /// Fresh random identifier of the form `analysis-xxxxxxxxx`
    pub fn generate() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(char::from)
            .collect();
        Self(format!("analysis-{}", suffix.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of a detected match event (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Goal,
    Pass,
    Shot,
    Foul,
    Save,
    Dribble,
    Tackle,
    Offside,
}

impl EventKind {
    /// All kinds, in summary display order
    pub const ALL: [EventKind; 8] = [
        EventKind::Goal,
        EventKind::Shot,
        EventKind::Pass,
        EventKind::Dribble,
        EventKind::Tackle,
        EventKind::Foul,
        EventKind::Save,
        EventKind::Offside,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Goal => "goal",
            EventKind::Pass => "pass",
            EventKind::Shot => "shot",
            EventKind::Foul => "foul",
            EventKind::Save => "save",
            EventKind::Dribble => "dribble",
            EventKind::Tackle => "tackle",
            EventKind::Offside => "offside",
        }
    }

    /// Plural label used by the summary panel
    pub fn plural_label(self) -> &'static str {
        match self {
            EventKind::Goal => "Goals",
            EventKind::Pass => "Passes",
            EventKind::Shot => "Shots",
            EventKind::Foul => "Fouls",
            EventKind::Save => "Saves",
            EventKind::Dribble => "Dribbles",
            EventKind::Tackle => "Tackles",
            EventKind::Offside => "Offsides",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Home,
    Away,
}

/// Position on the pitch, normalized to 0-100 on both axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A discrete event detected in the footage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: String,
    pub time: Seconds,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Point>,
}

/// One player's position in a tactical frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPosition {
    pub id: String,
    pub team: Team,
    pub number: u32,
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub possession: bool,
}

/// Snapshot of player and ball positions at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalFrame {
    pub players: Vec<PlayerPosition>,
    #[serde(rename = "ballPosition")]
    pub ball: Point,
}

impl TacticalFrame {
    /// First player flagged as holding the ball.
    ///
    /// "At most one possessor" is a convention only; frames with several
    /// flagged players still load.
    pub fn possessor(&self) -> Option<&PlayerPosition> {
        self.players.iter().find(|p| p.possession)
    }

    pub fn possessor_count(&self) -> usize {
        self.players.iter().filter(|p| p.possession).count()
    }
}

/// Complete analysis for one uploaded video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: AnalysisId,
    pub duration: Seconds,
    pub events: Vec<MatchEvent>,
    pub commentary: TimeIndex<String>,
    pub frames: TimeIndex<TacticalFrame>,
}

impl Analysis {
    /// Parse and validate an analysis document
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let analysis: Analysis = serde_json::from_str(json)?;
        analysis.validate()?;
        Ok(analysis)
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(AnalysisError::InvalidDuration(self.duration));
        }

        for (time, frame) in self.frames.iter() {
            let count = frame.possessor_count();
            if count > 1 {
                tracing::warn!(
                    analysis = %self.id,
                    time,
                    possessors = count,
                    "tactical frame has more than one player in possession"
                );
            }
        }

        Ok(())
    }

    /// Number of events of each kind, in [`EventKind::ALL`] order
    pub fn event_counts(&self) -> Vec<(EventKind, usize)> {
        EventKind::ALL
            .iter()
            .map(|kind| {
                let count = self.events.iter().filter(|e| e.kind == *kind).count();
                (*kind, count)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "analysis-test",
        "duration": 90,
        "events": [
            {"id": "e1", "time": 12.5, "type": "pass", "description": "Long pass", "player": "Smith", "team": "home", "coordinates": {"x": 45, "y": 50}},
            {"id": "e2", "time": 32.4, "type": "goal", "description": "Header"}
        ],
        "commentary": {"10": "Settling in", "12.5": "Long pass from Smith"},
        "frames": {
            "12.5": {
                "players": [
                    {"id": "p1", "team": "home", "number": 10, "position": {"x": 45, "y": 50}, "name": "Smith", "possession": true},
                    {"id": "p5", "team": "away", "number": 1, "position": {"x": 95, "y": 50}}
                ],
                "ballPosition": {"x": 55, "y": 60}
            }
        }
    }"#;

    #[test]
    fn test_parse_analysis() {
        let analysis = Analysis::from_json(SAMPLE).unwrap();
        assert_eq!(analysis.id.as_str(), "analysis-test");
        assert_eq!(analysis.events.len(), 2);
        assert_eq!(analysis.events[0].kind, EventKind::Pass);
        assert_eq!(analysis.events[0].team, Some(Team::Home));
        assert_eq!(analysis.events[1].player, None);
        assert_eq!(analysis.commentary.len(), 2);

        let frame = analysis.frames.exact(12.5).unwrap();
        assert_eq!(frame.ball, Point::new(55.0, 60.0));
        assert_eq!(frame.possessor().map(|p| p.number), Some(10));
        assert!(!frame.players[1].possession);
    }

    #[test]
    fn test_reject_unknown_event_kind() {
        let json = SAMPLE.replace("\"pass\"", "\"corner\"");
        assert!(matches!(Analysis::from_json(&json), Err(AnalysisError::Parse(_))));
    }

    #[test]
    fn test_reject_negative_duration() {
        let json = SAMPLE.replace("\"duration\": 90", "\"duration\": -1");
        assert!(matches!(
            Analysis::from_json(&json),
            Err(AnalysisError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_multiple_possessors_still_load() {
        let json = SAMPLE.replace(
            "\"number\": 1, \"position\": {\"x\": 95, \"y\": 50}}",
            "\"number\": 1, \"position\": {\"x\": 95, \"y\": 50}, \"possession\": true}",
        );
        let analysis = Analysis::from_json(&json).unwrap();
        let frame = analysis.frames.exact(12.5).unwrap();
        assert_eq!(frame.possessor_count(), 2);
        assert_eq!(frame.possessor().map(|p| p.id.as_str()), Some("p1"));
    }

    #[test]
    fn test_event_counts() {
        let analysis = Analysis::from_json(SAMPLE).unwrap();
        let counts = analysis.event_counts();
        assert_eq!(counts.len(), EventKind::ALL.len());
        assert!(counts.contains(&(EventKind::Goal, 1)));
        assert!(counts.contains(&(EventKind::Pass, 1)));
        assert!(counts.contains(&(EventKind::Save, 0)));
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = AnalysisId::generate();
        let b = AnalysisId::generate();
        assert!(a.as_str().starts_with("analysis-"));
        assert_eq!(a.as_str().len(), "analysis-".len() + 9);
        assert_ne!(a, b);
    }
}
