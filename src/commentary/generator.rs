//! Commentary text for a playback time.

use crate::core::analysis::{Analysis, EventKind, MatchEvent};
use crate::core::time::{constants, Seconds};

/// Commentary line for `time`.
///
/// Resolution order:
/// 1. a commentary entry keyed at exactly `time`;
/// 2. a templated line for the first event within the tolerance window;
/// 3. the latest commentary entry at or before `time`.
///
/// Returns an empty string when none of these apply.
pub fn resolve(time: Seconds, analysis: &Analysis) -> String {
    if let Some(text) = analysis.commentary.exact(time) {
        return text.clone();
    }

    if let Some(event) = event_near(time, analysis) {
        return event_line(event);
    }

    analysis
        .commentary
        .at_or_before(time)
        .map(|(_, text)| text.clone())
        .unwrap_or_default()
}

/// First event (in list order) within the tolerance window of `time`
pub fn event_near(time: Seconds, analysis: &Analysis) -> Option<&MatchEvent> {
    analysis
        .events
        .iter()
        .find(|event| (event.time - time).abs() <= constants::EVENT_TOLERANCE)
}

/// Templated line for a single event
pub fn event_line(event: &MatchEvent) -> String {
    let player = event.player.as_deref().unwrap_or("the player");
    let description = event
        .description
        .trim()
        .trim_end_matches(['.', '!', '?']);

    match event.kind {
        EventKind::Goal => format!("GOAL! {player} scores! {description}!"),
        EventKind::Pass => format!("{player} plays it forward. {description}."),
        EventKind::Shot => format!("{player} shoots! {description}!"),
        EventKind::Foul => format!("Foul by {player}. {description}."),
        EventKind::Save => format!("What a save from {player}! {description}!"),
        EventKind::Dribble => format!("{player} on the ball. {description}!"),
        EventKind::Tackle => format!("Strong challenge from {player}. {description}."),
        EventKind::Offside => format!("Flag is up, {player} is offside. {description}."),
    }
}
