//! Analysis lookup.
//! There is no analysis backend: every identifier resolves to the bundled match fixture.

use crate::core::analysis::{Analysis, AnalysisError, AnalysisId};
use crate::core::time::Seconds;

const MATCH_FIXTURE: &str = include_str!("../../assets/match_fixture.json");

/// Resolves an analysis identifier to its analysis
pub trait AnalysisSource {
    fn lookup(&self, id: &AnalysisId) -> Result<Analysis, AnalysisError>;
}

/// Source that answers every lookup with the bundled fixture
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSource;

impl AnalysisSource for FixtureSource {
    fn lookup(&self, id: &AnalysisId) -> Result<Analysis, AnalysisError> {
        tracing::debug!(analysis = %id, "serving fixture analysis");
        match_fixture()
    }
}

/// The bundled 90-second match fixture
pub fn match_fixture() -> Result<Analysis, AnalysisError> {
    Analysis::from_json(MATCH_FIXTURE)
}

/// Fixture analysis under a fresh identifier, stretched to `duration`
pub fn generate_analysis(duration: Seconds) -> Result<Analysis, AnalysisError> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(AnalysisError::InvalidDuration(duration));
    }

    let mut analysis = match_fixture()?;
    analysis.id = AnalysisId::generate();
    analysis.duration = duration;
    Ok(analysis)
}
