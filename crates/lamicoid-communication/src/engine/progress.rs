//! Progress reports copied out of the engine.

use serde::Serialize;
use std::fmt;

/// Overall phase reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressType {
    #[default]
    NotStarted,
    InProgress,
    Finished,
    Error,
}

impl fmt::Display for ProgressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Finished => "finished",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// An owned copy of one engine progress report.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProgressSnapshot {
    pub progress_type: ProgressType,
    /// Name of the current stage, empty before the first chunk.
    pub stage_name: String,
    /// Stage detail as the engine's JSON text, when it provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_json: Option<String>,
    /// Whether `stage_progress` carries a meaningful fraction.
    pub stage_has_progress: bool,
    pub stage_progress: f32,
    pub stage_index: usize,
    pub stage_count: usize,
    /// Overall fraction in `0.0..=1.0`.
    pub total_progress: f32,
}

impl ProgressSnapshot {
    /// Fraction of the current stage, if the stage reports one.
    pub fn stage_fraction(&self) -> Option<f32> {
        self.stage_has_progress
            .then(|| self.stage_progress.clamp(0.0, 1.0))
    }

    /// Overall progress as a whole percentage.
    pub fn percent(&self) -> u8 {
        (self.total_progress.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    pub fn is_finished(&self) -> bool {
        self.progress_type == ProgressType::Finished
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stage_count == 0 {
            return write!(f, "{} ({}%)", self.progress_type, self.percent());
        }
        write!(
            f,
            "stage {}/{} '{}'",
            self.stage_index + 1,
            self.stage_count,
            self.stage_name
        )?;
        if let Some(fraction) = self.stage_fraction() {
            write!(f, " {:.0}%", fraction * 100.0)?;
        }
        write!(f, ", total {}%", self.percent())
    }
}
