use serde::{Deserialize, Serialize};

use super::workout::SetType;

/// How weight and reps vary across the sets of one exercise in one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressionStrategy {
  /// Ascending: light and high reps first, heaviest last
  Pyramid,
  /// Descending: heaviest first while fresh
  ReversePyramid,
  /// Alternating heavy / moderate sets
  Wave,
  /// Same weight every set, reps near the middle of the range
  Flat,
}

impl ProgressionStrategy {
  pub fn label(&self) -> &'static str {
    match self {
      Self::Pyramid => "Pyramid (ascending)",
      Self::ReversePyramid => "Reverse Pyramid",
      Self::Wave => "Wave Loading",
      Self::Flat => "Flat Load",
    }
  }
}

impl std::fmt::Display for ProgressionStrategy {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Pyramid => write!(f, "pyramid"),
      Self::ReversePyramid => write!(f, "reverse-pyramid"),
      Self::Wave => write!(f, "wave"),
      Self::Flat => write!(f, "flat"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSet {
  pub set_type: SetType,
  pub reps: u32,
  /// Already rounded to the nearest half unit
  pub target_weight: f64,
  pub rest_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
  pub exercise_template_id: String,
  pub exercise_name: String,
  pub sets: Vec<PlannedSet>,
  pub notes: String,
  pub is_compound: bool,
  pub progression_strategy: ProgressionStrategy,
  pub estimated_duration_seconds: u32,
}

/// Output of one planning run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRoutine {
  pub title: String,
  pub exercises: Vec<PlannedExercise>,
  pub total_estimated_minutes: u32,
  pub notes: String,
}
