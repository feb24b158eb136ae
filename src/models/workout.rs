use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a logged set. Only `Normal` sets count as working sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
  #[default]
  Normal,
  Warmup,
  Failure,
  Dropset,
  /// Anything the service adds later; never treated as a working set
  #[serde(other)]
  Other,
}

/// A single logged set. Weight/reps may be absent for timed or distance work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSet {
  #[serde(default)]
  pub index: u32,
  #[serde(rename = "type", default)]
  pub set_type: SetType,
  #[serde(default)]
  pub weight_kg: Option<f64>,
  #[serde(default)]
  pub reps: Option<u32>,
  #[serde(default)]
  pub distance_meters: Option<f64>,
  #[serde(default)]
  pub duration_seconds: Option<i64>,
  #[serde(default)]
  pub rpe: Option<f64>,
}

impl WorkoutSet {
  pub fn is_working_set(&self) -> bool {
    self.set_type == SetType::Normal
  }

  /// Weight with missing values degraded to zero
  pub fn weight(&self) -> f64 {
    self.weight_kg.unwrap_or(0.0)
  }

  pub fn rep_count(&self) -> u32 {
    self.reps.unwrap_or(0)
  }

  /// weight x reps
  pub fn volume(&self) -> f64 {
    self.weight() * self.rep_count() as f64
  }
}

/// One exercise as performed inside a workout, sets in logged order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
  #[serde(default)]
  pub index: u32,
  #[serde(default)]
  pub title: String,
  pub exercise_template_id: String,
  #[serde(default)]
  pub superset_id: Option<i64>,
  #[serde(default)]
  pub notes: Option<String>,
  #[serde(default)]
  pub sets: Vec<WorkoutSet>,
}

/// Historical workout as returned by the service. Never mutated by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRecord {
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  pub start_time: DateTime<Utc>,
  pub end_time: DateTime<Utc>,
  #[serde(default)]
  pub exercises: Vec<WorkoutExercise>,
}
