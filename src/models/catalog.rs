use serde::{Deserialize, Serialize};

/// Static reference data for one exercise template. Read-only lookup data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseCatalogEntry {
  pub id: String,
  #[serde(default)]
  pub title: String,
  /// weight_reps, reps_only, duration, ...
  #[serde(rename = "type", default)]
  pub exercise_type: Option<String>,
  #[serde(default)]
  pub primary_muscle_group: Option<String>,
  #[serde(default)]
  pub secondary_muscle_groups: Vec<String>,
  #[serde(default)]
  pub equipment: Option<String>,
  #[serde(default)]
  pub is_custom: bool,
}
