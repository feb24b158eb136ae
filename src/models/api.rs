use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::ExerciseCatalogEntry;
use super::workout::{SetType, WorkoutRecord};

/// ---------------------------------------------------------------------------
/// Paginated Responses
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutsPage {
  pub page: u32,
  pub page_count: u32,
  #[serde(default)]
  pub workouts: Vec<WorkoutRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseTemplatesPage {
  pub page: u32,
  pub page_count: u32,
  #[serde(default)]
  pub exercise_templates: Vec<ExerciseCatalogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutinesPage {
  pub page: u32,
  pub page_count: u32,
  #[serde(default)]
  pub routines: Vec<Routine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutineFoldersPage {
  pub page: u32,
  pub page_count: u32,
  #[serde(default)]
  pub routine_folders: Vec<RoutineFolder>,
}

/// ---------------------------------------------------------------------------
/// Routines and Folders
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineFolder {
  pub id: i64,
  pub title: String,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

/// Set as the service stores it on a routine; absent values serialize as null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineSet {
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
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineExercise {
  pub exercise_template_id: String,
  #[serde(default)]
  pub superset_id: Option<i64>,
  #[serde(default)]
  pub notes: Option<String>,
  #[serde(default)]
  pub sets: Vec<RoutineSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub folder_id: Option<i64>,
  #[serde(default)]
  pub notes: Option<String>,
  #[serde(default)]
  pub exercises: Vec<RoutineExercise>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

/// Body of "create routine"; sent wrapped as `{"routine": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoutineRequest {
  pub title: String,
  pub folder_id: Option<i64>,
  pub notes: String,
  pub exercises: Vec<RoutineExercise>,
}
