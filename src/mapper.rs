//! Planned routine -> Hevy "create routine" payload

use thiserror::Error;

use crate::models::{CreateRoutineRequest, PlannedExercise, PlannedRoutine, RoutineExercise, RoutineSet};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
  #[error("Routine title is required")]
  MissingTitle,

  #[error("Routine must have at least one exercise")]
  NoExercises,

  #[error("Exercise {index} must have an exercise_template_id")]
  MissingTemplateId { index: usize },

  #[error("Exercise {index} ({exercise_template_id}) must have at least one set")]
  NoSets { index: usize, exercise_template_id: String },
}

pub fn map_to_payload(routine: &PlannedRoutine, folder_id: Option<i64>) -> CreateRoutineRequest {
  CreateRoutineRequest {
    title: routine.title.clone(),
    folder_id,
    notes: routine.notes.clone(),
    exercises: routine.exercises.iter().map(map_exercise).collect(),
  }
}

fn map_exercise(exercise: &PlannedExercise) -> RoutineExercise {
  let sets = exercise
    .sets
    .iter()
    .map(|set| RoutineSet {
      set_type: set.set_type,
      // Zero means bodyweight
      weight_kg: (set.target_weight > 0.0).then_some(set.target_weight),
      reps: Some(set.reps),
      distance_meters: None,
      duration_seconds: None,
    })
    .collect();

  RoutineExercise {
    exercise_template_id: exercise.exercise_template_id.clone(),
    superset_id: None,
    notes: Some(exercise.notes.clone()),
    sets,
  }
}

/// Structural checks, in order: title, exercise list, then each exercise's id and sets
pub fn validate_payload(payload: &CreateRoutineRequest) -> Result<(), PayloadError> {
  if payload.title.trim().is_empty() {
    return Err(PayloadError::MissingTitle);
  }

  if payload.exercises.is_empty() {
    return Err(PayloadError::NoExercises);
  }

  for (index, exercise) in payload.exercises.iter().enumerate() {
    if exercise.exercise_template_id.trim().is_empty() {
      return Err(PayloadError::MissingTemplateId { index });
    }
    if exercise.sets.is_empty() {
      return Err(PayloadError::NoSets {
        index,
        exercise_template_id: exercise.exercise_template_id.clone(),
      });
    }
  }

  Ok(())
}
