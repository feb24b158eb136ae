//! Routine publishing
//!
//! Renders a planned routine for the terminal and sends it to Hevy after
//! mapping and validating the payload. Dry runs never touch the network.

use std::fmt::Write as _;
use thiserror::Error;

use crate::hevy::{HevyClient, HevyError};
use crate::mapper::{map_to_payload, validate_payload, PayloadError};
use crate::models::{PlannedRoutine, Routine};

pub const DEFAULT_FOLDER_NAME: &str = "AI Routines";

#[derive(Debug, Error)]
pub enum PublishError {
  #[error("Invalid routine payload: {0}")]
  Payload(#[from] PayloadError),

  #[error(transparent)]
  Api(#[from] HevyError),
}

#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
  pub dry_run: bool,
  /// Folder to file the routine under; created when missing
  pub folder_name: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Summary Rendering
/// ---------------------------------------------------------------------------

pub fn format_routine_summary(routine: &PlannedRoutine) -> String {
  let rule = "=".repeat(60);
  let mut out = String::new();

  // Writing to a String cannot fail
  let _ = writeln!(out, "{}", rule);
  let _ = writeln!(out, "ROUTINE: {}", routine.title);
  let _ = writeln!(out, "{}", rule);
  let _ = writeln!(out, "Estimated Duration: {} minutes", routine.total_estimated_minutes);
  let _ = writeln!(out, "Exercises: {}", routine.exercises.len());
  let _ = writeln!(out, "Notes: {}", routine.notes);

  for (i, exercise) in routine.exercises.iter().enumerate() {
    let marker = if exercise.is_compound { "[compound]" } else { "[isolation]" };
    let _ = writeln!(out);
    let _ = writeln!(out, "{}. {} {}", i + 1, exercise.exercise_name, marker);
    let _ = writeln!(out, "   {}", exercise.progression_strategy.label());
    let _ = writeln!(out, "   {} sets:", exercise.sets.len());

    for (set_index, set) in exercise.sets.iter().enumerate() {
      let weight = if set.target_weight > 0.0 {
        format!("{}kg", set.target_weight)
      } else {
        "BW".to_string()
      };
      let _ = writeln!(
        out,
        "      Set {}: {} x {} reps (rest: {}s)",
        set_index + 1,
        weight,
        set.reps,
        set.rest_seconds
      );
    }

    if !exercise.notes.is_empty() {
      let _ = writeln!(out, "   {}", exercise.notes);
    }
  }

  out
}

/// ---------------------------------------------------------------------------
/// Publishing
/// ---------------------------------------------------------------------------

/// Returns `Ok(None)` for a dry run, the created routine otherwise
pub async fn publish(
  client: &HevyClient,
  routine: &PlannedRoutine,
  options: &PublishOptions,
) -> Result<Option<Routine>, PublishError> {
  if options.dry_run {
    tracing::info!("Dry run: routine '{}' not sent to Hevy", routine.title);
    return Ok(None);
  }

  // Structure is checked before any request goes out, folder lookup included
  let mut payload = map_to_payload(routine, None);
  validate_payload(&payload)?;

  if let Some(name) = &options.folder_name {
    payload.folder_id = Some(client.ensure_routine_folder(name).await?.id);
  }

  tracing::info!("Publishing routine '{}' to Hevy", routine.title);
  let created = client.create_routine(&payload).await?;

  Ok(Some(created))
}
