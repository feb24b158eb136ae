pub mod plan;
pub mod routines;
pub mod stats;

use chrono::{Months, NaiveDate};
use thiserror::Error;

use crate::analysis::{filter_by_focus, ExerciseStat, PerformanceAnalyzer};
use crate::config::{ConfigError, PlanningConstants, TrainingConfig};
use crate::hevy::{HevyClient, HevyError};
use crate::models::{ExerciseCatalogEntry, WorkoutRecord};
use crate::publisher::PublishError;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CommandError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Hevy(#[from] HevyError),

  #[error(transparent)]
  Publish(#[from] PublishError),

  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Failed to start runtime: {0}")]
  Runtime(#[from] std::io::Error),
}

/// ---------------------------------------------------------------------------
/// Shared History Loading
/// ---------------------------------------------------------------------------

/// First day of the history window ending on `today`
pub fn history_start(today: NaiveDate, history_months: u32) -> NaiveDate {
  today
    .checked_sub_months(Months::new(history_months))
    .unwrap_or(NaiveDate::MIN)
}

pub struct TrainingHistory {
  pub workouts: Vec<WorkoutRecord>,
  pub templates: Vec<ExerciseCatalogEntry>,
}

pub async fn fetch_history(
  client: &HevyClient,
  today: NaiveDate,
  history_months: u32,
) -> Result<TrainingHistory, CommandError> {
  let start = history_start(today, history_months);

  tracing::info!("Fetching workouts from {} to {}", start, today);
  let workouts = client.get_all_workouts(Some(start), Some(today)).await?;
  tracing::info!("Found {} workouts", workouts.len());

  tracing::info!("Fetching exercise templates");
  let templates = client.get_all_exercise_templates().await?;
  tracing::info!("Found {} exercise templates", templates.len());

  Ok(TrainingHistory { workouts, templates })
}

/// Stats for the configured focus muscles, best-ranked first
pub fn focused_stats(
  history: &TrainingHistory,
  training: &TrainingConfig,
  constants: &PlanningConstants,
) -> Vec<ExerciseStat> {
  let analyzer = PerformanceAnalyzer::from_constants(constants);
  let stats = analyzer.build_exercise_stats(&history.workouts, &history.templates);
  tracing::info!("Analyzed {} unique exercises", stats.len());

  let focused = filter_by_focus(&stats, &training.focus_muscles);
  tracing::info!(
    "{} exercises match focus: {}",
    focused.len(),
    training.focus_muscles.join(", ")
  );
  focused
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{make_exercise, make_set, make_template, make_workout};

  #[test]
  fn test_history_start() {
    let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
    assert_eq!(history_start(today, 12), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    // Clamped to the end of a shorter month
    assert_eq!(history_start(today, 1), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
  }

  #[test]
  fn test_focused_stats_filters_and_ranks() {
    let history = TrainingHistory {
      workouts: vec![
        make_workout(
          "1",
          0,
          vec![
            make_exercise("bench", "Bench Press", vec![make_set(80.0, 8)]),
            make_exercise("squat", "Squat", vec![make_set(120.0, 5)]),
          ],
        ),
        make_workout("2", 2, vec![make_exercise("curl", "Bicep Curl", vec![make_set(14.0, 10)])]),
        make_workout("3", 4, vec![make_exercise("curl", "Bicep Curl", vec![make_set(14.0, 10)])]),
      ],
      templates: vec![
        make_template("bench", "Bench Press", "chest", &["triceps"]),
        make_template("squat", "Squat", "quadriceps", &["glutes"]),
        make_template("curl", "Bicep Curl", "biceps", &[]),
      ],
    };

    let training = TrainingConfig::default();
    let focused = focused_stats(&history, &training, &PlanningConstants::default());
    let ids: Vec<&str> = focused.iter().map(|s| s.exercise_template_id.as_str()).collect();

    assert_eq!(ids, vec!["curl", "bench"]);
  }
}
