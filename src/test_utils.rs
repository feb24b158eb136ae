//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Workout history factories
//! - Catalog and stat fixtures
//! - A scripted random source for deterministic planner tests

use crate::analysis::{ExerciseStat, PerformanceRecord, ProgressionTrend};
use crate::models::{ExerciseCatalogEntry, SetType, WorkoutExercise, WorkoutRecord, WorkoutSet};
use crate::planner::RandomSource;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// ---------------------------------------------------------------------------
/// Workout History Factories
/// ---------------------------------------------------------------------------

/// Fixed anchor so tests never depend on the wall clock
pub fn base_time() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
}

/// A normal (working) set
pub fn make_set(weight: f64, reps: u32) -> WorkoutSet {
  make_typed_set(SetType::Normal, weight, reps)
}

pub fn make_typed_set(set_type: SetType, weight: f64, reps: u32) -> WorkoutSet {
  WorkoutSet {
    index: 0,
    set_type,
    weight_kg: Some(weight),
    reps: Some(reps),
    distance_meters: None,
    duration_seconds: None,
    rpe: None,
  }
}

pub fn make_exercise(template_id: &str, title: &str, sets: Vec<WorkoutSet>) -> WorkoutExercise {
  let sets = sets
    .into_iter()
    .enumerate()
    .map(|(i, mut set)| {
      set.index = i as u32;
      set
    })
    .collect();

  WorkoutExercise {
    index: 0,
    title: title.to_string(),
    exercise_template_id: template_id.to_string(),
    superset_id: None,
    notes: None,
    sets,
  }
}

/// Workout starting `day_offset` days after the anchor; larger offsets are more recent
pub fn make_workout(id: &str, day_offset: i64, exercises: Vec<WorkoutExercise>) -> WorkoutRecord {
  let start_time = base_time() + Duration::days(day_offset);

  WorkoutRecord {
    id: id.to_string(),
    title: format!("Workout {}", id),
    description: None,
    start_time,
    end_time: start_time + Duration::hours(1),
    exercises,
  }
}

/// ---------------------------------------------------------------------------
/// Catalog and Stat Fixtures
/// ---------------------------------------------------------------------------

pub fn make_template(id: &str, title: &str, primary: &str, secondary: &[&str]) -> ExerciseCatalogEntry {
  ExerciseCatalogEntry {
    id: id.to_string(),
    title: title.to_string(),
    exercise_type: Some("weight_reps".to_string()),
    primary_muscle_group: Some(primary.to_string()),
    secondary_muscle_groups: secondary.iter().map(|s| s.to_string()).collect(),
    equipment: None,
    is_custom: false,
  }
}

/// Stat with no weighted history; planner treats it as untrained
pub fn make_stat(id: &str, name: &str, muscle: Option<&str>, frequency: u32, total_volume: f64) -> ExerciseStat {
  let mut stat = ExerciseStat::new(id, name);
  stat.muscle_group = muscle.map(str::to_string);
  stat.frequency = frequency;
  stat.total_sets = frequency * 3;
  stat.total_volume = total_volume;
  stat
}

/// Stat whose best recorded set is `top_weight` x 8
pub fn make_trained_stat(
  id: &str,
  name: &str,
  muscle: Option<&str>,
  frequency: u32,
  top_weight: f64,
  trend: Option<ProgressionTrend>,
) -> ExerciseStat {
  let top = PerformanceRecord {
    date: base_time(),
    weight: top_weight,
    reps: 8,
  };

  let mut stat = make_stat(id, name, muscle, frequency, top.volume() * frequency as f64);
  stat.last_performed = Some(top.date);
  stat.recent_performance = vec![top.clone()];
  stat.top_set = Some(top);
  stat.avg_weight = Some(top_weight);
  stat.avg_reps = Some(8.0);
  stat.progression_trend = trend;
  stat
}

/// ---------------------------------------------------------------------------
/// Scripted Randomness
/// ---------------------------------------------------------------------------

/// Replays a fixed sequence of draws in `[0, 1)`, cycling when exhausted
pub struct FixedRandom {
  values: Vec<f64>,
  cursor: usize,
}

impl FixedRandom {
  pub fn new(values: Vec<f64>) -> Self {
    assert!(!values.is_empty(), "FixedRandom needs at least one value");
    Self { values, cursor: 0 }
  }

  /// Always draws the same value
  pub fn constant(value: f64) -> Self {
    Self::new(vec![value])
  }
}

impl RandomSource for FixedRandom {
  fn next_f64(&mut self) -> f64 {
    let value = self.values[self.cursor % self.values.len()];
    self.cursor += 1;
    value
  }

  fn next_index(&mut self, upper: usize) -> usize {
    let index = (self.next_f64() * upper as f64).floor() as usize;
    index.min(upper.saturating_sub(1))
  }
}
