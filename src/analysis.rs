//! Deterministic analysis layer for strength history
//!
//! Turns raw workout history into per-exercise statistics, then narrows and
//! buckets them for the routine planner. Nothing here fails: missing data
//! degrades to zero volume, placeholder names, or an unset trend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::PlanningConstants;
use crate::models::{ExerciseCatalogEntry, WorkoutRecord};

const UNKNOWN_EXERCISE: &str = "Unknown Exercise";
const RECENT_PERFORMANCE_LIMIT: usize = 5;
const TREND_WINDOW: usize = 3;

/// ---------------------------------------------------------------------------
/// Progression Trend
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionTrend {
  Improving,
  Plateaued,
  Regressing,
}

impl ProgressionTrend {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProgressionTrend::Improving => "improving",
      ProgressionTrend::Plateaued => "plateaued",
      ProgressionTrend::Regressing => "regressing",
    }
  }

  /// Classify the three most recent volumes, most recent first.
  /// Returns the trend and the consecutive-failure count it implies.
  pub fn classify(volumes: [f64; 3]) -> (Self, u32) {
    let [v0, v1, v2] = volumes;
    match () {
      _ if v0 > v1 && v1 > v2 => (ProgressionTrend::Improving, 0),
      _ if v0 < v1 && v1 < v2 => (ProgressionTrend::Regressing, 2),
      _ => (ProgressionTrend::Plateaued, 1),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Exercise Statistics
/// ---------------------------------------------------------------------------

/// Best set of one workout, or the best set ever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
  pub date: DateTime<Utc>,
  pub weight: f64,
  pub reps: u32,
}

impl PerformanceRecord {
  pub fn volume(&self) -> f64 {
    self.weight * self.reps as f64
  }
}

/// Aggregate for one exercise template, rebuilt on every planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseStat {
  pub exercise_template_id: String,
  pub exercise_name: String,
  /// Working (normal) sets, outliers included
  pub total_sets: u32,
  /// Sum of weight x reps over working sets under the outlier ceiling
  pub total_volume: f64,
  /// Number of workouts containing the exercise
  pub frequency: u32,
  pub last_performed: Option<DateTime<Utc>>,
  pub top_set: Option<PerformanceRecord>,
  /// Up to five per-workout best sets, most recent first
  pub recent_performance: Vec<PerformanceRecord>,
  pub avg_weight: Option<f64>,
  pub avg_reps: Option<f64>,
  pub muscle_group: Option<String>,
  pub other_muscles: Vec<String>,
  pub progression_trend: Option<ProgressionTrend>,
  pub consecutive_failures: u32,
}

impl ExerciseStat {
  pub fn new(exercise_template_id: impl Into<String>, exercise_name: impl Into<String>) -> Self {
    Self {
      exercise_template_id: exercise_template_id.into(),
      exercise_name: exercise_name.into(),
      total_sets: 0,
      total_volume: 0.0,
      frequency: 0,
      last_performed: None,
      top_set: None,
      recent_performance: Vec::new(),
      avg_weight: None,
      avg_reps: None,
      muscle_group: None,
      other_muscles: Vec::new(),
      progression_trend: None,
      consecutive_failures: 0,
    }
  }

  /// Frequency dominates; volume (in thousands) breaks ties
  pub fn ranking_score(&self) -> f64 {
    self.frequency as f64 * 10.0 + self.total_volume / 1000.0
  }

  /// Weight of the best set ever, zero when never loaded
  pub fn best_weight(&self) -> f64 {
    self.top_set.as_ref().map(|s| s.weight).unwrap_or(0.0)
  }
}

/// ---------------------------------------------------------------------------
/// Performance Analyzer
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PerformanceAnalyzer {
  outlier_ceiling_kg: f64,
}

impl Default for PerformanceAnalyzer {
  fn default() -> Self {
    Self::from_constants(&PlanningConstants::default())
  }
}

impl PerformanceAnalyzer {
  pub fn from_constants(constants: &PlanningConstants) -> Self {
    Self {
      outlier_ceiling_kg: constants.outlier_ceiling_kg,
    }
  }

  /// Build one stat entry per exercise template seen in the history
  pub fn build_exercise_stats(
    &self,
    workouts: &[WorkoutRecord],
    catalog: &[ExerciseCatalogEntry],
  ) -> HashMap<String, ExerciseStat> {
    let templates: HashMap<&str, &ExerciseCatalogEntry> =
      catalog.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut stats: HashMap<String, ExerciseStat> = HashMap::new();
    let mut history: HashMap<String, Vec<PerformanceRecord>> = HashMap::new();

    for workout in workouts {
      let workout_date = workout.start_time;
      let mut seen_this_workout: HashSet<&str> = HashSet::new();
      // (template id, best weight, best reps) in first-seen order
      let mut workout_best: Vec<(&str, Option<(f64, u32)>)> = Vec::new();

      for exercise in &workout.exercises {
        let template_id = exercise.exercise_template_id.as_str();
        let template = templates.get(template_id).copied();

        let stat = stats
          .entry(template_id.to_string())
          .or_insert_with(|| new_stat(template_id, &exercise.title, template));

        if seen_this_workout.insert(template_id) {
          stat.frequency += 1;
          workout_best.push((template_id, None));
        }

        let working_sets: Vec<_> = exercise.sets.iter().filter(|s| s.is_working_set()).collect();
        stat.total_sets += working_sets.len() as u32;

        let best_slot = workout_best
          .iter_mut()
          .find(|(id, _)| *id == template_id)
          .map(|(_, best)| best);

        let mut best = best_slot.as_ref().and_then(|b| **b);

        for set in working_sets {
          let weight = set.weight();
          let reps = set.rep_count();

          if weight > self.outlier_ceiling_kg {
            tracing::warn!(
              "Skipping outlier: {} - {}kg (likely typo)",
              stat.exercise_name,
              weight
            );
            continue;
          }

          let volume = weight * reps as f64;
          stat.total_volume += volume;

          let beats_top = stat.top_set.as_ref().map_or(true, |top| volume > top.volume());
          if beats_top {
            stat.top_set = Some(PerformanceRecord {
              date: workout_date,
              weight,
              reps,
            });
          }

          let beats_workout_best = best.map_or(true, |(w, r)| volume > w * r as f64);
          if beats_workout_best {
            best = Some((weight, reps));
          }
        }

        if let Some(slot) = best_slot {
          *slot = best;
        }

        if stat.last_performed.map_or(true, |last| workout_date > last) {
          stat.last_performed = Some(workout_date);
        }
      }

      for (template_id, best) in workout_best {
        if let Some((weight, reps)) = best {
          if weight > 0.0 {
            history.entry(template_id.to_string()).or_default().push(PerformanceRecord {
              date: workout_date,
              weight,
              reps,
            });
          }
        }
      }
    }

    for (template_id, stat) in stats.iter_mut() {
      let mut records = history.remove(template_id).unwrap_or_default();
      finalize_stat(stat, &mut records);
    }

    stats
  }
}

fn new_stat(template_id: &str, title: &str, template: Option<&ExerciseCatalogEntry>) -> ExerciseStat {
  let name = Some(title)
    .filter(|t| !t.trim().is_empty())
    .or_else(|| template.map(|t| t.title.as_str()).filter(|t| !t.trim().is_empty()))
    .unwrap_or(UNKNOWN_EXERCISE);

  let mut stat = ExerciseStat::new(template_id, name);
  if let Some(template) = template {
    stat.muscle_group = template.primary_muscle_group.clone();
    stat.other_muscles = template.secondary_muscle_groups.clone();
  }
  stat
}

/// Sort history, keep the recent window, derive averages and the trend
fn finalize_stat(stat: &mut ExerciseStat, history: &mut Vec<PerformanceRecord>) {
  history.sort_by(|a, b| b.date.cmp(&a.date));
  history.truncate(RECENT_PERFORMANCE_LIMIT);

  if history.len() >= TREND_WINDOW {
    let volumes = [history[0].volume(), history[1].volume(), history[2].volume()];
    let (trend, failures) = ProgressionTrend::classify(volumes);
    stat.progression_trend = Some(trend);
    stat.consecutive_failures = failures;
  }

  if stat.total_sets > 0 && !history.is_empty() {
    let n = history.len() as f64;
    stat.avg_weight = Some(history.iter().map(|h| h.weight).sum::<f64>() / n);
    stat.avg_reps = Some(history.iter().map(|h| h.reps as f64).sum::<f64>() / n);
  }

  stat.recent_performance = std::mem::take(history);
}

/// ---------------------------------------------------------------------------
/// Focus Filtering
/// ---------------------------------------------------------------------------

/// Name keywords (English and German) and muscle-group values per focus area
struct MuscleKeywords {
  aliases: &'static [&'static str],
  name_keywords: &'static [&'static str],
  primary_muscles: &'static [&'static str],
}

const MUSCLE_KEYWORDS: &[MuscleKeywords] = &[
  MuscleKeywords {
    aliases: &["arms", "biceps"],
    name_keywords: &["curl", "bicep", "bizeps"],
    primary_muscles: &["biceps"],
  },
  MuscleKeywords {
    aliases: &["triceps"],
    name_keywords: &["tricep", "trizeps"],
    primary_muscles: &["triceps"],
  },
  MuscleKeywords {
    aliases: &["shoulders"],
    name_keywords: &[
      "shoulder", "schulter", "press", "raise", "heben", "facepull", "front", "lateral",
    ],
    primary_muscles: &["shoulders"],
  },
  MuscleKeywords {
    aliases: &["chest"],
    name_keywords: &["chest", "brust", "bench", "fly", "fliegende", "butterfly"],
    primary_muscles: &["chest"],
  },
  MuscleKeywords {
    aliases: &["lats", "back", "upper_back"],
    name_keywords: &["lat", "row", "rudern", "pull", "ziehen"],
    primary_muscles: &["lats", "upper_back"],
  },
  MuscleKeywords {
    aliases: &["legs", "quadriceps", "hamstrings"],
    name_keywords: &["bein", "leg", "squat"],
    primary_muscles: &["quadriceps", "hamstrings", "glutes"],
  },
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
  needles.iter().any(|n| haystack.contains(n))
}

/// Muscle-group fields first, then the focus word in the name, then the keyword table
fn matches_focus(stat: &ExerciseStat, focus: &str) -> bool {
  let name = stat.exercise_name.to_lowercase();
  let primary = stat.muscle_group.as_deref().unwrap_or_default().to_lowercase();

  if primary.contains(focus) || stat.other_muscles.iter().any(|m| m.to_lowercase().contains(focus)) {
    return true;
  }

  if name.contains(focus) {
    return true;
  }

  MUSCLE_KEYWORDS
    .iter()
    .find(|k| k.aliases.contains(&focus))
    .is_some_and(|k| {
      contains_any(&name, k.name_keywords) || k.primary_muscles.contains(&primary.as_str())
    })
}

/// Keep exercises hitting any focus muscle, best-ranked first
pub fn filter_by_focus(stats: &HashMap<String, ExerciseStat>, focus_muscles: &[String]) -> Vec<ExerciseStat> {
  let focus: Vec<String> = focus_muscles
    .iter()
    .map(|m| m.trim().to_lowercase())
    .filter(|m| !m.is_empty())
    .collect();

  let mut filtered: Vec<ExerciseStat> = stats
    .values()
    .filter(|stat| focus.iter().any(|m| matches_focus(stat, m)))
    .cloned()
    .collect();

  // Id tiebreak keeps the order independent of map iteration
  filtered.sort_by(|a, b| {
    b.ranking_score()
      .total_cmp(&a.ranking_score())
      .then_with(|| a.exercise_template_id.cmp(&b.exercise_template_id))
  });

  filtered
}

/// ---------------------------------------------------------------------------
/// Categorization
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
  ChestCompound,
  ShoulderCompound,
  ChestIsolation,
  ShoulderIsolation,
  Triceps,
  Biceps,
  Other,
}

impl ExerciseCategory {
  pub fn label(&self) -> &'static str {
    match self {
      ExerciseCategory::ChestCompound => "chest compound",
      ExerciseCategory::ShoulderCompound => "shoulder compound",
      ExerciseCategory::ChestIsolation => "chest isolation",
      ExerciseCategory::ShoulderIsolation => "shoulder isolation",
      ExerciseCategory::Triceps => "triceps",
      ExerciseCategory::Biceps => "biceps",
      ExerciseCategory::Other => "other",
    }
  }
}

fn is_biceps(muscle: &str, name: &str) -> bool {
  muscle == "biceps" || contains_any(name, &["curl", "bizeps"])
}

fn is_triceps(muscle: &str, name: &str) -> bool {
  muscle == "triceps" || contains_any(name, &["tricep", "trizeps"])
}

fn is_chest_compound(muscle: &str, name: &str) -> bool {
  muscle == "chest"
    && (contains_any(name, &["bench", "bankdrücken"]) || (name.contains("press") && name.contains("brust")))
}

fn is_chest_isolation(muscle: &str, name: &str) -> bool {
  muscle == "chest" || contains_any(name, &["butterfly", "fliegende", "fly", "chest"])
}

fn is_shoulder_compound(muscle: &str, name: &str) -> bool {
  muscle == "shoulders" && contains_any(name, &["press", "drücken"])
}

fn is_shoulder_isolation(muscle: &str, name: &str) -> bool {
  muscle == "shoulders" || contains_any(name, &["heben", "raise", "facepull", "face pull"])
}

type CategoryRule = (ExerciseCategory, fn(&str, &str) -> bool);

/// Evaluated top to bottom; first match wins, `Other` otherwise
const CATEGORY_RULES: &[CategoryRule] = &[
  (ExerciseCategory::Biceps, is_biceps),
  (ExerciseCategory::Triceps, is_triceps),
  (ExerciseCategory::ChestCompound, is_chest_compound),
  (ExerciseCategory::ChestIsolation, is_chest_isolation),
  (ExerciseCategory::ShoulderCompound, is_shoulder_compound),
  (ExerciseCategory::ShoulderIsolation, is_shoulder_isolation),
];

pub fn classify_exercise(stat: &ExerciseStat) -> ExerciseCategory {
  let name = stat.exercise_name.to_lowercase();
  let muscle = stat.muscle_group.as_deref().unwrap_or_default().to_lowercase();

  CATEGORY_RULES
    .iter()
    .find(|(_, rule)| rule(&muscle, &name))
    .map(|(category, _)| *category)
    .unwrap_or(ExerciseCategory::Other)
}

/// Seven disjoint buckets, each keeping the input ranking order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorizedExercises {
  pub chest_compound: Vec<ExerciseStat>,
  pub shoulder_compound: Vec<ExerciseStat>,
  pub chest_isolation: Vec<ExerciseStat>,
  pub shoulder_isolation: Vec<ExerciseStat>,
  pub triceps: Vec<ExerciseStat>,
  pub biceps: Vec<ExerciseStat>,
  pub other: Vec<ExerciseStat>,
}

impl CategorizedExercises {
  pub fn bucket(&self, category: ExerciseCategory) -> &[ExerciseStat] {
    match category {
      ExerciseCategory::ChestCompound => &self.chest_compound,
      ExerciseCategory::ShoulderCompound => &self.shoulder_compound,
      ExerciseCategory::ChestIsolation => &self.chest_isolation,
      ExerciseCategory::ShoulderIsolation => &self.shoulder_isolation,
      ExerciseCategory::Triceps => &self.triceps,
      ExerciseCategory::Biceps => &self.biceps,
      ExerciseCategory::Other => &self.other,
    }
  }

  fn bucket_mut(&mut self, category: ExerciseCategory) -> &mut Vec<ExerciseStat> {
    match category {
      ExerciseCategory::ChestCompound => &mut self.chest_compound,
      ExerciseCategory::ShoulderCompound => &mut self.shoulder_compound,
      ExerciseCategory::ChestIsolation => &mut self.chest_isolation,
      ExerciseCategory::ShoulderIsolation => &mut self.shoulder_isolation,
      ExerciseCategory::Triceps => &mut self.triceps,
      ExerciseCategory::Biceps => &mut self.biceps,
      ExerciseCategory::Other => &mut self.other,
    }
  }

  pub fn len(&self) -> usize {
    self.chest_compound.len()
      + self.shoulder_compound.len()
      + self.chest_isolation.len()
      + self.shoulder_isolation.len()
      + self.triceps.len()
      + self.biceps.len()
      + self.other.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Which bucket holds the given exercise, if any
  pub fn category_of(&self, exercise_template_id: &str) -> Option<ExerciseCategory> {
    [
      ExerciseCategory::ChestCompound,
      ExerciseCategory::ShoulderCompound,
      ExerciseCategory::ChestIsolation,
      ExerciseCategory::ShoulderIsolation,
      ExerciseCategory::Triceps,
      ExerciseCategory::Biceps,
      ExerciseCategory::Other,
    ]
    .into_iter()
    .find(|c| self.bucket(*c).iter().any(|s| s.exercise_template_id == exercise_template_id))
  }
}

pub fn categorize(stats: Vec<ExerciseStat>) -> CategorizedExercises {
  let mut categories = CategorizedExercises::default();
  for stat in stats {
    let category = classify_exercise(&stat);
    categories.bucket_mut(category).push(stat);
  }
  categories
}
