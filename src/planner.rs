//! Routine planner
//!
//! Turns categorized exercise stats into today's routine. Structure is fixed
//! (one pick per slot, optional bonus exercise); the picks themselves and the
//! set counts are randomized through an injectable [`RandomSource`].

use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analysis::{CategorizedExercises, ExerciseCategory, ExerciseStat};
use crate::config::{PlanningConstants, TrainingConfig};
use crate::models::{PlannedExercise, PlannedRoutine};
use crate::progression::{
  calculate_adaptive_weight, estimate_exercise_duration, generate_sets, is_compound_exercise,
  select_progression_strategy, SetScheme,
};

/// Chance each runner-up (2nd and 3rd ranked) joins the pool
const TOP_INCLUSION_CHANCE: f64 = 0.7;
/// Chance each variety pick from outside the top three joins the pool
const VARIETY_INCLUSION_CHANCE: f64 = 0.4;
const TOP_CANDIDATES: usize = 3;
const VARIETY_CANDIDATES: usize = 2;

/// One pick from each, in this order
const SLOTS: [ExerciseCategory; 6] = [
  ExerciseCategory::ChestCompound,
  ExerciseCategory::ShoulderCompound,
  ExerciseCategory::ChestIsolation,
  ExerciseCategory::ShoulderIsolation,
  ExerciseCategory::Triceps,
  ExerciseCategory::Biceps,
];

/// ---------------------------------------------------------------------------
/// Randomness
/// ---------------------------------------------------------------------------

pub trait RandomSource {
  /// Uniform draw in `[0, 1)`
  fn next_f64(&mut self) -> f64;

  /// Uniform index in `[0, upper)`; `upper` is at least 1
  fn next_index(&mut self, upper: usize) -> usize;
}

/// Adapts any `rand` generator
pub struct RngSource<R: Rng> {
  rng: R,
}

impl<R: Rng> RngSource<R> {
  pub fn new(rng: R) -> Self {
    Self { rng }
  }
}

impl RngSource<ChaCha8Rng> {
  /// Reproducible stream: same seed, same routine
  pub fn seeded(seed: u64) -> Self {
    Self::new(ChaCha8Rng::seed_from_u64(seed))
  }

  pub fn from_entropy() -> Self {
    Self::new(ChaCha8Rng::from_entropy())
  }
}

impl<R: Rng> RandomSource for RngSource<R> {
  fn next_f64(&mut self) -> f64 {
    self.rng.gen::<f64>()
  }

  fn next_index(&mut self, upper: usize) -> usize {
    if upper <= 1 {
      return 0;
    }
    self.rng.gen_range(0..upper)
  }
}

/// Fisher-Yates
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
  for i in (1..items.len()).rev() {
    let j = rng.next_index(i + 1);
    items.swap(i, j);
  }
}

/// Candidate pool for one slot. `candidates` must already be ranked best-first.
///
/// The best candidate is always in the pool. The 2nd and 3rd each join with
/// 70% probability, and up to two randomly chosen lower-ranked candidates
/// join with 40% probability each. The pool is returned shuffled.
pub fn weighted_pool<'a, R: RandomSource + ?Sized>(
  candidates: &[&'a ExerciseStat],
  rng: &mut R,
) -> Vec<&'a ExerciseStat> {
  if candidates.len() <= 2 {
    let mut pool = candidates.to_vec();
    shuffle(&mut pool, rng);
    return pool;
  }

  let mut pool = vec![candidates[0]];
  for &candidate in &candidates[1..TOP_CANDIDATES] {
    if rng.next_f64() < TOP_INCLUSION_CHANCE {
      pool.push(candidate);
    }
  }

  let mut remainder = candidates[TOP_CANDIDATES..].to_vec();
  shuffle(&mut remainder, rng);
  for candidate in remainder.into_iter().take(VARIETY_CANDIDATES) {
    if rng.next_f64() < VARIETY_INCLUSION_CHANCE {
      pool.push(candidate);
    }
  }

  shuffle(&mut pool, rng);
  pool
}

/// ---------------------------------------------------------------------------
/// Routine Focus
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineFocus {
  FullUpper,
  ChestShoulders,
  ChestArms,
  ShoulderArms,
  Chest,
  Shoulders,
  Arms,
}

impl RoutineFocus {
  /// `arms` means both triceps and biceps are present
  pub fn from_flags(chest: bool, shoulders: bool, arms: bool) -> Self {
    match (chest, shoulders, arms) {
      (true, true, true) => Self::FullUpper,
      (true, true, false) => Self::ChestShoulders,
      (true, false, true) => Self::ChestArms,
      (false, true, true) => Self::ShoulderArms,
      (true, false, false) => Self::Chest,
      (false, true, false) => Self::Shoulders,
      (false, false, true) => Self::Arms,
      (false, false, false) => Self::FullUpper,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::FullUpper => "Full Upper Body",
      Self::ChestShoulders => "Chest & Shoulders",
      Self::ChestArms => "Chest & Arms",
      Self::ShoulderArms => "Shoulders & Arms",
      Self::Chest => "Chest Focus",
      Self::Shoulders => "Shoulder Focus",
      Self::Arms => "Arm Focus",
    }
  }

  fn of(exercises: &[PlannedExercise], categorized: &CategorizedExercises) -> Self {
    let present: HashSet<ExerciseCategory> = exercises
      .iter()
      .filter_map(|e| categorized.category_of(&e.exercise_template_id))
      .collect();
    let has = |c: ExerciseCategory| present.contains(&c);

    Self::from_flags(
      has(ExerciseCategory::ChestCompound) || has(ExerciseCategory::ChestIsolation),
      has(ExerciseCategory::ShoulderCompound) || has(ExerciseCategory::ShoulderIsolation),
      has(ExerciseCategory::Triceps) && has(ExerciseCategory::Biceps),
    )
  }
}

/// ---------------------------------------------------------------------------
/// Routine Planner
/// ---------------------------------------------------------------------------

pub struct RoutinePlanner<'a> {
  config: &'a TrainingConfig,
  constants: &'a PlanningConstants,
}

impl<'a> RoutinePlanner<'a> {
  pub fn new(config: &'a TrainingConfig, constants: &'a PlanningConstants) -> Self {
    Self { config, constants }
  }

  /// Plan the session for `today`. Empty buckets are skipped, never an error.
  pub fn plan_today_routine<R: RandomSource + ?Sized>(
    &self,
    categorized: &CategorizedExercises,
    today: NaiveDate,
    rng: &mut R,
  ) -> PlannedRoutine {
    let mut selected: Vec<PlannedExercise> = Vec::new();

    for slot in SLOTS {
      let candidates: Vec<&ExerciseStat> = categorized.bucket(slot).iter().collect();
      if let Some(exercise) = self.select_exercise(&candidates, &selected, rng) {
        tracing::debug!("Selected {} for {}", exercise.exercise_name, slot.label());
        selected.push(exercise);
      }
    }

    let (_, max_exercises) = self.config.exercise_count;
    let target_seconds = self.config.target_session_seconds() as f64;
    if selected.len() < max_exercises
      && (total_duration(&selected) as f64) < target_seconds * self.constants.fill_threshold
    {
      let bonus: Vec<&ExerciseStat> = categorized
        .other
        .iter()
        .chain(categorized.chest_isolation.iter().skip(1))
        .chain(categorized.shoulder_isolation.iter().skip(1))
        .collect();

      if let Some(exercise) = self.select_exercise(&bonus, &selected, rng) {
        tracing::debug!("Added bonus exercise {}", exercise.exercise_name);
        selected.push(exercise);
      }
    }

    let focus = RoutineFocus::of(&selected, categorized);
    let total_seconds = total_duration(&selected);

    PlannedRoutine {
      title: format!("AI Routine {} - {}", today.format("%Y-%m-%d"), focus.label()),
      total_estimated_minutes: (total_seconds as f64 / 60.0).round() as u32,
      notes: format!(
        "Hypertrophy routine focusing on {}. Progressive overload applied.",
        self.config.focus_muscles.join(", ")
      ),
      exercises: selected,
    }
  }

  /// Pick one candidate not already in the routine and plan it
  fn select_exercise<R: RandomSource + ?Sized>(
    &self,
    candidates: &[&ExerciseStat],
    selected: &[PlannedExercise],
    rng: &mut R,
  ) -> Option<PlannedExercise> {
    let taken: HashSet<&str> = selected.iter().map(|e| e.exercise_template_id.as_str()).collect();
    let available: Vec<&ExerciseStat> = candidates
      .iter()
      .copied()
      .filter(|c| !taken.contains(c.exercise_template_id.as_str()))
      .collect();

    if available.is_empty() {
      return None;
    }

    let pool = weighted_pool(&available, rng);
    let stat = pool.into_iter().find(|s| !taken.contains(s.exercise_template_id.as_str()))?;
    let num_sets = self.determine_sets(rng);
    Some(self.plan_exercise(stat, num_sets))
  }

  /// Either end of the configured range, 50/50
  fn determine_sets<R: RandomSource + ?Sized>(&self, rng: &mut R) -> u32 {
    let (min, max) = self.config.hypertrophy.sets_per_exercise;
    if rng.next_f64() > 0.5 {
      max
    } else {
      min
    }
  }

  pub fn plan_exercise(&self, stat: &ExerciseStat, num_sets: u32) -> PlannedExercise {
    let rules = &self.config.hypertrophy;
    let is_compound = is_compound_exercise(&stat.exercise_name);
    let strategy = select_progression_strategy(is_compound, stat, self.constants.wave_frequency_threshold);
    let rest_seconds = rules.rest_for(is_compound);

    let scheme = SetScheme {
      num_sets,
      base_weight: calculate_adaptive_weight(stat, rules, self.constants),
      min_reps: rules.reps_range.0,
      max_reps: rules.reps_range.1,
      rest_seconds,
    };

    PlannedExercise {
      exercise_template_id: stat.exercise_template_id.clone(),
      exercise_name: stat.exercise_name.clone(),
      sets: generate_sets(strategy, &scheme),
      notes: exercise_notes(stat),
      is_compound,
      progression_strategy: strategy,
      estimated_duration_seconds: estimate_exercise_duration(num_sets, rest_seconds, self.constants.seconds_per_set),
    }
  }
}

fn total_duration(exercises: &[PlannedExercise]) -> u32 {
  exercises.iter().map(|e| e.estimated_duration_seconds).sum()
}

/// "Last: 2025-01-07 | improving"
fn exercise_notes(stat: &ExerciseStat) -> String {
  let last = stat
    .last_performed
    .map(|d| d.format("%Y-%m-%d").to_string())
    .unwrap_or_else(|| "N/A".to_string());

  match stat.progression_trend {
    Some(trend) => format!("Last: {} | {}", last, trend.as_str()),
    None => format!("Last: {}", last),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analysis::{categorize, ProgressionTrend};
  use crate::models::ProgressionStrategy;
  use crate::test_utils::{make_stat, make_trained_stat, FixedRandom};

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
  }

  /// Ranked best-first within each bucket
  fn full_library() -> CategorizedExercises {
    categorize(vec![
      make_trained_stat("bench", "Bench Press (Barbell)", Some("chest"), 20, 100.0, Some(ProgressionTrend::Improving)),
      make_stat("incline", "Incline Bench Press", Some("chest"), 12, 9000.0),
      make_stat("db_bench", "Dumbbell Bench Press", Some("chest"), 8, 6000.0),
      make_stat("decline", "Decline Bench Press", Some("chest"), 2, 1000.0),
      make_trained_stat("ohp", "Overhead Press", Some("shoulders"), 18, 60.0, Some(ProgressionTrend::Plateaued)),
      make_stat("arnold", "Arnold Press", Some("shoulders"), 6, 3000.0),
      make_stat("fly", "Cable Fly", Some("chest"), 15, 4000.0),
      make_stat("pec_deck", "Butterfly", Some("chest"), 9, 3000.0),
      make_trained_stat("lateral", "Lateral Raise", Some("shoulders"), 40, 12.0, None),
      make_stat("face_pull", "Face Pull", Some("shoulders"), 10, 2000.0),
      make_stat("rear_delt", "Rear Delt Raise", Some("shoulders"), 4, 800.0),
      make_stat("pushdown", "Triceps Pushdown", Some("triceps"), 16, 5000.0),
      make_stat("skull", "Skull Crusher", Some("triceps"), 7, 2500.0),
      make_stat("curl", "Bicep Curl", Some("biceps"), 17, 4000.0),
      make_stat("hammer", "Hammer Curl", Some("biceps"), 11, 3000.0),
      make_stat("shrug", "Shrug", Some("traps"), 5, 6000.0),
    ])
  }

  fn ids(routine: &PlannedRoutine) -> Vec<&str> {
    routine.exercises.iter().map(|e| e.exercise_template_id.as_str()).collect()
  }

  #[test]
  fn test_shuffle_is_a_permutation() {
    let mut rng = RngSource::seeded(7);
    let mut items: Vec<u32> = (0..20).collect();
    shuffle(&mut items, &mut rng);

    let mut sorted = items.clone();
    sorted.sort();
    assert_eq!(sorted, (0..20).collect::<Vec<_>>());
  }

  #[test]
  fn test_pool_always_contains_best_candidate() {
    let stats: Vec<ExerciseStat> = (0..6).map(|i| make_stat(&i.to_string(), "Fly", None, 10 - i, 0.0)).collect();
    let candidates: Vec<&ExerciseStat> = stats.iter().collect();

    // Every inclusion roll fails
    let pool = weighted_pool(&candidates, &mut FixedRandom::constant(0.99));
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].exercise_template_id, "0");

    // Every inclusion roll succeeds: best + 2 runners-up + 2 variety
    let pool = weighted_pool(&candidates, &mut FixedRandom::constant(0.0));
    assert_eq!(pool.len(), 5);
    assert!(pool.iter().any(|s| s.exercise_template_id == "0"));

    for seed in 0..50 {
      let pool = weighted_pool(&candidates, &mut RngSource::seeded(seed));
      assert!(pool.iter().any(|s| s.exercise_template_id == "0"));
      assert!(pool.len() <= 5);
    }
  }

  #[test]
  fn test_small_pool_keeps_every_candidate() {
    let stats = vec![make_stat("a", "Curl", None, 3, 0.0), make_stat("b", "Curl", None, 2, 0.0)];
    let candidates: Vec<&ExerciseStat> = stats.iter().collect();

    let pool = weighted_pool(&candidates, &mut RngSource::seeded(3));
    assert_eq!(pool.len(), 2);
  }

  #[test]
  fn test_routine_fills_each_slot_once_without_duplicates() {
    let library = full_library();
    let config = TrainingConfig::default();
    let constants = PlanningConstants::default();
    let planner = RoutinePlanner::new(&config, &constants);

    for seed in 0..100 {
      let routine = planner.plan_today_routine(&library, today(), &mut RngSource::seeded(seed));
      let ids = ids(&routine);
      let unique: HashSet<&str> = ids.iter().copied().collect();

      assert_eq!(unique.len(), ids.len(), "duplicate exercise with seed {}", seed);
      assert!(ids.len() >= 6 && ids.len() <= config.exercise_count.1);
      for (exercise, slot) in routine.exercises.iter().zip(SLOTS) {
        assert_eq!(library.category_of(&exercise.exercise_template_id), Some(slot));
      }
    }
  }

  #[test]
  fn test_sets_and_reps_stay_within_configured_bounds() {
    let library = full_library();
    let config = TrainingConfig::default();
    let constants = PlanningConstants::default();
    let planner = RoutinePlanner::new(&config, &constants);
    let (min_sets, max_sets) = config.hypertrophy.sets_per_exercise;
    let (min_reps, max_reps) = config.hypertrophy.reps_range;

    for seed in 0..100 {
      let routine = planner.plan_today_routine(&library, today(), &mut RngSource::seeded(seed));
      for exercise in &routine.exercises {
        let n = exercise.sets.len() as u32;
        assert!(n == min_sets || n == max_sets);
        for set in &exercise.sets {
          assert!(set.reps >= min_reps && set.reps <= max_reps);
        }
      }
    }
  }

  #[test]
  fn test_inverted_rep_range_plans_like_the_ordered_one() {
    let library = full_library();
    let constants = PlanningConstants::default();
    let mut inverted = TrainingConfig::default();
    inverted.hypertrophy.reps_range = (12, 6);

    let planned = RoutinePlanner::new(&inverted, &constants).plan_today_routine(&library, today(), &mut RngSource::seeded(5));
    let expected = RoutinePlanner::new(&TrainingConfig::default(), &constants).plan_today_routine(
      &library,
      today(),
      &mut RngSource::seeded(5),
    );

    assert_eq!(planned, expected);
    for set in planned.exercises.iter().flat_map(|e| &e.sets) {
      assert!((6..=12).contains(&set.reps));
    }
  }

  #[test]
  fn test_same_seed_same_routine() {
    let library = full_library();
    let config = TrainingConfig::default();
    let constants = PlanningConstants::default();
    let planner = RoutinePlanner::new(&config, &constants);

    let first = planner.plan_today_routine(&library, today(), &mut RngSource::seeded(42));
    let second = planner.plan_today_routine(&library, today(), &mut RngSource::seeded(42));

    assert_eq!(first, second);
  }

  #[test]
  fn test_missing_compounds_still_produce_a_routine() {
    let library = categorize(vec![make_stat("fly", "Cable Fly", Some("chest"), 3, 500.0)]);
    let config = TrainingConfig::default();
    let constants = PlanningConstants::default();
    let planner = RoutinePlanner::new(&config, &constants);

    let routine = planner.plan_today_routine(&library, today(), &mut RngSource::seeded(1));

    assert_eq!(ids(&routine), vec!["fly"]);
    assert_eq!(routine.title, "AI Routine 2025-03-14 - Chest Focus");
  }

  #[test]
  fn test_empty_library_yields_empty_routine() {
    let config = TrainingConfig::default();
    let constants = PlanningConstants::default();
    let planner = RoutinePlanner::new(&config, &constants);

    let routine = planner.plan_today_routine(&CategorizedExercises::default(), today(), &mut RngSource::seeded(1));

    assert!(routine.exercises.is_empty());
    assert_eq!(routine.total_estimated_minutes, 0);
    assert_eq!(routine.title, "AI Routine 2025-03-14 - Full Upper Body");
  }

  #[test]
  fn test_bonus_exercise_added_when_session_is_short() {
    let library = full_library();
    let config = TrainingConfig::default();
    let constants = PlanningConstants::default();
    let planner = RoutinePlanner::new(&config, &constants);

    // Draws of 0.0: every pool roll succeeds, every exercise gets the minimum 3 sets.
    // 2 compounds x 375s + 4 isolations x 315s = 2010s, below 85% of 3600s.
    let routine = planner.plan_today_routine(&library, today(), &mut FixedRandom::constant(0.0));

    assert_eq!(routine.exercises.len(), 7);
    let bonus = &routine.exercises[6];
    assert_eq!(
      library.category_of(&bonus.exercise_template_id).map(|c| matches!(c, ExerciseCategory::Other | ExerciseCategory::ChestIsolation | ExerciseCategory::ShoulderIsolation)),
      Some(true)
    );
    assert_eq!(routine.total_estimated_minutes, ((2010 + bonus.estimated_duration_seconds) as f64 / 60.0).round() as u32);
  }

  #[test]
  fn test_no_bonus_exercise_when_session_is_full() {
    let library = full_library();
    let constants = PlanningConstants::default();

    let mut short_session = TrainingConfig::default();
    short_session.target_session_minutes = 30;
    let routine = RoutinePlanner::new(&short_session, &constants).plan_today_routine(
      &library,
      today(),
      &mut FixedRandom::constant(0.0),
    );
    assert_eq!(routine.exercises.len(), 6);
    assert_eq!(routine.total_estimated_minutes, 34);

    let mut capped = TrainingConfig::default();
    capped.exercise_count = (4, 6);
    let routine =
      RoutinePlanner::new(&capped, &constants).plan_today_routine(&library, today(), &mut FixedRandom::constant(0.0));
    assert_eq!(routine.exercises.len(), 6);
  }

  #[test]
  fn test_title_and_notes() {
    let library = full_library();
    let config = TrainingConfig::default();
    let constants = PlanningConstants::default();
    let planner = RoutinePlanner::new(&config, &constants);

    let routine = planner.plan_today_routine(&library, today(), &mut RngSource::seeded(9));

    assert_eq!(routine.title, "AI Routine 2025-03-14 - Full Upper Body");
    assert_eq!(
      routine.notes,
      "Hypertrophy routine focusing on arms, shoulders, chest. Progressive overload applied."
    );
  }

  #[test]
  fn test_focus_precedence() {
    assert_eq!(RoutineFocus::from_flags(true, true, true), RoutineFocus::FullUpper);
    assert_eq!(RoutineFocus::from_flags(true, true, false), RoutineFocus::ChestShoulders);
    assert_eq!(RoutineFocus::from_flags(true, false, true), RoutineFocus::ChestArms);
    assert_eq!(RoutineFocus::from_flags(false, true, true), RoutineFocus::ShoulderArms);
    assert_eq!(RoutineFocus::from_flags(false, true, false), RoutineFocus::Shoulders);
    assert_eq!(RoutineFocus::from_flags(false, false, true), RoutineFocus::Arms);
    assert_eq!(RoutineFocus::from_flags(false, false, false), RoutineFocus::FullUpper);
  }

  #[test]
  fn test_plan_exercise_applies_progression() {
    let config = TrainingConfig::default();
    let constants = PlanningConstants::default();
    let planner = RoutinePlanner::new(&config, &constants);

    let bench = make_trained_stat("bench", "Bench Press", Some("chest"), 3, 100.0, Some(ProgressionTrend::Improving));
    let planned = planner.plan_exercise(&bench, 4);

    assert!(planned.is_compound);
    assert_eq!(planned.progression_strategy, ProgressionStrategy::ReversePyramid);
    assert_eq!(planned.sets[0].target_weight, 102.5);
    assert_eq!(planned.sets[0].reps, 6);
    assert!(planned.sets.iter().all(|s| s.rest_seconds == 120));
    assert_eq!(planned.estimated_duration_seconds, 45 * 4 + 120 * 3);
    assert_eq!(planned.notes, "Last: 2025-01-01 | improving");

    let fly = make_stat("fly", "Cable Fly", Some("chest"), 2, 0.0);
    let planned = planner.plan_exercise(&fly, 3);

    assert!(!planned.is_compound);
    assert_eq!(planned.progression_strategy, ProgressionStrategy::Pyramid);
    assert_eq!(planned.sets[0].target_weight, 16.0);
    assert_eq!(planned.notes, "Last: N/A");
  }
}
