//! Per-Exercise Progression Engine
//!
//! Decides how one selected exercise is loaded in today's session:
//! - compound vs isolation classification
//! - progression strategy (pyramid, reverse pyramid, wave, flat)
//! - adaptive target weight from the historical trend
//! - concrete sets for the chosen strategy
//!
//! Key principles:
//! - Deterministic given the exercise's stats; no randomness here
//! - Regressing lifts are deloaded, plateaus get micro-progression
//! - Every weight is rounded to the nearest half unit where it is produced

use serde::{Deserialize, Serialize};

use crate::analysis::{ExerciseStat, ProgressionTrend};
use crate::config::{HypertrophyRules, PlanningConstants};
use crate::models::{PlannedSet, ProgressionStrategy, SetType};

const COMPOUND_KEYWORDS: &[&str] = &["press", "squat", "deadlift", "row", "pull-up", "chin-up", "dip"];

/// Lengthened-position work: flyes, pullovers, curls
const STRETCH_KEYWORDS: &[&str] = &["fly", "fliegende", "butterfly", "curl", "pullover", "überzug"];

/// Single-joint, constant-tension work: raises, pushdowns, extensions
const CONSTANT_TENSION_KEYWORDS: &[&str] = &["raise", "heben", "pushdown", "drücken", "extension"];

const DELOAD_PERCENT: f64 = -2.5;
const MICRO_PROGRESSION_PERCENT: f64 = 1.0;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Round to the nearest 0.5
pub fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

// ---------------------------------------------------------------------------
/// Exercise Classification
// ---------------------------------------------------------------------------

/// Multi-joint lifts, judged by name alone
pub fn is_compound_exercise(exercise_name: &str) -> bool {
    contains_any(&exercise_name.to_lowercase(), COMPOUND_KEYWORDS)
}

/// Working time plus rest between sets (no rest after the last set)
pub fn estimate_exercise_duration(num_sets: u32, rest_seconds: u32, seconds_per_set: u32) -> u32 {
    seconds_per_set * num_sets + rest_seconds * num_sets.saturating_sub(1)
}

fn is_constant_tension(name: &str) -> bool {
    contains_any(name, CONSTANT_TENSION_KEYWORDS) || (name.contains("pull") && !name.contains("pullover"))
}

// ---------------------------------------------------------------------------
/// Strategy Selection
// ---------------------------------------------------------------------------

/// First matching arm wins:
/// 1. compounds go heavy first (reverse pyramid)
/// 2. very frequent isolation work alternates load (wave)
/// 3. stretch-focused isolation builds up (pyramid)
/// 4. constant-tension isolation stays flat
/// 5. everything else pyramids
pub fn select_progression_strategy(
    is_compound: bool,
    stat: &ExerciseStat,
    wave_frequency_threshold: u32,
) -> ProgressionStrategy {
    let name = stat.exercise_name.to_lowercase();

    match (is_compound, stat.frequency) {
        (true, _) => ProgressionStrategy::ReversePyramid,
        (false, frequency) if frequency > wave_frequency_threshold => ProgressionStrategy::Wave,
        _ if contains_any(&name, STRETCH_KEYWORDS) => ProgressionStrategy::Pyramid,
        _ if is_constant_tension(&name) => ProgressionStrategy::Flat,
        _ => ProgressionStrategy::Pyramid,
    }
}

// ---------------------------------------------------------------------------
/// Adaptive Target Weight
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightAdjustment {
    /// Regressing or repeatedly failing: back off
    Deload,
    /// Plateaued: small bump to break through
    MicroProgression,
    /// Improving: full configured overload
    Progression,
    /// No trend data yet
    Maintain,
}

impl WeightAdjustment {
    pub fn for_stat(stat: &ExerciseStat) -> Self {
        match (stat.progression_trend, stat.consecutive_failures) {
            (Some(ProgressionTrend::Regressing), _) | (_, 2..) => Self::Deload,
            (Some(ProgressionTrend::Plateaued), _) | (_, 1) => Self::MicroProgression,
            (Some(ProgressionTrend::Improving), _) => Self::Progression,
            (None, _) => Self::Maintain,
        }
    }

    pub fn percent(&self, progressive_overload: f64) -> f64 {
        match self {
            Self::Deload => DELOAD_PERCENT,
            Self::MicroProgression => MICRO_PROGRESSION_PERCENT,
            Self::Progression => progressive_overload,
            Self::Maintain => 0.0,
        }
    }
}

/// Best-ever working weight adjusted by trend. Untrained exercises start
/// from the configured baseline unadjusted.
pub fn calculate_adaptive_weight(
    stat: &ExerciseStat,
    rules: &HypertrophyRules,
    constants: &PlanningConstants,
) -> f64 {
    let last_weight = stat.best_weight();
    if last_weight <= 0.0 {
        return round_to_half(constants.untrained_weight_kg);
    }

    let adjustment = WeightAdjustment::for_stat(stat);
    match adjustment {
        WeightAdjustment::Deload => {
            tracing::debug!("Deload applied for {} (regressing trend)", stat.exercise_name)
        }
        WeightAdjustment::MicroProgression => {
            tracing::debug!("Micro-progression for {} (plateau)", stat.exercise_name)
        }
        WeightAdjustment::Maintain => {
            tracing::debug!("Maintaining weight for {} (no trend data)", stat.exercise_name)
        }
        WeightAdjustment::Progression => {}
    }

    let percent = adjustment.percent(rules.progressive_overload);
    round_to_half(last_weight * (1.0 + percent / 100.0))
}

// ---------------------------------------------------------------------------
/// Set Generation
// ---------------------------------------------------------------------------

/// Inputs shared by every strategy's set generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetScheme {
    pub num_sets: u32,
    pub base_weight: f64,
    pub min_reps: u32,
    pub max_reps: u32,
    pub rest_seconds: u32,
}

impl SetScheme {
    /// Same scheme with the rep bounds in ascending order
    fn ordered(&self) -> SetScheme {
        SetScheme {
            min_reps: self.min_reps.min(self.max_reps),
            max_reps: self.min_reps.max(self.max_reps),
            ..*self
        }
    }

    fn clamp_reps(&self, reps: i64) -> u32 {
        reps.clamp(self.min_reps as i64, self.max_reps as i64) as u32
    }

    /// 0.0 on the first set, 1.0 on the last; a single set counts as the first
    fn progress(&self, index: u32) -> f64 {
        if self.num_sets > 1 {
            index as f64 / (self.num_sets - 1) as f64
        } else {
            0.0
        }
    }

    fn planned(&self, reps: u32, weight: f64) -> PlannedSet {
        PlannedSet {
            set_type: SetType::Normal,
            reps,
            target_weight: round_to_half(weight),
            rest_seconds: self.rest_seconds,
        }
    }
}

/// An inverted rep range (min above max) is treated as the same range reordered
pub fn generate_sets(strategy: ProgressionStrategy, scheme: &SetScheme) -> Vec<PlannedSet> {
    let scheme = &scheme.ordered();
    match strategy {
        ProgressionStrategy::Pyramid => pyramid_sets(scheme, true),
        ProgressionStrategy::ReversePyramid => pyramid_sets(scheme, false),
        ProgressionStrategy::Wave => wave_sets(scheme),
        ProgressionStrategy::Flat => flat_sets(scheme),
    }
}

/// Ascending: 80% -> 105% with reps max -> min.
/// Descending: 100% -> 80% with reps min -> max.
fn pyramid_sets(scheme: &SetScheme, ascending: bool) -> Vec<PlannedSet> {
    let rep_span = (scheme.max_reps as f64) - (scheme.min_reps as f64);

    (0..scheme.num_sets)
        .map(|i| {
            let progress = scheme.progress(i);
            let (weight_percent, reps) = if ascending {
                (0.80 + progress * 0.25, scheme.max_reps as f64 - progress * rep_span)
            } else {
                (1.0 - progress * 0.20, scheme.min_reps as f64 + progress * rep_span)
            };

            let reps = scheme.clamp_reps(reps.round() as i64);
            scheme.planned(reps, scheme.base_weight * weight_percent)
        })
        .collect()
}

/// Even sets heavy (95%, low reps), odd sets moderate (85%, high reps)
fn wave_sets(scheme: &SetScheme) -> Vec<PlannedSet> {
    (0..scheme.num_sets)
        .map(|i| {
            let (weight_percent, reps) = if i % 2 == 0 {
                (0.95, scheme.min_reps as i64 + 1)
            } else {
                (0.85, scheme.max_reps as i64 - 1)
            };
            scheme.planned(scheme.clamp_reps(reps), scheme.base_weight * weight_percent)
        })
        .collect()
}

/// Same weight throughout; second-to-last set +1 rep (3+ sets), last set -1 rep (4+ sets)
fn flat_sets(scheme: &SetScheme) -> Vec<PlannedSet> {
    let n = scheme.num_sets;
    let mid_reps = ((scheme.min_reps + scheme.max_reps) / 2) as i64;

    (0..n)
        .map(|i| {
            let mut reps = mid_reps;
            if n >= 3 && i == n - 2 {
                reps = mid_reps + 1;
            }
            if n >= 4 && i == n - 1 {
                reps = mid_reps - 1;
            }
            scheme.planned(scheme.clamp_reps(reps), scheme.base_weight)
        })
        .collect()
}
