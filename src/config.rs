//! Application and training configuration
//!
//! Configuration is a camelCase JSON file. Every section has defaults, so a partial
//! file only overrides the fields it names. Credentials come from the environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const DEFAULT_CONFIG_PATH: &str = "config/default.json";
const DEFAULT_BASE_URL: &str = "https://api.hevyapp.com/v1";

const ENV_API_KEY: &str = "HEVY_API_KEY";
const ENV_BASE_URL: &str = "HEVY_API_BASE_URL";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("Failed to read config file {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("Invalid configuration: {0}")]
  Invalid(String),
}

/// ---------------------------------------------------------------------------
/// Training Rules
/// ---------------------------------------------------------------------------

/// Hypertrophy set/rep/rest rules. Pairs are `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HypertrophyRules {
  pub sets_per_exercise: (u32, u32),
  pub reps_range: (u32, u32),
  /// seconds
  pub rest_compound: u32,
  /// seconds
  pub rest_isolation: u32,
  /// percent added to the working weight when an exercise is improving
  pub progressive_overload: f64,
}

impl Default for HypertrophyRules {
  fn default() -> Self {
    Self {
      sets_per_exercise: (3, 4),
      reps_range: (6, 12),
      rest_compound: 120,
      rest_isolation: 90,
      progressive_overload: 2.5,
    }
  }
}

impl HypertrophyRules {
  pub fn rest_for(&self, is_compound: bool) -> u32 {
    if is_compound {
      self.rest_compound
    } else {
      self.rest_isolation
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingConfig {
  pub target_session_minutes: u32,
  pub sessions_per_week: u32,
  pub focus_muscles: Vec<String>,
  pub exercise_count: (usize, usize),
  pub history_months: u32,
  pub hypertrophy: HypertrophyRules,
}

impl Default for TrainingConfig {
  fn default() -> Self {
    Self {
      target_session_minutes: 60,
      sessions_per_week: 3,
      focus_muscles: vec!["arms".into(), "shoulders".into(), "chest".into()],
      exercise_count: (6, 8),
      history_months: 12,
      hypertrophy: HypertrophyRules::default(),
    }
  }
}

impl TrainingConfig {
  pub fn target_session_seconds(&self) -> u32 {
    self.target_session_minutes * 60
  }

  /// Reject ranges the planner cannot honour
  pub fn validate(&self) -> Result<(), ConfigError> {
    let rules = &self.hypertrophy;

    check_range("exerciseCount", self.exercise_count.0, self.exercise_count.1)?;
    check_range("hypertrophy.setsPerExercise", rules.sets_per_exercise.0, rules.sets_per_exercise.1)?;
    check_range("hypertrophy.repsRange", rules.reps_range.0, rules.reps_range.1)?;

    if rules.sets_per_exercise.0 == 0 {
      return Err(ConfigError::Invalid("hypertrophy.setsPerExercise must start at 1 or more".into()));
    }
    if rules.reps_range.0 == 0 {
      return Err(ConfigError::Invalid("hypertrophy.repsRange must start at 1 or more".into()));
    }
    if self.target_session_minutes == 0 {
      return Err(ConfigError::Invalid("targetSessionMinutes must be positive".into()));
    }
    if !rules.progressive_overload.is_finite() {
      return Err(ConfigError::Invalid("hypertrophy.progressiveOverload must be a number".into()));
    }

    Ok(())
  }
}

fn check_range<T: PartialOrd + std::fmt::Display>(name: &str, min: T, max: T) -> Result<(), ConfigError> {
  if min > max {
    return Err(ConfigError::Invalid(format!("{} has min {} above max {}", name, min, max)));
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Planning Constants
/// ---------------------------------------------------------------------------

/// Thresholds used by the analyzer and planner. Tunable, but rarely changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanningConstants {
  /// Working sets heavier than this are treated as logging typos
  pub outlier_ceiling_kg: f64,
  /// Isolation exercises performed more often than this get wave loading
  pub wave_frequency_threshold: u32,
  /// Starting weight for exercises with no weighted history
  pub untrained_weight_kg: f64,
  /// Average time under the bar per set, excluding rest
  pub seconds_per_set: u32,
  /// Add a bonus exercise while the session is below this share of the target
  pub fill_threshold: f64,
}

impl Default for PlanningConstants {
  fn default() -> Self {
    Self {
      outlier_ceiling_kg: 300.0,
      wave_frequency_threshold: 30,
      untrained_weight_kg: 20.0,
      seconds_per_set: 45,
      fill_threshold: 0.85,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Service Connection
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HevyConfig {
  pub base_url: String,
  pub timeout_ms: u64,
  pub page_size: u32,
  /// Usually supplied through HEVY_API_KEY instead
  #[serde(skip_serializing)]
  pub api_key: Option<String>,
}

impl Default for HevyConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.into(),
      timeout_ms: 30_000,
      page_size: 10,
      api_key: None,
    }
  }
}

impl HevyConfig {
  pub fn api_key(&self) -> Result<&str, ConfigError> {
    self
      .api_key
      .as_deref()
      .filter(|k| !k.trim().is_empty())
      .ok_or_else(|| ConfigError::MissingConfig(ENV_API_KEY.into()))
  }
}

/// ---------------------------------------------------------------------------
/// Application Config
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
  pub hevy: HevyConfig,
  pub training: TrainingConfig,
  pub planning: PlanningConstants,
}

impl AppConfig {
  /// Load from a JSON file, falling back to defaults when the file is absent,
  /// then apply environment overrides and validate.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let mut config = match fs::read_to_string(path) {
      Ok(contents) => Self::from_json(&contents)?,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        tracing::warn!("Config file {} not found, using defaults", path.display());
        Self::default()
      }
      Err(source) => {
        return Err(ConfigError::Io {
          path: path.display().to_string(),
          source,
        })
      }
    };

    config.apply_env_overrides();
    config.training.validate()?;
    Ok(config)
  }

  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(json)?)
  }

  /// HEVY_API_KEY and HEVY_API_BASE_URL take precedence over the file
  pub fn apply_env_overrides(&mut self) {
    if let Ok(key) = env::var(ENV_API_KEY) {
      self.hevy.api_key = Some(key);
    }
    if let Ok(url) = env::var(ENV_BASE_URL) {
      if !url.trim().is_empty() {
        self.hevy.base_url = url;
      }
    }
  }
}
