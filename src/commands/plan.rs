use chrono::{Local, NaiveDate};

use super::{fetch_history, focused_stats, CommandError};
use crate::analysis::categorize;
use crate::config::AppConfig;
use crate::hevy::HevyClient;
use crate::models::{PlannedRoutine, Routine};
use crate::planner::{RoutinePlanner, RngSource};
use crate::publisher::{format_routine_summary, publish, PublishOptions, DEFAULT_FOLDER_NAME};

#[derive(Debug, Clone, Default)]
pub struct PlanArgs {
  pub dry_run: bool,
  /// Planning date; today when absent
  pub date: Option<NaiveDate>,
  /// Overrides targetSessionMinutes
  pub duration: Option<u32>,
  /// Routine folder; DEFAULT_FOLDER_NAME when absent
  pub folder: Option<String>,
  /// Fixed seed for a reproducible routine
  pub seed: Option<u64>,
}

fn publish_options(args: &PlanArgs) -> PublishOptions {
  PublishOptions {
    dry_run: args.dry_run,
    folder_name: Some(args.folder.clone().unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string())),
  }
}

/// Fetch history, plan today's routine, print it, then publish unless dry-running
pub async fn run(config: &AppConfig, args: PlanArgs) -> Result<Option<Routine>, CommandError> {
  let today = args.date.unwrap_or_else(|| Local::now().date_naive());

  let mut training = config.training.clone();
  if let Some(minutes) = args.duration {
    training.target_session_minutes = minutes;
    training.validate()?;
  }

  let client = HevyClient::new(&config.hevy)?;
  let history = fetch_history(&client, today, training.history_months).await?;

  let focused = focused_stats(&history, &training, &config.planning);
  if focused.is_empty() {
    tracing::warn!("No exercises in history match the focus muscles; the routine will be empty");
  }

  let categorized = categorize(focused);
  let planner = RoutinePlanner::new(&training, &config.planning);
  let routine: PlannedRoutine = match args.seed {
    Some(seed) => planner.plan_today_routine(&categorized, today, &mut RngSource::seeded(seed)),
    None => planner.plan_today_routine(&categorized, today, &mut RngSource::from_entropy()),
  };

  println!("{}", format_routine_summary(&routine));

  let options = publish_options(&args);
  let created = publish(&client, &routine, &options).await?;

  match &created {
    Some(saved) => {
      println!("Routine ID: {}", saved.id);
      println!("Title: {}", saved.title);
      if let Some(folder) = &options.folder_name {
        println!("Folder: {}", folder);
      }
    }
    None => println!("DRY RUN MODE - Routine not sent to Hevy"),
  }

  Ok(created)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::HevyConfig;
  use mockito::Matcher;
  use serde_json::json;

  fn history_body() -> String {
    json!({
      "page": 1,
      "page_count": 1,
      "workouts": [{
        "id": "w1",
        "title": "Push",
        "start_time": "2025-03-10T10:00:00Z",
        "end_time": "2025-03-10T11:00:00Z",
        "exercises": [
          {"index": 0, "title": "Bench Press (Barbell)", "exercise_template_id": "bench",
           "sets": [{"index": 0, "type": "normal", "weight_kg": 80, "reps": 8}]},
          {"index": 1, "title": "Bicep Curl", "exercise_template_id": "curl",
           "sets": [{"index": 0, "type": "normal", "weight_kg": 14, "reps": 10}]}
        ]
      }]
    })
    .to_string()
  }

  fn templates_body() -> String {
    json!({
      "page": 1,
      "page_count": 1,
      "exercise_templates": [
        {"id": "bench", "title": "Bench Press (Barbell)", "primary_muscle_group": "chest"},
        {"id": "curl", "title": "Bicep Curl", "primary_muscle_group": "biceps"}
      ]
    })
    .to_string()
  }

  #[tokio::test]
  async fn test_dry_run_plans_without_publishing() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/workouts")
      .match_query(Matcher::UrlEncoded("end_date".into(), "2025-03-14".into()))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(history_body())
      .create_async()
      .await;
    server
      .mock("GET", "/exercise_templates")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(templates_body())
      .create_async()
      .await;
    let post = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let config = AppConfig {
      hevy: HevyConfig {
        base_url: server.url(),
        api_key: Some("test-key".into()),
        ..HevyConfig::default()
      },
      ..AppConfig::default()
    };
    let args = PlanArgs {
      dry_run: true,
      date: NaiveDate::from_ymd_opt(2025, 3, 14),
      seed: Some(7),
      ..PlanArgs::default()
    };

    let created = run(&config, args).await.unwrap();

    assert!(created.is_none());
    post.assert_async().await;
  }

  #[test]
  fn test_publish_options_default_to_ai_routines_folder() {
    let options = publish_options(&PlanArgs::default());
    assert_eq!(options.folder_name.as_deref(), Some("AI Routines"));
    assert!(!options.dry_run);

    let args = PlanArgs {
      dry_run: true,
      folder: Some("Push Days".into()),
      ..PlanArgs::default()
    };
    let options = publish_options(&args);
    assert_eq!(options.folder_name.as_deref(), Some("Push Days"));
    assert!(options.dry_run);
  }

  #[tokio::test]
  async fn test_invalid_duration_is_rejected() {
    let config = AppConfig::default();
    let args = PlanArgs {
      duration: Some(0),
      ..PlanArgs::default()
    };

    let result = run(&config, args).await;
    assert!(matches!(result, Err(CommandError::Config(_))));
  }
}
