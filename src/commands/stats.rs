use chrono::{Local, NaiveDate};
use std::fmt::Write as _;

use super::{fetch_history, focused_stats, CommandError};
use crate::analysis::{classify_exercise, ExerciseStat};
use crate::config::AppConfig;
use crate::hevy::HevyClient;

/// Focus-filtered exercise stats, best-ranked first
pub async fn run(config: &AppConfig, limit: usize, date: Option<NaiveDate>) -> Result<Vec<ExerciseStat>, CommandError> {
  let today = date.unwrap_or_else(|| Local::now().date_naive());

  let client = HevyClient::new(&config.hevy)?;
  let history = fetch_history(&client, today, config.training.history_months).await?;
  let focused = focused_stats(&history, &config.training, &config.planning);

  println!("{}", format_stats_table(&focused, limit));
  Ok(focused)
}

pub fn format_stats_table(stats: &[ExerciseStat], limit: usize) -> String {
  let mut out = String::new();

  let _ = writeln!(
    out,
    "{:<4} {:<36} {:<20} {:>5} {:>10} {:>14} {:<10}",
    "#", "Exercise", "Bucket", "Freq", "Volume", "Top set", "Trend"
  );
  let _ = writeln!(out, "{}", "-".repeat(105));

  for (i, stat) in stats.iter().take(limit).enumerate() {
    let top_set = stat
      .top_set
      .as_ref()
      .map(|t| format!("{}kg x {}", t.weight, t.reps))
      .unwrap_or_else(|| "-".to_string());
    let trend = stat.progression_trend.map(|t| t.as_str()).unwrap_or("-");

    let _ = writeln!(
      out,
      "{:<4} {:<36} {:<20} {:>5} {:>10.0} {:>14} {:<10}",
      i + 1,
      truncate(&stat.exercise_name, 36),
      classify_exercise(stat).label(),
      stat.frequency,
      stat.total_volume,
      top_set,
      trend
    );
  }

  if stats.len() > limit {
    let _ = writeln!(out, "... {} more", stats.len() - limit);
  }

  out
}

fn truncate(name: &str, width: usize) -> String {
  if name.chars().count() <= width {
    return name.to_string();
  }
  let kept: String = name.chars().take(width.saturating_sub(3)).collect();
  format!("{}...", kept)
}
