use std::collections::HashMap;
use std::fmt::Write as _;

use super::CommandError;
use crate::config::AppConfig;
use crate::hevy::HevyClient;
use crate::models::{Routine, RoutineFolder};

/// List existing routines (first page) grouped by folder
pub async fn run(config: &AppConfig) -> Result<(), CommandError> {
  let client = HevyClient::new(&config.hevy)?;

  let folders = client.get_all_routine_folders().await?;
  let routines = client.get_routines(1).await?;
  tracing::info!(
    "Fetched {} routines (page 1 of {}) in {} folders",
    routines.routines.len(),
    routines.page_count,
    folders.len()
  );

  println!("{}", format_routines(&routines.routines, &folders));
  Ok(())
}

pub fn format_routines(routines: &[Routine], folders: &[RoutineFolder]) -> String {
  let folder_names: HashMap<i64, &str> = folders.iter().map(|f| (f.id, f.title.as_str())).collect();
  let mut out = String::new();

  let _ = writeln!(out, "Folders:");
  if folders.is_empty() {
    let _ = writeln!(out, "  (none)");
  }
  for folder in folders {
    let _ = writeln!(out, "  [{}] {}", folder.id, folder.title);
  }

  let _ = writeln!(out);
  let _ = writeln!(out, "Routines:");
  if routines.is_empty() {
    let _ = writeln!(out, "  (none)");
  }
  for routine in routines {
    let folder = routine
      .folder_id
      .map(|id| folder_names.get(&id).copied().unwrap_or("unknown folder").to_string())
      .unwrap_or_else(|| "no folder".to_string());

    let _ = writeln!(
      out,
      "  {} - {} exercises ({}) [{}]",
      routine.title,
      routine.exercises.len(),
      folder,
      routine.id
    );
  }

  out
}
