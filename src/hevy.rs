use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration as StdDuration;
use url::Url;

use crate::config::{ConfigError, HevyConfig};
use crate::models::{
  CreateRoutineRequest, ExerciseCatalogEntry, ExerciseTemplatesPage, Routine, RoutineFolder, RoutineFoldersPage,
  RoutinesPage, WorkoutRecord, WorkoutsPage,
};

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const API_KEY_HEADER: &str = "api-key";
const MAX_WORKOUT_PAGES: u32 = 100;
const MAX_TEMPLATE_PAGES: u32 = 50;
const MAX_FOLDER_PAGES: u32 = 20;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum HevyError {
  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("Invalid API URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Not authorized with Hevy (check HEVY_API_KEY)")]
  Unauthorized,

  #[error("Hevy API error {status}: {message}")]
  Api { status: u16, message: String },

  #[error("Unexpected response: {0}")]
  UnexpectedResponse(String),
}

/// Prefer the body's `message`, then `error`, then the raw body
fn extract_error_message(status: StatusCode, body: &str) -> String {
  let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
    v.get("message")
      .or_else(|| v.get("error"))
      .and_then(Value::as_str)
      .map(str::to_string)
  });

  match from_json {
    Some(message) => message,
    None if !body.trim().is_empty() => body.trim().to_string(),
    None => status.canonical_reason().unwrap_or("Request failed").to_string(),
  }
}

async fn check_status(response: Response) -> Result<Response, HevyError> {
  let status = response.status();

  if status == StatusCode::UNAUTHORIZED {
    return Err(HevyError::Unauthorized);
  }

  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(status, &body);
    tracing::error!("[Hevy API Error] {}: {}", status.as_u16(), message);
    return Err(HevyError::Api {
      status: status.as_u16(),
      message,
    });
  }

  Ok(response)
}

/// ---------------------------------------------------------------------------
/// Pagination
/// ---------------------------------------------------------------------------

pub trait Paginated {
  type Item;

  fn page_count(&self) -> u32;
  fn into_items(self) -> Vec<Self::Item>;
}

macro_rules! impl_paginated {
  ($page:ty, $item:ty, $field:ident) => {
    impl Paginated for $page {
      type Item = $item;

      fn page_count(&self) -> u32 {
        self.page_count
      }

      fn into_items(self) -> Vec<$item> {
        self.$field
      }
    }
  };
}

impl_paginated!(WorkoutsPage, WorkoutRecord, workouts);
impl_paginated!(ExerciseTemplatesPage, ExerciseCatalogEntry, exercise_templates);
impl_paginated!(RoutinesPage, Routine, routines);
impl_paginated!(RoutineFoldersPage, RoutineFolder, routine_folders);

/// Walk pages from 1 until `page_count` is reached or `max_pages` were fetched
async fn collect_pages<P, F, Fut>(label: &str, max_pages: u32, mut fetch: F) -> Result<Vec<P::Item>, HevyError>
where
  P: Paginated,
  F: FnMut(u32) -> Fut,
  Fut: Future<Output = Result<P, HevyError>>,
{
  let mut items = Vec::new();
  let mut page = 1;

  loop {
    let response = fetch(page).await?;
    let page_count = response.page_count();
    items.extend(response.into_items());

    if page >= page_count {
      break;
    }
    if page >= max_pages {
      tracing::warn!("[Hevy API] Stopped {} pagination at page {}", label, max_pages);
      break;
    }
    page += 1;
  }

  Ok(items)
}

/// `routine` may come back as an object or a one-element array
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
  Many(Vec<T>),
  One(T),
}

impl<T> OneOrMany<T> {
  fn into_first(self) -> Option<T> {
    match self {
      OneOrMany::Many(items) => items.into_iter().next(),
      OneOrMany::One(item) => Some(item),
    }
  }
}

/// Unwrap `{"<key>": ...}` when present, otherwise use the body as is
fn unwrap_envelope(mut body: Value, key: &str) -> Value {
  match body.get_mut(key) {
    Some(inner) => inner.take(),
    None => body,
  }
}

/// ---------------------------------------------------------------------------
/// Hevy API Client
/// ---------------------------------------------------------------------------

pub struct HevyClient {
  http: Client,
  base_url: String,
  api_key: String,
  page_size: u32,
}

impl HevyClient {
  pub fn new(config: &HevyConfig) -> Result<Self, HevyError> {
    let api_key = config
      .api_key()
      .map_err(|e| match e {
        ConfigError::MissingConfig(key) => HevyError::MissingConfig(key),
        other => HevyError::MissingConfig(other.to_string()),
      })?
      .to_string();

    let base_url = config.base_url.trim_end_matches('/').to_string();
    // Fail fast on a malformed base URL
    Url::parse(&base_url)?;

    let http = Client::builder()
      .timeout(StdDuration::from_millis(config.timeout_ms))
      .build()?;

    Ok(Self {
      http,
      base_url,
      api_key,
      page_size: config.page_size,
    })
  }

  fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, HevyError> {
    let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
    if !query.is_empty() {
      let mut pairs = url.query_pairs_mut();
      for (key, value) in query {
        pairs.append_pair(key, value);
      }
    }
    Ok(url)
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, HevyError> {
    let url = self.endpoint(path, query)?;
    tracing::debug!("GET {}", url);

    let response = self
      .http
      .get(url)
      .header(API_KEY_HEADER, &self.api_key)
      .header("Accept", "application/json")
      .send()
      .await?;

    Ok(check_status(response).await?.json().await?)
  }

  async fn post_json(&self, path: &str, body: &Value) -> Result<Value, HevyError> {
    let url = self.endpoint(path, &[])?;
    tracing::debug!("POST {}", url);

    let response = self
      .http
      .post(url)
      .header(API_KEY_HEADER, &self.api_key)
      .header("Accept", "application/json")
      .json(body)
      .send()
      .await?;

    Ok(check_status(response).await?.json().await?)
  }

  fn page_query(&self, page: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("pageSize", self.page_size.to_string())]
  }

  /// ---------------------------------------------------------------------------
  /// Workouts and Exercise Templates
  /// ---------------------------------------------------------------------------

  pub async fn get_workouts(
    &self,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    page: u32,
  ) -> Result<WorkoutsPage, HevyError> {
    let mut query = self.page_query(page);
    if let Some(start) = start_date {
      query.push(("start_date", start.format("%Y-%m-%d").to_string()));
    }
    if let Some(end) = end_date {
      query.push(("end_date", end.format("%Y-%m-%d").to_string()));
    }

    self.get_json("/workouts", &query).await
  }

  pub async fn get_all_workouts(
    &self,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
  ) -> Result<Vec<WorkoutRecord>, HevyError> {
    collect_pages("workout", MAX_WORKOUT_PAGES, move |page| {
      self.get_workouts(start_date, end_date, page)
    })
    .await
  }

  pub async fn get_exercise_templates(&self, page: u32) -> Result<ExerciseTemplatesPage, HevyError> {
    self.get_json("/exercise_templates", &self.page_query(page)).await
  }

  pub async fn get_all_exercise_templates(&self) -> Result<Vec<ExerciseCatalogEntry>, HevyError> {
    collect_pages("exercise template", MAX_TEMPLATE_PAGES, move |page| {
      self.get_exercise_templates(page)
    })
    .await
  }

  /// ---------------------------------------------------------------------------
  /// Routines and Folders
  /// ---------------------------------------------------------------------------

  pub async fn get_routines(&self, page: u32) -> Result<RoutinesPage, HevyError> {
    self.get_json("/routines", &self.page_query(page)).await
  }

  pub async fn get_routine_folders(&self, page: u32) -> Result<RoutineFoldersPage, HevyError> {
    self.get_json("/routine_folders", &self.page_query(page)).await
  }

  pub async fn get_all_routine_folders(&self) -> Result<Vec<RoutineFolder>, HevyError> {
    collect_pages("routine folder", MAX_FOLDER_PAGES, move |page| {
      self.get_routine_folders(page)
    })
    .await
  }

  pub async fn create_routine_folder(&self, title: &str) -> Result<RoutineFolder, HevyError> {
    let body = self
      .post_json("/routine_folders", &json!({ "routine_folder": { "title": title } }))
      .await?;

    serde_json::from_value(unwrap_envelope(body, "routine_folder"))
      .map_err(|e| HevyError::UnexpectedResponse(format!("routine folder: {}", e)))
  }

  pub async fn create_routine(&self, request: &CreateRoutineRequest) -> Result<Routine, HevyError> {
    let body = self.post_json("/routines", &json!({ "routine": request })).await?;

    let routine = serde_json::from_value::<OneOrMany<Routine>>(unwrap_envelope(body, "routine"))
      .map_err(|e| HevyError::UnexpectedResponse(format!("routine: {}", e)))?
      .into_first()
      .ok_or_else(|| HevyError::UnexpectedResponse("empty routine list".into()))?;

    tracing::info!("[Hevy API] Created routine: {} (ID: {})", routine.title, routine.id);
    Ok(routine)
  }

  /// Find a folder by exact title, creating it when missing
  pub async fn ensure_routine_folder(&self, folder_name: &str) -> Result<RoutineFolder, HevyError> {
    let folders = self.get_all_routine_folders().await?;

    if let Some(existing) = folders.into_iter().find(|f| f.title == folder_name) {
      tracing::info!("[Hevy API] Using existing folder: {} (ID: {})", folder_name, existing.id);
      return Ok(existing);
    }

    tracing::info!("[Hevy API] Creating new folder: {}", folder_name);
    self.create_routine_folder(folder_name).await
  }
}
