use serde::Deserialize;
use tracing::{
  info,
  warn
};

pub const DEFAULT_BASE_PATH: &str =
  "/mgmt/shared/fast";
pub const DEFAULT_UPLOAD_PATH: &str =
  "/mgmt/shared/file-transfer/uploads";
pub const DEFAULT_CHUNK_SIZE: u64 =
  1_000_000;
pub const DEFAULT_POLL_INTERVAL_MS: u32 =
  5_000;
pub const DEFAULT_IN_PROGRESS_MESSAGE:
  &str = "in progress";

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct ConsoleConfig {
  pub version: u32,
  pub api:     ApiConfig,
  pub upload:  UploadConfig,
  pub tasks:   TaskPollConfig
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct ApiConfig {
  pub base_path:   String,
  pub upload_path: String
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct UploadConfig {
  pub chunk_size: u64
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct TaskPollConfig {
  pub poll_interval_ms:    u32,
  pub in_progress_message: String
}

impl Default for ConsoleConfig {
  fn default() -> Self {
    Self {
      version: 1,
      api:     ApiConfig::default(),
      upload:  UploadConfig::default(),
      tasks:   TaskPollConfig::default()
    }
  }
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_path:   DEFAULT_BASE_PATH
        .to_string(),
      upload_path: DEFAULT_UPLOAD_PATH
        .to_string()
    }
  }
}

impl Default for UploadConfig {
  fn default() -> Self {
    Self {
      chunk_size: DEFAULT_CHUNK_SIZE
    }
  }
}

impl Default for TaskPollConfig {
  fn default() -> Self {
    Self {
      poll_interval_ms:
        DEFAULT_POLL_INTERVAL_MS,
      in_progress_message:
        DEFAULT_IN_PROGRESS_MESSAGE
          .to_string()
    }
  }
}

impl ConsoleConfig {
  /// Parses a TOML document, falling back to defaults
  /// when it cannot be read.
  pub fn from_toml_str(
    text: &str
  ) -> Self {
    match toml::from_str::<ConsoleConfig>(
      text
    ) {
      | Ok(mut config) => {
        config.sanitize();
        info!(
          version = config.version,
          base_path = %config.api.base_path,
          chunk_size = config.upload.chunk_size,
          poll_interval_ms = config.tasks.poll_interval_ms,
          "loaded console config"
        );
        config
      }
      | Err(error) => {
        tracing::error!(%error, "failed parsing console config; using defaults");
        ConsoleConfig::default()
      }
    }
  }

  fn sanitize(&mut self) {
    let base = self
      .api
      .base_path
      .trim()
      .trim_end_matches('/')
      .to_string();
    if base.is_empty() {
      warn!(
        "blank api.base_path; using \
         default"
      );
      self.api.base_path =
        DEFAULT_BASE_PATH.to_string();
    } else {
      self.api.base_path = base;
    }

    let upload = self
      .api
      .upload_path
      .trim()
      .trim_end_matches('/')
      .to_string();
    if upload.is_empty() {
      warn!(
        "blank api.upload_path; using \
         default"
      );
      self.api.upload_path =
        DEFAULT_UPLOAD_PATH.to_string();
    } else {
      self.api.upload_path = upload;
    }

    if self.upload.chunk_size == 0 {
      warn!(
        "upload.chunk_size must be \
         positive; using default"
      );
      self.upload.chunk_size =
        DEFAULT_CHUNK_SIZE;
    }

    if self.tasks.poll_interval_ms == 0 {
      warn!(
        "tasks.poll_interval_ms must be \
         positive; using default"
      );
      self.tasks.poll_interval_ms =
        DEFAULT_POLL_INTERVAL_MS;
    }

    if self
      .tasks
      .in_progress_message
      .trim()
      .is_empty()
    {
      self.tasks.in_progress_message =
        DEFAULT_IN_PROGRESS_MESSAGE
          .to_string();
    }
  }
}
