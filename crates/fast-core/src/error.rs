use thiserror::Error;

/// Failures of a single user-initiated console
/// operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsoleError {
  #[error(
    "Failed to get data from {url}: \
     {status} {status_text}"
  )]
  Request {
    url:         String,
    status:      u16,
    status_text: String
  },

  #[error(
    "Error loading template \
     \"{template}\":\n{message}"
  )]
  TemplateLoad {
    template: String,
    message:  String
  },

  #[error(transparent)]
  Upload(#[from] UploadError),

  #[error(
    "Could not find route info for url: \
     {url} (raw was {raw}, routes: \
     {routes})"
  )]
  RouteNotFound {
    url:    String,
    raw:    String,
    routes: String
  },

  #[error("Request to {url} failed: {message}")]
  Transport {
    url:     String,
    message: String
  },

  #[error(
    "Unexpected response from {url}: \
     {message}"
  )]
  Decode {
    url:     String,
    message: String
  }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
  #[error(
    "Failed to upload file {file_name} \
     (bytes {start}-{end}/{total}): \
     {status} {status_text}"
  )]
  Rejected {
    file_name:   String,
    start:       u64,
    end:         u64,
    total:       u64,
    status:      u16,
    status_text: String
  },

  #[error(
    "Failed to read {file_name} bytes \
     {start}-{end}: {message}"
  )]
  Read {
    file_name: String,
    start:     u64,
    end:       u64,
    message:   String
  },

  #[error("Cannot upload empty file {file_name}")]
  EmptyFile { file_name: String }
}

pub type Result<T> =
  std::result::Result<T, ConsoleError>;
