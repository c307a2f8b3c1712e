//! Sequential, range-addressed upload of one file to
//! the file-transfer endpoint.

use tracing::{
  debug,
  info
};

use crate::client::{
  FastClient,
  HttpTransport
};
use crate::error::{
  Result,
  UploadError
};

/// Inclusive byte range `start..=end`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct ByteRange {
  pub start: u64,
  pub end:   u64
}

impl ByteRange {
  pub fn len(&self) -> u64 {
    self.end - self.start + 1
  }

  /// `Content-Range` header value,
  /// `{start}-{end}/{total}`.
  pub fn content_range(
    &self,
    total: u64
  ) -> String {
    format!(
      "{}-{}/{}",
      self.start, self.end, total
    )
  }
}

/// Splits `[0, size)` into consecutive ranges of at
/// most `chunk_size` bytes. The last range ends at
/// `size - 1`.
pub fn plan_chunks(
  size: u64,
  chunk_size: u64
) -> Vec<ByteRange> {
  let chunk_size = chunk_size.max(1);
  let mut ranges = Vec::with_capacity(
    size.div_ceil(chunk_size) as usize
  );
  let mut start = 0;
  while start < size {
    let end = (start + chunk_size)
      .min(size)
      - 1;
    ranges.push(ByteRange { start, end });
    start = end + 1;
  }
  ranges
}

/// A file-like object that knows its size and can
/// hand out byte ranges.
#[allow(async_fn_in_trait)]
pub trait ChunkSource {
  fn name(&self) -> &str;

  fn size(&self) -> u64;

  async fn read_range(
    &self,
    range: ByteRange
  ) -> Result<Vec<u8>>;
}

/// Progress of one upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
  pub file_name:   String,
  pub total:       u64,
  pub offset:      u64,
  pub chunks_sent: usize
}

impl UploadSession {
  fn new(
    file_name: &str,
    total: u64
  ) -> Self {
    Self {
      file_name: file_name.to_string(),
      total,
      offset: 0,
      chunks_sent: 0
    }
  }

  pub fn is_complete(&self) -> bool {
    self.total > 0
      && self.offset == self.total
  }
}

/// Uploads `source` chunk by chunk. The next chunk
/// is only read once the previous POST succeeded;
/// the first failure aborts the sequence.
#[tracing::instrument(skip_all, fields(file = source.name(), size = source.size()))]
pub async fn upload_chunked<T, S>(
  client: &FastClient<T>,
  source: &S,
  chunk_size: u64
) -> Result<UploadSession>
where
  T: HttpTransport,
  S: ChunkSource
{
  let mut session = UploadSession::new(
    source.name(),
    source.size()
  );
  if session.total == 0 {
    return Err(
      UploadError::EmptyFile {
        file_name: session.file_name
      }
      .into()
    );
  }

  let plan =
    plan_chunks(session.total, chunk_size);
  info!(
    chunks = plan.len(),
    chunk_size, "starting chunked upload"
  );

  for range in plan {
    let bytes =
      source.read_range(range).await?;
    if bytes.len() as u64 != range.len() {
      return Err(
        UploadError::Read {
          file_name: session
            .file_name
            .clone(),
          start:     range.start,
          end:       range.end,
          message:   format!(
            "expected {} bytes, got {}",
            range.len(),
            bytes.len()
          )
        }
        .into()
      );
    }

    client
      .upload_chunk(
        &session.file_name,
        range,
        session.total,
        bytes
      )
      .await?;

    session.offset = range.end + 1;
    session.chunks_sent += 1;
    debug!(
      offset = session.offset,
      total = session.total,
      "uploaded chunk"
    );
  }

  info!(
    chunks = session.chunks_sent,
    "chunked upload complete"
  );
  Ok(session)
}

impl<T: HttpTransport> FastClient<T> {
  /// Uploads with the configured chunk size.
  pub async fn upload_file<S>(
    &self,
    source: &S
  ) -> Result<UploadSession>
  where
    S: ChunkSource
  {
    upload_chunked(
      self,
      source,
      self.chunk_size()
    )
    .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::client::{
    Body,
    Method
  };
  use crate::error::ConsoleError;
  use crate::test_support::{
    MemorySource,
    client_with,
    json_ok,
    status
  };

  #[test]
  fn plan_for_two_and_a_half_chunks() {
    let plan =
      plan_chunks(2_500_000, 1_000_000);
    assert_eq!(
      plan,
      vec![
        ByteRange {
          start: 0,
          end:   999_999
        },
        ByteRange {
          start: 1_000_000,
          end:   1_999_999
        },
        ByteRange {
          start: 2_000_000,
          end:   2_499_999
        },
      ]
    );
  }

  #[test]
  fn plan_for_small_file_is_one_range() {
    assert_eq!(
      plan_chunks(500_000, 1_000_000),
      vec![ByteRange {
        start: 0,
        end:   499_999
      }]
    );
  }

  #[test]
  fn plan_covers_every_byte_once() {
    for (size, chunk) in [
      (1, 1),
      (7, 3),
      (9, 3),
      (10, 1_000),
      (1_000_001, 1_000_000)
    ] {
      let plan = plan_chunks(size, chunk);
      assert_eq!(
        plan.len() as u64,
        size.div_ceil(chunk)
      );
      assert_eq!(plan[0].start, 0);
      assert_eq!(
        plan.last().map(|r| r.end),
        Some(size - 1)
      );
      for pair in plan.windows(2) {
        assert_eq!(
          pair[0].end + 1,
          pair[1].start
        );
      }
    }
    assert!(plan_chunks(0, 10).is_empty());
  }

  #[tokio::test]
  async fn uploads_ranges_in_order_with_headers() {
    let data: Vec<u8> = (0..25u8).collect();
    let source = MemorySource::new(
      "set.zip",
      data.clone()
    );
    let client = client_with(vec![
      json_ok(""),
      json_ok(""),
      json_ok(""),
    ]);

    let session =
      upload_chunked(&client, &source, 10)
        .await
        .expect("upload");

    assert!(session.is_complete());
    assert_eq!(session.chunks_sent, 3);

    let sent =
      client.transport().requests();
    let ranges: Vec<_> = sent
      .iter()
      .map(|req| {
        req
          .header_value("Content-Range")
          .unwrap_or_default()
          .to_string()
      })
      .collect();
    assert_eq!(
      ranges,
      vec!["0-9/25", "10-19/25", "20-24/25"]
    );
    assert_eq!(
      sent[2].header_value("Content-Length"),
      Some("5")
    );

    let mut rebuilt = Vec::new();
    for req in &sent {
      assert_eq!(req.method, Method::Post);
      assert_eq!(
        req.url,
        "/mgmt/shared/file-transfer/\
         uploads/set.zip"
      );
      assert_eq!(
        req.header_value("Content-Type"),
        Some("application/octet-stream")
      );
      if let Body::Bytes(bytes) = &req.body
      {
        rebuilt.extend_from_slice(bytes);
      }
    }
    assert_eq!(rebuilt, data);
  }

  #[tokio::test]
  async fn failed_chunk_aborts_remaining() {
    let source = MemorySource::new(
      "set.zip",
      vec![0u8; 30]
    );
    let client = client_with(vec![
      json_ok(""),
      status(500, "Internal Server Error"),
      json_ok(""),
    ]);

    let err =
      upload_chunked(&client, &source, 10)
        .await
        .expect_err("second chunk fails");

    assert_eq!(
      client.transport().requests().len(),
      2
    );
    assert!(matches!(
      err,
      ConsoleError::Upload(
        UploadError::Rejected {
          start: 10,
          end: 19,
          status: 500,
          ..
        }
      )
    ));
  }

  #[tokio::test]
  async fn empty_file_sends_nothing() {
    let source =
      MemorySource::new("empty.zip", vec![]);
    let client = client_with(vec![]);

    let err = client
      .upload_file(&source)
      .await
      .expect_err("empty upload");

    assert!(matches!(
      err,
      ConsoleError::Upload(
        UploadError::EmptyFile { .. }
      )
    ));
    assert!(
      client
        .transport()
        .requests()
        .is_empty()
    );
  }
}
