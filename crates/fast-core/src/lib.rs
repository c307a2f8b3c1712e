//! Browser-independent core of the FAST console:
//! configuration, REST client, chunked upload,
//! routing, page data and the template editor.

pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod navigation;
pub mod pages;
pub mod router;
pub mod tasks;
pub mod upload;

pub use client::{
  FastClient,
  HttpTransport
};
pub use config::ConsoleConfig;
pub use error::{
  ConsoleError,
  UploadError
};
pub use navigation::{
  NavigationToken,
  NavigationTracker,
  OutputSink,
  PageContext
};

#[cfg(test)]
pub(crate) mod test_support {
  use std::cell::RefCell;
  use std::collections::VecDeque;

  use crate::client::{
    FastClient,
    HttpRequest,
    HttpResponse,
    HttpTransport
  };
  use crate::config::ConsoleConfig;
  use crate::error::{
    ConsoleError,
    Result
  };
  use crate::navigation::{
    NavigationTracker,
    OutputSink,
    PageContext
  };
  use crate::upload::{
    ByteRange,
    ChunkSource
  };

  /// Replays queued responses and records every
  /// request it is handed.
  #[derive(Debug, Default)]
  pub struct MockTransport {
    responses: RefCell<VecDeque<HttpResponse>>,
    requests:  RefCell<Vec<HttpRequest>>
  }

  impl MockTransport {
    pub fn new(
      responses: Vec<HttpResponse>
    ) -> Self {
      Self {
        responses: RefCell::new(
          responses.into()
        ),
        requests:  RefCell::new(Vec::new())
      }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
      self.requests.borrow().clone()
    }
  }

  impl HttpTransport for MockTransport {
    async fn send(
      &self,
      request: HttpRequest
    ) -> Result<HttpResponse> {
      let url = request.url.clone();
      self.requests.borrow_mut().push(request);
      self
        .responses
        .borrow_mut()
        .pop_front()
        .ok_or(ConsoleError::Transport {
          url,
          message: "no response queued"
            .to_string()
        })
    }
  }

  pub fn client_with(
    responses: Vec<HttpResponse>
  ) -> FastClient<MockTransport> {
    FastClient::new(
      MockTransport::new(responses),
      &ConsoleConfig::default()
    )
  }

  pub fn json_ok(body: &str) -> HttpResponse {
    HttpResponse {
      status:      200,
      status_text: "OK".to_string(),
      body:        body.to_string()
    }
  }

  pub fn status(
    code: u16,
    text: &str
  ) -> HttpResponse {
    HttpResponse {
      status:      code,
      status_text: text.to_string(),
      body:        String::new()
    }
  }

  #[derive(Debug, Default)]
  pub struct Recorder {
    lines: RefCell<Vec<String>>
  }

  impl Recorder {
    pub fn lines(&self) -> Vec<String> {
      self.lines.borrow().clone()
    }
  }

  impl OutputSink for &Recorder {
    fn show(&self, text: &str) {
      self
        .lines
        .borrow_mut()
        .push(text.to_string());
    }
  }

  pub fn context(
    recorder: &Recorder
  ) -> (
    NavigationTracker,
    PageContext<&Recorder>
  ) {
    let tracker = NavigationTracker::new();
    let ctx =
      PageContext::new(tracker.begin(), recorder);
    (tracker, ctx)
  }

  pub struct MemorySource {
    name:  String,
    bytes: Vec<u8>
  }

  impl MemorySource {
    pub fn new(
      name: &str,
      bytes: Vec<u8>
    ) -> Self {
      Self {
        name: name.to_string(),
        bytes
      }
    }
  }

  impl ChunkSource for MemorySource {
    fn name(&self) -> &str {
      &self.name
    }

    fn size(&self) -> u64 {
      self.bytes.len() as u64
    }

    async fn read_range(
      &self,
      range: ByteRange
    ) -> Result<Vec<u8>> {
      Ok(
        self.bytes[range.start as usize
          ..=range.end as usize]
          .to_vec()
      )
    }
  }
}
