use fast_core::client::{
  Body,
  HttpRequest,
  HttpResponse,
  HttpTransport,
  Method
};
use fast_core::error::{
  ConsoleError,
  UploadError
};
use fast_core::upload::{
  ByteRange,
  ChunkSource
};
use fast_core::{
  ConsoleConfig,
  FastClient,
  OutputSink
};
use gloo::net::http::Request;
use wasm_bindgen_futures::JsFuture;
use yew::Callback;

const CONSOLE_CONFIG_TOML: &str =
  include_str!("../assets/console.toml");

pub type ConsoleClient =
  FastClient<BrowserTransport>;

pub fn load_console_config() -> ConsoleConfig
{
  ConsoleConfig::from_toml_str(
    CONSOLE_CONFIG_TOML
  )
}

pub fn console_client(
  config: &ConsoleConfig
) -> ConsoleClient {
  FastClient::new(BrowserTransport, config)
}

/// `fetch`-backed transport.
#[derive(
  Debug, Clone, Copy, Default, PartialEq,
)]
pub struct BrowserTransport;

impl HttpTransport for BrowserTransport {
  async fn send(
    &self,
    request: HttpRequest
  ) -> Result<HttpResponse, ConsoleError> {
    let url = request.url.clone();
    let transport_err =
      |err: gloo::net::Error| {
        ConsoleError::Transport {
          url:     url.clone(),
          message: err.to_string()
        }
      };

    let mut builder = match request.method {
      | Method::Get => Request::get(&url),
      | Method::Post => Request::post(&url),
      | Method::Delete => Request::delete(&url)
    };
    for (name, value) in &request.headers {
      builder = builder.header(name, value);
    }

    let response = match request.body {
      | Body::Empty => builder.send().await,
      | Body::Json(value) => {
        send_with(builder.json(&value)).await
      }
      | Body::Bytes(bytes) => {
        let body = js_sys::Uint8Array::from(
          bytes.as_slice()
        );
        send_with(builder.body(body)).await
      }
    }
    .map_err(transport_err)?;

    let status = response.status();
    let status_text = response.status_text();
    let body = response
      .text()
      .await
      .map_err(transport_err)?;

    Ok(HttpResponse {
      status,
      status_text,
      body
    })
  }
}

async fn send_with(
  request: Result<Request, gloo::net::Error>
) -> Result<gloo::net::http::Response, gloo::net::Error>
{
  request?.send().await
}

/// A file picked in the browser, read slice by slice.
pub struct FileSource {
  name: String,
  file: web_sys::File
}

impl FileSource {
  pub fn new(file: web_sys::File) -> Self {
    Self {
      name: file.name(),
      file
    }
  }
}

impl ChunkSource for FileSource {
  fn name(&self) -> &str {
    &self.name
  }

  fn size(&self) -> u64 {
    self.file.size() as u64
  }

  async fn read_range(
    &self,
    range: ByteRange
  ) -> Result<Vec<u8>, ConsoleError> {
    let read_err = |message: String| {
      ConsoleError::from(UploadError::Read {
        file_name: self.name.clone(),
        start: range.start,
        end: range.end,
        message
      })
    };

    let blob = self
      .file
      .slice_with_f64_and_f64(
        range.start as f64,
        (range.end + 1) as f64
      )
      .map_err(|err| {
        read_err(format!("{err:?}"))
      })?;
    let buffer =
      JsFuture::from(blob.array_buffer())
        .await
        .map_err(|err| {
          read_err(format!("{err:?}"))
        })?;
    Ok(
      js_sys::Uint8Array::new(&buffer).to_vec()
    )
  }
}

/// Output region of the current page.
#[derive(Clone, PartialEq)]
pub struct OutputPane(pub Callback<String>);

impl OutputSink for OutputPane {
  fn show(&self, text: &str) {
    self.0.emit(text.to_string());
  }
}

pub fn current_hash() -> String {
  web_sys::window()
    .and_then(|window| {
      window.location().hash().ok()
    })
    .unwrap_or_default()
}

pub fn navigate(href: &str) {
  if let Some(window) = web_sys::window() {
    if let Err(err) =
      window.location().set_hash(href)
    {
      tracing::error!(
        ?err,
        href,
        "failed to change location hash"
      );
    }
  }
}

pub fn reload() {
  if let Some(window) = web_sys::window() {
    if let Err(err) = window.location().reload()
    {
      tracing::error!(
        ?err,
        "failed to reload page"
      );
    }
  }
}
