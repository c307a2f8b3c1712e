//! Typed calls against the FAST REST surface.
//!
//! The browser plugs a fetch-backed [`HttpTransport`]
//! in; tests plug in a recording one.

use fast_gui_shared::{
  ApplicationCreate,
  ApplicationDetailDto,
  ApplicationDto,
  TaskDto,
  TemplateSetCreate,
  TemplateSetDto
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{
  debug,
  warn
};

use crate::config::ConsoleConfig;
use crate::editor::TemplateDefinition;
use crate::error::{
  ConsoleError,
  Result,
  UploadError
};
use crate::upload::ByteRange;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Method {
  Get,
  Post,
  Delete
}

impl Method {
  pub fn as_str(self) -> &'static str {
    match self {
      | Method::Get => "GET",
      | Method::Post => "POST",
      | Method::Delete => "DELETE"
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
  Empty,
  Json(Value),
  Bytes(Vec<u8>)
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
  pub method:  Method,
  pub url:     String,
  pub headers: Vec<(String, String)>,
  pub body:    Body
}

impl HttpRequest {
  pub fn new(
    method: Method,
    url: impl Into<String>
  ) -> Self {
    Self {
      method,
      url: url.into(),
      headers: Vec::new(),
      body: Body::Empty
    }
  }

  pub fn header(
    mut self,
    name: &str,
    value: impl Into<String>
  ) -> Self {
    self
      .headers
      .push((name.to_string(), value.into()));
    self
  }

  pub fn json(
    mut self,
    body: Value
  ) -> Self {
    self.body = Body::Json(body);
    self
  }

  pub fn bytes(
    mut self,
    body: Vec<u8>
  ) -> Self {
    self.body = Body::Bytes(body);
    self
  }

  pub fn header_value(
    &self,
    name: &str
  ) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(key, _)| {
        key.eq_ignore_ascii_case(name)
      })
      .map(|(_, value)| value.as_str())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
  pub status:      u16,
  pub status_text: String,
  pub body:        String
}

impl HttpResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// One request/response exchange. Implementations
/// report network failures as
/// [`ConsoleError::Transport`] and return every HTTP
/// status, successful or not, as a response.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
  async fn send(
    &self,
    request: HttpRequest
  ) -> Result<HttpResponse>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FastClient<T> {
  transport:   T,
  base_path:   String,
  upload_path: String,
  chunk_size:  u64
}

impl<T: HttpTransport> FastClient<T> {
  pub fn new(
    transport: T,
    config: &ConsoleConfig
  ) -> Self {
    Self {
      transport,
      base_path: config
        .api
        .base_path
        .clone(),
      upload_path: config
        .api
        .upload_path
        .clone(),
      chunk_size: config.upload.chunk_size
    }
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  pub fn chunk_size(&self) -> u64 {
    self.chunk_size
  }

  pub fn endpoint(
    &self,
    suffix: &str
  ) -> String {
    format!(
      "{}/{}",
      self.base_path,
      suffix.trim_start_matches('/')
    )
  }

  pub fn upload_endpoint(
    &self,
    file_name: &str
  ) -> String {
    format!(
      "{}/{}",
      self.upload_path, file_name
    )
  }

  /// Sends a request and fails with
  /// [`ConsoleError::Request`] on a non-2xx status.
  pub async fn send_checked(
    &self,
    request: HttpRequest
  ) -> Result<HttpResponse> {
    let url = request.url.clone();
    let method = request.method;
    let response =
      self.transport.send(request).await?;
    debug!(
      method = method.as_str(),
      url = %url,
      status = response.status,
      "backend response"
    );

    if !response.is_success() {
      warn!(
        method = method.as_str(),
        url = %url,
        status = response.status,
        "backend request failed"
      );
      return Err(ConsoleError::Request {
        url,
        status: response.status,
        status_text: response.status_text
      });
    }

    Ok(response)
  }

  /// GET `{base}/{suffix}` and decode the JSON body.
  pub async fn get_json<R>(
    &self,
    suffix: &str
  ) -> Result<R>
  where
    R: DeserializeOwned
  {
    let url = self.endpoint(suffix);
    let response = self
      .send_checked(HttpRequest::new(
        Method::Get,
        url.clone()
      ))
      .await?;
    decode_body(&url, &response.body)
  }

  pub async fn list_applications(
    &self
  ) -> Result<Vec<ApplicationDto>> {
    self.get_json("applications").await
  }

  pub async fn get_application(
    &self,
    app_path: &str
  ) -> Result<ApplicationDetailDto> {
    self
      .get_json(&format!(
        "applications/{app_path}"
      ))
      .await
  }

  pub async fn create_application(
    &self,
    body: &ApplicationCreate
  ) -> Result<Value> {
    let url = self.endpoint("applications");
    let payload = to_value(&url, body)?;
    let response = self
      .send_checked(
        HttpRequest::new(
          Method::Post,
          url.clone()
        )
        .json(payload)
      )
      .await?;
    decode_optional_body(
      &url,
      &response.body
    )
  }

  pub async fn delete_application(
    &self,
    tenant: &str,
    name: &str
  ) -> Result<()> {
    let url = self.endpoint(&format!(
      "applications/{tenant}/{name}"
    ));
    self
      .send_checked(HttpRequest::new(
        Method::Delete,
        url
      ))
      .await?;
    Ok(())
  }

  pub async fn list_tasks(
    &self
  ) -> Result<Vec<TaskDto>> {
    self.get_json("tasks").await
  }

  pub async fn list_template_sets(
    &self
  ) -> Result<Vec<TemplateSetDto>> {
    self.get_json("templatesets").await
  }

  pub async fn install_template_set(
    &self,
    name: &str
  ) -> Result<()> {
    let url = self.endpoint("templatesets");
    let payload = to_value(
      &url,
      &TemplateSetCreate {
        name: name.to_string()
      }
    )?;
    self
      .send_checked(
        HttpRequest::new(Method::Post, url)
          .json(payload)
      )
      .await?;
    Ok(())
  }

  pub async fn remove_template_set(
    &self,
    name: &str
  ) -> Result<()> {
    let url = self.endpoint(&format!(
      "templatesets/{name}"
    ));
    self
      .send_checked(HttpRequest::new(
        Method::Delete,
        url
      ))
      .await?;
    Ok(())
  }

  /// Reinstalls a set from the copy the backend
  /// already holds.
  pub async fn update_template_set(
    &self,
    name: &str
  ) -> Result<()> {
    self.remove_template_set(name).await?;
    self.install_template_set(name).await
  }

  /// Fetches a template definition. The backend
  /// answers unknown or broken templates with a
  /// `{code, message}` payload instead of a template.
  pub async fn get_template(
    &self,
    template_id: &str
  ) -> Result<TemplateDefinition> {
    let value: Value = self
      .get_json(&format!(
        "templates/{template_id}"
      ))
      .await?;
    TemplateDefinition::from_value(
      template_id,
      value
    )
  }

  /// POSTs one byte range of a file to the
  /// file-transfer endpoint.
  pub async fn upload_chunk(
    &self,
    file_name: &str,
    range: ByteRange,
    total: u64,
    bytes: Vec<u8>
  ) -> Result<()> {
    let request = HttpRequest::new(
      Method::Post,
      self.upload_endpoint(file_name)
    )
    .header(
      "Content-Type",
      "application/octet-stream"
    )
    .header(
      "Content-Range",
      range.content_range(total)
    )
    .header(
      "Content-Length",
      range.len().to_string()
    )
    .bytes(bytes);

    let response =
      self.transport.send(request).await?;
    if !response.is_success() {
      return Err(
        UploadError::Rejected {
          file_name:   file_name
            .to_string(),
          start:       range.start,
          end:         range.end,
          total,
          status:      response.status,
          status_text: response
            .status_text
        }
        .into()
      );
    }
    Ok(())
  }
}

fn decode_body<R>(
  url: &str,
  body: &str
) -> Result<R>
where
  R: DeserializeOwned
{
  serde_json::from_str(body).map_err(
    |err| ConsoleError::Decode {
      url:     url.to_string(),
      message: err.to_string()
    }
  )
}

fn decode_optional_body(
  url: &str,
  body: &str
) -> Result<Value> {
  if body.trim().is_empty() {
    return Ok(Value::Null);
  }
  decode_body(url, body)
}

fn to_value<B>(
  url: &str,
  body: &B
) -> Result<Value>
where
  B: serde::Serialize
{
  serde_json::to_value(body).map_err(
    |err| ConsoleError::Decode {
      url:     url.to_string(),
      message: format!(
        "failed to encode request body: \
         {err}"
      )
    }
  )
}
