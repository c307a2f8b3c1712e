use serde::{
  Deserialize,
  Serialize
};
use serde_json::{
  Map,
  Value
};

/// Parameter values bound to a template.
pub type View = Map<String, Value>;

/// Row of `GET applications`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ApplicationDto {
  pub tenant:   String,
  pub name:     String,
  #[serde(default)]
  pub template: Option<String>
}

impl ApplicationDto {
  /// `tenant/name`, the path segment used by the
  /// application endpoints and the modify route.
  pub fn path(&self) -> String {
    format!(
      "{}/{}",
      self.tenant, self.name
    )
  }
}

/// Response of `GET applications/{tenant}/{app}`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct ApplicationDetailDto {
  #[serde(default)]
  pub constants: ApplicationConstants
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Default,
)]
pub struct ApplicationConstants {
  pub fast: Option<FastConstants>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct FastConstants {
  pub template: String,
  #[serde(default)]
  pub view:     View
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct ApplicationCreate {
  pub name:       String,
  pub parameters: View
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskDto {
  pub id:          String,
  #[serde(default)]
  pub tenant:      String,
  #[serde(default)]
  pub application: String,
  #[serde(default)]
  pub message:     String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TemplateDescriptor {
  pub name: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSetDto {
  pub name:             String,
  #[serde(default)]
  pub templates:
    Vec<TemplateDescriptor>,
  #[serde(default)]
  pub supported:        bool,
  #[serde(default)]
  pub update_available: bool
}

impl TemplateSetDto {
  /// Full template id (`set/template`) for one of
  /// this set's descriptors. Descriptors that already
  /// carry a set prefix are returned unchanged.
  pub fn template_id(
    &self,
    template: &TemplateDescriptor
  ) -> String {
    if template.name.contains('/') {
      template.name.clone()
    } else {
      format!(
        "{}/{}",
        self.name, template.name
      )
    }
  }

  /// Template name without the set prefix.
  pub fn short_name<'a>(
    &self,
    template: &'a TemplateDescriptor
  ) -> &'a str {
    template
      .name
      .rsplit_once('/')
      .map(|(_, short)| short)
      .unwrap_or(&template.name)
  }
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TemplateSetCreate {
  pub name: String
}

/// Error payload the backend returns in place of a
/// template definition.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct ApiErrorDto {
  pub code:    Value,
  #[serde(default)]
  pub message: String
}
