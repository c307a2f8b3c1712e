//! Template-driven parameter editor.
//!
//! A template definition carries a JSON schema for its
//! view. The editor adapts that schema into an ordered
//! list of form fields, seeds values from the
//! template's defaults and any stored view, and
//! re-validates on every change.

use std::collections::{
  BTreeMap,
  BTreeSet
};
use std::sync::LazyLock;

use fast_gui_shared::{
  ApiErrorDto,
  ApplicationCreate,
  View
};
use regex::{
  Captures,
  Regex
};
use serde::Deserialize;
use serde_json::{
  Value,
  json
};
use tracing::debug;

use crate::client::{
  FastClient,
  HttpTransport
};
use crate::error::{
  ConsoleError,
  Result
};
use crate::navigation::{
  OutputSink,
  PageContext
};
use crate::router::TASKS_HREF;

static PLACEHOLDER: LazyLock<Regex> =
  LazyLock::new(|| {
    Regex::new(
      r"\{\{\{?\s*([A-Za-z0-9_.\-]+)\s*\}?\}\}"
    )
    .expect("placeholder pattern")
  });

#[derive(Debug, Deserialize)]
struct RawTemplate {
  #[serde(
    default,
    rename = "templateText",
    alias = "template_text"
  )]
  template_text: String,
  #[serde(
    default,
    rename = "_viewSchema",
    alias = "viewSchema"
  )]
  view_schema:   Option<Value>,
  #[serde(default, alias = "defaultView")]
  view:          View,
  #[serde(default)]
  title:         Option<String>,
  #[serde(default)]
  description:   Option<String>
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDefinition {
  pub id:            String,
  pub title:         Option<String>,
  pub description:   Option<String>,
  pub template_text: String,
  view_schema:       Value,
  view:              View
}

impl TemplateDefinition {
  /// Builds a definition from a `templates/{id}`
  /// payload. A truthy `code` member marks a backend
  /// error payload.
  pub fn from_value(
    id: &str,
    value: Value
  ) -> Result<Self> {
    if value
      .get("code")
      .is_some_and(is_truthy)
    {
      let message =
        serde_json::from_value::<ApiErrorDto>(
          value
        )
        .map(|payload| payload.message)
        .unwrap_or_default();
      return Err(
        ConsoleError::TemplateLoad {
          template: id.to_string(),
          message
        }
      );
    }

    let raw: RawTemplate =
      serde_json::from_value(value)
        .map_err(|err| {
          ConsoleError::Decode {
            url:     format!(
              "templates/{id}"
            ),
            message: err.to_string()
          }
        })?;

    Ok(Self {
      id:            id.to_string(),
      title:         raw.title,
      description:   raw.description,
      template_text: raw.template_text,
      view_schema:   raw
        .view_schema
        .unwrap_or_else(|| {
          json!({
            "type": "object",
            "properties": {}
          })
        }),
      view:          raw.view
    })
  }

  pub fn view_schema(&self) -> &Value {
    &self.view_schema
  }

  /// Property defaults from the schema, overlaid by
  /// the template's own view.
  pub fn default_view(&self) -> View {
    let mut view = View::new();
    for (name, prop) in
      schema_properties(&self.view_schema)
    {
      if let Some(default) = prop.get("default")
      {
        view.insert(
          name.clone(),
          default.clone()
        );
      }
    }
    for (name, value) in &self.view {
      view.insert(
        name.clone(),
        value.clone()
      );
    }
    view
  }

  /// Template defaults overlaid by `view`.
  pub fn combined_view(
    &self,
    view: &View
  ) -> View {
    let mut combined = self.default_view();
    for (name, value) in view {
      combined.insert(
        name.clone(),
        value.clone()
      );
    }
    combined
  }

  /// Substitutes `{{name}}` and `{{{name}}}`
  /// placeholders with values from the combined view.
  /// Section tags are left untouched.
  pub fn render(
    &self,
    view: &View
  ) -> String {
    let combined = self.combined_view(view);
    PLACEHOLDER
      .replace_all(
        &self.template_text,
        |caps: &Captures<'_>| {
          lookup(&combined, &caps[1])
            .map(scalar_text)
            .unwrap_or_default()
        }
      )
      .into_owned()
  }

  /// Rendered output, pretty-printed when it is JSON.
  pub fn render_preview(
    &self,
    view: &View
  ) -> String {
    let rendered = self.render(view);
    match serde_json::from_str::<Value>(
      &rendered
    ) {
      | Ok(value) => pretty(&value),
      | Err(_) => rendered
    }
  }
}

fn is_truthy(value: &Value) -> bool {
  match value {
    | Value::Null => false,
    | Value::Bool(flag) => *flag,
    | Value::Number(num) => {
      num.as_f64().is_some_and(|n| n != 0.0)
    }
    | Value::String(text) => !text.is_empty(),
    | Value::Array(_) | Value::Object(_) => {
      true
    }
  }
}

fn lookup<'a>(
  view: &'a View,
  path: &str
) -> Option<&'a Value> {
  let mut parts = path.split('.');
  let mut current =
    view.get(parts.next()?)?;
  for part in parts {
    current = current.get(part)?;
  }
  Some(current)
}

fn scalar_text(value: &Value) -> String {
  match value {
    | Value::String(text) => text.clone(),
    | Value::Null => String::new(),
    | other => other.to_string()
  }
}

pub fn pretty(value: &Value) -> String {
  serde_json::to_string_pretty(value)
    .unwrap_or_else(|_| value.to_string())
}

/// `properties` of an object schema, including those
/// of `allOf`/`anyOf`/`oneOf` branches.
fn schema_properties(
  schema: &Value
) -> Vec<(&String, &Value)> {
  let mut props = Vec::new();
  collect_properties(schema, &mut props);
  props
}

fn collect_properties<'a>(
  schema: &'a Value,
  out: &mut Vec<(&'a String, &'a Value)>
) {
  if let Some(map) = schema
    .get("properties")
    .and_then(Value::as_object)
  {
    out.extend(map.iter());
  }
  for key in ["allOf", "anyOf", "oneOf"] {
    if let Some(branches) =
      schema.get(key).and_then(Value::as_array)
    {
      for branch in branches {
        collect_properties(branch, out);
      }
    }
  }
}

/// Drops every view member the schema has no property
/// for.
pub fn filter_extra_properties(
  view: &View,
  schema: &Value
) -> View {
  let known: BTreeSet<&str> =
    schema_properties(schema)
      .into_iter()
      .map(|(name, _)| name.as_str())
      .collect();
  view
    .iter()
    .filter(|(name, _)| {
      known.contains(name.as_str())
    })
    .map(|(name, value)| {
      (name.clone(), value.clone())
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
  Text,
  Password,
  Integer,
  Number,
  Boolean,
  Choice(Vec<Value>),
  /// Arrays, objects and untyped values, edited as
  /// JSON text.
  Json
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
  pub name:        String,
  pub title:       String,
  pub description: Option<String>,
  pub kind:        FieldKind,
  pub required:    bool,
  pub minimum:     Option<f64>,
  pub maximum:     Option<f64>
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
  pub field:   String,
  pub message: String
}

impl FormField {
  fn from_property(
    name: &str,
    prop: &Value,
    required: bool
  ) -> Self {
    let kind = if let Some(options) =
      prop.get("enum").and_then(Value::as_array)
    {
      FieldKind::Choice(options.clone())
    } else {
      match prop
        .get("type")
        .and_then(Value::as_str)
      {
        | Some("string") => {
          if prop.get("format")
            == Some(&json!("password"))
          {
            FieldKind::Password
          } else {
            FieldKind::Text
          }
        }
        | Some("integer") => {
          FieldKind::Integer
        }
        | Some("number") => FieldKind::Number,
        | Some("boolean") => {
          FieldKind::Boolean
        }
        | _ => FieldKind::Json
      }
    };

    Self {
      name: name.to_string(),
      title: prop
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(name)
        .to_string(),
      description: prop
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string),
      kind,
      required,
      minimum: prop
        .get("minimum")
        .and_then(Value::as_f64),
      maximum: prop
        .get("maximum")
        .and_then(Value::as_f64)
    }
  }

  /// Converts raw input text to a value. `Ok(None)`
  /// clears the field.
  pub fn parse_input(
    &self,
    raw: &str
  ) -> std::result::Result<Option<Value>, String>
  {
    let trimmed = raw.trim();
    match &self.kind {
      | FieldKind::Text
      | FieldKind::Password => {
        Ok(Some(Value::String(
          raw.to_string()
        )))
      }
      | _ if trimmed.is_empty() => Ok(None),
      | FieldKind::Integer => trimmed
        .parse::<i64>()
        .map(|n| Some(Value::from(n)))
        .map_err(|_| {
          "Value must be an integer."
            .to_string()
        }),
      | FieldKind::Number => trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(|n| Some(Value::Number(n)))
        .ok_or_else(|| {
          "Value must be a number.".to_string()
        }),
      | FieldKind::Boolean => {
        match trimmed {
          | "true" => Ok(Some(Value::Bool(true))),
          | "false" => {
            Ok(Some(Value::Bool(false)))
          }
          | _ => Err(
            "Value must be true or false."
              .to_string()
          )
        }
      }
      | FieldKind::Choice(options) => options
        .iter()
        .find(|option| {
          scalar_text(option) == trimmed
        })
        .cloned()
        .map(Some)
        .ok_or_else(|| {
          "Value must be one of the \
           enumerated values."
            .to_string()
        }),
      | FieldKind::Json => {
        serde_json::from_str(trimmed)
          .map(Some)
          .map_err(|err| {
            format!("Invalid JSON: {err}")
          })
      }
    }
  }

  /// Value a checkbox or select starts with when
  /// neither the schema nor the view supplies one.
  pub fn initial_value(&self) -> Option<Value> {
    match &self.kind {
      | FieldKind::Boolean => {
        Some(Value::Bool(false))
      }
      | FieldKind::Choice(options) => {
        options.first().cloned()
      }
      | _ => None
    }
  }

  /// Text shown in the input for `value`.
  pub fn display_value(
    &self,
    value: Option<&Value>
  ) -> String {
    match (value, &self.kind) {
      | (None, _) => String::new(),
      | (Some(value), FieldKind::Json) => {
        pretty(value)
      }
      | (Some(value), _) => scalar_text(value)
    }
  }

  pub fn options(&self) -> Vec<String> {
    match &self.kind {
      | FieldKind::Choice(options) => options
        .iter()
        .map(scalar_text)
        .collect(),
      | _ => Vec::new()
    }
  }

  fn check(
    &self,
    value: Option<&Value>
  ) -> Option<String> {
    let value = match value {
      | None | Some(Value::Null) => {
        return self.required.then(|| {
          "Value required.".to_string()
        });
      }
      | Some(value) => value
    };

    let number_bounds = |n: f64| {
      if self.minimum.is_some_and(|min| n < min)
      {
        Some(format!(
          "Value must be at least {}.",
          self.minimum.unwrap_or_default()
        ))
      } else if self
        .maximum
        .is_some_and(|max| n > max)
      {
        Some(format!(
          "Value must be at most {}.",
          self.maximum.unwrap_or_default()
        ))
      } else {
        None
      }
    };

    match &self.kind {
      | FieldKind::Text
      | FieldKind::Password => match value {
        | Value::String(text)
          if self.required && text.is_empty() =>
        {
          Some("Value required.".to_string())
        }
        | Value::String(_) => None,
        | _ => {
          Some("Value must be a string.".to_string())
        }
      },
      | FieldKind::Integer => {
        if value.is_i64() || value.is_u64() {
          value.as_f64().and_then(number_bounds)
        } else {
          Some(
            "Value must be an integer."
              .to_string()
          )
        }
      }
      | FieldKind::Number => match value
        .as_f64()
      {
        | Some(n) => number_bounds(n),
        | None => {
          Some("Value must be a number.".to_string())
        }
      },
      | FieldKind::Boolean => {
        (!value.is_boolean()).then(|| {
          "Value must be true or false."
            .to_string()
        })
      }
      | FieldKind::Choice(options) => {
        (!options.contains(value)).then(|| {
          "Value must be one of the \
           enumerated values."
            .to_string()
        })
      }
      | FieldKind::Json => None
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub fields:      Vec<FormField>
}

impl FormSchema {
  pub fn field(
    &self,
    name: &str
  ) -> Option<&FormField> {
    self
      .fields
      .iter()
      .find(|field| field.name == name)
  }

  pub fn validate(
    &self,
    values: &View
  ) -> Vec<FieldError> {
    self
      .fields
      .iter()
      .filter_map(|field| {
        field
          .check(values.get(&field.name))
          .map(|message| FieldError {
            field: field.name.clone(),
            message
          })
      })
      .collect()
  }
}

/// Prepares a view schema for the form renderer.
/// Returns the adjusted schema together with the
/// ordered field list derived from it.
pub fn adapt_schema(
  schema: &Value
) -> (Value, FormSchema) {
  let mut adapted = schema.clone();
  let required: BTreeSet<String> = schema
    .get("required")
    .and_then(Value::as_array)
    .map(|names| {
      names
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
    })
    .unwrap_or_default();

  let mut ordered: Vec<(String, Value)> =
    schema_properties(schema)
      .into_iter()
      .map(|(name, prop)| {
        (name.clone(), prop.clone())
      })
      .collect();
  ordered.sort_by(|(_, a), (_, b)| {
    let order = |prop: &Value| {
      prop
        .get("propertyOrder")
        .and_then(Value::as_i64)
        .unwrap_or(i64::MAX)
    };
    order(a).cmp(&order(b))
  });

  let mut properties = serde_json::Map::new();
  let mut fields =
    Vec::with_capacity(ordered.len());
  for (index, (name, mut prop)) in
    ordered.into_iter().enumerate()
  {
    if let Some(obj) = prop.as_object_mut() {
      obj
        .entry("title")
        .or_insert_with(|| json!(name));
      obj.insert(
        "propertyOrder".to_string(),
        json!(index)
      );
      match obj
        .get("type")
        .and_then(Value::as_str)
      {
        | Some("boolean") => {
          obj.insert(
            "format".to_string(),
            json!("checkbox")
          );
        }
        | Some("array") => {
          obj
            .entry("format")
            .or_insert_with(|| json!("table"));
        }
        | _ => {}
      }
    }
    fields.push(FormField::from_property(
      &name,
      &prop,
      required.contains(&name)
    ));
    properties.insert(name, prop);
  }

  if let Some(obj) = adapted.as_object_mut() {
    obj.insert(
      "type".to_string(),
      json!("object")
    );
    obj.insert(
      "properties".to_string(),
      Value::Object(properties)
    );
    for key in ["allOf", "anyOf", "oneOf"] {
      obj.remove(key);
    }
  }

  let form = FormSchema {
    title:       schema
      .get("title")
      .and_then(Value::as_str)
      .map(str::to_string),
    description: schema
      .get("description")
      .and_then(Value::as_str)
      .map(str::to_string),
    fields
  };
  debug!(
    fields = form.fields.len(),
    "adapted schema for editor"
  );
  (adapted, form)
}

/// Live state of one editor instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
  template:     TemplateDefinition,
  schema:       Value,
  form:         FormSchema,
  values:       View,
  input_errors: BTreeMap<String, String>,
  drafts:       BTreeMap<String, String>,
  errors:       Vec<FieldError>,
  ready:        bool
}

impl EditorState {
  pub fn new(
    template: TemplateDefinition,
    view: Option<&View>
  ) -> Self {
    let (schema, form) =
      adapt_schema(template.view_schema());
    let combined = template.combined_view(
      view.unwrap_or(&View::new())
    );
    let mut values =
      filter_extra_properties(&combined, &schema);
    for field in &form.fields {
      if let Some(initial) = field.initial_value() {
        values
          .entry(field.name.clone())
          .or_insert(initial);
      }
    }
    let errors = form.validate(&values);

    Self {
      template,
      schema,
      form,
      values,
      input_errors: BTreeMap::new(),
      drafts: BTreeMap::new(),
      errors,
      ready: false
    }
  }

  pub fn template(
    &self
  ) -> &TemplateDefinition {
    &self.template
  }

  pub fn template_id(&self) -> &str {
    &self.template.id
  }

  pub fn schema(&self) -> &Value {
    &self.schema
  }

  pub fn form(&self) -> &FormSchema {
    &self.form
  }

  pub fn values(&self) -> &View {
    &self.values
  }

  /// The form has been rendered; action buttons may
  /// be used from now on.
  pub fn mark_ready(&mut self) {
    self.ready = true;
  }

  pub fn actions_enabled(&self) -> bool {
    self.ready
  }

  pub fn submit_enabled(&self) -> bool {
    self.ready && self.error_count() == 0
  }

  pub fn error_count(&self) -> usize {
    self.errors.len() + self.input_errors.len()
  }

  /// Current error for `field`, input errors first.
  pub fn field_error(
    &self,
    field: &str
  ) -> Option<&str> {
    self
      .input_errors
      .get(field)
      .map(String::as_str)
      .or_else(|| {
        self
          .errors
          .iter()
          .find(|err| err.field == field)
          .map(|err| err.message.as_str())
      })
  }

  /// Change event from an input element.
  pub fn set_input(
    &mut self,
    field: &str,
    raw: &str
  ) {
    let Some(form_field) =
      self.form.field(field)
    else {
      return;
    };
    self
      .drafts
      .insert(field.to_string(), raw.to_string());
    match form_field.parse_input(raw) {
      | Ok(Some(value)) => {
        self.input_errors.remove(field);
        self
          .values
          .insert(field.to_string(), value);
      }
      | Ok(None) => {
        self.input_errors.remove(field);
        self.values.remove(field);
      }
      | Err(message) => {
        self
          .input_errors
          .insert(field.to_string(), message);
      }
    }
    self.revalidate();
  }

  pub fn set_value(
    &mut self,
    field: &str,
    value: Value
  ) {
    if self.form.field(field).is_none() {
      return;
    }
    self.input_errors.remove(field);
    self.drafts.remove(field);
    self
      .values
      .insert(field.to_string(), value);
    self.revalidate();
  }

  /// Text for the field's input element: what the
  /// user last typed, else the current value.
  pub fn input_text(
    &self,
    field: &FormField
  ) -> String {
    self
      .drafts
      .get(&field.name)
      .cloned()
      .unwrap_or_else(|| {
        field.display_value(
          self.values.get(&field.name)
        )
      })
  }

  fn revalidate(&mut self) {
    self.errors =
      self.form.validate(&self.values);
  }

  pub fn template_text(&self) -> &str {
    &self.template.template_text
  }

  pub fn schema_text(&self) -> String {
    pretty(&self.schema)
  }

  pub fn combined_view_text(&self) -> String {
    pretty(&Value::Object(
      self.template.combined_view(&self.values)
    ))
  }

  pub fn preview_text(&self) -> String {
    self.template.render_preview(&self.values)
  }

  pub fn submission(
    &self
  ) -> ApplicationCreate {
    ApplicationCreate {
      name:       self.template.id.clone(),
      parameters: self.values.clone()
    }
  }
}

/// Fetches a template and builds an editor for it,
/// pre-filled with `view` when modifying an existing
/// application.
#[tracing::instrument(skip(ctx, client, view))]
pub async fn load_editor<T, S>(
  ctx: &PageContext<S>,
  client: &FastClient<T>,
  template_id: &str,
  view: Option<&View>
) -> Result<EditorState>
where
  T: HttpTransport,
  S: OutputSink
{
  ctx.display(&format!(
    "Loading template: {template_id}"
  ));
  let template =
    client.get_template(template_id).await?;
  ctx.display(&format!(
    "Creating editor with schema:\n{}",
    pretty(template.view_schema())
  ));

  let editor = EditorState::new(template, view);
  ctx.display(&format!(
    "Schema modified for the editor:\n{}",
    editor.schema_text()
  ));
  ctx.display("Editor loaded");
  Ok(editor)
}

/// Posts the editor's values as a new application.
/// Returns the route to show next.
pub async fn submit_application<T, S>(
  ctx: &PageContext<S>,
  client: &FastClient<T>,
  editor: &EditorState
) -> Result<&'static str>
where
  T: HttpTransport,
  S: OutputSink
{
  let body = editor.submission();
  ctx.display(&pretty(&json!({
    "method": "POST",
    "body": {
      "name": body.name,
      "parameters": body.parameters
    }
  })));
  let result =
    client.create_application(&body).await?;
  ctx.display(&pretty(&result));
  Ok(TASKS_HREF)
}
