//! Data side of the page controllers: fetch through
//! [`FastClient`], shape into view models, report
//! progress through the page context.

use std::collections::BTreeMap;

use fast_gui_shared::{
  ApplicationDto,
  TemplateSetDto,
  View
};
use futures::future;
use tracing::info;

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
use crate::router::{
  TASKS_HREF,
  href_for
};
use crate::upload::ChunkSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppListRow {
  /// Set on the first row of each tenant group.
  pub tenant:         Option<String>,
  pub divider_before: bool,
  pub zebra:          bool,
  pub application:    ApplicationDto,
  pub modify_href:    String
}

/// Rows of the application list, grouped by tenant.
/// Applications are stable-sorted by tenant first, so
/// grouping does not depend on backend ordering.
pub fn app_list_rows(
  apps: &[ApplicationDto]
) -> Vec<AppListRow> {
  let mut sorted = apps.to_vec();
  sorted.sort_by(|a, b| a.tenant.cmp(&b.tenant));

  let mut last_tenant: Option<String> = None;
  sorted
    .into_iter()
    .enumerate()
    .map(|(index, app)| {
      let zebra = index % 2 == 0;
      let starts_group =
        last_tenant.as_deref()
          != Some(app.tenant.as_str());
      if starts_group {
        last_tenant = Some(app.tenant.clone());
      }
      AppListRow {
        tenant: starts_group
          .then(|| app.tenant.clone()),
        divider_before: starts_group,
        zebra,
        modify_href: href_for(&format!(
          "modify/{}",
          app.path()
        )),
        application: app
      }
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateChoice {
  pub id:    String,
  pub label: String
}

/// One button row per template set.
pub fn template_choices(
  sets: &[TemplateSetDto]
) -> Vec<Vec<TemplateChoice>> {
  sets
    .iter()
    .map(|set| {
      set
        .templates
        .iter()
        .map(|tmpl| TemplateChoice {
          id:    set.template_id(tmpl),
          label: set.short_name(tmpl).to_string()
        })
        .collect()
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRow {
  pub name:         String,
  pub id:           String,
  /// `{tenant} {name}` of each application deployed
  /// from this template.
  pub applications: Vec<String>,
  pub zebra:        bool
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSetRow {
  pub name:             String,
  pub supported:        bool,
  pub update_available: bool,
  pub zebra:            bool,
  pub templates:        Vec<TemplateRow>
}

pub fn applications_by_template(
  apps: &[ApplicationDto]
) -> BTreeMap<&str, Vec<&ApplicationDto>> {
  let mut grouped: BTreeMap<
    &str,
    Vec<&ApplicationDto>
  > = BTreeMap::new();
  for app in apps {
    if let Some(template) =
      app.template.as_deref()
    {
      grouped
        .entry(template)
        .or_default()
        .push(app);
    }
  }
  grouped
}

pub fn template_set_rows(
  apps: &[ApplicationDto],
  sets: &[TemplateSetDto]
) -> Vec<TemplateSetRow> {
  let by_template =
    applications_by_template(apps);
  let mut count = 0usize;
  let mut next_zebra = || {
    count += 1;
    count % 2 == 1
  };

  sets
    .iter()
    .map(|set| {
      let zebra = next_zebra();
      let templates = set
        .templates
        .iter()
        .map(|tmpl| {
          let id = set.template_id(tmpl);
          let applications = by_template
            .get(id.as_str())
            .map(|apps| {
              apps
                .iter()
                .map(|app| {
                  format!(
                    "{} {}",
                    app.tenant, app.name
                  )
                })
                .collect()
            })
            .unwrap_or_default();
          TemplateRow {
            name: set
              .short_name(tmpl)
              .to_string(),
            id,
            applications,
            zebra: next_zebra()
          }
        })
        .collect();
      TemplateSetRow {
        name: set.name.clone(),
        supported: set.supported,
        update_available: set
          .update_available,
        zebra,
        templates
      }
    })
    .collect()
}

/// Template set name for an uploaded package: the
/// file name without its extension.
pub fn template_set_name(
  file_name: &str
) -> String {
  match file_name.rsplit_once('.') {
    | Some((stem, _)) if !stem.is_empty() => {
      stem.to_string()
    }
    | _ => file_name.to_string()
  }
}

pub async fn load_app_list<T, S>(
  ctx: &PageContext<S>,
  client: &FastClient<T>
) -> Result<Vec<AppListRow>>
where
  T: HttpTransport,
  S: OutputSink
{
  ctx.display("Fetching applications list");
  let apps = client.list_applications().await?;
  ctx.display("");
  Ok(app_list_rows(&apps))
}

/// Deletes an application. Returns the route to show
/// next.
pub async fn delete_application<T, S>(
  ctx: &PageContext<S>,
  client: &FastClient<T>,
  app: &ApplicationDto
) -> Result<&'static str>
where
  T: HttpTransport,
  S: OutputSink
{
  ctx.display(&format!(
    "Deleting {}",
    app.path()
  ));
  client
    .delete_application(&app.tenant, &app.name)
    .await?;
  info!(app = %app.path(), "application delete requested");
  Ok(TASKS_HREF)
}

pub async fn load_template_choices<T, S>(
  ctx: &PageContext<S>,
  client: &FastClient<T>
) -> Result<Vec<Vec<TemplateChoice>>>
where
  T: HttpTransport,
  S: OutputSink
{
  ctx.display("Fetching templates");
  let sets = client.list_template_sets().await?;
  ctx.display("");
  Ok(template_choices(&sets))
}

/// Template id and stored view of an existing
/// application (`tenant/app`).
pub async fn load_modify_target<T, S>(
  ctx: &PageContext<S>,
  client: &FastClient<T>,
  app_path: &str
) -> Result<(String, View)>
where
  T: HttpTransport,
  S: OutputSink
{
  ctx.display(&format!(
    "Fetching app data for {app_path}"
  ));
  let detail =
    client.get_application(app_path).await?;
  let fast =
    detail.constants.fast.ok_or_else(|| {
      ConsoleError::Decode {
        url:     client.endpoint(&format!(
          "applications/{app_path}"
        )),
        message: "application was not \
                  deployed from a template"
          .to_string()
      }
    })?;
  Ok((fast.template, fast.view))
}

/// Fetches applications and template sets together.
pub async fn load_template_overview<T, S>(
  ctx: &PageContext<S>,
  client: &FastClient<T>
) -> Result<Vec<TemplateSetRow>>
where
  T: HttpTransport,
  S: OutputSink
{
  ctx.display("...Loading Template List...");
  let (apps, sets) = future::try_join(
    client.list_applications(),
    client.list_template_sets()
  )
  .await?;
  let rows = template_set_rows(&apps, &sets);
  ctx.display("");
  Ok(rows)
}

/// Uploads a template set package and registers it.
/// Returns the installed set name.
pub async fn install_template_set<T, S, C>(
  ctx: &PageContext<S>,
  client: &FastClient<T>,
  source: &C
) -> Result<String>
where
  T: HttpTransport,
  S: OutputSink,
  C: ChunkSource
{
  let set_name =
    template_set_name(source.name());
  ctx.display(&format!(
    "Uploading file: {}",
    source.name()
  ));
  client.upload_file(source).await?;

  ctx.display(&format!(
    "Installing template set {set_name}"
  ));
  client
    .install_template_set(&set_name)
    .await?;

  ctx.display(&format!(
    "{set_name} installed successfully"
  ));
  Ok(set_name)
}

pub async fn remove_template_set<T, S>(
  ctx: &PageContext<S>,
  client: &FastClient<T>,
  name: &str
) -> Result<()>
where
  T: HttpTransport,
  S: OutputSink
{
  ctx.display(&format!("Deleting {name}"));
  client.remove_template_set(name).await
}

pub async fn update_template_set<T, S>(
  ctx: &PageContext<S>,
  client: &FastClient<T>,
  name: &str
) -> Result<()>
where
  T: HttpTransport,
  S: OutputSink
{
  ctx.display(&format!("Updating {name}"));
  client.update_template_set(name).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::client::Method;
  use crate::test_support::{
    Recorder,
    client_with,
    context,
    json_ok
  };

  fn app(
    tenant: &str,
    name: &str,
    template: Option<&str>
  ) -> ApplicationDto {
    ApplicationDto {
      tenant:   tenant.to_string(),
      name:     name.to_string(),
      template: template.map(str::to_string)
    }
  }

  #[test]
  fn rows_group_by_tenant_even_when_unsorted() {
    let rows = app_list_rows(&[
      app("t2", "a", None),
      app("t1", "b", None),
      app("t2", "c", None),
      app("t1", "d", None)
    ]);

    let tenants: Vec<_> = rows
      .iter()
      .map(|row| row.tenant.as_deref())
      .collect();
    assert_eq!(
      tenants,
      vec![Some("t1"), None, Some("t2"), None]
    );
    let names: Vec<_> = rows
      .iter()
      .map(|row| row.application.name.as_str())
      .collect();
    assert_eq!(names, vec!["b", "d", "a", "c"]);
    assert!(rows[0].zebra);
    assert!(!rows[1].zebra);
    assert_eq!(
      rows[2].modify_href,
      "#modify/t2/a"
    );
    assert_eq!(
      rows
        .iter()
        .filter(|row| row.divider_before)
        .count(),
      2
    );
  }

  #[test]
  fn template_rows_list_dependent_apps() {
    let sets: Vec<TemplateSetDto> =
      serde_json::from_str(
        r#"[{"name":"examples","templates":[{"name":"simple_http"},{"name":"simple_udp"}],"supported":true,"updateAvailable":false}]"#
      )
      .expect("sets");
    let apps = vec![
      app("t1", "web", Some("examples/simple_http")),
      app("t2", "web2", Some("examples/simple_http")),
      app("t3", "legacy", None),
    ];

    let rows = template_set_rows(&apps, &sets);

    assert_eq!(rows.len(), 1);
    assert!(rows[0].supported);
    assert!(!rows[0].update_available);
    assert_eq!(
      rows[0].templates[0].applications,
      vec!["t1 web", "t2 web2"]
    );
    assert_eq!(
      rows[0].templates[0].name,
      "simple_http"
    );
    assert!(
      rows[0].templates[1]
        .applications
        .is_empty()
    );
  }

  #[test]
  fn set_name_strips_extension() {
    assert_eq!(
      template_set_name("examples.zip"),
      "examples"
    );
    assert_eq!(
      template_set_name("my.set.zip"),
      "my.set"
    );
    assert_eq!(
      template_set_name("plain"),
      "plain"
    );
  }

  #[tokio::test]
  async fn delete_issues_one_delete_then_tasks() {
    let client = client_with(vec![json_ok("")]);
    let recorder = Recorder::default();
    let (_tracker, ctx) = context(&recorder);

    let next = delete_application(
      &ctx,
      &client,
      &app("tenant1", "app1", None)
    )
    .await
    .expect("delete");

    assert_eq!(next, TASKS_HREF);
    let sent =
      client.transport().requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(
      sent[0].method,
      Method::Delete
    );
    assert_eq!(
      sent[0].url,
      "/mgmt/shared/fast/applications/\
       tenant1/app1"
    );
    assert_eq!(
      recorder.lines(),
      vec!["Deleting tenant1/app1"]
    );
  }

  #[tokio::test]
  async fn delete_finishing_after_navigation_goes_nowhere() {
    let client = client_with(vec![json_ok("")]);
    let recorder = Recorder::default();
    let (tracker, ctx) = context(&recorder);

    let target = app("tenant1", "app1", None);
    let pending = delete_application(
      &ctx,
      &client,
      &target
    );
    tracker.begin();
    let next = ctx.settle(
      pending.await,
      "Error deleting application"
    );

    assert_eq!(next, None);
    assert_eq!(
      client.transport().requests().len(),
      1
    );
    assert!(recorder.lines().is_empty());
  }

  #[test]
  fn choices_label_buttons_with_template_name() {
    let sets: Vec<TemplateSetDto> =
      serde_json::from_str(
        r#"[{"name":"examples","templates":[{"name":"simple_http"},{"name":"examples/simple_udp"}]}]"#
      )
      .expect("sets");

    let rows = template_choices(&sets);

    assert_eq!(rows.len(), 1);
    assert_eq!(
      rows[0],
      vec![
        TemplateChoice {
          id:    "examples/simple_http".to_string(),
          label: "simple_http".to_string()
        },
        TemplateChoice {
          id:    "examples/simple_udp".to_string(),
          label: "simple_udp".to_string()
        },
      ]
    );
  }

  #[tokio::test]
  async fn modify_target_reads_fast_constants() {
    let client = client_with(vec![json_ok(
      r#"{"constants":{"fast":{"template":"examples/simple_http","view":{"app":"a1"}}}}"#,
    )]);
    let recorder = Recorder::default();
    let (_tracker, ctx) = context(&recorder);

    let (template, view) = load_modify_target(
      &ctx,
      &client,
      "t1/a1"
    )
    .await
    .expect("modify target");

    assert_eq!(
      template,
      "examples/simple_http"
    );
    assert_eq!(view.len(), 1);
  }

  #[tokio::test]
  async fn overview_fails_when_either_fetch_fails()
  {
    let client = client_with(vec![
      json_ok("[]"),
      crate::test_support::status(
        503,
        "Service Unavailable"
      ),
    ]);
    let recorder = Recorder::default();
    let (_tracker, ctx) = context(&recorder);

    let result =
      load_template_overview(&ctx, &client)
        .await;

    assert!(matches!(
      result,
      Err(ConsoleError::Request {
        status: 503,
        ..
      })
    ));
  }
}
