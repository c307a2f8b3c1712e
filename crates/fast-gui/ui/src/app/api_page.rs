use yew::{
  Html,
  function_component,
  html,
  use_effect_with
};

use super::PageProps;

const ENDPOINTS: &[(&str, &str, &str)] = &[
  ("GET", "applications", "List deployed applications"),
  ("POST", "applications", "Deploy an application from a template"),
  ("GET", "applications/{tenant}/{app}", "Fetch one application and its stored view"),
  ("DELETE", "applications/{tenant}/{app}", "Delete an application"),
  ("GET", "tasks", "List deployment tasks"),
  ("GET", "templates/{set}/{template}", "Fetch one template"),
  ("GET", "templatesets", "List installed template sets"),
  ("POST", "templatesets", "Install an uploaded template set"),
  ("DELETE", "templatesets/{set}", "Remove a template set")
];

#[function_component(ApiPage)]
pub fn api_page(props: &PageProps) -> Html {
  {
    let props = props.clone();
    use_effect_with((), move |_| {
      props.settled();
      || ()
    });
  }

  let base = &props.config.api.base_path;

  html! {
      <div class="api-list">
          <div class="appListRow">
              <div class="appListTitle">{ "Method" }</div>
              <div class="appListTitle">{ "Path" }</div>
              <div class="appListTitle">{ "Description" }</div>
          </div>
          <hr />
          {
              for ENDPOINTS.iter().map(|(method, path, about)| html! {
                  <div class="appListRow">
                      <div class="appListTitle">{ *method }</div>
                      <div class="appListTitle"><code>{ format!("{base}/{path}") }</code></div>
                      <div class="appListTitle">{ *about }</div>
                  </div>
              })
          }
          <div class="appListRow">
              <div class="appListTitle">{ "POST" }</div>
              <div class="appListTitle"><code>{ format!("{}/{{file}}", props.config.api.upload_path) }</code></div>
              <div class="appListTitle">{ "Upload a template set package in chunks" }</div>
          </div>
      </div>
  }
}
