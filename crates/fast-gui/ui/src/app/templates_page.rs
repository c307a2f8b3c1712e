use fast_core::pages::{
  self,
  TemplateSetRow
};
use web_sys::HtmlInputElement;
use yew::{
  Callback,
  Event,
  Html,
  MouseEvent,
  TargetCast,
  function_component,
  html,
  use_effect_with,
  use_node_ref,
  use_state
};

use super::PageProps;
use crate::api::{
  self,
  FileSource
};
use crate::components::TemplateSetTable;

#[function_component(TemplatesPage)]
pub fn templates_page(
  props: &PageProps
) -> Html {
  let rows = use_state(Vec::<TemplateSetRow>::new);
  let file_input = use_node_ref();

  {
    let rows = rows.clone();
    let props = props.clone();
    use_effect_with((), move |_| {
      wasm_bindgen_futures::spawn_local(
        async move {
          let ctx = props.context();
          let client = props.client();
          if let Some(list) = ctx.settle(
            pages::load_template_overview(
              &ctx, &client
            )
            .await,
            "Error fetching template sets"
          ) {
            rows.set(list);
          }
          props.settled();
        }
      );
      || ()
    });
  }

  let on_pick = {
    let file_input = file_input.clone();
    Callback::from(move |_: MouseEvent| {
      if let Some(input) =
        file_input.cast::<HtmlInputElement>()
      {
        input.click();
      }
    })
  };

  let on_file = {
    let props = props.clone();
    Callback::from(move |e: Event| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      let Some(file) = input
        .files()
        .and_then(|files| files.get(0))
      else {
        return;
      };
      let source = FileSource::new(file);
      let props = props.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let ctx = props.context();
          let client = props.client();
          if let Some(name) = ctx.settle(
            pages::install_template_set(
              &ctx, &client, &source
            )
            .await,
            "Failed to install template set"
          ) {
            tracing::info!(set = %name, "template set installed");
            api::reload();
          }
        }
      );
    })
  };

  let on_remove = {
    let props = props.clone();
    Callback::from(move |name: String| {
      let props = props.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let ctx = props.context();
          let client = props.client();
          if ctx
            .settle(
              pages::remove_template_set(
                &ctx, &client, &name
              )
              .await,
              "Error removing template set"
            )
            .is_some()
          {
            api::reload();
          }
        }
      );
    })
  };

  let on_update = {
    let props = props.clone();
    Callback::from(move |name: String| {
      let props = props.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let ctx = props.context();
          let client = props.client();
          if ctx
            .settle(
              pages::update_template_set(
                &ctx, &client, &name
              )
              .await,
              "Error updating template set"
            )
            .is_some()
          {
            api::reload();
          }
        }
      );
    })
  };

  html! {
      <div class="templates">
          <div class="template-actions">
              <button class="btn btn-primary" onclick={on_pick}>{ "Add Template Set" }</button>
              <input
                  ref={file_input}
                  type="file"
                  accept=".zip"
                  style="display:none;"
                  onchange={on_file}
              />
          </div>
          <TemplateSetTable rows={(*rows).clone()} {on_remove} {on_update} />
      </div>
  }
}
