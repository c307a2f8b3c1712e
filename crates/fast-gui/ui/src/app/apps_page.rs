use fast_core::pages::{
  self,
  AppListRow
};
use fast_gui_shared::ApplicationDto;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_effect_with,
  use_state
};

use super::PageProps;
use crate::api;
use crate::components::AppList;

#[function_component(AppsPage)]
pub fn apps_page(props: &PageProps) -> Html {
  let rows = use_state(Vec::<AppListRow>::new);

  {
    let rows = rows.clone();
    let props = props.clone();
    use_effect_with((), move |_| {
      wasm_bindgen_futures::spawn_local(
        async move {
          let ctx = props.context();
          let client = props.client();
          let loaded = ctx.settle(
            pages::load_app_list(&ctx, &client)
              .await,
            "Error fetching applications"
          );
          if let Some(list) = loaded {
            tracing::debug!(
              total = list.len(),
              "loaded application list"
            );
            rows.set(list);
          }
          props.settled();
        }
      );
      || ()
    });
  }

  let on_delete = {
    let props = props.clone();
    Callback::from(move |app: ApplicationDto| {
      let props = props.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let ctx = props.context();
          let client = props.client();
          if let Some(next) = ctx.settle(
            pages::delete_application(
              &ctx, &client, &app
            )
            .await,
            "Error deleting application"
          ) {
            api::navigate(next);
          }
        }
      );
    })
  };

  html! {
      <AppList rows={(*rows).clone()} {on_delete} />
  }
}
