use fast_core::pages::AppListRow;
use fast_gui_shared::ApplicationDto;
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct AppListProps {
  pub rows:      Vec<AppListRow>,
  pub on_delete: Callback<ApplicationDto>
}

#[function_component(AppList)]
pub fn app_list(
  props: &AppListProps
) -> Html {
  html! {
      <div id="applist" class="app-list">
          <div class="appListRow">
              <div class="appListTitle">{ "Tenant" }</div>
              <div class="appListTitle">{ "Application" }</div>
              <div class="appListTitle">{ "Template" }</div>
              <div class="appListEntry"></div>
              <div class="appListEntry"></div>
          </div>
          {
              for props.rows.iter().map(|row| {
                  let zebra = row.zebra.then_some("zebraRow");
                  let app = row.application.clone();
                  let on_delete = props.on_delete.clone();
                  html! {
                      <>
                          {
                              if row.divider_before {
                                  html! { <hr class={classes!(zebra)} /> }
                              } else {
                                  html! {}
                              }
                          }
                          <div class={classes!("appListRow", zebra)}>
                              <div class="appListTitle">{ row.tenant.clone().unwrap_or_default() }</div>
                              <div class="appListTitle">{ &row.application.name }</div>
                              <div class="appListTitle">{ row.application.template.clone().unwrap_or_default() }</div>
                              <a class="btn btn-primary appListEntry" href={row.modify_href.clone()}>{ "Modify" }</a>
                              <button
                                  class="btn btn-error appListEntry"
                                  onclick={move |_| on_delete.emit(app.clone())}
                              >
                                  { "Delete" }
                              </button>
                          </div>
                      </>
                  }
              })
          }
      </div>
  }
}
