use fast_core::pages::TemplateSetRow;
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TemplateSetTableProps {
  pub rows:      Vec<TemplateSetRow>,
  pub on_remove: Callback<String>,
  pub on_update: Callback<String>
}

#[function_component(TemplateSetTable)]
pub fn template_set_table(
  props: &TemplateSetTableProps
) -> Html {
  html! {
      <div id="template-list" class="template-list">
          {
              for props.rows.iter().map(|set| {
                  let remove = {
                      let on_remove = props.on_remove.clone();
                      let name = set.name.clone();
                      Callback::from(move |_: MouseEvent| on_remove.emit(name.clone()))
                  };
                  let update = {
                      let on_update = props.on_update.clone();
                      let name = set.name.clone();
                      Callback::from(move |_: MouseEvent| on_update.emit(name.clone()))
                  };

                  html! {
                      <>
                          <hr />
                          <div class={classes!("appListRow", set.zebra.then_some("zebraRow"))}>
                              <div class="appListTitle">{ &set.name }</div>
                              <div class="appListTitle">
                                  {
                                      if set.supported {
                                          html! { <div>{ "supported" }</div> }
                                      } else {
                                          html! {}
                                      }
                                  }
                              </div>
                              <div class="appListTitle">
                                  <a class="btn" onclick={remove}>{ "Remove" }</a>
                                  {
                                      if set.update_available {
                                          html! { <a class="btn" onclick={update}>{ "Update" }</a> }
                                      } else {
                                          html! {}
                                      }
                                  }
                              </div>
                          </div>
                          {
                              for set.templates.iter().map(|tmpl| html! {
                                  <>
                                      <hr />
                                      <div class={classes!("appListRow", tmpl.zebra.then_some("zebraRow"))}>
                                          <div class="appListTitle template-name">{ format!("/{}", tmpl.name) }</div>
                                          <div class="appListTitle">
                                              { for tmpl.applications.iter().map(|app| html! { <div>{ app }</div> }) }
                                          </div>
                                          <div class="appListTitle"></div>
                                      </div>
                                  </>
                              })
                          }
                      </>
                  }
              })
          }
      </div>
  }
}
