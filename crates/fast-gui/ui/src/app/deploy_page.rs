use fast_core::editor::{
  EditorState,
  load_editor,
  submit_application
};
use fast_core::pages::{
  self,
  TemplateChoice
};
use fast_core::router::Page;
use fast_gui_shared::View;
use serde_json::Value;
use yew::{
  Callback,
  Html,
  MouseEvent,
  UseStateHandle,
  function_component,
  html,
  use_effect_with,
  use_mut_ref,
  use_state
};

use super::PageProps;
use crate::api;
use crate::components::{
  EditorAction,
  EditorForm
};

/// Template picker plus editor. Serves both the
/// create and the modify routes.
#[function_component(DeployPage)]
pub fn deploy_page(props: &PageProps) -> Html {
  let choices =
    use_state(Vec::<Vec<TemplateChoice>>::new);
  let editor = use_state(|| None::<EditorState>);
  let editor_seq = use_mut_ref(|| 0_u64);

  let open_editor = {
    let props = props.clone();
    let editor = editor.clone();
    let editor_seq = editor_seq.clone();
    move |template_id: String,
          view: Option<View>| {
      let props = props.clone();
      let editor = editor.clone();
      let editor_seq = editor_seq.clone();
      async move {
        let ctx = props.context();
        let client = props.client();
        let loaded = ctx.settle(
          load_editor(
            &ctx,
            &client,
            &template_id,
            view.as_ref()
          )
          .await,
          "Error loading editor"
        );
        if let Some(next) = loaded {
          *editor_seq.borrow_mut() += 1;
          editor.set(Some(next));
        }
      }
    }
  };

  {
    let props = props.clone();
    let choices = choices.clone();
    let open_editor = open_editor.clone();
    use_effect_with((), move |_| {
      wasm_bindgen_futures::spawn_local(
        async move {
          let ctx = props.context();
          let client = props.client();

          if props.page == Page::Modify
            && !props.remainder.is_empty()
          {
            let target = ctx.settle(
              pages::load_modify_target(
                &ctx,
                &client,
                &props.remainder
              )
              .await,
              "Error fetching application"
            );
            if let Some((template_id, view)) =
              target
            {
              open_editor(template_id, Some(view))
                .await;
            }
          } else if let Some(sets) = ctx.settle(
            pages::load_template_choices(
              &ctx, &client
            )
            .await,
            "Error fetching templates"
          ) {
            choices.set(sets);
          }
          props.settled();
        }
      );
      || ()
    });
  }

  let on_choose = {
    let open_editor = open_editor.clone();
    move |template_id: String| {
      let open_editor = open_editor.clone();
      Callback::from(move |_: MouseEvent| {
        wasm_bindgen_futures::spawn_local(
          open_editor(template_id.clone(), None)
        );
      })
    }
  };

  let editor_view = match &*editor {
    | Some(state) => {
      editor_form(
        state,
        &editor,
        *editor_seq.borrow(),
        props
      )
    }
    | None => html! {},
  };

  html! {
      <div class="deploy">
          {
              for choices.iter().map(|set| html! {
                  <div class="template-set-row">
                      {
                          for set.iter().map(|choice| html! {
                              <button class="btn btn-template" onclick={on_choose(choice.id.clone())}>
                                  { &choice.label }
                              </button>
                          })
                      }
                  </div>
              })
          }
          { editor_view }
      </div>
  }
}

fn editor_form(
  state: &EditorState,
  handle: &UseStateHandle<Option<EditorState>>,
  seq: u64,
  props: &PageProps
) -> Html {
  let on_input = {
    let handle = handle.clone();
    Callback::from(
      move |(field, raw): (String, String)| {
        if let Some(mut next) = (*handle).clone()
        {
          next.set_input(&field, &raw);
          handle.set(Some(next));
        }
      }
    )
  };

  let on_toggle = {
    let handle = handle.clone();
    Callback::from(
      move |(field, checked): (String, bool)| {
        if let Some(mut next) = (*handle).clone()
        {
          next.set_value(
            &field,
            Value::Bool(checked)
          );
          handle.set(Some(next));
        }
      }
    )
  };

  let on_ready = {
    let handle = handle.clone();
    let props = props.clone();
    Callback::from(move |_: ()| {
      if let Some(mut next) = (*handle).clone() {
        next.mark_ready();
        handle.set(Some(next));
        props.context().display("Editor ready");
      }
    })
  };

  let on_action = {
    let handle = handle.clone();
    let props = props.clone();
    Callback::from(move |action: EditorAction| {
      let Some(state) = (*handle).as_ref() else {
        return;
      };
      let text = match action {
        | EditorAction::ViewTemplate => {
          state.template_text().to_string()
        }
        | EditorAction::ViewSchema => {
          state.schema_text()
        }
        | EditorAction::ViewView => {
          state.combined_view_text()
        }
        | EditorAction::Render => {
          state.preview_text()
        }
      };
      props.context().display(&text);
    })
  };

  let on_submit = {
    let handle = handle.clone();
    let props = props.clone();
    Callback::from(move |_: ()| {
      let Some(state) = (*handle).clone() else {
        return;
      };
      let props = props.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let ctx = props.context();
          let client = props.client();
          if let Some(next) = ctx.settle(
            submit_application(
              &ctx, &client, &state
            )
            .await,
            "Error submitting application"
          ) {
            api::navigate(next);
          }
        }
      );
    })
  };

  html! {
      <EditorForm
          key={seq.to_string()}
          editor={state.clone()}
          {on_input}
          {on_toggle}
          {on_ready}
          {on_action}
          {on_submit}
      />
  }
}
