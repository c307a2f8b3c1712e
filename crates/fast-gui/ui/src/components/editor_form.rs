use fast_core::editor::{
  EditorState,
  FieldKind,
  FormField
};
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement
};
use yew::{
  Callback,
  Event,
  Html,
  InputEvent,
  MouseEvent,
  Properties,
  TargetCast,
  classes,
  function_component,
  html,
  use_effect_with
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorAction {
  ViewTemplate,
  ViewSchema,
  ViewView,
  Render
}

#[derive(Properties, PartialEq)]
pub struct EditorFormProps {
  pub editor:    EditorState,
  /// `(field, raw text)` from a text-like input.
  pub on_input:  Callback<(String, String)>,
  pub on_toggle: Callback<(String, bool)>,
  pub on_ready:  Callback<()>,
  pub on_action: Callback<EditorAction>,
  pub on_submit: Callback<()>
}

#[function_component(EditorForm)]
pub fn editor_form(
  props: &EditorFormProps
) -> Html {
  {
    let on_ready = props.on_ready.clone();
    use_effect_with((), move |_| {
      on_ready.emit(());
      || ()
    });
  }

  let editor = &props.editor;
  let actions_disabled = !editor.actions_enabled();
  let action = |kind: EditorAction| {
    let on_action = props.on_action.clone();
    Callback::from(move |_: MouseEvent| on_action.emit(kind))
  };
  let submit = {
    let on_submit = props.on_submit.clone();
    Callback::from(move |_: MouseEvent| on_submit.emit(()))
  };

  html! {
      <div class="editor">
          <h3>{ editor.template_id() }</h3>
          {
              match &editor.form().description {
                  Some(text) => html! { <p class="editor-description">{ text }</p> },
                  None => html! {}
              }
          }
          <div id="form-div" class="form-div">
              { for editor.form().fields.iter().map(|field| field_row(editor, field, props)) }
          </div>
          <div class="editor-actions">
              <button id="view-tmpl" class="btn" disabled={actions_disabled}
                  onclick={action(EditorAction::ViewTemplate)}>{ "View Template" }</button>
              <button id="view-schema" class="btn" disabled={actions_disabled}
                  onclick={action(EditorAction::ViewSchema)}>{ "View Schema" }</button>
              <button id="view-view" class="btn" disabled={actions_disabled}
                  onclick={action(EditorAction::ViewView)}>{ "View View" }</button>
              <button id="view-render" class="btn" disabled={actions_disabled}
                  onclick={action(EditorAction::Render)}>{ "Render" }</button>
              <button id="form-btn" class="btn btn-primary" disabled={!editor.submit_enabled()}
                  onclick={submit}>{ "Submit" }</button>
          </div>
      </div>
  }
}

fn field_row(
  editor: &EditorState,
  field: &FormField,
  props: &EditorFormProps
) -> Html {
  let error = editor.field_error(&field.name);
  let input = field_input(editor, field, props);

  html! {
      <div class={classes!("form-row", error.map(|_| "has-error"))}>
          <label for={field.name.clone()}>
              { &field.title }
              { if field.required { " *" } else { "" } }
          </label>
          { input }
          {
              match &field.description {
                  Some(text) => html! { <small class="form-help">{ text }</small> },
                  None => html! {}
              }
          }
          {
              match error {
                  Some(message) => html! { <div class="form-error">{ message }</div> },
                  None => html! {}
              }
          }
      </div>
  }
}

fn field_input(
  editor: &EditorState,
  field: &FormField,
  props: &EditorFormProps
) -> Html {
  let name = field.name.clone();
  let text = editor.input_text(field);

  match &field.kind {
    | FieldKind::Boolean => {
      let checked = editor
        .values()
        .get(&field.name)
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
      let on_toggle = props.on_toggle.clone();
      let onchange =
        Callback::from(move |e: Event| {
          let input: HtmlInputElement =
            e.target_unchecked_into();
          on_toggle
            .emit((name.clone(), input.checked()));
        });
      html! {
          <input id={field.name.clone()} type="checkbox" {checked} {onchange} />
      }
    }
    | FieldKind::Choice(_) => {
      let on_input = props.on_input.clone();
      let onchange =
        Callback::from(move |e: Event| {
          let select: HtmlSelectElement =
            e.target_unchecked_into();
          on_input
            .emit((name.clone(), select.value()));
        });
      html! {
          <select id={field.name.clone()} {onchange}>
              {
                  if field.required {
                      html! {}
                  } else {
                      html! { <option value="" selected={text.is_empty()}></option> }
                  }
              }
              {
                  for field.options().into_iter().map(|option| {
                      let selected = option == text;
                      html! { <option value={option.clone()} {selected}>{ option }</option> }
                  })
              }
          </select>
      }
    }
    | FieldKind::Json => {
      let on_input = props.on_input.clone();
      let oninput =
        Callback::from(move |e: InputEvent| {
          let area: HtmlTextAreaElement =
            e.target_unchecked_into();
          on_input
            .emit((name.clone(), area.value()));
        });
      html! {
          <textarea id={field.name.clone()} rows="6" value={text} {oninput} />
      }
    }
    | kind => {
      let input_type = match kind {
        | FieldKind::Password => "password",
        | FieldKind::Integer
        | FieldKind::Number => "number",
        | _ => "text"
      };
      let min = field.minimum.map(|n| n.to_string());
      let max = field.maximum.map(|n| n.to_string());
      let on_input = props.on_input.clone();
      let oninput =
        Callback::from(move |e: InputEvent| {
          let input: HtmlInputElement =
            e.target_unchecked_into();
          on_input
            .emit((name.clone(), input.value()));
        });
      html! {
          <input
              id={field.name.clone()}
              type={input_type}
              value={text}
              {min}
              {max}
              {oninput}
          />
      }
    }
  }
}
