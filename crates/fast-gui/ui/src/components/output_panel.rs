use yew::{
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct OutputPanelProps {
  pub text: String
}

#[function_component(OutputPanel)]
pub fn output_panel(
  props: &OutputPanelProps
) -> Html {
  if props.text.is_empty() {
    return html! {};
  }

  html! {
      <pre id="output" class="output">{ &props.text }</pre>
  }
}
