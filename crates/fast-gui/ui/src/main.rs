mod api;
mod app;
mod components;

use app::App;

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  let root = gloo::utils::document()
    .get_element_by_id("app")
    .expect("index.html provides #app");
  tracing::info!(
    root = %root.id(),
    "mounting FAST console"
  );

  yew::Renderer::<App>::with_root(root).render();
}
