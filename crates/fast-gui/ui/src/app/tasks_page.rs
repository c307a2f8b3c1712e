use fast_core::tasks::{
  self,
  PollOutcome,
  TaskRow,
  TaskSnapshot
};
use gloo::timers::future::TimeoutFuture;
use yew::{
  Html,
  function_component,
  html,
  use_effect_with,
  use_state
};

use super::PageProps;
use crate::components::TaskTable;

#[function_component(TasksPage)]
pub fn tasks_page(props: &PageProps) -> Html {
  let rows = use_state(Vec::<TaskRow>::new);

  {
    let rows = rows.clone();
    let props = props.clone();
    use_effect_with((), move |_| {
      wasm_bindgen_futures::spawn_local(
        async move {
          let ctx = props.context();
          let client = props.client();
          let policy = props.config.tasks.clone();

          let first = ctx.settle(
            tasks::refresh_tasks(
              &client, &ctx.token, &policy
            )
            .await,
            "Error fetching tasks"
          );
          let Some(Some(initial)) = first else {
            props.settled();
            return;
          };
          rows.set(initial.rows.clone());
          props.settled();

          let render_rows = rows.clone();
          let outcome = tasks::poll_until_settled(
            &client,
            &ctx.token,
            &policy,
            &initial,
            TimeoutFuture::new,
            move |next: TaskSnapshot| {
              render_rows.set(next.rows)
            }
          )
          .await;
          if let Some(PollOutcome::Settled {
            refreshes
          }) = ctx.settle(
            outcome,
            "Error refreshing tasks"
          ) {
            tracing::debug!(
              refreshes,
              "task list settled"
            );
          }
        }
      );
      || ()
    });
  }

  html! {
      <TaskTable rows={(*rows).clone()} />
  }
}
