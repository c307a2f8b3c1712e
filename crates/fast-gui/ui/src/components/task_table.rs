use fast_core::tasks::TaskRow;
use yew::{
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskTableProps {
  pub rows: Vec<TaskRow>
}

#[function_component(TaskTable)]
pub fn task_table(
  props: &TaskTableProps
) -> Html {
  html! {
      <div id="task-list" class="task-list">
          <div class="appListRow">
              <div class="appListTitle">{ "Task ID" }</div>
              <div class="appListTitle">{ "Tenant" }</div>
              <div class="appListTitle">{ "Result" }</div>
          </div>
          <hr />
          {
              for props.rows.iter().map(|row| html! {
                  <>
                      <div class={classes!("appListRow", row.zebra.then_some("zebraRow"))}>
                          <div class="appListTitle">{ &row.id }</div>
                          <div class="appListTitle">{ &row.target }</div>
                          <div class="appListTitle">{ &row.message }</div>
                      </div>
                      <hr />
                  </>
              })
          }
      </div>
  }
}
