mod app_list;
mod editor_form;
mod nav_bar;
mod output_panel;
mod task_table;
mod template_set_table;

pub use app_list::AppList;
pub use editor_form::{
  EditorAction,
  EditorForm
};
pub use nav_bar::NavBar;
pub use output_panel::OutputPanel;
pub use task_table::TaskTable;
pub use template_set_table::TemplateSetTable;
