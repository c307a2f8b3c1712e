//! Deploy log: task list snapshots and the
//! self-rescheduling refresh loop.

use std::future::Future;

use fast_gui_shared::TaskDto;
use tracing::{
  debug,
  info
};

use crate::client::{
  FastClient,
  HttpTransport
};
use crate::config::TaskPollConfig;
use crate::error::Result;
use crate::navigation::NavigationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
  pub id:      String,
  /// `tenant/application`
  pub target:  String,
  pub message: String,
  pub zebra:   bool
}

pub fn task_rows(
  tasks: &[TaskDto]
) -> Vec<TaskRow> {
  tasks
    .iter()
    .enumerate()
    .map(|(index, task)| TaskRow {
      id:      task.id.clone(),
      target:  format!(
        "{}/{}",
        task.tenant, task.application
      ),
      message: task.message.clone(),
      zebra:   index % 2 == 0
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
  pub rows:        Vec<TaskRow>,
  pub in_progress: bool
}

impl TaskPollConfig {
  pub fn is_in_progress(
    &self,
    task: &TaskDto
  ) -> bool {
    task.message == self.in_progress_message
  }

  pub fn snapshot(
    &self,
    tasks: &[TaskDto]
  ) -> TaskSnapshot {
    TaskSnapshot {
      rows:        task_rows(tasks),
      in_progress: tasks
        .iter()
        .any(|task| self.is_in_progress(task))
    }
  }

  /// Delay before the next refresh, if one is due.
  pub fn next_delay(
    &self,
    snapshot: &TaskSnapshot
  ) -> Option<u32> {
    snapshot
      .in_progress
      .then_some(self.poll_interval_ms)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
  /// No task is in progress any more.
  Settled { refreshes: u32 },
  /// The navigation moved on first.
  Cancelled
}

/// One fetch of the task list. `None` when the
/// navigation was cancelled while fetching.
pub async fn refresh_tasks<T>(
  client: &FastClient<T>,
  token: &NavigationToken,
  policy: &TaskPollConfig
) -> Result<Option<TaskSnapshot>>
where
  T: HttpTransport
{
  let tasks = client.list_tasks().await?;
  if token.is_cancelled() {
    debug!(
      generation = token.generation(),
      "discarding task list of stale \
       navigation"
    );
    return Ok(None);
  }
  Ok(Some(policy.snapshot(&tasks)))
}

/// Keeps refreshing while `initial` (and each later
/// snapshot) reports a task in progress. The token is
/// checked after every sleep and every fetch, so a
/// newer navigation stops the loop without another
/// render.
pub async fn poll_until_settled<T, Sleep, Fut, Render>(
  client: &FastClient<T>,
  token: &NavigationToken,
  policy: &TaskPollConfig,
  initial: &TaskSnapshot,
  mut sleep: Sleep,
  mut render: Render
) -> Result<PollOutcome>
where
  T: HttpTransport,
  Sleep: FnMut(u32) -> Fut,
  Fut: Future<Output = ()>,
  Render: FnMut(TaskSnapshot)
{
  let mut delay = policy.next_delay(initial);
  let mut refreshes = 0;

  while let Some(ms) = delay {
    debug!(delay_ms = ms, "scheduling task refresh");
    sleep(ms).await;
    if token.is_cancelled() {
      info!("task polling cancelled");
      return Ok(PollOutcome::Cancelled);
    }

    let Some(snapshot) =
      refresh_tasks(client, token, policy)
        .await?
    else {
      info!("task polling cancelled");
      return Ok(PollOutcome::Cancelled);
    };
    refreshes += 1;
    delay = policy.next_delay(&snapshot);
    render(snapshot);
  }

  Ok(PollOutcome::Settled { refreshes })
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;
  use crate::navigation::NavigationTracker;
  use crate::test_support::{
    client_with,
    json_ok
  };

  const RUNNING: &str = r#"[{"id":"1","tenant":"t1","application":"a1","message":"in progress"}]"#;
  const DONE: &str = r#"[{"id":"1","tenant":"t1","application":"a1","message":"success"}]"#;

  fn task(message: &str) -> TaskDto {
    TaskDto {
      id:          "1".to_string(),
      tenant:      "t1".to_string(),
      application: "a1".to_string(),
      message:     message.to_string()
    }
  }

  #[test]
  fn in_progress_schedules_refresh() {
    let policy = TaskPollConfig::default();

    let running = policy.snapshot(&[
      task("success"),
      task("in progress")
    ]);
    assert_eq!(
      policy.next_delay(&running),
      Some(5_000)
    );

    let done = policy.snapshot(&[
      task("success"),
      task("In Progress")
    ]);
    assert_eq!(policy.next_delay(&done), None);
  }

  #[test]
  fn rows_show_tenant_and_application() {
    let rows = task_rows(&[task("success")]);
    assert_eq!(rows[0].target, "t1/a1");
    assert!(rows[0].zebra);
  }

  #[tokio::test]
  async fn polls_until_nothing_in_progress() {
    let client = client_with(vec![
      json_ok(RUNNING),
      json_ok(DONE),
    ]);
    let tracker = NavigationTracker::new();
    let token = tracker.begin();
    let policy = TaskPollConfig::default();
    let initial = policy.snapshot(&[task(
      "in progress"
    )]);
    let sleeps = RefCell::new(Vec::new());
    let renders = RefCell::new(0);

    let outcome = poll_until_settled(
      &client,
      &token,
      &policy,
      &initial,
      |ms| {
        sleeps.borrow_mut().push(ms);
        async {}
      },
      |_| *renders.borrow_mut() += 1
    )
    .await
    .expect("poll");

    assert_eq!(
      outcome,
      PollOutcome::Settled { refreshes: 2 }
    );
    assert_eq!(
      *sleeps.borrow(),
      vec![5_000, 5_000]
    );
    assert_eq!(*renders.borrow(), 2);
  }

  #[tokio::test]
  async fn settled_list_never_refetches() {
    let client = client_with(vec![]);
    let tracker = NavigationTracker::new();
    let token = tracker.begin();
    let policy = TaskPollConfig::default();
    let initial =
      policy.snapshot(&[task("success")]);

    let outcome = poll_until_settled(
      &client,
      &token,
      &policy,
      &initial,
      |_| async {},
      |_| {}
    )
    .await
    .expect("poll");

    assert_eq!(
      outcome,
      PollOutcome::Settled { refreshes: 0 }
    );
    assert!(
      client
        .transport()
        .requests()
        .is_empty()
    );
  }

  #[tokio::test]
  async fn navigation_away_stops_polling() {
    let client = client_with(vec![
      json_ok(RUNNING),
      json_ok(RUNNING),
    ]);
    let tracker = NavigationTracker::new();
    let token = tracker.begin();
    let policy = TaskPollConfig::default();
    let initial = policy.snapshot(&[task(
      "in progress"
    )]);
    let sleeps = RefCell::new(0);

    let outcome = poll_until_settled(
      &client,
      &token,
      &policy,
      &initial,
      |_| {
        let mut count = sleeps.borrow_mut();
        *count += 1;
        if *count == 2 {
          tracker.begin();
        }
        async {}
      },
      |_| {}
    )
    .await
    .expect("poll");

    assert_eq!(outcome, PollOutcome::Cancelled);
    assert_eq!(
      client.transport().requests().len(),
      1
    );
  }
}
