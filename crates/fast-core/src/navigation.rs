//! Per-navigation cancellation and context.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::{
  debug,
  error,
  info
};

use crate::error::ConsoleError;

/// Hands out one [`NavigationToken`] per navigation.
/// Beginning a navigation cancels every token issued
/// before it.
#[derive(Debug, Clone, Default)]
pub struct NavigationTracker {
  current: Rc<Cell<u64>>
}

impl NavigationTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn begin(&self) -> NavigationToken {
    let generation = self.current.get() + 1;
    self.current.set(generation);
    debug!(generation, "navigation started");
    NavigationToken {
      generation,
      current: Rc::clone(&self.current)
    }
  }

  pub fn generation(&self) -> u64 {
    self.current.get()
  }
}

#[derive(Clone)]
pub struct NavigationToken {
  generation: u64,
  current:    Rc<Cell<u64>>
}

impl NavigationToken {
  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn is_cancelled(&self) -> bool {
    self.current.get() != self.generation
  }

  pub fn is_current(&self) -> bool {
    !self.is_cancelled()
  }
}

impl PartialEq for NavigationToken {
  fn eq(
    &self,
    other: &Self
  ) -> bool {
    self.generation == other.generation
      && Rc::ptr_eq(
        &self.current,
        &other.current
      )
  }
}

impl fmt::Debug for NavigationToken {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.debug_struct("NavigationToken")
      .field("generation", &self.generation)
      .field(
        "cancelled",
        &self.is_cancelled()
      )
      .finish()
  }
}

/// Where a page writes its status text.
pub trait OutputSink {
  fn show(&self, text: &str);
}

/// Everything a page controller may touch for the
/// lifetime of one navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext<S> {
  pub token:  NavigationToken,
  pub output: S
}

impl<S: OutputSink> PageContext<S> {
  pub fn new(
    token: NavigationToken,
    output: S
  ) -> Self {
    Self { token, output }
  }

  pub fn is_active(&self) -> bool {
    self.token.is_current()
  }

  /// Writes to the output region unless the
  /// navigation has moved on.
  pub fn display(&self, text: &str) {
    if text.is_empty() {
      debug!("clearing output");
    } else {
      info!(output = %text, "console output");
    }
    if self.is_active() {
      self.output.show(text);
    } else {
      debug!(
        generation = self.token.generation(),
        "dropping output of stale navigation"
      );
    }
  }

  /// Terminal catch of a controller chain: errors are
  /// logged and shown as `{prefix}: {error}`. A value
  /// produced after the navigation moved on is
  /// discarded.
  pub fn settle<T>(
    &self,
    result: Result<T, ConsoleError>,
    prefix: &str
  ) -> Option<T> {
    match result {
      | Ok(_) if !self.is_active() => {
        debug!(
          generation = self.token.generation(),
          "discarding result of stale navigation"
        );
        None
      }
      | Ok(value) => Some(value),
      | Err(err) => {
        error!(error = %err, "{prefix}");
        let text = if prefix.is_empty() {
          err.to_string()
        } else {
          format!("{prefix}: {err}")
        };
        self.display(&text);
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::{
    Recorder,
    context
  };

  #[test]
  fn new_navigation_cancels_previous_token() {
    let tracker = NavigationTracker::new();
    let first = tracker.begin();
    assert!(first.is_current());

    let second = tracker.begin();
    assert!(first.is_cancelled());
    assert!(second.is_current());
    assert_ne!(first, second);
  }

  #[test]
  fn stale_context_drops_output() {
    let recorder = Recorder::default();
    let (tracker, ctx) = context(&recorder);

    ctx.display("Fetching applications list");
    tracker.begin();
    ctx.display("late write");

    assert_eq!(
      recorder.lines(),
      vec!["Fetching applications list"]
    );
  }

  #[test]
  fn settle_reports_prefixed_error() {
    let recorder = Recorder::default();
    let (_tracker, ctx) = context(&recorder);

    let settled: Option<()> = ctx.settle(
      Err(ConsoleError::Transport {
        url:     "/x".to_string(),
        message: "offline".to_string()
      }),
      "Error fetching applications"
    );

    assert!(settled.is_none());
    assert_eq!(
      recorder.lines()[0],
      "Error fetching applications: \
       Request to /x failed: offline"
    );
  }

  #[test]
  fn settle_discards_value_of_stale_navigation() {
    let recorder = Recorder::default();
    let (tracker, ctx) = context(&recorder);

    tracker.begin();
    let settled = ctx.settle(Ok("#tasks"), "unused");

    assert_eq!(settled, None);
    assert!(recorder.lines().is_empty());
  }
}
