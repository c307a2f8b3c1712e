//! Hash-fragment routing.
//!
//! The route table is static configuration; the
//! [`Router`] tracks which route is active and whether
//! its page has settled.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{
  error,
  info
};

use crate::error::ConsoleError;
use crate::navigation::{
  NavigationToken,
  NavigationTracker
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Page {
  Apps,
  Create,
  Modify,
  Templates,
  Tasks,
  Api
}

#[derive(Debug, PartialEq, Eq)]
pub struct RouteDef {
  pub prefix:    &'static str,
  pub page:      Page,
  /// Routes with a label appear in the nav bar, in
  /// table order.
  pub nav_label: Option<&'static str>
}

pub const ROUTES: &[RouteDef] = &[
  RouteDef {
    prefix:    "",
    page:      Page::Apps,
    nav_label: Some("Application List")
  },
  RouteDef {
    prefix:    "create",
    page:      Page::Create,
    nav_label: Some("Deploy")
  },
  RouteDef {
    prefix:    "modify",
    page:      Page::Modify,
    nav_label: None
  },
  RouteDef {
    prefix:    "templates",
    page:      Page::Templates,
    nav_label: Some("Templates")
  },
  RouteDef {
    prefix:    "tasks",
    page:      Page::Tasks,
    nav_label: Some("Deploy Log")
  },
  RouteDef {
    prefix:    "api",
    page:      Page::Api,
    nav_label: Some("API")
  }
];

pub const TASKS_HREF: &str = "#tasks";

static EDIT_SUFFIX: LazyLock<Regex> =
  LazyLock::new(|| {
    Regex::new(r"/application.*?/edit")
      .expect("edit suffix pattern")
  });

#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
  pub route:     &'static RouteDef,
  /// Fragment after normalization, without `#`.
  pub url:       String,
  pub segment:   String,
  pub remainder: String
}

impl RouteMatch {
  pub fn page(&self) -> Page {
    self.route.page
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
  pub label:    &'static str,
  pub href:     String,
  pub selected: bool
}

pub fn href_for(prefix: &str) -> String {
  format!("#{prefix}")
}

/// Resolves a location hash (with or without the
/// leading `#`) to a route.
pub fn resolve(
  fragment: &str
) -> Result<RouteMatch, ConsoleError> {
  let raw = fragment
    .strip_prefix('#')
    .unwrap_or(fragment);
  let url =
    EDIT_SUFFIX.replace(raw, "").into_owned();
  let (segment, remainder) = url
    .split_once('/')
    .unwrap_or((url.as_str(), ""));

  let Some(route) = ROUTES
    .iter()
    .find(|route| route.prefix == segment)
  else {
    return Err(
      ConsoleError::RouteNotFound {
        url:    url.clone(),
        raw:    raw.to_string(),
        routes: ROUTES
          .iter()
          .map(|route| route.prefix)
          .collect::<Vec<_>>()
          .join(",")
      }
    );
  };

  Ok(RouteMatch {
    route,
    segment: segment.to_string(),
    remainder: remainder.to_string(),
    url: url.clone()
  })
}

/// Nav bar entries; the entry for `active_segment`
/// is marked selected instead of being a link.
pub fn nav_items(
  active_segment: &str
) -> Vec<NavItem> {
  ROUTES
    .iter()
    .filter_map(|route| {
      route.nav_label.map(|label| {
        NavItem {
          label,
          href: href_for(route.prefix),
          selected: route.prefix
            == active_segment
        }
      })
    })
    .collect()
}

fn active_segment(fragment: &str) -> String {
  let raw = fragment
    .strip_prefix('#')
    .unwrap_or(fragment);
  let url = EDIT_SUFFIX.replace(raw, "");
  url
    .split('/')
    .next()
    .unwrap_or_default()
    .to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outlet {
  Empty,
  NotFound(String),
  Page {
    route: RouteMatch,
    token: NavigationToken
  }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RouterState {
  #[default]
  Idle,
  Loading {
    route: RouteMatch,
    token: NavigationToken
  },
  Loaded {
    route: RouteMatch,
    token: NavigationToken
  },
  NotFound {
    message: String
  }
}

/// What the caller must do for a navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
  /// Invoke the page controller for `route` with
  /// `route.remainder`, then call
  /// [`Router::settle`] with `token`.
  Dispatch {
    route: RouteMatch,
    token: NavigationToken
  },
  NotFound {
    message: String
  }
}

/// Renderable state of the router.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterSnapshot {
  pub nav:     Vec<NavItem>,
  pub outlet:  Outlet,
  pub visible: bool
}

#[derive(Debug, Default)]
pub struct Router {
  tracker: NavigationTracker,
  state:   RouterState,
  nav:     Vec<NavItem>
}

impl Router {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> &RouterState {
    &self.state
  }

  /// Handles a hash change or the initial load. The
  /// previous navigation's token is cancelled before
  /// anything else happens.
  #[tracing::instrument(skip(self))]
  pub fn navigate(
    &mut self,
    fragment: &str
  ) -> Navigation {
    let token = self.tracker.begin();
    self.nav =
      nav_items(&active_segment(fragment));

    match resolve(fragment) {
      | Ok(route) => {
        info!(
          url = %route.url,
          remainder = %route.remainder,
          generation = token.generation(),
          "dispatching route"
        );
        self.state = RouterState::Loading {
          route: route.clone(),
          token: token.clone()
        };
        Navigation::Dispatch { route, token }
      }
      | Err(err) => {
        let message = err.to_string();
        error!(%message, "unknown route");
        self.state = RouterState::NotFound {
          message: message.clone()
        };
        Navigation::NotFound { message }
      }
    }
  }

  /// Marks the page of `token` as settled. Returns
  /// false, and changes nothing, when a newer
  /// navigation has started since.
  pub fn settle(
    &mut self,
    token: &NavigationToken
  ) -> bool {
    if token.is_cancelled() {
      return false;
    }
    match &self.state {
      | RouterState::Loading {
        route,
        token: active
      } if active == token => {
        self.state = RouterState::Loaded {
          route: route.clone(),
          token: active.clone()
        };
        true
      }
      | _ => false
    }
  }

  pub fn content_visible(&self) -> bool {
    !matches!(
      self.state,
      RouterState::Loading { .. }
    )
  }

  pub fn snapshot(&self) -> RouterSnapshot {
    let outlet = match &self.state {
      | RouterState::Idle => Outlet::Empty,
      | RouterState::NotFound { message } => {
        Outlet::NotFound(message.clone())
      }
      | RouterState::Loading {
        route,
        token
      }
      | RouterState::Loaded { route, token } => {
        Outlet::Page {
          route: route.clone(),
          token: token.clone()
        }
      }
    };
    RouterSnapshot {
      nav: self.nav.clone(),
      outlet,
      visible: self.content_visible()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_fragment_is_application_list() {
    let route = resolve("#").expect("route");
    assert_eq!(route.page(), Page::Apps);
    assert_eq!(route.remainder, "");

    let route = resolve("").expect("route");
    assert_eq!(route.page(), Page::Apps);
  }

  #[test]
  fn modify_keeps_remainder_path() {
    let route = resolve("#modify/tenant1/app1")
      .expect("route");
    assert_eq!(route.page(), Page::Modify);
    assert_eq!(route.segment, "modify");
    assert_eq!(
      route.remainder,
      "tenant1/app1"
    );
  }

  #[test]
  fn embedded_edit_suffix_is_stripped() {
    let route = resolve(
      "#modify/tenant1/application/app1/edit",
    )
    .expect("route");
    assert_eq!(route.page(), Page::Modify);
    assert_eq!(route.remainder, "tenant1");
  }

  #[test]
  fn unknown_route_reports_known_prefixes() {
    let err =
      resolve("#nowhere/else").expect_err("404");
    let text = err.to_string();
    assert!(text.contains(
      "Could not find route info for url: \
       nowhere/else"
    ));
    assert!(
      text.contains(
        ",create,modify,templates,tasks,api"
      )
    );
  }

  #[test]
  fn nav_highlights_active_segment_in_order() {
    let nav = nav_items("tasks");
    let labels: Vec<_> =
      nav.iter().map(|item| item.label).collect();
    assert_eq!(
      labels,
      vec![
        "Application List",
        "Deploy",
        "Templates",
        "Deploy Log",
        "API"
      ]
    );
    let selected: Vec<_> = nav
      .iter()
      .filter(|item| item.selected)
      .map(|item| item.href.as_str())
      .collect();
    assert_eq!(selected, vec!["#tasks"]);
  }

  #[test]
  fn dispatch_hides_until_settled() {
    let mut router = Router::new();
    assert!(router.content_visible());

    let Navigation::Dispatch { token, .. } =
      router.navigate("#tasks")
    else {
      panic!("tasks must dispatch");
    };
    assert!(!router.content_visible());
    assert!(!router.snapshot().visible);

    assert!(router.settle(&token));
    assert!(router.content_visible());
    assert!(matches!(
      router.state(),
      RouterState::Loaded { .. }
    ));
  }

  #[test]
  fn stale_settle_is_ignored() {
    let mut router = Router::new();
    let Navigation::Dispatch {
      token: first, ..
    } = router.navigate("#templates")
    else {
      panic!("templates must dispatch");
    };
    let Navigation::Dispatch {
      token: second,
      ..
    } = router.navigate("#create")
    else {
      panic!("create must dispatch");
    };

    assert!(first.is_cancelled());
    assert!(!router.settle(&first));
    assert!(!router.content_visible());
    assert!(router.settle(&second));
  }

  #[test]
  fn not_found_invokes_nothing_and_stays_visible()
  {
    let mut router = Router::new();
    let Navigation::Dispatch {
      token: previous,
      ..
    } = router.navigate("#api")
    else {
      panic!("api must dispatch");
    };

    let nav = router.navigate("#bogus");
    assert!(matches!(
      nav,
      Navigation::NotFound { .. }
    ));
    assert!(previous.is_cancelled());
    assert!(router.content_visible());
    assert!(matches!(
      router.snapshot().outlet,
      Outlet::NotFound(_)
    ));
  }
}
