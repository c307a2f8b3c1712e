mod api_page;
mod apps_page;
mod deploy_page;
mod tasks_page;
mod templates_page;

use std::rc::Rc;

use fast_core::router::{
  Navigation,
  Outlet,
  Page,
  RouteMatch,
  Router
};
use fast_core::{
  ConsoleConfig,
  NavigationToken,
  PageContext
};
use gloo::events::EventListener;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html,
  use_effect_with,
  use_memo,
  use_mut_ref,
  use_state
};

use crate::api::{
  ConsoleClient,
  OutputPane,
  console_client,
  current_hash,
  load_console_config
};
use crate::components::{
  NavBar,
  OutputPanel
};
use self::api_page::ApiPage;
use self::apps_page::AppsPage;
use self::deploy_page::DeployPage;
use self::tasks_page::TasksPage;
use self::templates_page::TemplatesPage;

/// Props every routed page receives.
#[derive(Properties, Clone, PartialEq)]
pub struct PageProps {
  pub page:       Page,
  pub token:      NavigationToken,
  /// Route text after the matched segment.
  pub remainder:  String,
  pub config:     Rc<ConsoleConfig>,
  pub on_output:  Callback<String>,
  pub on_settled: Callback<NavigationToken>
}

impl PageProps {
  pub fn context(&self) -> PageContext<OutputPane> {
    PageContext::new(
      self.token.clone(),
      OutputPane(self.on_output.clone())
    )
  }

  pub fn client(&self) -> ConsoleClient {
    console_client(&self.config)
  }

  /// Reveals the page once its controller is done.
  pub fn settled(&self) {
    self.on_settled.emit(self.token.clone());
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let config = use_memo((), |_| {
    load_console_config()
  });
  let router = use_mut_ref(Router::new);
  let snapshot = {
    let router = router.clone();
    use_state(move || router.borrow().snapshot())
  };
  let output = use_state(String::new);

  let on_output = {
    let output = output.clone();
    Callback::from(move |text: String| {
      output.set(text)
    })
  };

  let on_settled = {
    let router = router.clone();
    let snapshot = snapshot.clone();
    Callback::from(
      move |token: NavigationToken| {
        let mut router = router.borrow_mut();
        if router.settle(&token) {
          snapshot.set(router.snapshot());
        } else {
          tracing::debug!(
            generation = token.generation(),
            "ignoring settle of stale page"
          );
        }
      }
    )
  };

  {
    let router = router.clone();
    let snapshot = snapshot.clone();
    let output = output.clone();
    use_effect_with((), move |_| {
      let route = Callback::from(move |_: ()| {
        let fragment = current_hash();
        let navigation =
          router.borrow_mut().navigate(&fragment);
        if let Navigation::NotFound { message } =
          &navigation
        {
          tracing::warn!(%message, "route not found");
        }
        output.set(String::new());
        snapshot.set(router.borrow().snapshot());
      });

      route.emit(());
      let listener =
        web_sys::window().map(|window| {
          EventListener::new(
            &window,
            "hashchange",
            move |_| route.emit(())
          )
        });
      tracing::debug!(
        attached = listener.is_some(),
        "hashchange listener"
      );

      move || drop(listener)
    });
  }

  let content_style = if snapshot.visible {
    ""
  } else {
    "display:none;"
  };

  let outlet = match &snapshot.outlet {
    | Outlet::Empty => html! {},
    | Outlet::NotFound(message) => html! {
        <div class="route-error">{ message }</div>
    },
    | Outlet::Page { route, token } => {
      render_page(
        route,
        token,
        &config,
        &on_output,
        &on_settled
      )
    }
  };

  html! {
      <div class="console">
          <NavBar items={snapshot.nav.clone()} visible={snapshot.visible} />
          <div id="content" class="content" style={content_style}>
              { outlet }
          </div>
          <OutputPanel text={(*output).clone()} />
      </div>
  }
}

fn render_page(
  route: &RouteMatch,
  token: &NavigationToken,
  config: &Rc<ConsoleConfig>,
  on_output: &Callback<String>,
  on_settled: &Callback<NavigationToken>
) -> Html {
  let key = token.generation().to_string();
  let props = PageProps {
    page:       route.page(),
    token:      token.clone(),
    remainder:  route.remainder.clone(),
    config:     config.clone(),
    on_output:  on_output.clone(),
    on_settled: on_settled.clone()
  };

  match props.page {
    | Page::Apps => {
      html! { <AppsPage key={key} ..props /> }
    }
    | Page::Create | Page::Modify => {
      html! { <DeployPage key={key} ..props /> }
    }
    | Page::Templates => {
      html! { <TemplatesPage key={key} ..props /> }
    }
    | Page::Tasks => {
      html! { <TasksPage key={key} ..props /> }
    }
    | Page::Api => {
      html! { <ApiPage key={key} ..props /> }
    }
  }
}
