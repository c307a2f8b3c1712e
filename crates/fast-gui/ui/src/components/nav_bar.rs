use fast_core::router::NavItem;
use yew::{
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct NavBarProps {
  pub items:   Vec<NavItem>,
  pub visible: bool
}

#[function_component(NavBar)]
pub fn nav_bar(
  props: &NavBarProps
) -> Html {
  let style = if props.visible {
    ""
  } else {
    "display:none;"
  };

  html! {
      <nav id="navBar" class="nav-bar" style={style}>
          {
              for props.items.iter().map(|item| {
                  if item.selected {
                      html! { <div class="selected-nav">{ item.label }</div> }
                  } else {
                      html! { <a class="btn btn-nav" href={item.href.clone()}>{ item.label }</a> }
                  }
              })
          }
      </nav>
  }
}
