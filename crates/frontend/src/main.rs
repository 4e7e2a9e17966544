mod api;
mod components;
mod coords;
mod pages;
mod session;
mod viewport;

use dioxus::prelude::*;
use fleet_shared::models::DeviceKey;

use crate::session::use_session_provider;

#[derive(Routable, Clone, Debug, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/login")]
    Login {},
    #[route("/devices/:device")]
    DeviceView { device: String },
}

#[component]
fn Home() -> Element {
    rsx! {
        pages::dashboard::Dashboard { focus: None::<DeviceKey> }
    }
}

#[component]
fn Login() -> Element {
    rsx! {
        pages::login::Login {}
    }
}

/// Deep link to one device. A malformed key opens the plain dashboard.
#[component]
fn DeviceView(device: String) -> Element {
    let focus = device.parse::<DeviceKey>().ok();
    rsx! {
        pages::dashboard::Dashboard { focus }
    }
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    use_session_provider();

    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_device_deep_link_route() {
        let route = Route::from_str("/devices/unknown-4").ok();
        assert_eq!(
            route,
            Some(Route::DeviceView {
                device: "unknown-4".to_string()
            })
        );
        let link = Route::DeviceView {
            device: "device-7".to_string(),
        };
        assert_eq!(link.to_string(), "/devices/device-7");
    }
}
