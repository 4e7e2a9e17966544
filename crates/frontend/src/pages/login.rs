use dioxus::logger::tracing::info;
use dioxus::prelude::*;

use crate::api;
use crate::session::use_session;
use crate::Route;

/// Check the form before anything is sent.
fn validate(email: &str, password: &str) -> Result<(), String> {
    if email.trim().is_empty() || password.is_empty() {
        return Err("Email and password are required".to_string());
    }
    Ok(())
}

#[component]
pub fn LoginForm() -> Element {
    let mut session = use_session();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);

    let state = session.state.read().clone();

    rsx! {
        div { class: "login-screen",
            form {
                class: "panel login-form",
                onsubmit: move |evt: Event<FormData>| {
                    evt.prevent_default();
                    let email_value = email.read().trim().to_string();
                    let password_value = password.read().clone();
                    if let Err(message) = validate(&email_value, &password_value) {
                        session.login_failed(message);
                        return;
                    }
                    session.begin_login();
                    spawn(async move {
                        match api::login(&email_value, &password_value).await {
                            Ok(token) => {
                                info!("Signed in as {}", email_value);
                                password.set(String::new());
                                session.login_succeeded(token);
                            }
                            Err(e) => session.login_failed(e.to_string()),
                        }
                    });
                },
                h1 { "Fleet Console" }
                p { class: "muted", "Sign in to see your fleet." }
                label { r#for: "login-email", "Email" }
                input {
                    id: "login-email",
                    r#type: "email",
                    autocomplete: "username",
                    value: "{email}",
                    disabled: state.logging_in,
                    oninput: move |evt| email.set(evt.value()),
                }
                label { r#for: "login-password", "Password" }
                input {
                    id: "login-password",
                    r#type: "password",
                    autocomplete: "current-password",
                    value: "{password}",
                    disabled: state.logging_in,
                    oninput: move |evt| password.set(evt.value()),
                }
                if let Some(message) = state.login_error.as_ref() {
                    div { class: "form-error", role: "alert", "{message}" }
                }
                button {
                    class: "primary",
                    r#type: "submit",
                    disabled: state.logging_in,
                    if state.logging_in { "Signing in…" } else { "Sign in" }
                }
            }
        }
    }
}

/// Standalone `/login` route. Sends an authenticated session to the map.
#[component]
pub fn Login() -> Element {
    let session = use_session();
    let navigator = use_navigator();

    use_effect(move || {
        if session.authenticated() {
            navigator.replace(Route::Home {});
        }
    });

    rsx! {
        LoginForm {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_both_fields() {
        assert!(validate("", "secret").is_err());
        assert!(validate("   ", "secret").is_err());
        assert!(validate("ops@example.com", "").is_err());
        assert!(validate("ops@example.com", "secret").is_ok());
    }
}
