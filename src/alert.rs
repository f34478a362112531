//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered into the page's `#alert-container`, either as the
//! target of a failed htmx request (`hx-target-error`) or as an out-of-band
//! swap alongside a successful response.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// An alert message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with no details.
    SuccessSimple { message: String },
    /// An error message with extra details.
    Error { message: String, details: String },
}

impl Alert {
    fn parts(&self) -> (bool, &str, &str) {
        match self {
            Alert::SuccessSimple { message } => (true, message, ""),
            Alert::Error { message, details } => (false, message, details),
        }
    }

    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (is_success, message, details) = self.parts();
        let style = if is_success {
            "flex items-start gap-3 p-4 mb-4 text-green-800 rounded-lg bg-green-50 \
            dark:bg-gray-800 dark:text-green-400 shadow"
        } else {
            "flex items-start gap-3 p-4 mb-4 text-red-800 rounded-lg bg-red-50 \
            dark:bg-gray-800 dark:text-red-400 shadow"
        };

        html! {
            div role="alert" class=(style)
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    onclick="this.parentElement.remove()"
                    class="ms-auto text-lg leading-none"
                {
                    "✕"
                }
            }
        }
    }

    /// Render the alert wrapped for an out-of-band swap into `#alert-container`.
    pub fn into_oob_html(self) -> Markup {
        html! {
            div id="alert-container" hx-swap-oob="innerHTML" { (self.into_html()) }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
