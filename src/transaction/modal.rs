//! The modal dialog that wraps the transaction form.
//!
//! Opening the modal locks the page scroll and closing it unlocks the page
//! again. htmx requests signal the change with an event in the `HX-Trigger`
//! header which the page listens for, see [crate::html::base].

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HX_TRIGGER;
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    timezone::local_today,
    transaction::{
        core::{Transaction, TransactionId, get_transaction},
        form::{TransactionEditBuffer, transaction_form},
    },
};

/// The id of the element the modal is rendered into.
pub const TRANSACTION_MODAL_ID: &str = "transaction-modal";

/// Whether the page behind the modal can be scrolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollLock {
    Locked,
    Unlocked,
}

impl ScrollLock {
    /// The CSS `overflow` value for the page body.
    pub fn overflow(&self) -> &'static str {
        match self {
            ScrollLock::Locked => "hidden",
            ScrollLock::Unlocked => "auto",
        }
    }

    /// The event name sent in the `HX-Trigger` header.
    pub fn event(&self) -> &'static str {
        match self {
            ScrollLock::Locked => "lock-scroll",
            ScrollLock::Unlocked => "unlock-scroll",
        }
    }
}

pub struct TransactionModal<'a> {
    pub open: bool,
    /// The transaction being edited, `None` when creating a transaction.
    pub editing: Option<&'a Transaction>,
    /// Used as the default date for new transactions.
    pub today: Date,
}

impl TransactionModal<'_> {
    pub fn scroll_lock(&self) -> ScrollLock {
        if self.open {
            ScrollLock::Locked
        } else {
            ScrollLock::Unlocked
        }
    }

    pub fn into_html(self) -> Markup {
        if !self.open {
            return html! {};
        }

        let buffer = match self.editing {
            Some(transaction) => TransactionEditBuffer::from_transaction(transaction),
            None => TransactionEditBuffer::new(self.today),
        };
        let editing_id = self.editing.map(|transaction| transaction.id);
        let modal_target = format!("#{TRANSACTION_MODAL_ID}");

        html! {
            div
                class="fixed inset-0 z-40 flex items-center justify-center bg-gray-900/50"
                role="dialog"
                aria-modal="true"
            {
                div
                    class="relative w-full max-w-md p-6 m-4 bg-white rounded-lg shadow
                        dark:bg-gray-800"
                {
                    button
                        type="button"
                        aria-label="Close"
                        hx-get=(endpoints::CLOSE_TRANSACTION_MODAL)
                        hx-target=(modal_target)
                        hx-swap="innerHTML"
                        class="absolute top-3 right-3 text-lg leading-none text-gray-500
                            hover:text-gray-900 dark:text-gray-400 dark:hover:text-white"
                    {
                        "✕"
                    }

                    (transaction_form(&buffer, editing_id))
                }
            }
        }
    }
}

/// Render `modal` as an htmx response that tells the page to update its scroll lock.
fn modal_response(modal: TransactionModal<'_>) -> Response {
    let event = modal.scroll_lock().event();

    ([(HX_TRIGGER, event)], modal.into_html()).into_response()
}

/// The state needed to open the transaction modal.
#[derive(Debug, Clone)]
pub struct TransactionModalState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionModalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Open the modal with an empty transaction form.
pub async fn get_new_transaction_modal(State(state): State<TransactionModalState>) -> Response {
    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    modal_response(TransactionModal {
        open: true,
        editing: None,
        today,
    })
}

/// Open the modal with the form filled in with the transaction `transaction_id`.
pub async fn get_edit_transaction_modal(
    State(state): State<TransactionModalState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let transaction = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        match get_transaction(user_id, transaction_id, &connection) {
            Ok(transaction) => transaction,
            Err(error) => return error.into_alert_response(),
        }
    };

    modal_response(TransactionModal {
        open: true,
        editing: Some(&transaction),
        today,
    })
}

/// Close the modal, leaving its container empty.
pub async fn get_close_transaction_modal() -> Response {
    modal_response(TransactionModal {
        open: false,
        editing: None,
        today: Date::MIN,
    })
}
