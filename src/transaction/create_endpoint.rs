//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HX_TRIGGER;
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    timezone::local_today,
    transaction::{
        form::{SubmitOutcome, TransactionEditBuffer, submit, transaction_form},
        store::SqliteTransactionStore,
        view::TRANSACTIONS_CHANGED_EVENT,
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new transaction.
///
/// Responds with an empty form on success so the next transaction can be
/// entered straight away, and with no content if a required field is empty.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(mut buffer): Form<TransactionEditBuffer>,
) -> Response {
    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let outcome = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };
        let mut store = SqliteTransactionStore::new(&connection);

        submit(&mut buffer, None, &mut store, user_id, today)
    };

    match outcome {
        SubmitOutcome::Ignored => StatusCode::NO_CONTENT.into_response(),
        SubmitOutcome::Created(transaction) | SubmitOutcome::Updated(transaction) => {
            tracing::info!("Created transaction {}", transaction.id);
            let alert = Alert::SuccessSimple {
                message: "Transaction added".to_owned(),
            };

            (
                [(HX_TRIGGER, TRANSACTIONS_CHANGED_EVENT)],
                html! {
                    (transaction_form(&buffer, None))
                    (alert.into_oob_html())
                },
            )
                .into_response()
        }
        SubmitOutcome::Failed(error) => error.into_alert_response(),
    }
}
