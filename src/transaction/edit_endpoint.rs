//! Defines the endpoint for updating an existing transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
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
        core::TransactionId,
        form::{SubmitOutcome, TransactionEditBuffer, submit, transaction_form},
        store::SqliteTransactionStore,
        view::TRANSACTIONS_CHANGED_EVENT,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for updating a transaction.
///
/// Responds with the form still holding the submitted values on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
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
                tracing::error!("Could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };
        let mut store = SqliteTransactionStore::new(&connection);

        submit(&mut buffer, Some(transaction_id), &mut store, user_id, today)
    };

    match outcome {
        SubmitOutcome::Ignored => StatusCode::NO_CONTENT.into_response(),
        SubmitOutcome::Created(_) | SubmitOutcome::Updated(_) => {
            let alert = Alert::SuccessSimple {
                message: "Transaction updated".to_owned(),
            };

            (
                [(HX_TRIGGER, TRANSACTIONS_CHANGED_EVENT)],
                html! {
                    (transaction_form(&buffer, Some(transaction_id)))
                    (alert.into_oob_html())
                },
            )
                .into_response()
        }
        SubmitOutcome::Failed(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_htmx::HX_TRIGGER;
    use time::macros::date;

    use crate::{
        auth::UserID,
        test_utils::{
            assert_form_input_with_value, create_test_user, get_test_connection, must_get_form,
            parse_html_fragment,
        },
        transaction::{
            Category, Transaction, TransactionFields, TransactionKind, create_transaction,
            form::TransactionEditBuffer, get_transaction,
        },
    };

    use super::{EditTransactionState, edit_transaction_endpoint};

    fn get_state() -> (EditTransactionState, UserID, Transaction) {
        let conn = get_test_connection();
        let user = create_test_user(&conn, "test@example.com");
        let transaction = create_transaction(
            user.id,
            TransactionFields {
                kind: TransactionKind::Expense,
                description: "Groceries".to_owned(),
                amount: 42.5,
                category: Category::Food,
                date: date!(2025 - 10 - 05),
            },
            &conn,
        )
        .expect("could not create test transaction");

        (
            EditTransactionState {
                db_connection: Arc::new(Mutex::new(conn)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
            transaction,
        )
    }

    fn bus_fare() -> TransactionEditBuffer {
        TransactionEditBuffer {
            kind: "expense".to_owned(),
            description: "Bus fare".to_owned(),
            amount: "3.5".to_owned(),
            category: "transport".to_owned(),
            date: "2025-10-06".to_owned(),
        }
    }

    #[tokio::test]
    async fn can_update_transaction() {
        let (state, user_id, transaction) = get_state();

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction.id),
            Form(bus_fare()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(HX_TRIGGER).unwrap(),
            "transactions-changed"
        );
        let got = get_transaction(user_id, transaction.id, &state.db_connection.lock().unwrap())
            .expect("could not get test transaction");
        assert_eq!(got.description, "Bus fare");
        assert_eq!(got.amount, 3.5);
        assert_eq!(got.category, Category::Transport);
        assert_eq!(got.date, date!(2025 - 10 - 06));
        assert_eq!(got.created_at, transaction.created_at);

        // The form keeps the submitted values after an update.
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "description", "text", "Bus fare");
        assert_form_input_with_value(&form, "amount", "number", "3.5");
    }

    #[tokio::test]
    async fn updating_missing_transaction_is_not_found() {
        let (state, user_id, _) = get_state();

        let response = edit_transaction_endpoint(
            State(state),
            Extension(user_id),
            Path(1337),
            Form(bus_fare()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cannot_update_other_users_transaction() {
        let (state, owner_id, transaction) = get_state();
        let other = create_test_user(&state.db_connection.lock().unwrap(), "other@example.com");

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Extension(other.id),
            Path(transaction.id),
            Form(bus_fare()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let got = get_transaction(owner_id, transaction.id, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(got, transaction);
    }

    #[tokio::test]
    async fn empty_amount_is_ignored() {
        let (state, user_id, transaction) = get_state();
        let form = TransactionEditBuffer {
            amount: String::new(),
            ..bus_fare()
        };

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction.id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let got = get_transaction(user_id, transaction.id, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(got, transaction);
    }
}
