//! Defines the route handlers for the page that displays transactions as a table.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    header::Header,
    pagination::{Page, PageQuery, PaginationConfig},
    timezone::local_today,
};

use super::{
    core::{
        TransactionId, count_transactions, get_transaction, list_transactions,
        summarize_transactions,
    },
    modal::TransactionModal,
    view::{TransactionsContent, transactions_content_view, transactions_view},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// Controls how many transactions are shown per page.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters for the transactions page.
///
/// `modal=new` opens the modal for a new transaction and `edit` opens the
/// modal for the transaction with that ID.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub modal: Option<String>,
    pub edit: Option<TransactionId>,
}

impl TransactionsQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

fn load_transactions_content(
    user_id: UserID,
    page_query: &PageQuery,
    pagination_config: &PaginationConfig,
    connection: &Connection,
) -> Result<TransactionsContent, Error> {
    let transaction_count = count_transactions(user_id, connection)?;
    let page = Page::new(page_query, pagination_config, transaction_count);
    let transactions = list_transactions(user_id, page.limit(), page.offset(), connection)?;
    let summary = summarize_transactions(user_id, connection)?;

    Ok(TransactionsContent {
        summary,
        transactions,
        page,
        max_pages: pagination_config.max_pages,
    })
}

/// Render the transactions page for the logged in user.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
) -> Response {
    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("Could not get user {user_id} for transactions page: {error}");
            return error.into_response();
        }
    };

    let content = match load_transactions_content(
        user_id,
        &query.page_query(),
        &state.pagination_config,
        &connection,
    ) {
        Ok(content) => content,
        Err(error) => {
            tracing::error!("Could not load transactions for user {user_id}: {error}");
            return error.into_response();
        }
    };

    let editing = match query.edit {
        Some(transaction_id) => match get_transaction(user_id, transaction_id, &connection) {
            Ok(transaction) => Some(transaction),
            Err(error) => return error.into_response(),
        },
        None => None,
    };

    drop(connection);

    let modal = TransactionModal {
        open: editing.is_some() || query.modal.as_deref() == Some("new"),
        editing: editing.as_ref(),
        today,
    };
    let scroll_lock = modal.scroll_lock();

    transactions_view(
        Header::new(&user).into_html(),
        &content,
        modal.into_html(),
        scroll_lock,
    )
    .into_response()
}

/// Render the transactions summary and table for htmx to swap into the page.
pub async fn get_transactions_table(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(page_query): Query<PageQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match load_transactions_content(
        user_id,
        &page_query,
        &state.pagination_config,
        &connection,
    ) {
        Ok(content) => transactions_content_view(&content).into_response(),
        Err(error) => {
            tracing::error!("Could not load transactions for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
