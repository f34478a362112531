//! Transaction management for the personal finance application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its categories and the database queries for it
//! - The transaction form, the modal that wraps it and the endpoints it submits to
//! - The page that lists a user's transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod modal;
mod store;
mod transactions_page;
mod view;

pub use core::{
    Category, TransactionFields, TransactionKind, create_transaction, create_transaction_table,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use modal::{
    get_close_transaction_modal, get_edit_transaction_modal, get_new_transaction_modal,
};
pub use transactions_page::{get_transactions_page, get_transactions_table};

#[cfg(test)]
pub use core::{
    Transaction, TransactionPatch, count_transactions, delete_transaction, get_transaction,
    list_transactions, summarize_transactions, update_transaction,
};
