//! Defines the transaction store trait used by the transaction form.

use rusqlite::Connection;

use crate::{
    Error,
    auth::UserID,
    transaction::core::{
        Transaction, TransactionFields, TransactionId, TransactionPatch, create_transaction,
        update_transaction,
    },
};

/// Handles the creation and modification of a user's transactions.
pub trait TransactionStore {
    /// Create a new transaction owned by `user_id`.
    fn create(&mut self, user_id: UserID, fields: TransactionFields)
    -> Result<Transaction, Error>;

    /// Apply `patch` to the transaction `id` owned by `user_id`.
    fn update(
        &mut self,
        user_id: UserID,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Transaction, Error>;
}

/// Stores transactions in a SQLite database.
///
/// Callers are expected to hold the database lock for as long as the store lives.
pub struct SqliteTransactionStore<'a> {
    connection: &'a Connection,
}

impl<'a> SqliteTransactionStore<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SqliteTransactionStore<'_> {
    fn create(
        &mut self,
        user_id: UserID,
        fields: TransactionFields,
    ) -> Result<Transaction, Error> {
        create_transaction(user_id, fields, self.connection)
    }

    fn update(
        &mut self,
        user_id: UserID,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Transaction, Error> {
        update_transaction(user_id, id, patch, self.connection)
    }
}
