//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserID};

/// The database ID of a transaction.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense,
}

impl TransactionKind {
    /// Every kind, in the order they are shown in the form.
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Expense, TransactionKind::Income];

    /// The value used in forms and the database.
    pub fn value(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// The human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidTransactionKind(other.to_owned())),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The fixed set of labels used to classify a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Category {
    Food,
    Transport,
    Housing,
    Health,
    Education,
    Leisure,
    Work,
    Other,
}

impl Category {
    /// Every category, in the order they are shown in the form.
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Housing,
        Category::Health,
        Category::Education,
        Category::Leisure,
        Category::Work,
        Category::Other,
    ];

    /// The value used in forms and the database.
    pub fn value(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Housing => "housing",
            Category::Health => "health",
            Category::Education => "education",
            Category::Leisure => "leisure",
            Category::Work => "work",
            Category::Other => "other",
        }
    }

    /// The human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Housing => "Housing",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Leisure => "Leisure",
            Category::Work => "Work",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.value() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.value()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.value()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned, never negative.
    pub amount: f64,
    /// The category the transaction belongs to.
    pub category: Category,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    pub updated_at: OffsetDateTime,
}

/// The user editable fields of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned, never negative.
    pub amount: f64,
    /// The category the transaction belongs to.
    pub category: Category,
    /// When the transaction happened.
    pub date: Date,
}

/// A partial update to a transaction. Fields set to `None` are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub date: Option<Date>,
}

impl From<TransactionFields> for TransactionPatch {
    fn from(fields: TransactionFields) -> Self {
        Self {
            kind: Some(fields.kind),
            description: Some(fields.description),
            amount: Some(fields.amount),
            category: Some(fields.category),
            date: Some(fields.date),
        }
    }
}

/// The totals across all of a user's transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionSummary {
    pub income: f64,
    pub expenses: f64,
}

impl TransactionSummary {
    /// Income minus expenses.
    pub fn balance(&self) -> f64 {
        self.income - self.expenses
    }
}

/// The largest amount a single transaction may have.
///
/// Keeps the totals of a user's transactions finite. Must match the `CHECK` on
/// the `amount` column.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, user_id, kind, description, amount, category, date, created_at, updated_at";

/// Create a new transaction owned by `user_id`.
///
/// Both timestamps are set to the current time.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g., the amount is negative or `user_id` does not refer to a user.
pub fn create_transaction(
    user_id: UserID,
    fields: TransactionFields,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
                (user_id, kind, description, amount, category, date, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                fields.kind,
                fields.description,
                fields.amount,
                fields.category,
                fields.date,
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
             WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Apply `patch` to the transaction `id` owned by `user_id` and refresh its `updated_at`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    patch: TransactionPatch,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "UPDATE \"transaction\" SET \
                kind = COALESCE(?1, kind), \
                description = COALESCE(?2, description), \
                amount = COALESCE(?3, amount), \
                category = COALESCE(?4, category), \
                date = COALESCE(?5, date), \
                updated_at = ?6 \
             WHERE id = ?7 AND user_id = ?8 \
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                patch.kind,
                patch.description,
                patch.amount,
                patch.category,
                patch.date,
                now,
                id,
                user_id.as_i64(),
            ],
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get up to `limit` of the user's transactions, newest first, skipping the first `offset`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn list_transactions(
    user_id: UserID,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
             WHERE user_id = ?1 \
             ORDER BY date DESC, id DESC \
             LIMIT ?2 OFFSET ?3"
        ))?
        .query_map((user_id.as_i64(), limit, offset), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Get the number of transactions owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u64, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    Ok(count.max(0) as u64)
}

/// Sum the income and expenses of the user's transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn summarize_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionSummary, Error> {
    let summary = connection.query_row(
        "SELECT \
            COALESCE(SUM(CASE WHEN kind = 'income' THEN amount END), 0.0), \
            COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount END), 0.0) \
         FROM \"transaction\" WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| {
            Ok(TransactionSummary {
                income: row.get(0)?,
                expenses: row.get(1)?,
            })
        },
    )?;

    Ok(summary)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                description TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0 AND amount <= 1000000000000),
                category TEXT NOT NULL CHECK (category IN (
                    'food', 'transport', 'housing', 'health',
                    'education', 'leisure', 'work', 'other'
                )),
                date TEXT NOT NULL CHECK (date IS date(date)),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Used by the transactions page, which lists a user's transactions newest first.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        kind: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        category: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
