//! The form for creating and editing a transaction.
//!
//! The form keeps the values the user has typed in a [TransactionEditBuffer]
//! which is only turned into a transaction once it passes validation.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        loading_spinner,
    },
    transaction::{
        core::{
            Category, MAX_AMOUNT, Transaction, TransactionFields, TransactionId, TransactionKind,
        },
        store::TransactionStore,
    },
};

/// The id of the form element, used as the htmx swap target.
pub const TRANSACTION_FORM_ID: &str = "transaction-form";

/// The raw, unvalidated values of the transaction form as submitted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionEditBuffer {
    pub kind: String,
    pub description: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl TransactionEditBuffer {
    /// An empty expense in the food category that happened `today`.
    pub fn new(today: Date) -> Self {
        Self {
            kind: TransactionKind::Expense.value().to_owned(),
            description: String::new(),
            amount: String::new(),
            category: Category::Food.value().to_owned(),
            date: today.to_string(),
        }
    }

    /// Fill the buffer with the stored values of `transaction`.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            kind: transaction.kind.value().to_owned(),
            description: transaction.description.clone(),
            amount: transaction.amount.to_string(),
            category: transaction.category.value().to_owned(),
            date: transaction.date.to_string(),
        }
    }

    /// Parse the buffer into the fields of a transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::MissingField] if the description or amount is blank,
    /// - [Error::InvalidAmount] if the amount is not a number from zero to [MAX_AMOUNT],
    /// - [Error::InvalidTransactionKind] or [Error::InvalidCategory] for unknown values,
    /// - or [Error::InvalidDate] if the date is not a `YYYY-MM-DD` calendar date.
    pub fn validate(&self) -> Result<TransactionFields, Error> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(Error::MissingField("description"));
        }

        let amount = self.amount.trim();
        if amount.is_empty() {
            return Err(Error::MissingField("amount"));
        }

        let amount = match amount.parse::<f64>() {
            Ok(parsed) if (0.0..=MAX_AMOUNT).contains(&parsed) => parsed,
            _ => return Err(Error::InvalidAmount(amount.to_owned())),
        };

        let kind = self.kind.trim().parse()?;
        let category = self.category.trim().parse()?;

        let date = self.date.trim();
        let date = Date::parse(date, format_description!("[year]-[month]-[day]"))
            .map_err(|_| Error::InvalidDate(date.to_owned()))?;

        Ok(TransactionFields {
            kind,
            description: description.to_owned(),
            amount,
            category,
            date,
        })
    }
}

/// The result of submitting the transaction form.
#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    /// A required field was empty so nothing was saved.
    Ignored,
    /// A new transaction was saved.
    Created(Transaction),
    /// An existing transaction was changed.
    Updated(Transaction),
    /// The form was invalid or the store rejected it.
    Failed(Error),
}

/// Save the contents of `buffer`, updating the transaction `editing` if set
/// and creating a new transaction otherwise.
///
/// The buffer is reset to [TransactionEditBuffer::new] after a new
/// transaction has been created, and left as is in every other case.
pub fn submit(
    buffer: &mut TransactionEditBuffer,
    editing: Option<TransactionId>,
    store: &mut impl TransactionStore,
    user_id: UserID,
    today: Date,
) -> SubmitOutcome {
    let fields = match buffer.validate() {
        Ok(fields) => fields,
        Err(Error::MissingField(field)) => {
            tracing::debug!("Ignoring transaction form submission with empty {field}");
            return SubmitOutcome::Ignored;
        }
        Err(error) => return SubmitOutcome::Failed(error),
    };

    match editing {
        Some(transaction_id) => match store.update(user_id, transaction_id, fields.into()) {
            Ok(transaction) => SubmitOutcome::Updated(transaction),
            Err(error) => {
                tracing::error!("Could not update transaction {transaction_id}: {error}");
                SubmitOutcome::Failed(error)
            }
        },
        None => match store.create(user_id, fields) {
            Ok(transaction) => {
                *buffer = TransactionEditBuffer::new(today);
                SubmitOutcome::Created(transaction)
            }
            Err(error) => {
                tracing::error!("Could not create transaction: {error}");
                SubmitOutcome::Failed(error)
            }
        },
    }
}

/// Render the transaction form holding the values in `buffer`.
///
/// The form is sent as a POST to create a transaction, or as a PUT when `editing` is set.
pub fn transaction_form(buffer: &TransactionEditBuffer, editing: Option<TransactionId>) -> Markup {
    let (heading, button_label) = match editing {
        Some(_) => ("Edit Transaction", "Update"),
        None => ("New Transaction", "Add"),
    };
    let update_endpoint = editing.map(|id| format_endpoint(endpoints::TRANSACTION, id));
    let create_endpoint = editing.is_none().then_some(endpoints::TRANSACTIONS_API);
    let form_target = format!("#{TRANSACTION_FORM_ID}");

    html! {
        form
            id=(TRANSACTION_FORM_ID)
            hx-post=[create_endpoint]
            hx-put=[update_endpoint]
            hx-target=(form_target)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="find fieldset"
            class="w-full space-y-4"
        {
            h2 class="text-xl font-bold text-gray-900 dark:text-white" { (heading) }

            fieldset class="space-y-4"
            {
                div
                {
                    label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                    select name="kind" id="kind" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for kind in TransactionKind::ALL {
                            option value=(kind.value()) selected[buffer.kind == kind.value()]
                            {
                                (kind.label())
                            }
                        }
                    }
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        name="description"
                        id="description"
                        type="text"
                        placeholder="e.g. Supermarket shopping"
                        required
                        autofocus
                        value=(buffer.description)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    div class="input-wrapper w-full"
                    {
                        input
                            name="amount"
                            id="amount"
                            type="number"
                            step="0.01"
                            min="0"
                            max=(MAX_AMOUNT)
                            placeholder="0.00"
                            required
                            value=(buffer.amount)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    select name="category" id="category" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for category in Category::ALL {
                            option
                                value=(category.value())
                                selected[buffer.category == category.value()]
                            {
                                (category.label())
                            }
                        }
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        required
                        value=(buffer.date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="flex gap-3"
                {
                    @if editing.is_some() {
                        button
                            type="button"
                            hx-get=(endpoints::CLOSE_TRANSACTION_MODAL)
                            hx-target="#transaction-modal"
                            hx-swap="innerHTML"
                            class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Cancel"
                        }
                    }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span class="htmx-idle-label" { "💾 " (button_label) }

                        span class="htmx-indicator"
                        {
                            (loading_spinner())
                            "Saving..."
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod buffer_tests {
    use time::{OffsetDateTime, macros::date};

    use crate::{
        Error,
        auth::UserID,
        transaction::{Category, Transaction, TransactionKind, core::MAX_AMOUNT},
    };

    use super::TransactionEditBuffer;

    fn filled_buffer() -> TransactionEditBuffer {
        TransactionEditBuffer {
            kind: "expense".to_owned(),
            description: "Groceries".to_owned(),
            amount: "42.50".to_owned(),
            category: "food".to_owned(),
            date: "2025-10-05".to_owned(),
        }
    }

    #[test]
    fn new_buffer_has_defaults() {
        let buffer = TransactionEditBuffer::new(date!(2025 - 10 - 05));

        assert_eq!(
            buffer,
            TransactionEditBuffer {
                kind: "expense".to_owned(),
                description: String::new(),
                amount: String::new(),
                category: "food".to_owned(),
                date: "2025-10-05".to_owned(),
            }
        );
    }

    #[test]
    fn from_transaction_fills_every_field() {
        let now = OffsetDateTime::now_utc();
        let transaction = Transaction {
            id: 1,
            user_id: UserID::new(1),
            kind: TransactionKind::Income,
            description: "Salary".to_owned(),
            amount: 1234.5,
            category: Category::Work,
            date: date!(2025 - 09 - 30),
            created_at: now,
            updated_at: now,
        };

        let buffer = TransactionEditBuffer::from_transaction(&transaction);

        assert_eq!(
            buffer,
            TransactionEditBuffer {
                kind: "income".to_owned(),
                description: "Salary".to_owned(),
                amount: "1234.5".to_owned(),
                category: "work".to_owned(),
                date: "2025-09-30".to_owned(),
            }
        );
    }

    #[test]
    fn validate_parses_fields() {
        let fields = filled_buffer().validate().expect("buffer should be valid");

        assert_eq!(fields.kind, TransactionKind::Expense);
        assert_eq!(fields.description, "Groceries");
        assert_eq!(fields.amount, 42.5);
        assert_eq!(fields.category, Category::Food);
        assert_eq!(fields.date, date!(2025 - 10 - 05));
    }

    #[test]
    fn validate_rejects_blank_required_fields() {
        let mut buffer = filled_buffer();
        buffer.description = "   ".to_owned();
        assert_eq!(buffer.validate(), Err(Error::MissingField("description")));

        let mut buffer = filled_buffer();
        buffer.amount = String::new();
        assert_eq!(buffer.validate(), Err(Error::MissingField("amount")));
    }

    #[test]
    fn validate_rejects_bad_amounts() {
        for amount in ["abc", "-1", "inf", "NaN", "1e308", "1000000000000.01"] {
            let mut buffer = filled_buffer();
            buffer.amount = amount.to_owned();

            assert_eq!(
                buffer.validate(),
                Err(Error::InvalidAmount(amount.to_owned())),
                "amount {amount:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_accepts_maximum_amount() {
        let mut buffer = filled_buffer();
        buffer.amount = "1000000000000".to_owned();

        assert_eq!(
            buffer.validate().map(|fields| fields.amount),
            Ok(MAX_AMOUNT)
        );
    }

    #[test]
    fn validate_accepts_zero_amount() {
        let mut buffer = filled_buffer();
        buffer.amount = "0".to_owned();

        assert_eq!(buffer.validate().map(|fields| fields.amount), Ok(0.0));
    }

    #[test]
    fn validate_rejects_bad_dates() {
        for date in ["2025-02-30", "05/10/2025", ""] {
            let mut buffer = filled_buffer();
            buffer.date = date.to_owned();

            assert_eq!(
                buffer.validate(),
                Err(Error::InvalidDate(date.to_owned())),
                "date {date:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_rejects_unknown_category() {
        let mut buffer = filled_buffer();
        buffer.category = "groceries".to_owned();

        assert_eq!(
            buffer.validate(),
            Err(Error::InvalidCategory("groceries".to_owned()))
        );
    }
}
