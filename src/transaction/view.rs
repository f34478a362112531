//! HTML rendering for the transactions page.

use maud::{Markup, html};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base_with_overflow,
        dollar_input_styles, format_currency,
    },
    pagination::{Page, create_pagination_indicators, pagination_view},
    transaction::{
        core::{Transaction, TransactionKind, TransactionSummary},
        modal::{ScrollLock, TRANSACTION_MODAL_ID},
    },
};

/// The htmx event sent when a transaction is created, updated or deleted.
pub const TRANSACTIONS_CHANGED_EVENT: &str = "transactions-changed";

/// The max number of graphemes to display in the transaction table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

/// A page of a user's transactions with the totals for all of their transactions.
pub(crate) struct TransactionsContent {
    pub summary: TransactionSummary,
    pub transactions: Vec<Transaction>,
    pub page: Page,
    pub max_pages: u64,
}

fn amount_class(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "text-green-700 dark:text-green-300",
        TransactionKind::Expense => "text-red-700 dark:text-red-300",
    }
}

pub(crate) fn transactions_view(
    header: Markup,
    content: &TransactionsContent,
    modal: Markup,
    scroll_lock: ScrollLock,
) -> Markup {
    let new_transaction_page_url = format!("{}?modal=new", endpoints::TRANSACTIONS_VIEW);
    let modal_target = format!("#{TRANSACTION_MODAL_ID}");

    let body = html! {
        (header)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a
                        href=(new_transaction_page_url)
                        hx-get=(endpoints::NEW_TRANSACTION_MODAL)
                        hx-target=(modal_target)
                        hx-swap="innerHTML"
                        hx-target-error="#alert-container"
                        class=(LINK_STYLE)
                    {
                        "New transaction"
                    }
                }

                (transactions_content_view(content))
            }
        }

        div id=(TRANSACTION_MODAL_ID) { (modal) }
    };

    base_with_overflow(
        "Transactions",
        &[dollar_input_styles()],
        &body,
        scroll_lock.overflow(),
    )
}

/// The summary and table of transactions.
///
/// Reloads itself whenever the transactions change.
pub(crate) fn transactions_content_view(content: &TransactionsContent) -> Markup {
    let page = &content.page;
    let refresh_url = format!(
        "{}?page={}&per_page={}",
        endpoints::TRANSACTIONS_TABLE,
        page.number,
        page.per_page
    );
    let indicators = create_pagination_indicators(page.number, page.page_count, content.max_pages);

    html! {
        div
            id="transactions-content"
            class="space-y-4"
            hx-get=(refresh_url)
            hx-trigger={ (TRANSACTIONS_CHANGED_EVENT) " from:body" }
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
        {
            (summary_view(&content.summary))

            section class="rounded bg-gray-50 dark:bg-gray-800 overflow-x-auto"
            {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                            th scope="col" class="px-6 py-4 text-right" { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for transaction in &content.transactions {
                            (transaction_row_view(transaction))
                        }

                        @if content.transactions.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan="6" class="px-6 py-4 text-center"
                                {
                                    "No transactions yet."
                                }
                            }
                        }
                    }
                }
            }

            @if page.page_count > 1 {
                (pagination_view(&indicators, endpoints::TRANSACTIONS_VIEW, page.per_page))
            }
        }
    }
}

fn summary_view(summary: &TransactionSummary) -> Markup {
    let balance = summary.balance();
    let balance_class = if balance < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-green-700 dark:text-green-300"
    };
    let card_style = "flex-1 p-4 rounded bg-white dark:bg-gray-800 shadow";

    html! {
        section class="flex flex-wrap gap-4" aria-label="Summary"
        {
            div class=(card_style)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Income" }
                p class={ "text-2xl font-semibold " (amount_class(TransactionKind::Income)) }
                    data-summary="income"
                {
                    (format_currency(summary.income))
                }
            }

            div class=(card_style)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Expenses" }
                p class={ "text-2xl font-semibold " (amount_class(TransactionKind::Expense)) }
                    data-summary="expenses"
                {
                    (format_currency(summary.expenses))
                }
            }

            div class=(card_style)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Balance" }
                p class={ "text-2xl font-semibold " (balance_class) } data-summary="balance"
                {
                    (format_currency(balance))
                }
            }
        }
    }
}

fn transaction_row_view(transaction: &Transaction) -> Markup {
    let (description, tooltip) = format_description(&transaction.description);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );
    let edit_page_url = format!("{}?edit={}", endpoints::TRANSACTIONS_VIEW, transaction.id);
    let edit_modal_url = format_endpoint(endpoints::EDIT_TRANSACTION_MODAL, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let modal_target = format!("#{TRANSACTION_MODAL_ID}");

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.date) { (transaction.date) }
            }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (transaction.category.label()) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.kind.label()) }
            td class={ "px-6 py-4 text-right " (amount_class(transaction.kind)) }
            {
                (format_currency(transaction.amount))
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a
                        href=(edit_page_url)
                        hx-get=(edit_modal_url)
                        hx-target=(modal_target)
                        hx-swap="innerHTML"
                        hx-target-error="#alert-container"
                        class=(LINK_STYLE)
                    {
                        "Edit"
                    }

                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm=(confirm_message)
                        hx-target="#alert-container"
                        hx-target-error="#alert-container"
                        hx-swap="innerHTML"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(description))
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::{OffsetDateTime, macros::date};

    use crate::{
        auth::UserID,
        pagination::Page,
        transaction::{Category, Transaction, TransactionKind, core::TransactionSummary},
    };

    use super::{
        MAX_DESCRIPTION_GRAPHEMES, TransactionsContent, format_description,
        transactions_content_view,
    };

    fn transaction(id: i64, description: &str) -> Transaction {
        let now = OffsetDateTime::now_utc();
        Transaction {
            id,
            user_id: UserID::new(1),
            kind: TransactionKind::Expense,
            description: description.to_owned(),
            amount: 42.5,
            category: Category::Food,
            date: date!(2025 - 10 - 05),
            created_at: now,
            updated_at: now,
        }
    }

    fn content(transactions: Vec<Transaction>, page_count: u64) -> TransactionsContent {
        TransactionsContent {
            summary: TransactionSummary {
                income: 100.0,
                expenses: 42.5,
            },
            transactions,
            page: Page {
                number: 1,
                per_page: 20,
                page_count,
            },
            max_pages: 5,
        }
    }

    fn render(content: &TransactionsContent) -> Html {
        Html::parse_fragment(&transactions_content_view(content).into_string())
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let description = "a".repeat(MAX_DESCRIPTION_GRAPHEMES + 1);

        let (truncated, tooltip) = format_description(&description);

        assert_eq!(truncated.len(), MAX_DESCRIPTION_GRAPHEMES);
        assert!(truncated.ends_with("..."));
        assert_eq!(tooltip, Some(description.as_str()));
    }

    #[test]
    fn short_descriptions_are_unchanged() {
        assert_eq!(format_description("Groceries"), ("Groceries".to_owned(), None));
    }

    #[test]
    fn rows_show_transaction_details() {
        let html = render(&content(vec![transaction(3, "Groceries")], 1));

        let row = html
            .select(&Selector::parse("tr[data-transaction-row]").unwrap())
            .next()
            .expect("no transaction row");
        let cells = row
            .select(&Selector::parse("td").unwrap())
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(
            cells[..5],
            ["2025-10-05", "Groceries", "Food", "Expense", "$42.50"]
        );

        let edit = row
            .select(&Selector::parse("a[hx-get]").unwrap())
            .next()
            .expect("no edit link");
        assert_eq!(edit.value().attr("hx-get"), Some("/transactions/3/modal"));
        assert_eq!(edit.value().attr("href"), Some("/transactions?edit=3"));

        let delete = row
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .next()
            .expect("no delete button");
        assert_eq!(delete.value().attr("hx-delete"), Some("/api/transactions/3"));
        assert!(delete.value().attr("hx-confirm").is_some());
    }

    #[test]
    fn summary_shows_totals_and_balance() {
        let html = render(&content(vec![], 1));

        let value = |name: &str| {
            html.select(&Selector::parse(&format!("[data-summary={name}]")).unwrap())
                .next()
                .unwrap_or_else(|| panic!("no {name} summary"))
                .text()
                .collect::<String>()
                .trim()
                .to_owned()
        };
        assert_eq!(value("income"), "$100.00");
        assert_eq!(value("expenses"), "$42.50");
        assert_eq!(value("balance"), "$57.50");
    }

    #[test]
    fn content_refreshes_when_transactions_change() {
        let html = render(&content(vec![], 1));

        let container = html
            .select(&Selector::parse("#transactions-content").unwrap())
            .next()
            .expect("no content container");
        assert_eq!(
            container.value().attr("hx-trigger"),
            Some("transactions-changed from:body")
        );
        assert_eq!(
            container.value().attr("hx-get"),
            Some("/api/transactions/table?page=1&per_page=20")
        );
    }

    #[test]
    fn pagination_only_shown_for_multiple_pages() {
        let single = render(&content(vec![], 1));
        let multiple = render(&content(vec![], 3));

        let selector = Selector::parse("nav.pagination").unwrap();
        assert_eq!(single.select(&selector).count(), 0);
        assert_eq!(multiple.select(&selector).count(), 1);
    }

    #[test]
    fn empty_table_shows_placeholder_row() {
        let html = render(&content(vec![], 1));

        let text = html
            .select(&Selector::parse("tbody td").unwrap())
            .next()
            .expect("no placeholder cell")
            .text()
            .collect::<String>();
        assert_eq!(text.trim(), "No transactions yet.");
    }
}
