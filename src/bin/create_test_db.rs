use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::str::FromStr;

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use pocket_ledger::{
    Category, NewUser, PasswordHash, TransactionFields, TransactionKind, ValidatedPassword,
    create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for Pocket Ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "test";

/// (days ago, kind, description, amount, category)
const SAMPLE_TRANSACTIONS: [(i64, TransactionKind, &str, f64, Category); 12] = [
    (0, TransactionKind::Expense, "Coffee", 5.5, Category::Food),
    (1, TransactionKind::Expense, "Bus fare", 3.2, Category::Transport),
    (2, TransactionKind::Expense, "Supermarket shopping", 142.37, Category::Food),
    (3, TransactionKind::Income, "Salary", 3200.0, Category::Work),
    (5, TransactionKind::Expense, "Rent", 1450.0, Category::Housing),
    (7, TransactionKind::Expense, "Doctor's visit", 65.0, Category::Health),
    (9, TransactionKind::Expense, "Online course", 120.0, Category::Education),
    (12, TransactionKind::Expense, "Cinema tickets", 34.0, Category::Leisure),
    (14, TransactionKind::Income, "Freelance project", 800.0, Category::Work),
    (18, TransactionKind::Expense, "Petrol", 88.15, Category::Transport),
    (21, TransactionKind::Expense, "Birthday present", 45.99, Category::Other),
    (25, TransactionKind::Income, "Sold old bike", 150.0, Category::Other),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {DEMO_EMAIL} with the password {DEMO_PASSWORD:?}...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            email: EmailAddress::from_str(DEMO_EMAIL)?,
            display_name: Some("Demo User".to_owned()),
            photo_url: None,
            password_hash,
        },
        &conn,
    )?;

    println!("Creating {} sample transactions...", SAMPLE_TRANSACTIONS.len());

    let today = OffsetDateTime::now_utc().date();

    for (days_ago, kind, description, amount, category) in SAMPLE_TRANSACTIONS {
        create_transaction(
            user.id,
            TransactionFields {
                kind,
                description: description.to_owned(),
                amount,
                category,
                date: today - Duration::days(days_ago),
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
