use std::str::FromStr;

use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    PasswordHash,
    auth::{NewUser, User, create_user},
    db::initialize,
};

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    initialize(&connection).expect("could not initialize test DB");

    connection
}

#[track_caller]
pub(crate) fn create_test_user(connection: &Connection, email: &str) -> User {
    create_user(
        NewUser {
            email: EmailAddress::from_str(email).expect("invalid test email"),
            display_name: Some("Test User".to_owned()),
            photo_url: None,
            password_hash: PasswordHash::new_unchecked("hunter2"),
        },
        connection,
    )
    .expect("could not create test user")
}
