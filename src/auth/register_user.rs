//! The registration page and the route for creating a new user account.
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{NewUser, create_user, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base,
        email_input, loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// The minimum number of characters the password should have to be considered valid on the
/// client side. The server also checks the strength of the password.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

/// The error messages to show next to each field of the registration form.
#[derive(Debug, Default)]
struct RegistrationErrors<'a> {
    email: Option<&'a str>,
    photo_url: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn text_input(
    label: &str,
    name: &str,
    type_: &str,
    placeholder: &str,
    value: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(type_)
                name=(name)
                id=(name)
                placeholder=(placeholder)
                class=(FORM_TEXT_INPUT_STYLE)
                value=(value);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn registration_form(form: &RegisterForm, errors: RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="find input, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(&form.email, errors.email))
            (text_input(
                "Display Name (optional)",
                "display_name",
                "text",
                "Ada Lovelace",
                &form.display_name,
                None,
            ))
            (text_input(
                "Photo URL (optional)",
                "photo_url",
                "url",
                "https://example.com/me.png",
                &form.photo_url,
                errors.photo_url,
            ))
            (password_input(&form.password, PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form(&RegisterForm::default(), Default::default());
    let content = log_in_register("Create Account", &registration_form);

    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub photo_url: String,
    pub password: String,
    pub confirm_password: String,
}

/// Blank optional fields are stored as NULL.
fn optional_field(value: &str) -> Option<String> {
    let value = value.trim();

    (!value.is_empty()).then(|| value.to_owned())
}

fn is_valid_photo_url(raw_url: &str) -> bool {
    raw_url
        .parse::<Uri>()
        .is_ok_and(|uri| matches!(uri.scheme_str(), Some("http" | "https")) && uri.host().is_some())
}

/// Create a user from the registration form, log them in and redirect them to the
/// transactions page.
///
/// Invalid fields are reported next to the field in the returned form.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let email = match EmailAddress::from_str(user_data.email.trim()) {
        Ok(email) => email,
        Err(_) => {
            let message = Error::InvalidEmail(user_data.email.clone()).to_string();
            return registration_form(
                &user_data,
                RegistrationErrors {
                    email: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let photo_url = optional_field(&user_data.photo_url);
    if photo_url.as_deref().is_some_and(|url| !is_valid_photo_url(url)) {
        return registration_form(
            &user_data,
            RegistrationErrors {
                photo_url: Some("Photo URL must be a http or https URL"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return registration_form(
                &user_data,
                RegistrationErrors {
                    password: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            &user_data,
            RegistrationErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let new_user = NewUser {
        email,
        display_name: optional_field(&user_data.display_name),
        photo_url,
        password_hash,
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        create_user(new_user, &connection)
    };

    match user {
        Ok(user) => match set_auth_cookie(jar, user.id, state.cookie_duration) {
            Ok(jar) => (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                jar,
            )
                .into_response(),
            Err(error) => {
                tracing::error!("An error occurred while setting the auth cookie: {error}");
                get_internal_server_error_redirect()
            }
        },
        Err(Error::DuplicateEmail) => registration_form(
            &user_data,
            RegistrationErrors {
                email: Some("This email address is already registered, try logging in instead."),
                ..Default::default()
            },
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            get_internal_server_error_redirect()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{Router, routing::post};
    use axum_test::{TestResponse, TestServer};
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        PasswordHash,
        app_state::create_cookie_key,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, NewUser, create_user, create_user_table,
            get_user_by_email,
        },
        endpoints,
    };

    use super::{RegisterForm, RegistrationState, register_user};

    const STRONG_PASSWORD: &str = "iamtestingwhethericancreateanewuser";

    fn get_test_state() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        RegistrationState {
            cookie_key: create_cookie_key("42"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_test_server(state: RegistrationState) -> TestServer {
        let app = Router::new()
            .route(endpoints::USERS, post(register_user))
            .with_state(state);

        TestServer::new(app)
    }

    fn valid_form() -> RegisterForm {
        RegisterForm {
            email: "ada@example.com".to_owned(),
            display_name: "Ada".to_owned(),
            photo_url: String::new(),
            password: STRONG_PASSWORD.to_owned(),
            confirm_password: STRONG_PASSWORD.to_owned(),
        }
    }

    #[track_caller]
    fn assert_field_error(response: &TestResponse, field_id: &str) {
        let html = Html::parse_fragment(&response.text());
        let selector = Selector::parse(&format!("#{field_id} + p.text-red-500")).unwrap();

        assert!(
            html.select(&selector).next().is_some(),
            "expected an error message after #{field_id} in {}",
            html.html()
        );
    }

    #[tokio::test]
    async fn create_user_succeeds() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server.post(endpoints::USERS).form(&valid_form()).await;

        response.assert_status_see_other();
        assert_eq!(response.header("hx-redirect"), endpoints::TRANSACTIONS_VIEW);
        response.cookie(COOKIE_TOKEN);

        let user = get_user_by_email("ada@example.com", &state.db_connection.lock().unwrap())
            .expect("user was not created");
        assert_eq!(user.display_name.as_deref(), Some("Ada"));
        assert_eq!(user.photo_url, None);
    }

    #[tokio::test]
    async fn create_user_fails_with_existing_email() {
        let state = get_test_state();
        create_user(
            NewUser {
                email: EmailAddress::from_str("ada@example.com").unwrap(),
                display_name: None,
                photo_url: None,
                password_hash: PasswordHash::new_unchecked("hash"),
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let server = get_test_server(state);

        let response = server.post(endpoints::USERS).form(&valid_form()).await;

        response.assert_status_ok();
        assert_field_error(&response, "email");
    }

    #[tokio::test]
    async fn create_user_fails_with_invalid_email() {
        let server = get_test_server(get_test_state());
        let form = RegisterForm {
            email: "not an email".to_owned(),
            ..valid_form()
        };

        let response = server.post(endpoints::USERS).form(&form).await;

        response.assert_status_ok();
        assert_field_error(&response, "email");
    }

    #[tokio::test]
    async fn create_user_fails_with_invalid_photo_url() {
        let server = get_test_server(get_test_state());
        let form = RegisterForm {
            photo_url: "ftp://example.com/me.png".to_owned(),
            ..valid_form()
        };

        let response = server.post(endpoints::USERS).form(&form).await;

        response.assert_status_ok();
        assert_field_error(&response, "photo_url");
    }

    #[tokio::test]
    async fn create_user_fails_with_weak_password() {
        let server = get_test_server(get_test_state());
        let form = RegisterForm {
            password: "foo".to_owned(),
            confirm_password: "foo".to_owned(),
            ..valid_form()
        };

        let response = server.post(endpoints::USERS).form(&form).await;

        response.assert_status_ok();
        assert_field_error(&response, "password");
    }

    #[tokio::test]
    async fn create_user_fails_with_mismatched_passwords() {
        let server = get_test_server(get_test_state());
        let form = RegisterForm {
            confirm_password: "thisisadifferentpasswordentirely".to_owned(),
            ..valid_form()
        };

        let response = server.post(endpoints::USERS).form(&form).await;

        response.assert_status_ok();
        assert_field_error(&response, "confirm-password");
    }
}
