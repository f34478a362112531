//! The page header showing the signed-in user and a sign-out link.

use maud::{Markup, html};

use crate::{auth::User, endpoints};

/// Shown when the user has not set a photo URL.
pub const PLACEHOLDER_PHOTO_URL: &str = "https://placehold.co/32x32/png";

/// The header displayed at the top of every page for logged in users.
pub struct Header<'a> {
    display_name: Option<&'a str>,
    photo_url: Option<&'a str>,
}

impl<'a> Header<'a> {
    pub fn new(user: &'a User) -> Self {
        Self {
            display_name: user.display_name.as_deref(),
            photo_url: user.photo_url.as_deref(),
        }
    }

    pub fn into_html(self) -> Markup {
        let photo_url = self.photo_url.unwrap_or(PLACEHOLDER_PHOTO_URL);

        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            header class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::TRANSACTIONS_VIEW)
                        class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "💸 Pocket Ledger"
                    }

                    div class="flex items-center gap-3"
                    {
                        img
                            src=(photo_url)
                            alt="User photo"
                            width="32"
                            height="32"
                            class="w-8 h-8 rounded-full";

                        @if let Some(display_name) = self.display_name {
                            span
                                class="text-sm font-medium text-gray-900 dark:text-white"
                                data-display-name="true"
                            {
                                (display_name)
                            }
                        }

                        a
                            href=(endpoints::LOG_OUT)
                            class="text-sm text-gray-900 hover:text-blue-700 dark:text-white
                                dark:hover:text-blue-500"
                        {
                            "Sign out"
                        }
                    }
                }
            }
        )
    }
}
