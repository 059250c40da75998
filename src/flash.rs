//! One-shot messages that survive a redirect.
//!
//! A handler that redirects stores a [Flash] in a private cookie, and the next
//! page that is rendered takes it out of the cookie jar and displays it.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};

use crate::alert::Alert;

pub(crate) const COOKIE_FLASH: &str = "flash";

/// Whether a flash message reports a success or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

/// A message to show the user on the next page they load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn into_alert(self) -> Alert {
        match self.level {
            FlashLevel::Success => Alert::SuccessSimple {
                message: self.message,
            },
            FlashLevel::Error => Alert::ErrorSimple {
                message: self.message,
            },
        }
    }
}

/// Store `flash` in the cookie jar, replacing any message that has not been shown yet.
pub fn set_flash(jar: PrivateCookieJar, flash: Flash) -> PrivateCookieJar {
    let value = match serde_json::to_string(&flash) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!("Could not serialize flash message {flash:?}: {error}");
            return jar;
        }
    };

    jar.add(
        Cookie::build((COOKIE_FLASH, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Remove the flash message from the cookie jar, returning it if there was a valid one.
pub fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(COOKIE_FLASH) else {
        return (jar, None);
    };

    let flash = match serde_json::from_str(cookie.value_trimmed()) {
        Ok(flash) => Some(flash),
        Err(error) => {
            tracing::warn!("Discarding malformed flash cookie: {error}");
            None
        }
    };

    (jar.remove(Cookie::build(COOKIE_FLASH).path("/")), flash)
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};

    use crate::alert::Alert;

    use super::{COOKIE_FLASH, Flash, set_flash, take_flash};

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(Key::from(&Sha512::digest("flashy")))
    }

    #[test]
    fn take_returns_stored_message() {
        let jar = set_flash(get_jar(), Flash::success("Expense added successfully!"));

        let (jar, flash) = take_flash(jar);

        assert_eq!(flash, Some(Flash::success("Expense added successfully!")));
        assert!(jar.get(COOKIE_FLASH).is_none());
    }

    #[test]
    fn take_on_empty_jar_returns_none() {
        let (_, flash) = take_flash(get_jar());

        assert_eq!(flash, None);
    }

    #[test]
    fn later_flash_replaces_earlier_one() {
        let jar = set_flash(get_jar(), Flash::success("first"));
        let jar = set_flash(jar, Flash::error("second"));

        let (_, flash) = take_flash(jar);

        assert_eq!(flash, Some(Flash::error("second")));
    }

    #[test]
    fn error_flash_becomes_error_alert() {
        let alert = Flash::error("nope").into_alert();

        assert_eq!(
            alert,
            Alert::ErrorSimple {
                message: "nope".to_owned()
            }
        );
    }
}
