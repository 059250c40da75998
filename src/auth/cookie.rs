//! Defines functions for storing sessions in encrypted cookies.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{Token, UserID},
};

pub(crate) const COOKIE_SESSION: &str = "session";
/// The default duration for which session cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::days(1);

/// Add a session cookie to the cookie jar.
///
/// `user_id` is set for staff log-ins and `None` for log-ins with a shared
/// view password. Sets the initial expiry of the cookie to `duration` from
/// the current time.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the token cannot be serialized.
pub fn set_session_cookie(
    jar: PrivateCookieJar,
    user_id: Option<UserID>,
    view_access: bool,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = Token {
        user_id,
        view_access,
        expires_at: OffsetDateTime::now_utc() + duration,
    };

    add_token_cookie(jar, &token)
}

fn add_token_cookie(jar: PrivateCookieJar, token: &Token) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, value))
            .path("/")
            .expires(token.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the session token from the cookie jar.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no session cookie.
/// - [Error::InvalidSession] if the cookie cannot be decoded or the session has expired.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::CookieMissing)?;

    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::InvalidSession)?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::InvalidSession);
    }

    Ok(token)
}

/// Set the expiry of the session cookie in `jar` to the latest of UTC now
/// plus `duration` and the session's current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns:
/// - [Error::CookieMissing] or [Error::InvalidSession] if there is no valid session.
/// - [Error::InvalidSession] if extending the session by `duration` would overflow the date time.
pub(crate) fn extend_session_cookie(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or(Error::InvalidSession)?;

    let token = Token {
        expires_at: max(token.expires_at, new_expiry),
        ..token
    };

    add_token_cookie(jar, &token)
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{Token, UserID},
    };

    use super::{
        COOKIE_SESSION, DEFAULT_COOKIE_DURATION, add_token_cookie, extend_session_cookie,
        get_token_from_cookies, invalidate_session_cookie, set_session_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_staff_session() {
        let jar = set_session_cookie(
            get_jar(),
            Some(UserID::new(1)),
            true,
            DEFAULT_COOKIE_DURATION,
        )
        .unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(token.user_id, Some(UserID::new(1)));
        assert!(token.view_access);
        assert_date_time_close!(
            token.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn can_set_family_session() {
        let jar = set_session_cookie(get_jar(), None, true, DEFAULT_COOKIE_DURATION).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();

        assert_eq!(token.user_id, None);
        assert!(token.view_access);
    }

    #[test]
    fn missing_cookie_is_an_error() {
        assert_eq!(
            get_token_from_cookies(&get_jar()),
            Err(Error::CookieMissing)
        );
    }

    #[test]
    fn garbage_cookie_is_invalid() {
        let jar = get_jar().add(Cookie::new(COOKIE_SESSION, "FOOBAR"));

        assert_eq!(get_token_from_cookies(&jar), Err(Error::InvalidSession));
    }

    #[test]
    fn expired_session_is_invalid() {
        let token = Token {
            user_id: Some(UserID::new(1)),
            view_access: true,
            expires_at: OffsetDateTime::now_utc() - Duration::minutes(1),
        };
        let jar = add_token_cookie(get_jar(), &token).unwrap();

        assert_eq!(get_token_from_cookies(&jar), Err(Error::InvalidSession));
    }

    #[test]
    fn can_extend_session() {
        let jar = set_session_cookie(get_jar(), None, true, Duration::seconds(5)).unwrap();

        let jar = extend_session_cookie(jar, Duration::minutes(10)).unwrap();
        let token = get_token_from_cookies(&jar).unwrap();
        let cookie = jar.get(COOKIE_SESSION).unwrap();
        let want = OffsetDateTime::now_utc() + Duration::minutes(10);

        assert_date_time_close!(token.expires_at, want);
        assert_date_time_close!(cookie.expires_datetime().unwrap(), want);
    }

    #[test]
    fn extending_never_shortens_session() {
        let jar = set_session_cookie(get_jar(), None, true, Duration::days(7)).unwrap();
        let want = get_token_from_cookies(&jar).unwrap().expires_at;

        let jar = extend_session_cookie(jar, Duration::seconds(5)).unwrap();

        assert_eq!(get_token_from_cookies(&jar).unwrap().expires_at, want);
    }

    #[test]
    fn invalidate_session_succeeds() {
        let jar = set_session_cookie(
            get_jar(),
            Some(UserID::new(1)),
            true,
            DEFAULT_COOKIE_DURATION,
        )
        .unwrap();

        let jar = invalidate_session_cookie(jar);
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(get_token_from_cookies(&jar), Err(Error::InvalidSession));
    }
}
