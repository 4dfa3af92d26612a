//! One-shot notices carried across a redirect in a cookie.
//!
//! The cookie value is `<level>:<url-encoded message>`. Reading it removes it.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::notice::{Notice, NoticeLevel};

pub const FLASH_COOKIE: &str = "flash";

/// Store `notice` for the next page view.
pub fn set_flash(jar: CookieJar, notice: &Notice) -> CookieJar {
    let value = format!(
        "{}:{}",
        notice.level,
        urlencoding::encode(&notice.message)
    );

    let cookie = Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    jar.add(cookie)
}

/// Take the pending notice, if any, and clear the cookie.
///
/// Malformed values are discarded.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Notice>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };

    let notice = decode(cookie.value());
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, notice)
}

fn decode(value: &str) -> Option<Notice> {
    let (level, message) = value.split_once(':')?;
    let level = level.parse::<NoticeLevel>().ok()?;
    let message = urlencoding::decode(message).ok()?;
    Some(Notice::new(level, message.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};

    fn jar_with(value: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", FLASH_COOKIE, value)).unwrap(),
        );
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn test_set_flash_encodes_level_and_message() {
        let jar = set_flash(CookieJar::new(), &Notice::success("Product 'Malbec' created"));
        let cookie = jar.get(FLASH_COOKIE).unwrap();
        assert!(cookie.value().starts_with("success:"));
        assert!(!cookie.value().contains(' '));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_take_flash_reads_and_clears() {
        let (jar, notice) = take_flash(jar_with("danger:Product%20not%20found"));
        assert_eq!(notice, Some(Notice::danger("Product not found")));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn test_take_flash_without_cookie() {
        let (_, notice) = take_flash(CookieJar::new());
        assert!(notice.is_none());
    }

    #[test]
    fn test_malformed_values_are_discarded() {
        assert!(decode("no-separator").is_none());
        assert!(decode("shout:hello").is_none());
        assert_eq!(decode("info:"), Some(Notice::info("")));
    }
}
