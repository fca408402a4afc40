//! Session cookie rendering and parsing.

use crate::config::SessionConfig;

/// `Set-Cookie` value that stores `token` for the configured lifetime.
///
/// ```
/// use linkboard_auth::{cookie, SessionConfig};
///
/// let config = SessionConfig::new(vec![0; 32]);
/// assert_eq!(
///     cookie::session_cookie(&config, "abc"),
///     "linkboard_session=abc; Path=/; Max-Age=604800; HttpOnly; SameSite=Lax"
/// );
/// ```
#[must_use]
pub fn session_cookie(config: &SessionConfig, token: &str) -> String {
    render(config, token, config.max_age_secs())
}

/// `Set-Cookie` value that deletes the session cookie.
#[must_use]
pub fn clear_cookie(config: &SessionConfig) -> String {
    render(config, "", 0)
}

fn render(config: &SessionConfig, value: &str, max_age: i64) -> String {
    let mut cookie = format!(
        "{}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite={}",
        config.cookie_name,
        config.same_site.as_str()
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Value of cookie `name` in a `Cookie` request header.
///
/// ```
/// use linkboard_auth::cookie::find_cookie;
///
/// assert_eq!(find_cookie("a=1; linkboard_session=tok; b=2", "linkboard_session"), Some("tok"));
/// assert_eq!(find_cookie("a=1", "linkboard_session"), None);
/// ```
#[must_use]
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}
