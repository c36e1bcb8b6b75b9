//! Display of sequence members.

use std::borrow::Cow;

use integer_seq_sdk::Response;

/// Values longer than this are shortened when shortening is enabled.
pub const SHORTEN_THRESHOLD: usize = 50;
const KEPT_DIGITS: usize = 20;

/// Shortens a long value to its first and last 20 characters.
#[must_use]
pub fn shorten(value: &str) -> Cow<'_, str> {
    let len = value.chars().count();
    if len <= SHORTEN_THRESHOLD {
        return Cow::Borrowed(value);
    }
    let head: String = value.chars().take(KEPT_DIGITS).collect();
    let tail: String = value.chars().skip(len - KEPT_DIGITS).collect();
    Cow::Owned(format!(
        "{head}...[{} digits skipped]...{tail}",
        len - 2 * KEPT_DIGITS
    ))
}

/// Text shown for `response`. Error responses show their message.
#[must_use]
pub fn display_value(response: &Response, shorten_long: bool) -> String {
    let text = match response {
        Response::Int(v) => v.to_string(),
        Response::Text(s) => s.clone(),
        Response::Error(message) => return message.clone(),
    };
    if shorten_long {
        shorten(&text).into_owned()
    } else {
        text
    }
}
