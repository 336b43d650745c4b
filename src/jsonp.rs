// Strips `callback(...)` wrappers from feed bodies before JSON parsing.

use crate::error::{LookupError, Result};

/// Return the raw JSON payload of a possibly JSONP-wrapped body.
///
/// A body that starts with an identifier followed by `(` must close with `)`
/// (optionally followed by `;`). Anything else is returned trimmed and untouched.
pub fn unwrap_jsonp(body: &str) -> Result<&str> {
    let text = body.trim();

    let ident_len = callback_name_len(text);
    if ident_len == 0 || !text[ident_len..].starts_with('(') {
        return Ok(text);
    }

    let inner = &text[ident_len + 1..];
    let inner = inner.strip_suffix(';').unwrap_or(inner).trim_end();
    match inner.strip_suffix(')') {
        Some(payload) => Ok(payload.trim()),
        None => Err(LookupError::Malformed(format!(
            "unterminated JSONP wrapper `{}(`",
            &text[..ident_len]
        ))),
    }
}

/// Byte length of a leading JS identifier (dotted paths allowed), or 0.
fn callback_name_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.')))
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_wrapped_body() {
        let body = r#"getNinjaList({"list":[]})"#;
        assert_eq!(unwrap_jsonp(body).unwrap(), r#"{"list":[]}"#);
    }

    #[test]
    fn test_unwrap_with_semicolon_and_whitespace() {
        let body = "\n  getNinjaData( {\"a\":1} );\n";
        assert_eq!(unwrap_jsonp(body).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_unwrap_dotted_callback() {
        assert_eq!(unwrap_jsonp("window.cb([1,2])").unwrap(), "[1,2]");
    }

    #[test]
    fn test_plain_json_passes_through() {
        assert_eq!(unwrap_jsonp("  {\"list\":[]}  ").unwrap(), "{\"list\":[]}");
        assert_eq!(unwrap_jsonp("[1]").unwrap(), "[1]");
        assert_eq!(unwrap_jsonp("").unwrap(), "");
    }

    #[test]
    fn test_bare_word_is_not_a_wrapper() {
        // Not followed by `(`, left for the JSON parser to reject.
        assert_eq!(unwrap_jsonp("null").unwrap(), "null");
    }

    #[test]
    fn test_unterminated_wrapper_is_malformed() {
        let err = unwrap_jsonp("getNinjaList({\"list\":[]}").unwrap_err();
        assert!(matches!(err, LookupError::Malformed(_)));
    }
}
