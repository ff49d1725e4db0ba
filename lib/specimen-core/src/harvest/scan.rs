//! Embedded payload extraction.
//!
//! The documentation page inlines its whole data model in a script
//! assignment:
//!
//! ```html
//! <script>window.__DATA__ = {"schema":{"paths":{...}}};</script>
//! ```
//!
//! The scanner locates that assignment and captures the JSON value on its
//! right-hand side, leaving the terminator and anything after it behind.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

/// Matches the page data assignment up to the start of its JSON value.
static DATA_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"window\.__DATA__\s*=\s*").expect("a valid regex"));

/// Extracts the raw JSON payload embedded in the document's script elements.
///
/// Scripts are visited in document order and each successful match replaces
/// the previous one, so the last assignment wins. Returns `None` when no
/// script carries the assignment followed by a well-formed JSON value.
pub(super) fn extract_embedded_json(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").ok()?;

    let mut payload = None;
    for element in document.select(&selector) {
        let text = element.text().collect::<String>();
        if let Some(found) = capture_assignment(&text) {
            debug!(bytes = found.len(), "captured embedded payload");
            payload = Some(found.to_string());
        }
    }
    payload
}

/// Finds the assignment inside one script body and slices out its value.
fn capture_assignment(script: &str) -> Option<&str> {
    let assignment = DATA_ASSIGNMENT.find(script)?;
    let rest = script.get(assignment.end()..)?;
    leading_json_value(rest)
}

/// Measures one balanced JSON value at the start of the input and returns
/// the slice holding it verbatim.
///
/// The streaming deserializer stops at the end of the first value, so the
/// statement terminator never needs any offset arithmetic.
fn leading_json_value(input: &str) -> Option<&str> {
    let mut stream = serde_json::Deserializer::from_str(input).into_iter::<serde_json::Value>();
    match stream.next()? {
        Ok(_) => input.get(..stream.byte_offset()),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_extract_payload_from_head_script() {
        let html = r#"
            <html>
            <head>
                <script>window.__DATA__ = {"schema":{"paths":{}}};</script>
            </head>
            <body>content</body>
            </html>
        "#;

        let payload = extract_embedded_json(html);
        assert_eq!(payload.as_deref(), Some(r#"{"schema":{"paths":{}}}"#));
    }

    #[test]
    fn should_ignore_the_statement_terminator_and_trailing_code() {
        let html = r#"<script>window.__DATA__ = {"a": [1, 2]}; window.other = 1;</script>"#;

        let payload = extract_embedded_json(html);
        assert_eq!(payload.as_deref(), Some(r#"{"a": [1, 2]}"#));
    }

    #[test]
    fn should_tolerate_whitespace_around_the_assignment() {
        let html = "<script>window.__DATA__={\"compact\":true};</script>";

        let payload = extract_embedded_json(html);
        assert_eq!(payload.as_deref(), Some(r#"{"compact":true}"#));
    }

    #[test]
    fn should_keep_braces_and_semicolons_inside_strings() {
        let html = r#"<script>window.__DATA__ = {"note": "a; b} c"};</script>"#;

        let payload = extract_embedded_json(html);
        assert_eq!(payload.as_deref(), Some(r#"{"note": "a; b} c"}"#));
    }

    #[test]
    fn should_keep_the_last_assignment_when_several_scripts_match() {
        let html = r#"
            <script>window.__DATA__ = {"first": 1};</script>
            <script>window.__DATA__ = {"second": 2};</script>
        "#;

        let payload = extract_embedded_json(html);
        assert_eq!(payload.as_deref(), Some(r#"{"second": 2}"#));
    }

    #[test]
    fn should_return_none_without_an_assignment() {
        let html = "<html><body>No data here</body></html>";
        assert_eq!(extract_embedded_json(html), None);
    }

    #[test]
    fn should_return_none_when_the_value_is_not_json() {
        let html = "<script>window.__DATA__ = fetchLater();</script>";
        assert_eq!(extract_embedded_json(html), None);
    }

    #[test]
    fn should_match_scripts_outside_the_head() {
        let html = r#"
            <html>
            <head><script>analytics();</script></head>
            <body><script>window.__DATA__ = {"late": true};</script></body>
            </html>
        "#;

        let payload = extract_embedded_json(html);
        assert_eq!(payload.as_deref(), Some(r#"{"late": true}"#));
    }
}
