// SPDX-License-Identifier: MIT

//! Classification of raw HTTP responses into a parsed JSON body or a
//! [`ConnectorError`].

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::{strip_braces, truncate, ConnectorError, MAX_MESSAGE_LEN};

/// HTML error text longer than this (after removing markup) is replaced
/// with [`HTML_FALLBACK`].
pub const HTML_MESSAGE_THRESHOLD: usize = 500;

pub const HTML_FALLBACK: &str = "Cannot parse error details";

pub const ERR_CANNOT_PROCESS: &str = "Can't process response from server";

/// Status codes for which an empty body is a successful response.
pub const EMPTY_RESPONSE_OK: [u16; 4] = [200, 201, 202, 204];

lazy_static! {
    // One pattern per element so a close tag only ends its own element.
    static ref RE_NOISE: Vec<Regex> = ["script", "style", "footer", "nav"]
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect();
    static ref RE_TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
}

pub fn is_success(status: u16) -> bool {
    (200..399).contains(&status)
}

/// Classify a response. `Ok(None)` is an accepted empty response.
pub fn process_response(
    status: u16,
    content_type: &str,
    body: &str,
) -> Result<Option<JsonValue>, ConnectorError> {
    let content_type = content_type.to_lowercase();

    if body.trim().is_empty() {
        return process_empty_response(status);
    }

    if content_type.contains("json") {
        return process_json_response(status, body);
    }

    if content_type.contains("html") {
        return Err(process_html_response(status, body));
    }

    Err(ConnectorError::Parse(format!(
        "{}. Status Code: {}, Data from server: {}",
        ERR_CANNOT_PROCESS,
        status,
        truncate(&strip_braces(body), MAX_MESSAGE_LEN)
    )))
}

fn process_empty_response(status: u16) -> Result<Option<JsonValue>, ConnectorError> {
    if EMPTY_RESPONSE_OK.contains(&status) {
        return Ok(None);
    }
    Err(ConnectorError::Server {
        status,
        detail: "Empty response and no information in the header".to_string(),
        body: None,
    })
}

fn process_json_response(status: u16, body: &str) -> Result<Option<JsonValue>, ConnectorError> {
    let json: JsonValue = serde_json::from_str(body).map_err(|err| {
        ConnectorError::Parse(format!(
            "Unable to parse reply as a Json: {}, raw string reply: '{}'",
            err,
            truncate(&strip_braces(body), MAX_MESSAGE_LEN)
        ))
    })?;

    if is_success(status) {
        return Ok(Some(json));
    }

    let detail = truncate(&strip_braces(&json.to_string()), MAX_MESSAGE_LEN);
    Err(ConnectorError::Server {
        status,
        detail,
        body: Some(json),
    })
}

fn process_html_response(status: u16, body: &str) -> ConnectorError {
    let text = html_to_text(body);
    let detail = if text.is_empty() || text.chars().count() > HTML_MESSAGE_THRESHOLD {
        HTML_FALLBACK.to_string()
    } else {
        strip_braces(&text)
    };
    ConnectorError::Server {
        status,
        detail,
        body: None,
    }
}

/// Reduce an HTML document to its visible text on a single line.
pub fn html_to_text(html: &str) -> String {
    let mut html = html.to_string();
    for re in RE_NOISE.iter() {
        html = re.replace_all(&html, " ").into_owned();
    }
    let text = RE_TAG.replace_all(&html, " ");
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_json_success_returns_body_unchanged() {
        let body = r#"{"cluster_name":"es","status":"green","nested":{"a":[1,2]}}"#;
        for status in [200, 201, 302, 398] {
            let json = process_response(status, "application/json; charset=UTF-8", body)
                .unwrap()
                .unwrap();
            assert_eq!(json, serde_json::from_str::<JsonValue>(body).unwrap());
        }
    }

    #[test]
    fn test_json_error_status() {
        let body = r#"{"error":{"reason":"no such index"},"status":404}"#;
        let err = process_response(404, "application/json", body).unwrap_err();
        match err {
            ConnectorError::Server {
                status,
                detail,
                body,
            } => {
                assert_eq!(status, 404);
                assert!(!detail.contains('{'));
                assert!(!detail.contains('}'));
                assert!(detail.contains("no such index"));
                assert_eq!(body.unwrap()["status"], 404);
            }
            _ => panic!("unexpected error: {:?}", err),
        }

        // 399 is outside of the success range.
        assert!(process_response(399, "application/json", "{}").is_err());
        assert!(process_response(199, "application/json", "{}").is_err());
    }

    #[test]
    fn test_json_parse_error() {
        let err = process_response(200, "application/json", "{not json").unwrap_err();
        assert!(matches!(err, ConnectorError::Parse(_)));
        assert!(!err.to_string().contains('{'));
    }

    #[test]
    fn test_empty_response() {
        for status in EMPTY_RESPONSE_OK {
            assert!(process_response(status, "application/json", "")
                .unwrap()
                .is_none());
            assert!(process_response(status, "", "  \n").unwrap().is_none());
        }
        let err = process_response(500, "application/json", "").unwrap_err();
        assert!(matches!(err, ConnectorError::Server { status: 500, .. }));
    }

    #[test]
    fn test_html_response() {
        let html = r#"<html><head><style>body { color: red; }</style>
            <script>var x = {};</script></head>
            <body><nav>Home | About</nav>
            <h1>502   Bad
            Gateway</h1><footer>nginx</footer></body></html>"#;
        let err = process_response(502, "text/html", html).unwrap_err();
        match err {
            ConnectorError::Server { status, detail, .. } => {
                assert_eq!(status, 502);
                assert_eq!(detail, "502 Bad Gateway");
            }
            _ => panic!("unexpected error: {:?}", err),
        }
    }

    #[test]
    fn test_html_response_too_long() {
        let html = format!("<html><body><p>{}</p></body></html>", "word ".repeat(200));
        let err = process_response(500, "text/html; charset=utf-8", &html).unwrap_err();
        match err {
            ConnectorError::Server { detail, .. } => assert_eq!(detail, HTML_FALLBACK),
            _ => panic!("unexpected error: {:?}", err),
        }
    }

    #[test]
    fn test_html_is_error_even_with_success_status() {
        let err = process_response(200, "text/html", "<p>hello</p>").unwrap_err();
        assert!(matches!(err, ConnectorError::Server { status: 200, .. }));
    }

    #[test]
    fn test_unknown_content_type() {
        let err = process_response(200, "text/plain", "ok").unwrap_err();
        match err {
            ConnectorError::Parse(msg) => assert!(msg.starts_with(ERR_CANNOT_PROCESS)),
            _ => panic!("unexpected error: {:?}", err),
        }
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text("<div>\n  a\t<b>b</b>\n\n c </div>"),
            "a b c"
        );
        assert_eq!(html_to_text("<SCRIPT type=x>alert(1)</SCRIPT>x"), "x");
        assert_eq!(
            html_to_text("<nav>Home <script>x()</script> About</nav><p>Bad Gateway</p>"),
            "Bad Gateway"
        );
        assert_eq!(
            html_to_text("<footer><style>p {}</style>(c) 2024</footer>Down"),
            "Down"
        );
    }
}
