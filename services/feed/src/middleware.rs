//! Response middleware

use axum::{
    http::{HeaderValue, header::CONTENT_TYPE},
    response::Response,
};

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Declare the charset on every JSON response
pub async fn json_charset(mut response: Response) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));

    if is_json {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
    }

    response
}
