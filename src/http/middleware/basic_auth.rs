use crate::http::error::error_response;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;

#[derive(Clone, Debug)]
pub struct BasicCredentials {
    pub user: String,
    pub pass: String,
}

fn decode_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn require_basic_auth(
    State(expected): State<BasicCredentials>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(decode_basic);

    let authorized = supplied.is_some_and(|(user, pass)| {
        let user_ok = constant_time_eq(&user, &expected.user);
        let pass_ok = constant_time_eq(&pass, &expected.pass);
        user_ok && pass_ok
    });

    if !authorized {
        let mut resp = error_response(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "valid basic credentials are required",
        );
        resp.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"restricted\", charset=\"UTF-8\""),
        );
        return resp;
    }

    next.run(request).await
}
