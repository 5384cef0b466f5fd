//! End-to-end tests for the access gate.
//!
//! Each test builds the full router (layers included) and drives it with
//! `tower::ServiceExt::oneshot`: the cookie returned by `/api/verify-access`
//! is replayed against `/api/game` the way a browser would.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{InvalidHeaderValue, CACHE_CONTROL, CONTENT_TYPE, COOKIE, SET_COOKIE},
        HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode,
    },
    Router,
};
use gamegate::gate::{
    self,
    credential::{CredentialCarrier, CredentialPolicy, SessionCredential},
    GateConfig, GateState,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tower::ServiceExt;
use ulid::Ulid;

const GAME_HTML: &[u8] =
    b"<!DOCTYPE html><html><head><title>Just a Minute</title></head><body></body></html>";

struct Payload(PathBuf);

impl Payload {
    fn write(contents: &[u8]) -> Result<Self> {
        let path = temp_path();
        std::fs::write(&path, contents).context("failed to write payload fixture")?;
        Ok(Self(path))
    }
}

impl Drop for Payload {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn temp_path() -> PathBuf {
    std::env::temp_dir().join(format!("gamegate-it-{}.html", Ulid::new()))
}

fn config(access_code: Option<&str>, payload: &Path) -> GateConfig {
    GateConfig::new()
        .with_access_code(access_code.map(|code| SecretString::from(code.to_string())))
        .with_payload_path(payload)
}

fn app(access_code: Option<&str>, payload: &Path) -> Router {
    gate::router(Arc::new(GateState::new(config(access_code, payload))))
}

/// Carries the credential in a plain request header instead of a cookie.
#[derive(Debug)]
struct HeaderCarrier;

const ACCESS_HEADER: &str = "x-game-access";

impl CredentialCarrier for HeaderCarrier {
    fn issue(
        &self,
        credential: &SessionCredential,
        _policy: &CredentialPolicy,
    ) -> Result<(HeaderName, HeaderValue), InvalidHeaderValue> {
        Ok((
            HeaderName::from_static(ACCESS_HEADER),
            HeaderValue::from_str(credential.value())?,
        ))
    }

    fn read(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(ACCESS_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
    }
}

async fn verify(app: &Router, body: &str) -> Result<Response<Body>> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/verify-access")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
        )
        .await?;
    Ok(response)
}

async fn fetch_game(app: &Router, cookie: Option<&str>) -> Result<Response<Body>> {
    let mut request = Request::builder().method("GET").uri("/api/game");
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    let response = app.clone().oneshot(request.body(Body::empty())?).await?;
    Ok(response)
}

/// Turn a `Set-Cookie` header into the `Cookie` header a browser would send back.
fn cookie_from(response: &Response<Body>) -> Result<String> {
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?;
    let pair = set_cookie
        .split(';')
        .next()
        .context("empty Set-Cookie")?
        .trim();
    Ok(pair.to_string())
}

async fn json_body(response: Response<Body>) -> Result<Value> {
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[tokio::test]
async fn correct_code_unlocks_the_game() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;
    let app = app(Some("letmein"), &payload.0);

    let response = verify(&app, r#"{"accessCode":"letmein"}"#).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = cookie_from(&response)?;
    assert_eq!(cookie, "game_access=granted");

    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert!(set_cookie.contains("Path=/"));
    assert!(!set_cookie.contains("Secure"));

    let body = json_body(response).await?;
    assert_eq!(body["success"], json!(true));

    let game = fetch_game(&app, Some(&cookie)).await?;
    assert_eq!(game.status(), StatusCode::OK);
    assert_eq!(game.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(game.headers()["x-content-type-options"], "nosniff");
    assert_eq!(game.headers()["x-frame-options"], "DENY");
    assert_eq!(game.headers()[CACHE_CONTROL], "private, max-age=3600");

    let bytes = to_bytes(game.into_body(), usize::MAX).await?;
    assert_eq!(bytes.as_ref(), GAME_HTML);
    Ok(())
}

#[tokio::test]
async fn wrong_code_keeps_the_game_locked() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;
    let app = app(Some("letmein"), &payload.0);

    let response = verify(&app, r#"{"accessCode":"wrong"}"#).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(
        json_body(response).await?,
        json!({ "error": "Invalid access code" })
    );

    let game = fetch_game(&app, None).await?;
    assert_eq!(game.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(game).await?,
        json!({ "error": "Unauthorized. Please enter a valid access code." })
    );
    Ok(())
}

#[tokio::test]
async fn valid_cookie_with_missing_payload_is_not_found() -> Result<()> {
    let app = app(Some("letmein"), &temp_path());

    let response = verify(&app, r#"{"accessCode":"letmein"}"#).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = cookie_from(&response)?;

    let game = fetch_game(&app, Some(&cookie)).await?;
    assert_eq!(game.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(game).await?,
        json!({ "error": "Game file not found" })
    );
    Ok(())
}

#[tokio::test]
async fn missing_access_code_field_is_bad_request() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;
    let app = app(Some("letmein"), &payload.0);

    let response = verify(&app, "{}").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(
        json_body(response).await?,
        json!({ "error": "Invalid request" })
    );
    Ok(())
}

#[tokio::test]
async fn unset_secret_never_reports_invalid_code() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;
    let app = app(None, &payload.0);

    for body in [r#"{"accessCode":"letmein"}"#, r#"{"accessCode":"wrong"}"#] {
        let response = verify(&app, body).await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(
            json_body(response).await?,
            json!({ "error": "Server configuration error" })
        );
    }
    Ok(())
}

#[tokio::test]
async fn repeated_issuance_yields_independent_credentials() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;
    let app = app(Some("letmein"), &payload.0);

    let first = cookie_from(&verify(&app, r#"{"accessCode":"letmein"}"#).await?)?;
    let second = cookie_from(&verify(&app, r#"{"accessCode":"letmein"}"#).await?)?;

    for cookie in [&first, &second] {
        let game = fetch_game(&app, Some(cookie)).await?;
        assert_eq!(game.status(), StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn credential_survives_a_restart() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;

    let issuer = app(Some("letmein"), &payload.0);
    let cookie = cookie_from(&verify(&issuer, r#"{"accessCode":"letmein"}"#).await?)?;

    // A fresh router shares nothing with the one that issued the cookie.
    let restarted = app(Some("letmein"), &payload.0);
    let game = fetch_game(&restarted, Some(&cookie)).await?;
    assert_eq!(game.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn forged_cookies_are_rejected() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;
    let app = app(Some("letmein"), &payload.0);

    for cookie in [
        "game_access=letmein",
        "game_access=true",
        "game_access=",
        "session=granted",
    ] {
        let game = fetch_game(&app, Some(cookie)).await?;
        assert_eq!(game.status(), StatusCode::UNAUTHORIZED, "cookie {cookie}");
        let body = to_bytes(game.into_body(), usize::MAX).await?;
        assert!(!body.starts_with(b"<!DOCTYPE html>"));
    }
    Ok(())
}

#[tokio::test]
async fn request_id_is_generated_and_propagated() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;
    let app = app(Some("letmein"), &payload.0);

    let generated = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(generated.status(), StatusCode::OK);
    let request_id = generated
        .headers()
        .get("x-request-id")
        .context("missing x-request-id")?
        .to_str()?;
    assert!(Ulid::from_string(request_id).is_ok());

    let echoed = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "client-supplied")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(echoed.headers()["x-request-id"], "client-supplied");
    Ok(())
}

#[tokio::test]
async fn wrong_methods_are_rejected() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;
    let app = app(Some("letmein"), &payload.0);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/verify-access")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/game")
                .header(COOKIE, "game_access=granted")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn secure_mode_marks_the_cookie_secure() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;
    let state = GateState::new(config(Some("letmein"), &payload.0).with_secure_cookies(true));
    let app = gate::router(Arc::new(state));

    let response = verify(&app, r#"{"accessCode":"letmein"}"#).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?;
    assert!(set_cookie.ends_with("; Secure"));
    assert!(set_cookie.contains("HttpOnly"));

    let game = fetch_game(&app, Some(&cookie_from(&response)?)).await?;
    assert_eq!(game.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn favicon_links_follow_configuration() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;

    let plain = app(Some("letmein"), &payload.0);
    let cookie = cookie_from(&verify(&plain, r#"{"accessCode":"letmein"}"#).await?)?;
    let game = fetch_game(&plain, Some(&cookie)).await?;
    let bytes = to_bytes(game.into_body(), usize::MAX).await?;
    assert_eq!(bytes.as_ref(), GAME_HTML);

    let state = GateState::new(config(Some("letmein"), &payload.0).with_favicon_links(true));
    let decorated = gate::router(Arc::new(state));
    let game = fetch_game(&decorated, Some(&cookie)).await?;
    assert_eq!(game.status(), StatusCode::OK);
    let html = String::from_utf8(to_bytes(game.into_body(), usize::MAX).await?.to_vec())?;
    assert!(html.contains(r#"<link rel="icon" type="image/x-icon" href="/favicon.ico" />"#));
    assert!(html.contains(r#"<link rel="apple-touch-icon" href="/favicon.ico" />"#));
    assert!(html.starts_with("<!DOCTYPE html><html><head><title>Just a Minute</title>"));
    assert!(html.ends_with("</head><body></body></html>"));
    Ok(())
}

#[tokio::test]
async fn custom_carrier_replaces_the_cookie() -> Result<()> {
    let payload = Payload::write(GAME_HTML)?;
    let state = GateState::new(config(Some("letmein"), &payload.0))
        .with_carrier(Arc::new(HeaderCarrier));
    let app = gate::router(Arc::new(state));

    let response = verify(&app, r#"{"accessCode":"letmein"}"#).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let issued = response
        .headers()
        .get(ACCESS_HEADER)
        .context("missing access header")?
        .to_str()?
        .to_string();
    assert_eq!(issued, "granted");

    // The cookie transport is no longer consulted.
    let game = fetch_game(&app, Some("game_access=granted")).await?;
    assert_eq!(game.status(), StatusCode::UNAUTHORIZED);

    let game = app
        .oneshot(
            Request::builder()
                .uri("/api/game")
                .header(ACCESS_HEADER, issued)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(game.status(), StatusCode::OK);
    let bytes = to_bytes(game.into_body(), usize::MAX).await?;
    assert_eq!(bytes.as_ref(), GAME_HTML);
    Ok(())
}
