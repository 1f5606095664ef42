use http_body_util::BodyExt;
use quill_core::config::QuillConfig;
use quill_core::http::response::IntoResponse;
use quill_core::http::StatusCode;
use quill_core::HttpError;
use quill_security::{SessionCodec, SessionConfig, SessionError};

#[tokio::test]
async fn session_errors_are_unauthorized() {
    for err in [
        SessionError::Malformed,
        SessionError::Expired,
        SessionError::DigestMismatch,
        SessionError::UnknownUser("u1".into()),
    ] {
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Unauthorized");
    }
}

#[test]
fn session_error_maps_to_http_error() {
    let err: HttpError = SessionError::InvalidExpiry("x".into()).into();
    assert!(matches!(err, HttpError::Unauthorized(msg) if msg == "Unauthorized"));
}

#[test]
fn config_section_with_defaults() {
    let config = QuillConfig::from_yaml_str("session:\n  secret: Awesome\n", "test").unwrap();
    let session: SessionConfig = config.section().unwrap();
    assert_eq!(session, SessionConfig::new("Awesome"));
    assert_eq!(session.cookie_name, "awesession");
    assert_eq!(session.max_age, 86400);
}

#[test]
fn config_section_overrides() {
    let config = QuillConfig::from_yaml_str(
        "session:\n  secret: s\n  cookie_name: sid\n  max_age: 60\n",
        "test",
    )
    .unwrap();
    let session: SessionConfig = config.section().unwrap();
    assert_eq!(session, SessionConfig::new("s").with_cookie_name("sid").with_max_age(60));
}

#[test]
fn missing_secret_is_an_error() {
    let config = QuillConfig::from_yaml_str("session:\n  max_age: 60\n", "test").unwrap();
    assert!(config.section::<SessionConfig>().is_err());
}

#[test]
fn codec_uses_configured_name_and_lifetime() {
    let codec = SessionCodec::new(SessionConfig::new("s").with_cookie_name("sid").with_max_age(60));
    assert_eq!(codec.cookie_name(), "sid");
    let cookie = codec.encode("u1", "pw");
    let claim = codec.parse(&cookie).unwrap();
    assert_eq!(claim.uid, "u1");
    assert!(codec.verify(&claim, "pw").is_ok());
    assert!(codec.set_cookie("u1", "pw").contains("; Max-Age=60;"));
}
