use wiremock::matchers::{body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pixauth::error::AuthError;
use pixauth::oauth::TokenClient;
use pixauth::proxy::ProxyConfig;

fn token_body() -> serde_json::Value {
    serde_json::json!({
        "access_token": "a",
        "refresh_token": "b",
        "expires_in": 3600,
        "token_type": "bearer",
        "scope": "",
        "user": {"id": "12345", "name": "someone", "account": "someone"}
    })
}

fn client_for(server: &MockServer) -> TokenClient {
    TokenClient::with_token_url(
        &ProxyConfig::direct(),
        format!("{}/auth/token", server.uri()),
    )
    .unwrap()
}

#[tokio::test]
async fn refresh_posts_refresh_grant_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        // wiremock's `header` matcher splits incoming values on commas, so the
        // comma inside "iPhone13,2" can never match it; `header_regex` sees the
        // raw value.
        .and(header_regex(
            "user-agent",
            r"^PixivIOSApp/7\.13\.3 \(iOS 14\.6; iPhone13,2\)$",
        ))
        .and(header("app-os", "ios"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=sometoken"))
        .and(body_string_contains("client_id=MOBrBDS8blbauoSck0ZfDbtuzpyT"))
        .and(body_string_contains("client_secret="))
        .and(body_string_contains("include_policy=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).refresh("sometoken").await.unwrap();

    assert_eq!(response.access_token, "a");
    assert_eq!(response.refresh_token, "b");
    assert_eq!(response.expires_in, 3600);
}

#[tokio::test]
async fn exchange_code_posts_authorization_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=ABC123"))
        .and(body_string_contains("code_verifier=test-verifier"))
        .and(body_string_contains("redirect_uri="))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .exchange_code("ABC123", "test-verifier")
        .await
        .unwrap();

    assert_eq!(response.access_token, "a");
    assert_eq!(response.user.unwrap()["id"], "12345");
}

#[tokio::test]
async fn body_without_access_token_is_reported_with_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"has_error": true, "error": "invalid_grant"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .refresh("expired")
        .await
        .unwrap_err();

    match err {
        AuthError::MalformedResponse { field, body } => {
            assert_eq!(field, "access_token");
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn error_status_body_surfaces_as_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "invalid_request"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).refresh("bad").await.unwrap_err();
    assert!(matches!(err, AuthError::MalformedResponse { .. }));
}
