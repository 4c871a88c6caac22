use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::tests::test_support::{base_config, client_with_tokens};
use crate::{Error, RefreshError, StorefrontClient};

#[tokio::test]
async fn rejected_refresh_fails_all_waiters_and_terminates_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string("token blacklisted")
                .set_delay(Duration::from_millis(250)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server.uri(), "expired-access", "dead-refresh").await;
    let mut invalidated = client.session().invalidated();
    assert!(!*invalidated.borrow_and_update());

    let (a, b, c) = tokio::join!(client.products(), client.products(), client.products());
    for outcome in [a, b, c] {
        match outcome {
            Err(Error::SessionExpired(RefreshError::Rejected { status, .. })) => {
                assert_eq!(status.as_u16(), 401);
            }
            other => panic!("expected session-expired rejection, got {other:?}"),
        }
    }

    // One terminal signal for the whole episode, both tokens gone.
    assert!(*invalidated.borrow_and_update());
    assert!(client.session().is_terminated());
    assert!(client.credentials().snapshot().await.is_empty());
}

#[tokio::test]
async fn missing_refresh_token_terminates_without_any_refresh_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // Persisted pair with the refresh half already gone.
    let creds_path = std::path::PathBuf::from(format!(
        "target/creds-missing-refresh-{}.json",
        server.address().port()
    ));
    std::fs::create_dir_all("target").ok();
    std::fs::write(
        &creds_path,
        r#"{"access":"expired-access","refresh":null}"#,
    )
    .unwrap();

    let mut config = base_config(&server.uri());
    config.credentials_path = Some(creds_path.clone());
    let client = StorefrontClient::new(config).expect("client");

    let (a, b) = tokio::join!(client.products(), client.products());
    for outcome in [a, b] {
        match outcome {
            Err(Error::SessionExpired(RefreshError::MissingRefreshToken)) => {}
            other => panic!("expected missing-refresh-token rejection, got {other:?}"),
        }
    }

    assert!(client.credentials().snapshot().await.is_empty());
    // Teardown is persisted: a store reopened from the same file is empty.
    let reopened = crate::CredentialStore::open(creds_path).expect("reopen");
    assert!(reopened.snapshot().await.is_empty());
}

#[tokio::test]
async fn malformed_refresh_response_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // 2xx without a usable access token counts as failure.
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server.uri(), "expired-access", "live-refresh").await;
    match client.products().await {
        Err(Error::SessionExpired(RefreshError::MalformedResponse)) => {}
        other => panic!("expected malformed-response rejection, got {other:?}"),
    }
    assert!(client.credentials().snapshot().await.is_empty());
}
