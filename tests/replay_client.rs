//! Replay requests against a local mock of the login endpoint

use mockito::{Matcher, Server};
use rust_token_replay::{ActionToken, AuthError, AuthSessionClient, Identity, PipelineConfig};

fn config_for(server_url: &str) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.login_url = format!("{}/en/sign-in", server_url);
    config.client.timeout_secs = 5;
    config
}

#[tokio::test]
async fn replay_sends_token_and_identity() {
    let mut server = Server::new_async().await;
    let url = server.url();

    let mock = server
        .mock("POST", "/en/sign-in")
        .match_header("next-action", "7f0c9e1d2a")
        .match_header("content-type", "text/plain; charset=UTF-8")
        .match_header("origin", url.as_str())
        .match_header("referer", format!("{}/en/sign-in", url).as_str())
        .match_header("user-agent", Matcher::Regex("Chrome/".to_string()))
        .match_body(r#"["dev@example.com"]"#)
        .with_status(200)
        .with_body("0:[\"$@1\",[\"x\",null]]\n1:false\n")
        .expect(1)
        .create_async()
        .await;

    let client = AuthSessionClient::new(&config_for(&url)).unwrap();
    let identity = Identity::new("dev@example.com").unwrap();
    let token = ActionToken::new("7f0c9e1d2a");

    let raw = client.authenticate(&identity, &token).await.unwrap();

    mock.assert_async().await;
    assert_eq!(raw.status, 200);
    assert_eq!(raw.body, "0:[\"$@1\",[\"x\",null]]\n1:false\n");
}

#[tokio::test]
async fn replay_returns_error_status_verbatim() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/en/sign-in")
        .with_status(500)
        .with_body("<html>error</html>")
        .expect(1)
        .create_async()
        .await;

    let client = AuthSessionClient::new(&config_for(&server.url())).unwrap();
    let identity = Identity::new("dev@example.com").unwrap();

    let raw = client
        .authenticate(&identity, &ActionToken::new("stale"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(raw.status, 500);
    assert_eq!(raw.body, "<html>error</html>");
}

#[tokio::test]
async fn replay_connection_failure_is_network_error() {
    // nothing listens on the discard port
    let client = AuthSessionClient::new(&config_for("http://127.0.0.1:9")).unwrap();
    let identity = Identity::new("dev@example.com").unwrap();

    let result = client.authenticate(&identity, &ActionToken::new("tok")).await;

    assert!(matches!(result, Err(AuthError::Network(_))));
}

#[tokio::test]
async fn unsendable_token_is_rejected_before_replay() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/en/sign-in")
        .expect(0)
        .create_async()
        .await;

    let client = AuthSessionClient::new(&config_for(&server.url())).unwrap();
    let identity = Identity::new("dev@example.com").unwrap();

    let result = client
        .authenticate(&identity, &ActionToken::new("7f0c\r\nx-injected: 1"))
        .await;

    mock.assert_async().await;
    assert!(matches!(result, Err(AuthError::InvalidToken(_))));
}
