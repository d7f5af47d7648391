
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{Duration, Utc};
use test_helpers::*;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error;

/// A connection attempt that must be refused before the upgrade completes.
async fn assert_refused(url: &str) {
    match connect_async(url).await {
        Ok(_) => panic!("Handshake should have been refused: {url}"),
        Err(Error::Http(response)) => {
            assert_eq!(response.status(), 401, "Expected 401 Unauthorized");
            assert!(
                response.body().as_ref().is_none_or(|b| b.is_empty()),
                "Refusal must carry no structured body"
            );
        }
        Err(other) => panic!("Expected an HTTP refusal, got: {other:?}"),
    }
}

#[tokio::test]
async fn valid_proof_completes_handshake_and_registers_peer() {
    let (addr, server) = start_test_server().await;
    let key = keypair(1);

    let (_sender, _receiver) = connect_peer(addr, &key).await;

    // Registration happens during upgrade; poll briefly for the entry.
    for _ in 0..50 {
        if server.registry().is_connected(&peer_id_of(&key)) {
            return;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    }
    panic!("Peer never appeared in the registry");
}

#[tokio::test]
async fn missing_credentials_are_refused() {
    let (addr, _server) = start_test_server().await;
    let key = keypair(2);
    let ts = Utc::now().to_rfc3339();

    // No query parameters at all.
    assert_refused(&format!("ws://{addr}/ws")).await;

    // Each credential absent in turn.
    assert_refused(&format!(
        "ws://{addr}/ws?timestamp={}&signature={}",
        urlencode(&ts),
        urlencode(&sign_timestamp(&key, &ts)),
    ))
    .await;
    assert_refused(&format!(
        "ws://{addr}/ws?publicKey={}&signature={}",
        urlencode(&armored_public(&key)),
        urlencode(&sign_timestamp(&key, &ts)),
    ))
    .await;
    assert_refused(&format!(
        "ws://{addr}/ws?publicKey={}&timestamp={}",
        urlencode(&armored_public(&key)),
        urlencode(&ts),
    ))
    .await;
}

#[tokio::test]
async fn signature_from_wrong_key_is_refused() {
    let (addr, _server) = start_test_server().await;
    let key = keypair(3);
    let imposter = keypair(4);
    let ts = Utc::now().to_rfc3339();

    let url = format!(
        "ws://{addr}/ws?publicKey={}&timestamp={}&signature={}",
        urlencode(&armored_public(&key)),
        urlencode(&ts),
        urlencode(&sign_timestamp(&imposter, &ts)),
    );
    assert_refused(&url).await;
}

#[tokio::test]
async fn garbage_key_material_is_refused() {
    let (addr, _server) = start_test_server().await;
    let key = keypair(5);
    let ts = Utc::now().to_rfc3339();

    let url = format!(
        "ws://{addr}/ws?publicKey={}&timestamp={}&signature={}",
        urlencode("not-base64!!"),
        urlencode(&ts),
        urlencode(&sign_timestamp(&key, &ts)),
    );
    assert_refused(&url).await;
}

#[tokio::test]
async fn stale_timestamp_is_refused() {
    let (addr, _server) = start_test_server().await;
    let key = keypair(6);
    let stale = (Utc::now() - Duration::seconds(600)).to_rfc3339();

    assert_refused(&auth_url_with_timestamp(addr, &key, &stale)).await;
}

#[tokio::test]
async fn replayed_proof_within_window_is_accepted() {
    // The freshness window bounds replay exposure; within it, the same
    // signed timestamp authenticates repeatedly.
    let (addr, _server) = start_test_server().await;
    let key = keypair(7);
    let ts = Utc::now().to_rfc3339();
    let url = auth_url_with_timestamp(addr, &key, &ts);

    let (first, _) = connect_async(&url).await.expect("First connect failed");
    drop(first);
    let (second, _) = connect_async(&url).await.expect("Replay within window failed");
    drop(second);
}

#[tokio::test]
async fn truncated_signature_is_refused() {
    let (addr, _server) = start_test_server().await;
    let key = keypair(8);
    let ts = Utc::now().to_rfc3339();
    let short_sig = BASE64.encode([0u8; 16]);

    let url = format!(
        "ws://{addr}/ws?publicKey={}&timestamp={}&signature={}",
        urlencode(&armored_public(&key)),
        urlencode(&ts),
        urlencode(&short_sig),
    );
    assert_refused(&url).await;
}

#[tokio::test]
async fn health_endpoint_reports_presence_count() {
    let (addr, server) = start_test_server().await;
    let key = keypair(9);

    let client = reqwest::Client::new();
    let body: serde_json::Value = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .expect("Health request failed")
        .json()
        .await
        .expect("Health body was not JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connected_peers"], 0);

    let (_sender, _receiver) = connect_peer(addr, &key).await;
    for _ in 0..50 {
        if server.registry().len() == 1 {
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    }

    let body: serde_json::Value = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .expect("Health request failed")
        .json()
        .await
        .expect("Health body was not JSON");
    assert_eq!(body["connected_peers"], 1);
}
