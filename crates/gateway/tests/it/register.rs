//! Registration over HTTP.

use crate::utils::{
    Client, SENDER, addr_request, node, spawn, text_request, verified_result,
};
use alloy_primitives::Address;
use alloy_sol_types::SolValue;
use ens_gateway::GatewayConfig;
use futures::future::join_all;
use serde_json::{Value, json};

#[tokio::test(flavor = "multi_thread")]
async fn can_register() {
    let (handle, client) = spawn(GatewayConfig::test()).await;

    let (status, body) = client
        .register(json!({
            "name": "alice.test.divicompany.eth",
            "addr": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
            "texts": { "description": "hello", "url": "https://divi.eth.limo" },
        }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "alice.test.divicompany.eth");
    assert_eq!(body["node"], node("alice.test.divicompany.eth").to_string());
    assert_eq!(body["record"]["addr"], "0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
    assert_eq!(body["record"]["texts"]["url"], "https://divi.eth.limo");
    assert!(body["record"]["registeredAt"].is_string());

    let (status, found) = client.get("/names/alice.test.divicompany.eth").await;
    assert_eq!(status, 200);
    similar_asserts::assert_eq!(found, body);

    handle.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_is_conflict() {
    let (handle, client) = spawn(GatewayConfig::test()).await;

    let (status, first) = client.register(json!({ "name": "bob.test2.divicompany.eth" })).await;
    assert_eq!(status, 200);

    let (status, body) = client
        .register(json!({
            "name": "bob.test2.divicompany.eth",
            "texts": { "description": "mine" },
        }))
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("bob.test2.divicompany.eth"));

    let (_, found) = client.get("/names/bob.test2.divicompany.eth").await;
    assert_eq!(found["record"], first["record"]);

    handle.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn rejects_invalid_registrations() {
    let (handle, client) = spawn(GatewayConfig::test()).await;

    for name in [
        "",
        "alice.divicompany.eth",
        "alice.test3.divicompany.eth",
        "-alice.test.divicompany.eth",
        "ALICE.test.divicompany.eth",
        "alice.test.divi.eth",
    ] {
        let (status, body) = client.register(json!({ "name": name })).await;
        assert_eq!(status, 400, "{name}");
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    let (status, body) = client.register(json!({ "label": "alice" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let (_, health) = client.get("/health").await;
    assert_eq!(health["records"], 0);

    handle.shutdown().await.unwrap();
}

/// Sends 16 registrations of one name at once and returns the winning response.
async fn race_one_name(client: &Client) -> Value {
    let requests = (0..16).map(|i| {
        let client = client.clone();
        async move {
            client
                .register(json!({
                    "name": "race.test.divicompany.eth",
                    "texts": { "description": i.to_string() },
                }))
                .await
        }
    });
    let results = join_all(requests).await;

    assert_eq!(results.iter().filter(|(status, _)| *status == 200).count(), 1);
    assert_eq!(results.iter().filter(|(status, _)| *status == 409).count(), 15);

    let winner = results.into_iter().find(|(status, _)| *status == 200).unwrap().1;
    let (_, found) = client.get("/names/race.test.divicompany.eth").await;
    assert_eq!(found["record"], winner["record"]);
    winner
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_registrations_have_one_winner() {
    let (handle, client) = spawn(GatewayConfig::test()).await;
    race_one_name(&client).await;
    handle.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_registrations_journal_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.jsonl");
    let config = GatewayConfig::test().with_store_path(&path);

    let (handle, client) = spawn(config.clone()).await;
    let winner = race_one_name(&client).await;
    handle.shutdown().await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);

    let (handle, client) = spawn(config).await;
    let (status, found) = client.get("/names/race.test.divicompany.eth").await;
    assert_eq!(status, 200);
    similar_asserts::assert_eq!(found, winner);
    let (_, health) = client.get("/health").await;
    assert_eq!(health["records"], 1);
    handle.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn registration_is_resolvable() {
    let (handle, client) = spawn(GatewayConfig::test()).await;

    let (status, _) = client
        .register(json!({ "name": "alice.test.divicompany.eth", "texts": { "description": "x" } }))
        .await;
    assert_eq!(status, 200);

    let request = addr_request("alice.test.divicompany.eth");
    let (status, body) = client.ccip_get(SENDER, &request).await;
    assert_eq!(status, 200);
    let result = verified_result(&body, &request);
    assert_eq!(Address::abi_decode(&result).unwrap(), Address::ZERO);

    let request = text_request("alice.test.divicompany.eth", "description");
    let (status, body) = client.ccip_post(SENDER, &request).await;
    assert_eq!(status, 200);
    let result = verified_result(&body, &request);
    assert_eq!(String::abi_decode(&result).unwrap(), "x");

    handle.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn records_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.jsonl");
    let config = GatewayConfig::test().with_store_path(&path);

    let (handle, client) = spawn(config.clone()).await;
    let (status, registered) = client
        .register(json!({
            "name": "carol.test.divicompany.eth",
            "texts": { "description": "kept" },
        }))
        .await;
    assert_eq!(status, 200);
    handle.shutdown().await.unwrap();

    let (handle, client) = spawn(config).await;
    let (status, found) = client.get("/names/carol.test.divicompany.eth").await;
    assert_eq!(status, 200);
    similar_asserts::assert_eq!(found, registered);

    let (status, _) = client.register(json!({ "name": "carol.test.divicompany.eth" })).await;
    assert_eq!(status, 409);

    let request = text_request("carol.test.divicompany.eth", "description");
    let (_, body) = client.ccip_post(SENDER, &request).await;
    assert_eq!(String::abi_decode(&verified_result(&body, &request)).unwrap(), "kept");

    handle.shutdown().await.unwrap();
}
