//! CCIP-Read lookups over HTTP.

use crate::utils::{
    SENDER, SIGNER, addr_request, node, resolve_call, spawn, text_request, verified_result,
};
use alloy_primitives::{Address, Bytes, U256, hex};
use alloy_sol_types::{SolCall, SolValue};
use ens_gateway::GatewayConfig;
use ens_gateway_core::abi::{IAddressResolver, IContentHashResolver};
use serde_json::json;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const ALICE: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

#[tokio::test(flavor = "multi_thread")]
async fn resolves_addr_and_coin_types() {
    let (handle, client) = spawn(GatewayConfig::test()).await;
    let name = "alice.test.divicompany.eth";
    client.register(json!({ "name": name, "addr": ALICE })).await;
    let alice: Address = ALICE.parse().unwrap();

    let request = addr_request(name);
    let (status, body) = client.ccip_post(SENDER, &request).await;
    assert_eq!(status, 200);
    assert_eq!(Address::abi_decode(&verified_result(&body, &request)).unwrap(), alice);

    let eth = IAddressResolver::addrCall { node: node(name), coinType: U256::from(60) };
    let request = resolve_call(name, eth.abi_encode());
    let (_, body) = client.ccip_get(SENDER, &request).await;
    assert_eq!(
        Bytes::abi_decode(&verified_result(&body, &request)).unwrap(),
        Bytes::from(alice.to_vec())
    );

    let btc = IAddressResolver::addrCall { node: node(name), coinType: U256::ZERO };
    let request = resolve_call(name, btc.abi_encode());
    let (_, body) = client.ccip_get(SENDER, &request).await;
    assert!(Bytes::abi_decode(&verified_result(&body, &request)).unwrap().is_empty());

    handle.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn unregistered_names_resolve_empty() {
    let (handle, client) = spawn(GatewayConfig::test()).await;
    let name = "nobody.test2.divicompany.eth";

    let request = addr_request(name);
    let (status, body) = client.ccip_get(SENDER, &request).await;
    assert_eq!(status, 200);
    assert_eq!(Address::abi_decode(&verified_result(&body, &request)).unwrap(), Address::ZERO);

    let request = text_request(name, "description");
    let (_, body) = client.ccip_get(SENDER, &request).await;
    assert_eq!(String::abi_decode(&verified_result(&body, &request)).unwrap(), "");

    let contenthash = IContentHashResolver::contenthashCall { node: node(name) };
    let request = resolve_call(name, contenthash.abi_encode());
    let (_, body) = client.ccip_get(SENDER, &request).await;
    assert!(Bytes::abi_decode(&verified_result(&body, &request)).unwrap().is_empty());

    handle.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn expiry_follows_ttl() {
    let config = GatewayConfig::test().with_signature_ttl(Duration::from_secs(60));
    let (handle, client) = spawn(config).await;

    let request = addr_request("alice.test.divicompany.eth");
    let before = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let (_, body) = client.ccip_post(SENDER, &request).await;
    let after = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();

    let data = hex::decode(body["data"].as_str().unwrap()).unwrap();
    let response = ens_gateway_core::SignedResponse::abi_decode(&data).unwrap();
    assert!(response.expires >= before + 60 && response.expires <= after + 60);
    assert_eq!(response.recover_signer(SENDER, &request).unwrap(), SIGNER);

    handle.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn protocol_errors() {
    let (handle, client) = spawn(GatewayConfig::test()).await;

    // not a resolve(bytes,bytes) call
    let (status, body) = client.ccip_post(SENDER, &hex!("deadbeef")).await;
    assert_eq!(status, 400);
    assert!(body["message"].is_string());

    // outside the zone
    let (status, body) = client.ccip_get(SENDER, &addr_request("alice.test.divi.eth")).await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("divicompany.eth"));

    // unsupported inner call
    let request = resolve_call("alice.test.divicompany.eth", hex!("12345678").to_vec());
    let (status, body) = client.ccip_get(SENDER, &request).await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("0x12345678"));

    handle.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn health_reports_signer() {
    let (handle, client) = spawn(GatewayConfig::test()).await;
    client.register(json!({ "name": "alice.test.divicompany.eth" })).await;

    let (status, body) = client.get("/health").await;
    assert_eq!(status, 200);
    similar_asserts::assert_eq!(
        body,
        json!({
            "status": "ok",
            "signer": SIGNER.to_checksum(None),
            "zone": "divicompany.eth",
            "records": 1,
        })
    );
    assert_eq!(handle.state().resolver.signer_address(), SIGNER);

    handle.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn fails_to_start_without_key() {
    let config = GatewayConfig { private_key: None, ..GatewayConfig::test() };
    let err = ens_gateway::try_spawn(config).await.unwrap_err();
    assert!(err.to_string().contains("signing key"));

    let config = GatewayConfig::test().with_root_domain("not a domain");
    assert!(ens_gateway::try_spawn(config).await.is_err());
}
