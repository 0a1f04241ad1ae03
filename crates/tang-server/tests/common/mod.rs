//! Shared helpers for router-level tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use p521::ecdsa::{signature::Verifier, Signature, VerifyingKey};
use tang_core::codec::base64url_decode;
use tang_core::{Jws, PrivateJwk, PublicJwk, ThumbprintAlgorithm};
use tang_server::{create_router, AppState, KeyStorage, MemoryStorage, TangService};

pub const TOKEN: &str = "test-rotation-token";

/// A router over fresh in-memory storage
pub fn app(rotate_token: Option<&str>) -> (Arc<AppState>, TangService) {
    let storage: Arc<dyn KeyStorage> = Arc::new(MemoryStorage::new());
    app_with_storage(storage, rotate_token)
}

pub fn app_with_storage(
    storage: Arc<dyn KeyStorage>,
    rotate_token: Option<&str>,
) -> (Arc<AppState>, TangService) {
    let state = Arc::new(AppState::new(storage, rotate_token.map(String::from)));
    let router = create_router(state.clone());
    (state, router)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

pub async fn send(router: &TangService, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(router: &TangService, uri: &str) -> TestResponse {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

pub async fn post_json(
    router: &TangService,
    uri: &str,
    body: impl Into<Body>,
) -> TestResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/jwk+json")
        .body(body.into())
        .unwrap();
    send(router, request).await
}

pub async fn post_rotate(router: &TangService, authorization: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(Method::POST).uri("/rotate");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}

/// S256 thumbprint of a key
pub fn thp(key: &PublicJwk) -> String {
    key.thumbprint(ThumbprintAlgorithm::S256).unwrap()
}

/// Current signing and exchange keys (private form)
pub async fn active_pair(state: &AppState) -> (PrivateJwk, PrivateJwk) {
    let keys = state.keys.load().await.unwrap();
    let signing = keys
        .active
        .iter()
        .find(|k| k.is_signing_key())
        .and_then(|k| k.as_private())
        .unwrap()
        .clone();
    let exchange = keys
        .active
        .iter()
        .find(|k| k.is_exchange_key())
        .and_then(|k| k.as_private())
        .unwrap()
        .clone();
    (signing, exchange)
}

/// Decoded advertisement payload: the public keys it carries
pub fn advertised_keys(jws: &Jws) -> Vec<serde_json::Value> {
    let payload: serde_json::Value =
        serde_json::from_slice(&base64url_decode(&jws.payload).unwrap()).unwrap();
    payload["keys"].as_array().unwrap().clone()
}

/// Does any signature of `jws` verify under `key`
pub fn signed_by(jws: &Jws, key: &PublicJwk) -> bool {
    let verifier = VerifyingKey::from_affine(key.to_affine().unwrap()).unwrap();
    jws.signatures.iter().any(|entry| {
        let input = format!("{}.{}", entry.protected, jws.payload);
        let raw = base64url_decode(&entry.signature).unwrap();
        let signature = Signature::from_slice(&raw).unwrap();
        verifier.verify(input.as_bytes(), &signature).is_ok()
    })
}

/// A well-formed client key body for /rec
pub fn client_body(client: &PublicJwk) -> String {
    serde_json::json!({
        "kty": client.kty,
        "crv": client.crv,
        "x": client.x,
        "y": client.y,
        "alg": "ECMR",
    })
    .to_string()
}
