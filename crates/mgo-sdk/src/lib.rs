// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! JSON-RPC client for Mgo full nodes. The client is cheap to clone and may
//! be shared across transaction builders; it owns its own connection pool
//! and a token-bucket rate limiter in front of every request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use mgo_json_rpc_types::{
    ExecuteTransactionBlockRequest, MgoObjectResponse, MgoTransactionBlockResponse,
};
use mgo_transaction_builder::DataProvider;
use mgo_types::base_types::ObjectID;

pub mod error;

pub use error::{Error, MgoRpcResult};

pub const MGO_DEVNET_URL: &str = "https://fullnode.devnet.mangonetwork.io";
pub const MGO_TESTNET_URL: &str = "https://fullnode.testnet2.mangonetwork.io";
pub const MGO_MIRROR_TESTNET_URL: &str = "https://fullnode.testnet.mangonetwork.io";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_PERMITS_PER_SECOND: u64 = 10_000;

/// Configures and builds an [`MgoClient`].
pub struct MgoClientBuilder {
    request_timeout: Duration,
    permits_per_second: u64,
}

impl Default for MgoClientBuilder {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            permits_per_second: DEFAULT_PERMITS_PER_SECOND,
        }
    }
}

impl MgoClientBuilder {
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn permits_per_second(mut self, permits_per_second: u64) -> Self {
        self.permits_per_second = permits_per_second;
        self
    }

    pub fn build(self, http_url: impl AsRef<str>) -> MgoRpcResult<MgoClient> {
        let http = HttpClientBuilder::default()
            .request_timeout(self.request_timeout)
            .build(http_url)?;
        let api = Arc::new(RpcClient {
            http,
            limiter: RateLimiter::new(self.permits_per_second),
        });
        Ok(MgoClient {
            read_api: ReadApi { api: api.clone() },
            quorum_driver: QuorumDriver { api: api.clone() },
            api,
        })
    }
}

struct RpcClient {
    http: HttpClient,
    limiter: RateLimiter,
}

impl RpcClient {
    async fn request<R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: impl jsonrpsee::core::traits::ToRpcParams + Send,
    ) -> MgoRpcResult<R> {
        self.limiter.acquire().await;
        Ok(self.http.request(method, params).await?)
    }
}

/// A token bucket refilled continuously at the configured rate; callers
/// wait, never fail, when the bucket runs dry.
struct RateLimiter {
    permits_per_second: u64,
    state: Mutex<BucketState>,
}

struct BucketState {
    available: f64,
    last_refill: Instant,
}

impl RateLimiter {
    fn new(permits_per_second: u64) -> Self {
        Self {
            permits_per_second,
            state: Mutex::new(BucketState {
                available: permits_per_second as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    async fn acquire(&self) {
        let rate = self.permits_per_second as f64;
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                let refilled = now.duration_since(state.last_refill).as_secs_f64() * rate;
                state.available = (state.available + refilled).min(rate);
                state.last_refill = now;
                if state.available >= 1.0 {
                    state.available -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - state.available) / rate)
            };
            tokio::time::sleep(wait).await;
        }
    }
}

/// Client for the Mgo JSON-RPC surface the SDK core needs: the reference gas
/// price and transaction submission.
#[derive(Clone)]
pub struct MgoClient {
    api: Arc<RpcClient>,
    read_api: ReadApi,
    quorum_driver: QuorumDriver,
}

impl MgoClient {
    pub fn new(http_url: impl AsRef<str>) -> MgoRpcResult<MgoClient> {
        MgoClientBuilder::default().build(http_url)
    }

    pub fn read_api(&self) -> &ReadApi {
        &self.read_api
    }

    pub fn quorum_driver(&self) -> &QuorumDriver {
        &self.quorum_driver
    }
}

#[derive(Clone)]
pub struct ReadApi {
    api: Arc<RpcClient>,
}

impl ReadApi {
    /// The network's current reference gas price.
    pub async fn get_reference_gas_price(&self) -> MgoRpcResult<u64> {
        self.api
            .request("mgox_getReferenceGasPrice", rpc_params![])
            .await
    }

    /// Fetch an object's current version and digest, e.g. to reference it as
    /// a transaction input or gas payment.
    pub async fn get_object(&self, object_id: ObjectID) -> MgoRpcResult<MgoObjectResponse> {
        self.api.request("mgo_getObject", rpc_params![object_id]).await
    }
}

#[derive(Clone)]
pub struct QuorumDriver {
    api: Arc<RpcClient>,
}

impl QuorumDriver {
    /// Submit a signed transaction block. Remote errors come back verbatim;
    /// retrying is the caller's call.
    pub async fn execute_transaction_block(
        &self,
        request: ExecuteTransactionBlockRequest,
    ) -> MgoRpcResult<MgoTransactionBlockResponse> {
        debug!(
            signatures = request.signatures.len(),
            "executing transaction block"
        );
        self.api
            .request(
                "mgo_executeTransactionBlock",
                rpc_params![
                    request.tx_bytes,
                    request.signatures,
                    request.options,
                    request.request_type
                ],
            )
            .await
    }
}

#[async_trait]
impl DataProvider for MgoClient {
    async fn get_reference_gas_price(&self) -> Result<u64, anyhow::Error> {
        Ok(self.read_api.get_reference_gas_price().await?)
    }

    async fn execute_transaction_block(
        &self,
        request: ExecuteTransactionBlockRequest,
    ) -> Result<MgoTransactionBlockResponse, anyhow::Error> {
        Ok(self.quorum_driver.execute_transaction_block(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_for_well_formed_urls() {
        let client = MgoClient::new(MGO_DEVNET_URL).unwrap();
        let _: &ReadApi = client.read_api();
        let _: &QuorumDriver = client.quorum_driver();

        assert!(MgoClientBuilder::default().build("not a url").is_err());
    }

    #[tokio::test]
    async fn rate_limiter_grants_burst_permits_immediately() {
        let limiter = RateLimiter::new(100);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limiter_waits_when_drained() {
        let limiter = RateLimiter::new(2);
        limiter.acquire().await;
        limiter.acquire().await;

        let start = Instant::now();
        limiter.acquire().await;
        // The third permit needed a refill interval to pass.
        assert!(start.elapsed() >= Duration::from_millis(400));
    }
}
