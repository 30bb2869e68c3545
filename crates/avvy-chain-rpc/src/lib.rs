// # JSON-RPC Chain Reader
//
// Reads registrar state with `eth_call` against an EVM JSON-RPC endpoint:
//
// ```json
// {"jsonrpc": "2.0", "id": 1, "method": "eth_call",
//  "params": [{"to": "0x<registrar>", "data": "0x<calldata>"}, "latest"]}
// ```
//
// Calldata comes from `avvy_core::abi::ContractCall` and return words are
// decoded with the same module, so request and response layouts share one
// implementation.
//
// ## Trust Level: Untrusted (Chain Reader)
//
// - ✅ One HTTP request per read
// - ✅ HTTP timeout configured
// - ❌ NO retry logic
// - ❌ NO default value for a malformed or missing result

use async_trait::async_trait;
use avvy_core::abi::{self, ContractCall, DecodeError};
use avvy_core::config::{ChainReaderConfig, TimeoutConfig};
use avvy_core::traits::{ChainReader, ChainReaderFactory};
use avvy_core::{Error, ProviderRegistry, Result};
use primitive_types::{H160, H256};
use serde_json::{Value, json};
use std::time::Duration;

const READER_NAME: &str = "json_rpc";

/// Registrar reader over `eth_call`
#[derive(Debug, Clone)]
pub struct JsonRpcChainReader {
    /// JSON-RPC endpoint
    url: String,

    /// Registrar contract
    registrar: H160,

    /// HTTP client for RPC requests
    client: reqwest::Client,
}

impl JsonRpcChainReader {
    /// Create a new reader
    ///
    /// # Parameters
    ///
    /// - `url`: JSON-RPC endpoint (e.g. the public C-Chain RPC)
    /// - `registrar`: registrar contract address
    /// - `timeout`: per-request HTTP timeout
    pub fn new(url: impl Into<String>, registrar: H160, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            registrar,
            client,
        })
    }

    /// JSON-RPC request body for a read-only call
    pub fn request_body(&self, call: &ContractCall) -> Result<Value> {
        let data = call.encode()?;
        Ok(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": format!("{:#x}", self.registrar),
                    "data": format!("0x{}", hex::encode(data)),
                },
                "latest"
            ]
        }))
    }

    /// Issue one `eth_call` and return the raw return data
    async fn eth_call(&self, call: &ContractCall) -> Result<Vec<u8>> {
        let name = call.name();
        let body = self.request_body(call)?;
        tracing::debug!(call = name, %body, "eth_call");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::chain_read(name, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(match status.as_u16() {
                429 => Error::chain_read(name, format!("Rate limit exceeded. Status: {}", status)),
                500..=599 => Error::chain_read(
                    name,
                    format!("RPC server error (transient): {} - {}", status, text),
                ),
                _ => Error::chain_read(name, format!("RPC request failed: {} - {}", status, text)),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| Error::chain_read(name, format!("Failed to parse response: {}", e)))?;
        tracing::debug!(call = name, response = %json, "eth_call result");

        parse_call_result(name, &json)
    }
}

/// Extract and hex-decode the `result` of a JSON-RPC response
pub fn parse_call_result(call: &str, json: &Value) -> Result<Vec<u8>> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(Error::chain_read(call, format!("RPC error: {}", message)));
    }

    let result = json
        .get("result")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::chain_read(call, "Invalid response format: result is not a string"))?;

    let digits = result
        .strip_prefix("0x")
        .ok_or_else(|| Error::chain_read(call, format!("Result is not 0x-prefixed: {}", result)))?;

    hex::decode(digits).map_err(|e| Error::chain_read(call, format!("Result is not hex: {}", e)))
}

fn malformed(call: &str, e: DecodeError) -> Error {
    Error::chain_read(call, format!("Malformed return data: {}", e))
}

/// `expiryOf` return data; zero means not registered
pub fn decode_expiry(data: &[u8]) -> Result<Option<u64>> {
    let expiry = abi::decode_u64(data, 0).map_err(|e| malformed("expiryOf", e))?;
    Ok((expiry != 0).then_some(expiry))
}

/// `ownerOf` return data; the zero address means unowned
pub fn decode_owner(data: &[u8]) -> Result<Option<H160>> {
    let owner = abi::decode_address(data, 0).map_err(|e| malformed("ownerOf", e))?;
    Ok((!owner.is_zero()).then_some(owner))
}

/// `exists` return data
pub fn decode_exists(data: &[u8]) -> Result<bool> {
    abi::decode_bool(data, 0).map_err(|e| malformed("exists", e))
}

#[async_trait]
impl ChainReader for JsonRpcChainReader {
    async fn read_expiry(&self, domain_hash: H256) -> Result<Option<u64>> {
        let data = self.eth_call(&ContractCall::ExpiryOf { domain_hash }).await?;
        decode_expiry(&data)
    }

    async fn read_owner(&self, domain_hash: H256) -> Result<Option<H160>> {
        let data = self.eth_call(&ContractCall::OwnerOf { domain_hash }).await?;
        decode_owner(&data)
    }

    async fn domain_exists(&self, domain_hash: H256) -> Result<bool> {
        let data = self.eth_call(&ContractCall::Exists { domain_hash }).await?;
        decode_exists(&data)
    }

    fn reader_name(&self) -> &'static str {
        READER_NAME
    }
}

/// Factory for creating JSON-RPC chain readers
pub struct JsonRpcFactory;

impl ChainReaderFactory for JsonRpcFactory {
    fn create(
        &self,
        config: &ChainReaderConfig,
        registrar: H160,
        timeouts: &TimeoutConfig,
    ) -> Result<Box<dyn ChainReader>> {
        match config {
            ChainReaderConfig::JsonRpc { url } => Ok(Box::new(JsonRpcChainReader::new(
                url.clone(),
                registrar,
                timeouts.chain(),
            )?)),
            _ => Err(Error::config("Invalid config for JSON-RPC chain reader")),
        }
    }
}

/// Register the JSON-RPC chain reader with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_chain_reader(READER_NAME, Box::new(JsonRpcFactory));
}
