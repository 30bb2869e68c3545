// # Chain Reader Trait
//
// Read-only access to registrar state.
//
// ## Implementations
//
// - Ethereum JSON-RPC `eth_call`: `avvy-chain-rpc` crate

use async_trait::async_trait;
use primitive_types::{H160, H256};

/// Trait for on-chain registrar reads
///
/// # Trust Level: Untrusted
///
/// Same rules as [`PriceOracle`](crate::PriceOracle): one request per call,
/// no retries, no cached or invented values. A malformed response is an
/// error, never a default.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current expiry of a domain, in seconds since the epoch
    ///
    /// `Ok(None)` means the registrar reports the name as not registered.
    async fn read_expiry(&self, domain_hash: H256) -> Result<Option<u64>, crate::Error>;

    /// Current owner, `Ok(None)` if unowned
    async fn read_owner(&self, domain_hash: H256) -> Result<Option<H160>, crate::Error>;

    /// Whether the registrar knows the name
    async fn domain_exists(&self, domain_hash: H256) -> Result<bool, crate::Error>;

    /// Get the reader name (for logging/debugging)
    fn reader_name(&self) -> &'static str;
}

/// Helper trait for constructing chain readers from configuration
pub trait ChainReaderFactory: Send + Sync {
    /// Create a ChainReader for `registrar` from configuration
    fn create(
        &self,
        config: &crate::config::ChainReaderConfig,
        registrar: H160,
        timeouts: &crate::config::TimeoutConfig,
    ) -> Result<Box<dyn ChainReader>, crate::Error>;
}
