// # Price Oracle Trait
//
// Supplies the fiat value of one unit of the native token.
//
// ## Implementations
//
// - CoinGecko simple-price API: `avvy-oracle-coingecko` crate
//
// ## Usage
//
// ```rust,ignore
// use avvy_core::PriceOracle;
//
// async fn show(oracle: &dyn PriceOracle) -> avvy_core::Result<()> {
//     let rate = oracle.native_token_price().await?;
//     println!("1 AVAX = {} USD ({})", rate, oracle.oracle_name());
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for exchange-rate sources
///
/// # Trust Level: Untrusted
///
/// Oracles are external integrations.
///
/// ## Allowed Capabilities
/// - ✅ Perform one HTTP/HTTPS call to their endpoint per invocation
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff (callers own retry policy)
/// - ❌ Cache a rate across calls
/// - ❌ Substitute a hard-coded or last-known rate on failure
/// - ❌ Spawn tasks or threads
///
/// The returned value is a point-in-time observation. Validation of the
/// value (finite, positive) happens in the core, which maps a bad value to
/// `OracleUnavailable` just like a transport failure.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Fetch the current fiat price of one native token
    ///
    /// # Returns
    ///
    /// - `Ok(f64)`: The rate as reported by the source
    /// - `Err(Error::OracleUnavailable)`: Transport, status or parse failure
    async fn native_token_price(&self) -> Result<f64, crate::Error>;

    /// Get the oracle name (for logging/debugging)
    fn oracle_name(&self) -> &'static str;
}

/// Helper trait for constructing oracles from configuration
pub trait PriceOracleFactory: Send + Sync {
    /// Create a PriceOracle instance from configuration
    fn create(
        &self,
        config: &crate::config::OracleConfig,
        timeouts: &crate::config::TimeoutConfig,
    ) -> Result<Box<dyn PriceOracle>, crate::Error>;
}
