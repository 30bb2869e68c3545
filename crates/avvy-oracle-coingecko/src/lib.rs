// # CoinGecko Price Oracle
//
// Fetches the fiat price of the native token from CoinGecko's simple-price
// endpoint:
//
// ```http
// GET /api/v3/simple/price?ids=avalanche-2&vs_currencies=usd
//
// {"avalanche-2": {"usd": 35.12}}
// ```
//
// ## Trust Level: Untrusted (Price Oracle)
//
// - ✅ One HTTP request per call
// - ✅ HTTP timeout configured
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 429, 5xx)
// - ❌ NO retry logic (callers own retry policy)
// - ❌ NO caching of the last rate
// - ❌ NO fallback rate when the request fails

use async_trait::async_trait;
use avvy_core::config::{OracleConfig, TimeoutConfig};
use avvy_core::traits::{PriceOracle, PriceOracleFactory};
use avvy_core::{Error, ProviderRegistry, Result};
use serde_json::Value;
use std::time::Duration;

const ORACLE_NAME: &str = "coingecko";

/// CoinGecko simple-price oracle
#[derive(Debug, Clone)]
pub struct CoingeckoOracle {
    /// Endpoint, without query string
    url: String,

    /// CoinGecko id of the native token (e.g. "avalanche-2")
    coin_id: String,

    /// Fiat currency code (e.g. "usd")
    vs_currency: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl CoingeckoOracle {
    /// Create a new oracle
    ///
    /// # Parameters
    ///
    /// - `url`: simple-price endpoint
    /// - `coin_id`: CoinGecko coin id
    /// - `vs_currency`: fiat currency code
    /// - `timeout`: per-request HTTP timeout
    pub fn new(
        url: impl Into<String>,
        coin_id: impl Into<String>,
        vs_currency: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            coin_id: coin_id.into().to_lowercase(),
            vs_currency: vs_currency.into().to_lowercase(),
            client,
        })
    }

    /// The request URL, query string included
    pub fn request_url(&self) -> String {
        format!(
            "{}?ids={}&vs_currencies={}",
            self.url, self.coin_id, self.vs_currency
        )
    }
}

#[async_trait]
impl PriceOracle for CoingeckoOracle {
    async fn native_token_price(&self) -> Result<f64> {
        let url = self.request_url();
        tracing::debug!(%url, "Fetching exchange rate");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::oracle(ORACLE_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status.as_u16(), &body));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| Error::oracle(ORACLE_NAME, format!("Failed to parse response: {}", e)))?;

        let rate = parse_price(&json, &self.coin_id, &self.vs_currency)?;
        tracing::debug!(rate, coin = %self.coin_id, currency = %self.vs_currency, "Exchange rate fetched");
        Ok(rate)
    }

    fn oracle_name(&self) -> &'static str {
        ORACLE_NAME
    }
}

/// Map a non-success HTTP status to an oracle error
fn status_error(status: u16, body: &str) -> Error {
    let message = match status {
        401 | 403 => format!("Authentication failed or API key required. Status: {}", status),
        404 => format!("Endpoint not found. Status: {}", status),
        429 => format!("Rate limit exceeded. Status: {}", status),
        500..=599 => format!("CoinGecko server error (transient): {} - {}", status, body),
        _ => format!("Price request failed: {} - {}", status, body),
    };
    Error::oracle(ORACLE_NAME, message)
}

/// Extract `json[coin_id][vs_currency]` as a number
///
/// Positivity is checked by the caller; this only rejects a missing or
/// non-numeric field.
fn parse_price(json: &Value, coin_id: &str, vs_currency: &str) -> Result<f64> {
    json.get(coin_id)
        .and_then(|coin| coin.get(vs_currency))
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            Error::oracle(
                ORACLE_NAME,
                format!(
                    "Invalid response format: no numeric {}.{} in {}",
                    coin_id, vs_currency, json
                ),
            )
        })
}

/// Factory for creating CoinGecko oracles
pub struct CoingeckoFactory;

impl PriceOracleFactory for CoingeckoFactory {
    fn create(
        &self,
        config: &OracleConfig,
        timeouts: &TimeoutConfig,
    ) -> Result<Box<dyn PriceOracle>> {
        match config {
            OracleConfig::Coingecko {
                url,
                coin_id,
                vs_currency,
            } => {
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(Error::config(format!(
                        "Oracle URL must use HTTP or HTTPS scheme, got: {}",
                        url
                    )));
                }
                Ok(Box::new(CoingeckoOracle::new(
                    url.clone(),
                    coin_id.clone(),
                    vs_currency.clone(),
                    timeouts.oracle(),
                )?))
            }
            _ => Err(Error::config("Invalid config for CoinGecko oracle")),
        }
    }
}

/// Register the CoinGecko oracle with a registry
///
/// # Example
///
/// ```rust
/// use avvy_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// avvy_oracle_coingecko::register(&registry);
/// assert!(registry.has_oracle("coingecko"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_oracle(ORACLE_NAME, Box::new(CoingeckoFactory));
}
