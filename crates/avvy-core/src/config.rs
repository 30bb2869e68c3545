//! Configuration types
//!
//! All constants that shape a transaction (tier prices, seconds per year,
//! supported chain, registrar address) live here and are handed to the
//! calculators as explicit values. Nothing reads ambient global state.

use serde::{Deserialize, Serialize};

/// Avalanche C-Chain
pub const AVALANCHE_C_CHAIN_ID: u64 = 43114;

/// Avvy Domains registrar contract on the C-Chain
pub const DEFAULT_REGISTRAR_ADDRESS: &str = "0x5BBD3a8E215B1fC30595fd1Aba4F3FcDbB614078";

/// Public C-Chain RPC endpoint
pub const DEFAULT_RPC_URL: &str = "https://api.avax.network/ext/bc/C/rpc";

/// CoinGecko simple-price endpoint
pub const DEFAULT_ORACLE_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// 365 days; leap years are ignored for both registration and renewal
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvvyConfig {
    /// Tier prices and unit scaling
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Target chain and contract
    #[serde(default)]
    pub chain: ChainConfig,

    /// Exchange-rate source
    #[serde(default)]
    pub oracle: OracleConfig,

    /// On-chain state source
    #[serde(default)]
    pub chain_reader: ChainReaderConfig,

    /// Per-call timeouts for external reads
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl AvvyConfig {
    /// Create a configuration with the documented defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.pricing.validate()?;
        self.chain.validate()?;
        self.oracle.validate()?;
        self.chain_reader.validate()?;
        self.timeouts.validate()?;
        Ok(())
    }
}

/// Length-tiered pricing, in whole fiat units per year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Labels of exactly three characters
    #[serde(default = "default_three_chars")]
    pub three_chars: u64,

    /// Labels of exactly four characters
    #[serde(default = "default_four_chars")]
    pub four_chars: u64,

    /// Labels of five characters or more
    #[serde(default = "default_five_plus_chars")]
    pub five_plus_chars: u64,

    /// Shortest registrable label, in characters
    #[serde(default = "default_min_label_length")]
    pub min_label_length: usize,

    /// Decimal places of the native token's smallest unit
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u32,
}

impl PricingConfig {
    /// Validate the pricing table
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.min_label_length < crate::pricing::MIN_TIERED_LENGTH {
            return Err(crate::Error::config(format!(
                "Minimum label length must be >= {}, got {}",
                crate::pricing::MIN_TIERED_LENGTH,
                self.min_label_length
            )));
        }
        if self.three_chars == 0 || self.four_chars == 0 || self.five_plus_chars == 0 {
            return Err(crate::Error::config("Tier prices must be > 0"));
        }
        if self.native_decimals > 36 {
            return Err(crate::Error::config(format!(
                "Native decimals must be <= 36, got {}",
                self.native_decimals
            )));
        }
        Ok(())
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            three_chars: default_three_chars(),
            four_chars: default_four_chars(),
            five_plus_chars: default_five_plus_chars(),
            min_label_length: default_min_label_length(),
            native_decimals: default_native_decimals(),
        }
    }
}

/// Target chain configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// The single supported chain id
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Registrar contract address, 0x-prefixed hex
    #[serde(default = "default_registrar_address")]
    pub registrar_address: String,

    /// Seconds added per registered year
    #[serde(default = "default_seconds_per_year")]
    pub seconds_per_year: u64,

    /// Canonical name suffix
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl ChainConfig {
    /// Validate the chain configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.chain_id == 0 {
            return Err(crate::Error::config("Chain id must be > 0"));
        }
        if self.seconds_per_year == 0 {
            return Err(crate::Error::config("Seconds per year must be > 0"));
        }
        if !self.suffix.starts_with('.') || self.suffix.len() < 2 {
            return Err(crate::Error::config(format!(
                "Suffix must look like '.tld', got '{}'",
                self.suffix
            )));
        }
        crate::transaction::parse_address(&self.registrar_address)
            .map_err(|e| crate::Error::config(format!("Registrar address: {}", e)))?;
        Ok(())
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            registrar_address: default_registrar_address(),
            seconds_per_year: default_seconds_per_year(),
            suffix: default_suffix(),
        }
    }
}

/// Exchange-rate source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OracleConfig {
    /// CoinGecko simple-price API
    Coingecko {
        /// Endpoint URL
        url: String,
        /// CoinGecko id of the native token
        coin_id: String,
        /// Fiat currency code
        vs_currency: String,
    },

    /// Custom oracle
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl OracleConfig {
    /// Validate the oracle configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            OracleConfig::Coingecko {
                url,
                coin_id,
                vs_currency,
            } => {
                if url.is_empty() {
                    return Err(crate::Error::config("Oracle URL cannot be empty"));
                }
                if coin_id.is_empty() || vs_currency.is_empty() {
                    return Err(crate::Error::config(
                        "Oracle coin id and currency cannot be empty",
                    ));
                }
                Ok(())
            }
            OracleConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom oracle factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom oracle config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the oracle type name
    pub fn type_name(&self) -> &str {
        match self {
            OracleConfig::Coingecko { .. } => "coingecko",
            OracleConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig::Coingecko {
            url: DEFAULT_ORACLE_URL.to_string(),
            coin_id: "avalanche-2".to_string(),
            vs_currency: "usd".to_string(),
        }
    }
}

/// On-chain state source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChainReaderConfig {
    /// Ethereum JSON-RPC endpoint
    JsonRpc {
        /// Endpoint URL
        url: String,
    },

    /// Custom reader
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ChainReaderConfig {
    /// Validate the reader configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ChainReaderConfig::JsonRpc { url } => {
                if url.is_empty() {
                    return Err(crate::Error::config("RPC URL cannot be empty"));
                }
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "RPC URL must use HTTP or HTTPS scheme, got: {}",
                        url
                    )));
                }
                Ok(())
            }
            ChainReaderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom reader factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom reader config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the reader type name
    pub fn type_name(&self) -> &str {
        match self {
            ChainReaderConfig::JsonRpc { .. } => "json_rpc",
            ChainReaderConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ChainReaderConfig {
    fn default() -> Self {
        ChainReaderConfig::JsonRpc {
            url: DEFAULT_RPC_URL.to_string(),
        }
    }
}

/// Timeouts applied around each external read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Exchange-rate fetch timeout (in seconds)
    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: u64,

    /// Chain read timeout (in seconds)
    #[serde(default = "default_chain_timeout_secs")]
    pub chain_timeout_secs: u64,
}

impl TimeoutConfig {
    /// Validate the timeouts
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.oracle_timeout_secs == 0 || self.chain_timeout_secs == 0 {
            return Err(crate::Error::config("Timeouts must be > 0"));
        }
        Ok(())
    }

    /// Oracle timeout as a `Duration`
    pub fn oracle(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Chain read timeout as a `Duration`
    pub fn chain(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.chain_timeout_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            oracle_timeout_secs: default_oracle_timeout_secs(),
            chain_timeout_secs: default_chain_timeout_secs(),
        }
    }
}

fn default_three_chars() -> u64 {
    640
}

fn default_four_chars() -> u64 {
    160
}

fn default_five_plus_chars() -> u64 {
    5
}

fn default_min_label_length() -> usize {
    3
}

fn default_native_decimals() -> u32 {
    18
}

fn default_chain_id() -> u64 {
    AVALANCHE_C_CHAIN_ID
}

fn default_registrar_address() -> String {
    DEFAULT_REGISTRAR_ADDRESS.to_string()
}

fn default_seconds_per_year() -> u64 {
    SECONDS_PER_YEAR
}

fn default_suffix() -> String {
    ".avax".to_string()
}

fn default_oracle_timeout_secs() -> u64 {
    10
}

fn default_chain_timeout_secs() -> u64 {
    10
}
