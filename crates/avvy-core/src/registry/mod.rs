//! Plugin-based collaborator registry
//!
//! Oracle and chain-reader implementations live in their own crates and
//! register a factory here under their configuration type name. The binary
//! then builds whatever the configuration asks for without knowing the
//! concrete types.
//!
//! ## Registration
//!
//! ```rust,ignore
//! // In the avvy-oracle-coingecko crate
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_oracle("coingecko", Box::new(CoingeckoFactory));
//! }
//! ```

use crate::config::{AvvyConfig, ChainReaderConfig, OracleConfig};
use crate::error::{Error, Result};
use crate::traits::{ChainReader, ChainReaderFactory, PriceOracle, PriceOracleFactory};
use crate::transaction::parse_address;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Registry of oracle and chain-reader factories
///
/// Interior mutability with `RwLock`: concurrent lookups, exclusive
/// registration. A poisoned lock still holds a usable map (factories are
/// inserted whole), so poisoning is ignored.
#[derive(Default)]
pub struct ProviderRegistry {
    oracles: RwLock<HashMap<String, Box<dyn PriceOracleFactory>>>,
    chain_readers: RwLock<HashMap<String, Box<dyn ChainReaderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a price oracle factory
    ///
    /// # Parameters
    ///
    /// - `name`: Oracle type name (e.g., "coingecko")
    /// - `factory`: Factory object for creating oracle instances
    pub fn register_oracle(&self, name: impl Into<String>, factory: Box<dyn PriceOracleFactory>) {
        let mut oracles = self.oracles.write().unwrap_or_else(PoisonError::into_inner);
        oracles.insert(name.into(), factory);
    }

    /// Register a chain reader factory
    ///
    /// # Parameters
    ///
    /// - `name`: Reader type name (e.g., "json_rpc")
    /// - `factory`: Factory object for creating reader instances
    pub fn register_chain_reader(
        &self,
        name: impl Into<String>,
        factory: Box<dyn ChainReaderFactory>,
    ) {
        let mut readers = self
            .chain_readers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        readers.insert(name.into(), factory);
    }

    /// Create the oracle named by `config.oracle`
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn PriceOracle>)`: Created oracle instance
    /// - `Err(Error::Config)`: If the type is not registered or creation fails
    pub fn create_oracle(&self, config: &AvvyConfig) -> Result<Box<dyn PriceOracle>> {
        let oracle: &OracleConfig = &config.oracle;
        let oracle_type = oracle.type_name();
        let oracles = self.oracles.read().unwrap_or_else(PoisonError::into_inner);

        let factory = oracles
            .get(oracle_type)
            .ok_or_else(|| Error::config(format!("Unknown oracle type: {}", oracle_type)))?;

        factory.create(oracle, &config.timeouts)
    }

    /// Create the chain reader named by `config.chain_reader`, bound to the
    /// configured registrar
    pub fn create_chain_reader(&self, config: &AvvyConfig) -> Result<Box<dyn ChainReader>> {
        let reader: &ChainReaderConfig = &config.chain_reader;
        let reader_type = reader.type_name();
        let registrar = parse_address(&config.chain.registrar_address)?;

        let readers = self
            .chain_readers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let factory = readers
            .get(reader_type)
            .ok_or_else(|| Error::config(format!("Unknown chain reader type: {}", reader_type)))?;

        factory.create(reader, registrar, &config.timeouts)
    }

    /// List all registered oracle types
    pub fn list_oracles(&self) -> Vec<String> {
        let oracles = self.oracles.read().unwrap_or_else(PoisonError::into_inner);
        oracles.keys().cloned().collect()
    }

    /// List all registered chain reader types
    pub fn list_chain_readers(&self) -> Vec<String> {
        let readers = self
            .chain_readers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        readers.keys().cloned().collect()
    }

    /// Check if an oracle type is registered
    pub fn has_oracle(&self, name: &str) -> bool {
        let oracles = self.oracles.read().unwrap_or_else(PoisonError::into_inner);
        oracles.contains_key(name)
    }

    /// Check if a chain reader type is registered
    pub fn has_chain_reader(&self, name: &str) -> bool {
        let readers = self
            .chain_readers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        readers.contains_key(name)
    }
}
