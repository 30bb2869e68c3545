//! Test doubles for service contract tests
//!
//! Each mock counts its calls so tests can assert exactly how often the
//! service reached out to the world.

#![allow(dead_code)]

use avvy_core::config::{AvvyConfig, TimeoutConfig};
use avvy_core::error::{Error, Result};
use avvy_core::traits::{ChainReader, NameResolver, PriceOracle, RecordType};
use avvy_core::DomainTxService;
use primitive_types::{H160, H256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 2025-01-01T00:00:00Z
pub const T0: u64 = 1_735_689_600;

/// How a mock responds
#[derive(Debug, Clone)]
pub enum Behavior<T> {
    /// Answer with this value
    Respond(T),
    /// Fail with `OracleUnavailable` / `ChainReadUnavailable`
    Fail(&'static str),
    /// Never answer within any reasonable timeout
    Hang,
}

/// A PriceOracle with a scripted answer
pub struct MockPriceOracle {
    behavior: Behavior<f64>,
    call_count: Arc<AtomicUsize>,
}

impl MockPriceOracle {
    pub fn with_rate(rate: f64) -> Self {
        Self::new(Behavior::Respond(rate))
    }

    pub fn failing(message: &'static str) -> Self {
        Self::new(Behavior::Fail(message))
    }

    pub fn hanging() -> Self {
        Self::new(Behavior::Hang)
    }

    pub fn new(behavior: Behavior<f64>) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times native_token_price() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new oracle that shares its counter with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            behavior: other.behavior.clone(),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl PriceOracle for MockPriceOracle {
    async fn native_token_price(&self) -> Result<f64> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Respond(rate) => Ok(*rate),
            Behavior::Fail(message) => Err(Error::oracle("mock", *message)),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::oracle("mock", "woke up"))
            }
        }
    }

    fn oracle_name(&self) -> &'static str {
        "mock"
    }
}

/// A ChainReader over an in-memory registrar
pub struct MockChainReader {
    expiry: Behavior<HashMap<H256, u64>>,
    owners: HashMap<H256, H160>,
    call_count: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockChainReader {
    /// A registrar that knows no names
    pub fn empty() -> Self {
        Self::new(Behavior::Respond(HashMap::new()))
    }

    /// A registrar where `domain_hash` expires at `expiry`
    pub fn with_expiry(domain_hash: H256, expiry: u64) -> Self {
        Self::new(Behavior::Respond(HashMap::from([(domain_hash, expiry)])))
    }

    pub fn failing(message: &'static str) -> Self {
        Self::new(Behavior::Fail(message))
    }

    pub fn hanging() -> Self {
        Self::new(Behavior::Hang)
    }

    pub fn new(expiry: Behavior<HashMap<H256, u64>>) -> Self {
        Self {
            expiry,
            owners: HashMap::new(),
            call_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the owner of a name
    pub fn with_owner(mut self, domain_hash: H256, owner: H160) -> Self {
        self.owners.insert(domain_hash, owner);
        self
    }

    /// Get the number of reads issued
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Names of the reads issued, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Create a new reader that shares state and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            expiry: other.expiry.clone(),
            owners: other.owners.clone(),
            call_count: Arc::clone(&other.call_count),
            calls: Arc::clone(&other.calls),
        }
    }

    async fn lookup(&self, call: &'static str) -> Result<&HashMap<H256, u64>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);
        match &self.expiry {
            Behavior::Respond(map) => Ok(map),
            Behavior::Fail(message) => Err(Error::chain_read(call, *message)),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::chain_read(call, "woke up"))
            }
        }
    }
}

#[async_trait::async_trait]
impl ChainReader for MockChainReader {
    async fn read_expiry(&self, domain_hash: H256) -> Result<Option<u64>> {
        Ok(self.lookup("expiryOf").await?.get(&domain_hash).copied())
    }

    async fn read_owner(&self, domain_hash: H256) -> Result<Option<H160>> {
        self.lookup("ownerOf").await?;
        Ok(self.owners.get(&domain_hash).copied())
    }

    async fn domain_exists(&self, domain_hash: H256) -> Result<bool> {
        Ok(self.lookup("exists").await?.contains_key(&domain_hash))
    }

    fn reader_name(&self) -> &'static str {
        "mock"
    }
}

/// A NameResolver over a fixed record table
pub struct MockNameResolver {
    records: HashMap<(String, String), String>,
    call_count: Arc<AtomicUsize>,
}

impl MockNameResolver {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_record(mut self, name: &str, record: &RecordType, value: &str) -> Self {
        self.records
            .insert((name.to_string(), record.to_string()), value.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NameResolver for MockNameResolver {
    async fn resolve(&self, name: &str, record: &RecordType) -> Result<Option<String>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .get(&(name.to_string(), record.to_string()))
            .cloned())
    }

    fn resolver_name(&self) -> &'static str {
        "mock"
    }
}

/// Default configuration with short timeouts
pub fn test_config() -> AvvyConfig {
    AvvyConfig {
        timeouts: TimeoutConfig {
            oracle_timeout_secs: 1,
            chain_timeout_secs: 1,
        },
        ..AvvyConfig::default()
    }
}

/// Build a service over the given mocks
pub fn service(oracle: MockPriceOracle, reader: MockChainReader) -> DomainTxService {
    DomainTxService::new(Box::new(oracle), Box::new(reader), test_config())
        .expect("default configuration is valid")
}

/// Keccak-256 of a label
pub fn label_hash(label: &str) -> H256 {
    avvy_core::DomainName::parse(label, ".avax")
        .expect("valid label")
        .hash()
}
