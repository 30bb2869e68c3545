// # avvy-core
//
// Core library for building unsigned `.avax` domain transactions.
//
// ## Architecture Overview
//
// - **PricingCalculator**: length-tiered fiat price and exact conversion to
//   the native token's smallest unit
// - **ExpiryCalculator**: new expiry for registration and renewal
// - **abi**: selector and 32-byte-word calldata for the registrar calls
// - **TransactionBuilder**: assembles the unsigned intent
// - **PriceOracle** / **ChainReader** / **NameResolver**: external
//   collaborators, implemented in separate crates
// - **DomainTxService**: composes the above per request
// - **ProviderRegistry**: plugin-based construction of collaborators
//
// ## Design Principles
//
// 1. **Pure core**: calculators and the encoder perform no I/O
// 2. **Exact money**: no floating point past the oracle boundary
// 3. **No hidden recovery**: no retries, caches or fallback rates
// 4. **Explicit configuration**: constants are passed in, never global

pub mod abi;
pub mod config;
pub mod domain;
pub mod error;
pub mod expiry;
pub mod pricing;
pub mod registry;
pub mod service;
pub mod traits;
pub mod transaction;

// Re-export core types for convenience
pub use abi::{ContractCall, FunctionCall, Token};
pub use config::AvvyConfig;
pub use domain::{DomainName, Years};
pub use error::{Error, Result};
pub use expiry::ExpiryCalculator;
pub use pricing::{ExchangeRate, FiatAmount, PriceTier, PricingCalculator};
pub use registry::ProviderRegistry;
pub use service::{
    DomainInfo, DomainTxService, PreparedTransaction, PriceQuote, RegistrationRequest,
    RenewalRequest, ResolvedRecord,
};
pub use traits::{ChainReader, NameResolver, PriceOracle, RecordType};
pub use transaction::{TransactionBuilder, TransactionIntent};
