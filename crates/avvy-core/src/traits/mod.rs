//! Collaborator traits
//!
//! The core never performs I/O itself. Everything it reads from the outside
//! world comes through one of these interfaces:
//!
//! - [`PriceOracle`]: fiat value of one native token
//! - [`ChainReader`]: registrar state (expiry, owner, existence)
//! - [`NameResolver`]: records attached to a registered name

pub mod price_oracle;
pub mod chain_reader;
pub mod name_resolver;

pub use price_oracle::{PriceOracle, PriceOracleFactory};
pub use chain_reader::{ChainReader, ChainReaderFactory};
pub use name_resolver::{NameResolver, RecordType};
