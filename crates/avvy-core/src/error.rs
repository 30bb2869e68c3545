//! Error types for the domain transaction builder
//!
//! Every failure is scoped to a single request. Nothing here is fatal to the
//! process, and nothing is retried or papered over with a fallback value.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Duration below one year
    #[error("Invalid duration: {0} year(s), minimum is 1")]
    InvalidDuration(u64),

    /// Label shorter than the shortest price tier
    #[error("Invalid domain length: '{label}' has {length} character(s), minimum is {minimum}")]
    InvalidDomainLength {
        /// The offending label
        label: String,
        /// Length in characters
        length: usize,
        /// Configured minimum
        minimum: usize,
    },

    /// Exchange rate rejected by the pure converter
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),

    /// The price oracle failed, timed out or returned an unusable rate
    #[error("Price oracle unavailable ({oracle}): {message}")]
    OracleUnavailable {
        /// Oracle name
        oracle: String,
        /// What went wrong
        message: String,
    },

    /// A chain read failed, timed out or returned a malformed value
    #[error("Chain read unavailable ({call}): {message}")]
    ChainReadUnavailable {
        /// Contract call being read (e.g. "expiryOf")
        call: String,
        /// What went wrong
        message: String,
    },

    /// Renewal requested for a name without an on-chain expiry
    #[error("Domain not registered: {0}")]
    NotRegistered(String),

    /// Expiry arithmetic overflowed or did not move forward
    #[error("Expiry overflow: base {base}, {years} year(s)")]
    ExpiryOverflow {
        /// Timestamp the extension started from
        base: u64,
        /// Requested years
        years: u64,
    },

    /// Dynamic argument too long to encode
    #[error("Encoding overflow: {length} bytes exceeds maximum of {max}")]
    EncodingOverflow {
        /// Byte length of the argument
        length: usize,
        /// Encoder bound
        max: usize,
    },

    /// Caller asked for a chain other than the supported one
    #[error("Unsupported chain {requested}, only {supported} is supported")]
    UnsupportedChain {
        /// Requested chain id
        requested: u64,
        /// The one supported chain id
        supported: u64,
    },

    /// The resolver has no value for this record
    #[error("Record not found: {record} on {name}")]
    RecordNotFound {
        /// Canonical domain name
        name: String,
        /// Record type that was requested
        record: String,
    },

    /// The name-resolution collaborator failed
    #[error("Resolver unavailable: {0}")]
    ResolverUnavailable(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid rate error
    pub fn invalid_rate(msg: impl Into<String>) -> Self {
        Self::InvalidRate(msg.into())
    }

    /// Create an oracle error
    pub fn oracle(oracle: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OracleUnavailable {
            oracle: oracle.into(),
            message: message.into(),
        }
    }

    /// Create a chain read error
    pub fn chain_read(call: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChainReadUnavailable {
            call: call.into(),
            message: message.into(),
        }
    }

    /// Create a resolver error
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::ResolverUnavailable(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure came from an external collaborator rather than
    /// from the caller's input
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::OracleUnavailable { .. }
                | Self::ChainReadUnavailable { .. }
                | Self::ResolverUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = Error::InvalidDomainLength {
            label: "ab".to_string(),
            length: 2,
            minimum: 3,
        };
        assert_eq!(
            err.to_string(),
            "Invalid domain length: 'ab' has 2 character(s), minimum is 3"
        );

        let err = Error::oracle("coingecko", "timed out");
        assert_eq!(err.to_string(), "Price oracle unavailable (coingecko): timed out");
    }

    #[test]
    fn test_external_classification() {
        assert!(Error::oracle("x", "y").is_external());
        assert!(Error::chain_read("expiryOf", "y").is_external());
        assert!(!Error::InvalidDuration(0).is_external());
        assert!(!Error::invalid_rate("zero").is_external());
    }
}
