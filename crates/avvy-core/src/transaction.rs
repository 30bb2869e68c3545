//! Unsigned transaction intents
//!
//! The intent is the only artifact this crate produces. It is handed to an
//! external signer and never signed or submitted here.

use primitive_types::{H160, U256};
use serde::{Serialize, Serializer};

use crate::config::ChainConfig;
use crate::error::{Error, Result};

/// Parse a `0x`-prefixed 20-byte hex address (any case)
pub fn parse_address(input: &str) -> Result<H160> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| Error::invalid_input(format!("Address '{}' must start with 0x", input)))?;

    let bytes = hex::decode(digits)
        .map_err(|e| Error::invalid_input(format!("Address '{}' is not hex: {}", input, e)))?;
    if bytes.len() != 20 {
        return Err(Error::invalid_input(format!(
            "Address '{}' is {} bytes, expected 20",
            input,
            bytes.len()
        )));
    }
    Ok(H160::from_slice(&bytes))
}

/// An unsigned contract call
///
/// Serializes as `{"to": "0x..", "data": "0x..", "value": "<decimal>",
/// "chainId": n}`. The value is a decimal string of the smallest unit and
/// never passes through a float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIntent {
    /// Target contract
    #[serde(serialize_with = "serialize_address")]
    pub to: H160,

    /// Calldata
    #[serde(serialize_with = "serialize_bytes")]
    pub data: Vec<u8>,

    /// Native-token value in the smallest unit
    #[serde(serialize_with = "serialize_decimal")]
    pub value: U256,

    /// Target chain
    pub chain_id: u64,
}

impl TransactionIntent {
    /// Target as lower-case `0x` hex
    pub fn to_hex(&self) -> String {
        format!("{:#x}", self.to)
    }

    /// Calldata as `0x` hex
    pub fn data_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.data))
    }

    /// Value as a base-10 integer string
    pub fn value_decimal(&self) -> String {
        self.value.to_string()
    }
}

fn serialize_address<S: Serializer>(address: &H160, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:#x}", address))
}

fn serialize_bytes<S: Serializer>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(data)))
}

fn serialize_decimal<S: Serializer>(value: &U256, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

/// Assembles intents for one registrar on one chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBuilder {
    registrar: H160,
    chain_id: u64,
}

impl TransactionBuilder {
    /// Create a builder for `registrar` on `chain_id`
    pub fn new(registrar: H160, chain_id: u64) -> Self {
        Self {
            registrar,
            chain_id,
        }
    }

    /// Create a builder from validated chain configuration
    pub fn from_config(config: &ChainConfig) -> Result<Self> {
        let registrar = parse_address(&config.registrar_address)?;
        Ok(Self::new(registrar, config.chain_id))
    }

    /// The registrar all intents target
    pub fn registrar(&self) -> H160 {
        self.registrar
    }

    /// The only chain this builder produces intents for
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Resolve a caller's requested chain, defaulting to the supported one
    pub fn ensure_chain(&self, requested: Option<u64>) -> Result<u64> {
        match requested {
            None => Ok(self.chain_id),
            Some(id) if id == self.chain_id => Ok(id),
            Some(id) => Err(Error::UnsupportedChain {
                requested: id,
                supported: self.chain_id,
            }),
        }
    }

    /// Assemble an intent. Inputs are trusted.
    pub fn build(&self, target: H160, calldata: Vec<u8>, value: U256, chain_id: u64) -> TransactionIntent {
        TransactionIntent {
            to: target,
            data: calldata,
            value,
            chain_id,
        }
    }

    /// Assemble an intent against the configured registrar and chain
    pub fn build_for_registrar(&self, calldata: Vec<u8>, value: U256) -> TransactionIntent {
        self.build(self.registrar, calldata, value, self.chain_id)
    }
}
