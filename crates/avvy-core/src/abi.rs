//! Contract calldata encoding
//!
//! Implements the subset of the EVM calling convention this crate needs:
//! a 4-byte selector followed by 32-byte words. Fixed-width arguments
//! (`uint256`, `bytes32`) occupy one head word each. A `string` argument puts
//! an offset word in the head and appends its tail:
//!
//! ```text
//! selector | head[0] .. head[n-1] | len | utf8 bytes, zero-padded to 32
//!            ^ offsets count from here
//! ```
//!
//! The call shapes are closed: [`ContractCall`] lists every function the
//! registrar is called with. There is no general ABI support here.

use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

use crate::error::{Error, Result};

/// Word width of the calling convention
pub const WORD: usize = 32;

/// Largest dynamic argument the encoder accepts (1 MiB)
pub const MAX_DYNAMIC_BYTES: usize = 1 << 20;

/// A function selector
pub type Selector = [u8; 4];

/// First four bytes of the Keccak-256 of a canonical signature
pub fn selector(signature: &str) -> Selector {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// One positional argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `string`, encoded in the tail
    String(String),
    /// `uint256`
    Uint(U256),
    /// `bytes32`
    Hash(H256),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        matches!(self, Token::String(_))
    }
}

/// Encode a `uint256` as one big-endian word
pub fn uint_word(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

/// A function call: selector plus ordered arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    selector: Selector,
    args: Vec<Token>,
}

impl FunctionCall {
    /// Build a call descriptor
    pub fn new(selector: Selector, args: Vec<Token>) -> Self {
        Self { selector, args }
    }

    /// The selector
    pub fn selector(&self) -> Selector {
        self.selector
    }

    /// The arguments, in order
    pub fn args(&self) -> &[Token] {
        &self.args
    }

    /// Selector followed by the encoded argument block
    pub fn encode(&self) -> Result<Vec<u8>> {
        let block = encode_args(&self.args)?;
        let mut out = Vec::with_capacity(4 + block.len());
        out.extend_from_slice(&self.selector);
        out.extend_from_slice(&block);
        Ok(out)
    }
}

/// Encode an argument block (no selector)
pub fn encode_args(args: &[Token]) -> Result<Vec<u8>> {
    if let Some(length) = args
        .iter()
        .filter_map(|arg| match arg {
            Token::String(s) => Some(s.len()),
            _ => None,
        })
        .find(|len| *len > MAX_DYNAMIC_BYTES)
    {
        return Err(Error::EncodingOverflow {
            length,
            max: MAX_DYNAMIC_BYTES,
        });
    }

    let head_len = args.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for arg in args {
        match arg {
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::Hash(hash) => head.extend_from_slice(hash.as_bytes()),
            Token::String(s) => {
                let offset = head_len + tail.len();
                head.extend_from_slice(&uint_word(U256::from(offset)));
                encode_string_tail(s.as_bytes(), &mut tail);
            }
        }
    }

    debug_assert_eq!(head.len(), head_len);
    debug_assert!(args.iter().any(Token::is_dynamic) || tail.is_empty());

    head.extend_from_slice(&tail);
    Ok(head)
}

fn encode_string_tail(bytes: &[u8], tail: &mut Vec<u8>) {
    tail.extend_from_slice(&uint_word(U256::from(bytes.len())));
    tail.extend_from_slice(bytes);
    let padding = (WORD - bytes.len() % WORD) % WORD;
    tail.resize(tail.len() + padding, 0);
}

/// Malformed argument or return data
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than the layout requires
    #[error("data truncated: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes present
        available: usize,
    },

    /// A word does not fit the expected integer width
    #[error("value does not fit in {0} bits")]
    Overflow(u32),

    /// An address word with non-zero high bytes
    #[error("word is not a left-padded address")]
    NotAnAddress,

    /// A bool word other than 0 or 1
    #[error("word is not a bool")]
    NotABool,

    /// String bytes are not UTF-8
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
}

fn word_at(data: &[u8], start: usize) -> std::result::Result<&[u8], DecodeError> {
    let end = start.checked_add(WORD).ok_or(DecodeError::Overflow(64))?;
    data.get(start..end).ok_or(DecodeError::Truncated {
        needed: end,
        available: data.len(),
    })
}

/// Decode the `uint256` in word `index`
pub fn decode_uint(data: &[u8], index: usize) -> std::result::Result<U256, DecodeError> {
    let start = index.checked_mul(WORD).ok_or(DecodeError::Overflow(64))?;
    Ok(U256::from_big_endian(word_at(data, start)?))
}

/// Decode word `index` as a `u64`, rejecting wider values
pub fn decode_u64(data: &[u8], index: usize) -> std::result::Result<u64, DecodeError> {
    let value = decode_uint(data, index)?;
    if value > U256::from(u64::MAX) {
        return Err(DecodeError::Overflow(64));
    }
    Ok(value.low_u64())
}

/// Decode the `address` in word `index`
pub fn decode_address(data: &[u8], index: usize) -> std::result::Result<H160, DecodeError> {
    let start = index.checked_mul(WORD).ok_or(DecodeError::Overflow(64))?;
    let word = word_at(data, start)?;
    if word[..12].iter().any(|b| *b != 0) {
        return Err(DecodeError::NotAnAddress);
    }
    Ok(H160::from_slice(&word[12..]))
}

/// Decode the `bool` in word `index`
pub fn decode_bool(data: &[u8], index: usize) -> std::result::Result<bool, DecodeError> {
    let value = decode_uint(data, index)?;
    if value == U256::zero() {
        Ok(false)
    } else if value == U256::one() {
        Ok(true)
    } else {
        Err(DecodeError::NotABool)
    }
}

/// Decode the `string` whose offset word is at `index` of an argument block
pub fn decode_string(block: &[u8], index: usize) -> std::result::Result<String, DecodeError> {
    let offset = to_usize(decode_uint(block, index)?)?;
    let length = to_usize(U256::from_big_endian(word_at(block, offset)?))?;

    let start = offset + WORD;
    let end = start.checked_add(length).ok_or(DecodeError::Overflow(64))?;
    let bytes = block.get(start..end).ok_or(DecodeError::Truncated {
        needed: end,
        available: block.len(),
    })?;

    String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
}

fn to_usize(value: U256) -> std::result::Result<usize, DecodeError> {
    if value > U256::from(usize::MAX) {
        return Err(DecodeError::Overflow(usize::BITS));
    }
    Ok(value.as_usize())
}

/// Every registrar function this crate calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// `registerDomain(string,uint256)`: label and years
    RegisterDomain {
        /// Label being registered
        name: String,
        /// Registration period
        years: u64,
    },

    /// `renewDomain(bytes32,uint256)`: domain hash and new expiry
    RenewDomain {
        /// Keccak-256 of the label
        domain_hash: H256,
        /// New expiry, seconds since the epoch
        new_expiry: u64,
    },

    /// `expiryOf(bytes32)` view
    ExpiryOf {
        /// Keccak-256 of the label
        domain_hash: H256,
    },

    /// `ownerOf(bytes32)` view
    OwnerOf {
        /// Keccak-256 of the label
        domain_hash: H256,
    },

    /// `exists(bytes32)` view
    Exists {
        /// Keccak-256 of the label
        domain_hash: H256,
    },
}

impl ContractCall {
    /// Canonical signature, the selector preimage
    pub fn signature(&self) -> &'static str {
        match self {
            ContractCall::RegisterDomain { .. } => "registerDomain(string,uint256)",
            ContractCall::RenewDomain { .. } => "renewDomain(bytes32,uint256)",
            ContractCall::ExpiryOf { .. } => "expiryOf(bytes32)",
            ContractCall::OwnerOf { .. } => "ownerOf(bytes32)",
            ContractCall::Exists { .. } => "exists(bytes32)",
        }
    }

    /// Function name, for logs and errors
    pub fn name(&self) -> &'static str {
        let signature = self.signature();
        signature.split('(').next().unwrap_or(signature)
    }

    /// The function selector
    pub fn selector(&self) -> Selector {
        selector(self.signature())
    }

    /// The call as a selector plus ordered arguments
    pub fn to_function_call(&self) -> FunctionCall {
        let args = match self {
            ContractCall::RegisterDomain { name, years } => {
                vec![Token::String(name.clone()), Token::Uint(U256::from(*years))]
            }
            ContractCall::RenewDomain {
                domain_hash,
                new_expiry,
            } => vec![Token::Hash(*domain_hash), Token::Uint(U256::from(*new_expiry))],
            ContractCall::ExpiryOf { domain_hash }
            | ContractCall::OwnerOf { domain_hash }
            | ContractCall::Exists { domain_hash } => vec![Token::Hash(*domain_hash)],
        };
        FunctionCall::new(self.selector(), args)
    }

    /// Encoded calldata
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.to_function_call().encode()
    }
}
