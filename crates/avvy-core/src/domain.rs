//! Domain names and registration durations
//!
//! A [`DomainName`] is read once from caller input and never changes. Its
//! identity is the trimmed, lower-cased label with the canonical suffix
//! removed; the suffix is re-appended for display.

use primitive_types::H256;
use serde::Serialize;
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A canonicalised domain name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DomainName {
    label: String,
    suffix: String,
}

impl DomainName {
    /// Parse caller input into a domain name
    ///
    /// Accepts both `"name"` and `"name.avax"`. Case is folded, surrounding
    /// whitespace is dropped. Subdomains and embedded whitespace are rejected.
    ///
    /// Label length is not checked here; the pricing tiers own the minimum.
    pub fn parse(input: &str, suffix: &str) -> Result<Self> {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(Error::invalid_input("Domain name is required"));
        }

        let suffix = suffix.to_lowercase();
        let label = normalized
            .strip_suffix(suffix.as_str())
            .unwrap_or(&normalized)
            .to_string();

        if label.is_empty() {
            return Err(Error::invalid_input(format!(
                "Domain name '{}' has an empty label",
                input.trim()
            )));
        }
        if label.contains('.') {
            return Err(Error::invalid_input(format!(
                "Only second-level {} names can be registered, got '{}'",
                suffix, normalized
            )));
        }
        if label.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::invalid_input(format!(
                "Domain name contains whitespace or control characters: '{}'",
                label.escape_debug()
            )));
        }

        Ok(Self { label, suffix })
    }

    /// The registrable label, without suffix
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.label.chars().count()
    }

    /// Fully qualified name, e.g. `"abc.avax"`
    pub fn full_name(&self) -> String {
        format!("{}{}", self.label, self.suffix)
    }

    /// Keccak-256 of the label bytes, as used by the registrar's
    /// `bytes32` lookups
    pub fn hash(&self) -> H256 {
        H256::from_slice(&Keccak256::digest(self.label.as_bytes()))
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.label, self.suffix)
    }
}

/// A registration or renewal period, in whole years (at least one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Years(u64);

impl Years {
    /// Create a duration, rejecting zero
    pub fn new(years: u64) -> Result<Self> {
        if years < 1 {
            return Err(Error::InvalidDuration(years));
        }
        Ok(Self(years))
    }

    /// Number of years
    pub fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for Years {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let years: u64 = s.trim().parse().map_err(|_| {
            Error::invalid_input(format!(
                "Valid years parameter (minimum 1) is required, got '{}'",
                s
            ))
        })?;
        Self::new(years)
    }
}

impl fmt::Display for Years {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
