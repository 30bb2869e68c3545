//! Record lookup for registered names

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Kind of record attached to a name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RecordType {
    /// EVM address (the default)
    #[default]
    Evm,
    /// Bitcoin address
    Btc,
    /// Content hash
    Content,
    /// Avatar URI
    Avatar,
    /// Free-form key
    Custom(String),
}

impl FromStr for RecordType {
    type Err = crate::Error;

    /// Parses `EVM`, `BTC`, `CONTENT`, `AVATAR` or `CUSTOM:<key>`, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(RecordType::Evm);
        }

        let upper = trimmed.to_ascii_uppercase();
        match upper.as_str() {
            "EVM" => Ok(RecordType::Evm),
            "BTC" => Ok(RecordType::Btc),
            "CONTENT" => Ok(RecordType::Content),
            "AVATAR" => Ok(RecordType::Avatar),
            _ if upper.starts_with("CUSTOM:") => {
                let key = trimmed["CUSTOM:".len()..].trim();
                if key.is_empty() {
                    return Err(crate::Error::invalid_input("Custom record key cannot be empty"));
                }
                Ok(RecordType::Custom(key.to_string()))
            }
            _ => Err(crate::Error::invalid_input(format!(
                "Unknown record type '{}', expected EVM, BTC, CONTENT, AVATAR or CUSTOM:<key>",
                trimmed
            ))),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Evm => f.write_str("EVM"),
            RecordType::Btc => f.write_str("BTC"),
            RecordType::Content => f.write_str("CONTENT"),
            RecordType::Avatar => f.write_str("AVATAR"),
            RecordType::Custom(key) => write!(f, "CUSTOM:{}", key),
        }
    }
}

impl Serialize for RecordType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Resolves records of a fully qualified name (e.g. `"abc.avax"`)
///
/// Same trust rules as the other collaborators: single-shot, no retries.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Look up one record; `Ok(None)` if the name has no such record
    async fn resolve(
        &self,
        name: &str,
        record: &RecordType,
    ) -> Result<Option<String>, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_parsing() {
        assert_eq!("evm".parse::<RecordType>().unwrap(), RecordType::Evm);
        assert_eq!("".parse::<RecordType>().unwrap(), RecordType::Evm);
        assert_eq!("Btc".parse::<RecordType>().unwrap(), RecordType::Btc);
        assert_eq!("CONTENT".parse::<RecordType>().unwrap(), RecordType::Content);
        assert_eq!("avatar".parse::<RecordType>().unwrap(), RecordType::Avatar);
        assert_eq!(
            "custom:Twitter".parse::<RecordType>().unwrap(),
            RecordType::Custom("Twitter".to_string())
        );
    }

    #[test]
    fn test_record_type_rejects_unknown() {
        assert!(matches!(
            "mx".parse::<RecordType>(),
            Err(crate::Error::InvalidInput(_))
        ));
        assert!("CUSTOM:".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_record_type_display() {
        assert_eq!(RecordType::Custom("key".into()).to_string(), "CUSTOM:key");
        assert_eq!(
            serde_json::to_value(RecordType::Btc).unwrap(),
            serde_json::json!("BTC")
        );
    }
}
