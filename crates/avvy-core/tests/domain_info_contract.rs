//! Contract Test: Read-only Queries
//!
//! Verifies domain status lookups and record resolution.

mod common;

use avvy_core::error::Error;
use avvy_core::traits::RecordType;
use avvy_core::DomainTxService;
use common::*;
use primitive_types::H160;

#[tokio::test]
async fn available_name_skips_owner_and_expiry_reads() {
    let reader = MockChainReader::empty();
    let calls = MockChainReader::sharing_counters_with(&reader);
    let service = service(MockPriceOracle::with_rate(20.0), reader);

    let info = service.domain_info("Fresh.avax").await.unwrap();
    assert!(info.available);
    assert_eq!(info.owner, None);
    assert_eq!(info.expiry, None);
    assert_eq!(calls.calls(), vec!["exists"]);
}

#[tokio::test]
async fn registered_name_reports_owner_and_expiry() {
    let hash = label_hash("taken");
    let owner = H160::repeat_byte(0xab);
    let reader = MockChainReader::with_expiry(hash, T0).with_owner(hash, owner);
    let calls = MockChainReader::sharing_counters_with(&reader);
    let service = service(MockPriceOracle::with_rate(20.0), reader);

    let info = service.domain_info("taken").await.unwrap();
    assert!(!info.available);
    assert_eq!(info.domain_name, "taken.avax");
    assert_eq!(info.domain_hash, format!("{:#x}", hash));
    assert_eq!(info.owner.as_deref(), Some("0xabababababababababababababababababababab"));
    assert_eq!(info.expiry, Some(T0));
    assert_eq!(info.expiry_date.as_deref(), Some("2025-01-01T00:00:00Z"));
    assert_eq!(calls.calls(), vec!["exists", "ownerOf", "expiryOf"]);
}

fn resolving_service(resolver: MockNameResolver) -> DomainTxService {
    service(MockPriceOracle::with_rate(20.0), MockChainReader::empty()).with_resolver(Box::new(resolver))
}

#[tokio::test]
async fn resolve_returns_record() {
    let resolver = MockNameResolver::new().with_record(
        "avvy.avax",
        &RecordType::Evm,
        "0x5bbd3a8e215b1fc30595fd1aba4f3fcdbb614078",
    );
    let service = resolving_service(resolver);

    let record = service.resolve("AVVY", &RecordType::Evm).await.unwrap();
    assert_eq!(record.domain_name, "avvy.avax");
    assert_eq!(record.value, "0x5bbd3a8e215b1fc30595fd1aba4f3fcdbb614078");

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["recordType"], "EVM");
}

#[tokio::test]
async fn missing_or_empty_record_is_not_found() {
    let resolver = MockNameResolver::new().with_record("avvy.avax", &RecordType::Avatar, "  ");
    let service = resolving_service(resolver);

    for record in [RecordType::Btc, RecordType::Avatar] {
        let err = service.resolve("avvy.avax", &record).await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound { ref name, .. } if name == "avvy.avax"));
    }
}

#[tokio::test]
async fn resolve_without_resolver_is_config_error() {
    let service = service(MockPriceOracle::with_rate(20.0), MockChainReader::empty());
    assert!(matches!(
        service.resolve("avvy", &RecordType::Evm).await,
        Err(Error::Config(_))
    ));
}
