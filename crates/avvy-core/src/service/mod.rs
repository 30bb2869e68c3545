//! Domain transaction service
//!
//! [`DomainTxService`] composes the pure calculators with the external
//! collaborators and answers one request at a time:
//!
//! ```text
//!            ┌──────────────┐     ┌──────────────┐
//!  request ─▶│ DomainName / │────▶│ Pricing /    │
//!            │ Years        │     │ Expiry       │
//!            └──────────────┘     └──────────────┘
//!                                        │
//!      ┌─────────────┐  rate             ▼          ┌──────────────────┐
//!      │ PriceOracle │──────────▶ ┌──────────────┐  │ TransactionIntent│
//!      └─────────────┘            │ ContractCall │─▶│ + metadata       │
//!      ┌─────────────┐  expiry    │ encode       │  └──────────────────┘
//!      │ ChainReader │──────────▶ └──────────────┘
//!      └─────────────┘
//! ```
//!
//! ## Failure policy
//!
//! Input is validated before any I/O. Each external read is issued once,
//! bounded by its configured timeout. A failure or timeout surfaces as
//! `OracleUnavailable` / `ChainReadUnavailable`; nothing is retried and no
//! cached or default value is substituted. The service holds no mutable
//! state, so one instance serves concurrent requests.

use primitive_types::U256;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::abi::ContractCall;
use crate::config::{AvvyConfig, TimeoutConfig};
use crate::domain::{DomainName, Years};
use crate::error::{Error, Result};
use crate::expiry::{self, ExpiryCalculator};
use crate::pricing::{ExchangeRate, FiatAmount, PriceTier, PricingCalculator};
use crate::traits::{ChainReader, NameResolver, PriceOracle, RecordType};
use crate::transaction::{TransactionBuilder, TransactionIntent};

/// A request to register a new name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Name as typed by the caller, with or without suffix
    pub name: String,
    /// Registration period in years
    pub years: u64,
    /// Chain the caller intends to sign for, if stated
    pub chain_id: Option<u64>,
    /// Passed through to the response untouched
    pub enhanced_privacy: bool,
}

/// A request to extend an existing registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalRequest {
    /// Name as typed by the caller, with or without suffix
    pub name: String,
    /// Extension in years
    pub years: u64,
    /// Chain the caller intends to sign for, if stated
    pub chain_id: Option<u64>,
}

/// Price of a name for a period, at the current rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Fully qualified name
    pub domain_name: String,
    /// Period priced
    pub years: Years,
    /// Length tier
    pub tier: PriceTier,
    /// Fiat total
    pub price_fiat: FiatAmount,
    /// Rate used for conversion
    pub exchange_rate: ExchangeRate,
    /// Native total in the smallest unit, base-10
    pub price_native_units: String,
    /// Native total in whole tokens, e.g. `"0.25"`
    pub price_native: String,
}

/// Which transaction was prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// `registerDomain`
    Registration,
    /// `renewDomain`
    Renewal,
}

/// Human-facing context for a prepared transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    /// Registration or renewal
    pub kind: TransactionKind,
    /// Fully qualified name
    pub domain_name: String,
    /// Period paid for
    pub years: Years,
    /// Fiat total
    pub price_fiat: FiatAmount,
    /// Native total in whole tokens
    pub price_native: String,
    /// Rate used for conversion
    pub exchange_rate: ExchangeRate,
    /// New expiry, seconds since the epoch
    pub expiry: u64,
    /// New expiry as RFC 3339, if representable
    pub expiry_date: Option<String>,
    /// Caller's privacy flag (registration only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_privacy: Option<bool>,
}

/// An unsigned transaction plus its context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedTransaction {
    /// Handed to the signer
    pub intent: TransactionIntent,
    /// Shown to the user
    pub meta: TransactionMeta,
}

/// On-chain status of a name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInfo {
    /// Fully qualified name
    pub domain_name: String,
    /// Keccak-256 of the label, `0x` hex
    pub domain_hash: String,
    /// Whether the name can be registered
    pub available: bool,
    /// Owner, `0x` hex
    pub owner: Option<String>,
    /// Expiry, seconds since the epoch
    pub expiry: Option<u64>,
    /// Expiry as RFC 3339
    pub expiry_date: Option<String>,
}

/// A resolved record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRecord {
    /// Fully qualified name
    pub domain_name: String,
    /// Record looked up
    pub record_type: RecordType,
    /// Record value
    pub value: String,
}

/// Builds unsigned registration and renewal transactions
pub struct DomainTxService {
    oracle: Box<dyn PriceOracle>,
    chain_reader: Box<dyn ChainReader>,
    resolver: Option<Box<dyn NameResolver>>,
    pricing: PricingCalculator,
    expiry: ExpiryCalculator,
    builder: TransactionBuilder,
    suffix: String,
    timeouts: TimeoutConfig,
}

impl DomainTxService {
    /// Create a service
    ///
    /// # Errors
    ///
    /// `Config` if the configuration does not validate.
    pub fn new(
        oracle: Box<dyn PriceOracle>,
        chain_reader: Box<dyn ChainReader>,
        config: AvvyConfig,
    ) -> Result<Self> {
        config.validate()?;

        let builder = TransactionBuilder::from_config(&config.chain)?;
        info!(
            oracle = oracle.oracle_name(),
            chain_reader = chain_reader.reader_name(),
            chain_id = builder.chain_id(),
            registrar = %format!("{:#x}", builder.registrar()),
            "Domain transaction service ready"
        );

        Ok(Self {
            oracle,
            chain_reader,
            resolver: None,
            pricing: PricingCalculator::new(config.pricing),
            expiry: ExpiryCalculator::new(config.chain.seconds_per_year),
            builder,
            suffix: config.chain.suffix,
            timeouts: config.timeouts,
        })
    }

    /// Attach a record resolver
    pub fn with_resolver(mut self, resolver: Box<dyn NameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// The transaction builder in use
    pub fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    /// Parse a caller-supplied name against the configured suffix
    pub fn parse_name(&self, input: &str) -> Result<DomainName> {
        DomainName::parse(input, &self.suffix)
    }

    /// Price a name for `years` at the current rate
    pub async fn quote(&self, name: &str, years: u64) -> Result<PriceQuote> {
        let name = self.parse_name(name)?;
        let years = Years::new(years)?;
        let tier = self.pricing.tier(&name)?;
        let fiat = self.pricing.price(&name, years)?;

        let rate = self.fetch_rate().await?;
        let native = self.pricing.to_native_amount(fiat, &rate)?;

        debug!(domain = %name, %years, %fiat, %rate, %native, "Quoted price");

        Ok(PriceQuote {
            domain_name: name.full_name(),
            years,
            tier,
            price_fiat: fiat,
            exchange_rate: rate,
            price_native_units: native.to_string(),
            price_native: self.pricing.format_native(native),
        })
    }

    /// Prepare a `registerDomain` transaction, expiry counted from now
    pub async fn prepare_registration(
        &self,
        request: &RegistrationRequest,
    ) -> Result<PreparedTransaction> {
        self.prepare_registration_at(request, expiry::now_unix()).await
    }

    /// Prepare a `registerDomain` transaction with an explicit clock
    pub async fn prepare_registration_at(
        &self,
        request: &RegistrationRequest,
        now: u64,
    ) -> Result<PreparedTransaction> {
        let name = self.parse_name(&request.name)?;
        let years = Years::new(request.years)?;
        let fiat = self.pricing.price(&name, years)?;
        let chain_id = self.builder.ensure_chain(request.chain_id)?;
        let new_expiry = self.expiry.registration_expiry(years, now)?;
        let calldata = ContractCall::RegisterDomain {
            name: name.label().to_string(),
            years: years.get(),
        }
        .encode()?;

        let rate = self.fetch_rate().await?;
        let value = self.pricing.to_native_amount(fiat, &rate)?;

        info!(domain = %name, %years, %value, "Prepared registration");

        Ok(self.prepared(
            TransactionKind::Registration,
            &name,
            years,
            fiat,
            rate,
            value,
            new_expiry,
            calldata,
            chain_id,
            Some(request.enhanced_privacy),
        ))
    }

    /// Prepare a `renewDomain` transaction extending the on-chain expiry
    ///
    /// # Errors
    ///
    /// `NotRegistered` if the registrar reports no expiry for the name. The
    /// oracle is not consulted in that case.
    pub async fn prepare_renewal(&self, request: &RenewalRequest) -> Result<PreparedTransaction> {
        let name = self.parse_name(&request.name)?;
        let years = Years::new(request.years)?;
        let fiat = self.pricing.price(&name, years)?;
        let chain_id = self.builder.ensure_chain(request.chain_id)?;
        let domain_hash = name.hash();

        let current = self
            .chain_call("expiryOf", self.chain_reader.read_expiry(domain_hash))
            .await?
            .ok_or_else(|| Error::NotRegistered(name.full_name()))?;
        let new_expiry = self.expiry.renewal_expiry(years, current)?;
        let calldata = ContractCall::RenewDomain {
            domain_hash,
            new_expiry,
        }
        .encode()?;

        let rate = self.fetch_rate().await?;
        let value = self.pricing.to_native_amount(fiat, &rate)?;

        info!(domain = %name, %years, current, new_expiry, %value, "Prepared renewal");

        Ok(self.prepared(
            TransactionKind::Renewal,
            &name,
            years,
            fiat,
            rate,
            value,
            new_expiry,
            calldata,
            chain_id,
            None,
        ))
    }

    /// Read a name's registration status
    pub async fn domain_info(&self, name: &str) -> Result<DomainInfo> {
        let name = self.parse_name(name)?;
        let domain_hash = name.hash();

        let exists = self
            .chain_call("exists", self.chain_reader.domain_exists(domain_hash))
            .await?;

        let (owner, expiry) = if exists {
            let owner = self
                .chain_call("ownerOf", self.chain_reader.read_owner(domain_hash))
                .await?;
            let expiry = self
                .chain_call("expiryOf", self.chain_reader.read_expiry(domain_hash))
                .await?;
            (owner, expiry)
        } else {
            (None, None)
        };

        debug!(domain = %name, exists, "Read domain info");

        Ok(DomainInfo {
            domain_name: name.full_name(),
            domain_hash: format!("{:#x}", domain_hash),
            available: !exists,
            owner: owner.map(|address| format!("{:#x}", address)),
            expiry,
            expiry_date: expiry.and_then(expiry::to_rfc3339),
        })
    }

    /// Look up a record of a registered name
    ///
    /// # Errors
    ///
    /// - `Config` if no resolver is attached
    /// - `RecordNotFound` if the record is absent or empty
    /// - `ResolverUnavailable` if the lookup fails or times out
    pub async fn resolve(&self, name: &str, record: &RecordType) -> Result<ResolvedRecord> {
        let name = self.parse_name(name)?;
        let resolver = self
            .resolver
            .as_ref()
            .ok_or_else(|| Error::config("No name resolver configured"))?;

        let full_name = name.full_name();
        let value = match tokio::time::timeout(
            self.timeouts.chain(),
            resolver.resolve(&full_name, record),
        )
        .await
        {
            Ok(Ok(value)) => value,
            Ok(Err(e @ Error::ResolverUnavailable(_))) => return Err(e),
            Ok(Err(e)) => return Err(Error::resolver(e.to_string())),
            Err(_) => {
                return Err(Error::resolver(format!(
                    "{} timed out after {:?}",
                    resolver.resolver_name(),
                    self.timeouts.chain()
                )));
            }
        };

        match value {
            Some(value) if !value.trim().is_empty() => Ok(ResolvedRecord {
                domain_name: full_name,
                record_type: record.clone(),
                value,
            }),
            _ => Err(Error::RecordNotFound {
                name: full_name,
                record: record.to_string(),
            }),
        }
    }

    /// One oracle read, validated into an exact rate
    async fn fetch_rate(&self) -> Result<ExchangeRate> {
        let oracle = self.oracle.oracle_name();
        let timeout = self.timeouts.oracle();

        let raw = match tokio::time::timeout(timeout, self.oracle.native_token_price()).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(oracle, error = %e, "Exchange rate fetch failed");
                return Err(match e {
                    Error::OracleUnavailable { .. } => e,
                    other => Error::oracle(oracle, other.to_string()),
                });
            }
            Err(_) => {
                warn!(oracle, ?timeout, "Exchange rate fetch timed out");
                return Err(Error::oracle(oracle, timed_out(timeout)));
            }
        };

        ExchangeRate::from_f64(raw).map_err(|e| {
            warn!(oracle, raw, "Oracle returned an unusable rate");
            Error::oracle(oracle, e.to_string())
        })
    }

    /// One chain read, bounded by the chain timeout
    async fn chain_call<T>(
        &self,
        call: &'static str,
        read: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout = self.timeouts.chain();
        match tokio::time::timeout(timeout, read).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(
                    reader = self.chain_reader.reader_name(),
                    call,
                    error = %e,
                    "Chain read failed"
                );
                Err(match e {
                    Error::ChainReadUnavailable { .. } => e,
                    other => Error::chain_read(call, other.to_string()),
                })
            }
            Err(_) => {
                warn!(reader = self.chain_reader.reader_name(), call, ?timeout, "Chain read timed out");
                Err(Error::chain_read(call, timed_out(timeout)))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn prepared(
        &self,
        kind: TransactionKind,
        name: &DomainName,
        years: Years,
        fiat: FiatAmount,
        rate: ExchangeRate,
        value: U256,
        new_expiry: u64,
        calldata: Vec<u8>,
        chain_id: u64,
        enhanced_privacy: Option<bool>,
    ) -> PreparedTransaction {
        let intent = self
            .builder
            .build(self.builder.registrar(), calldata, value, chain_id);

        PreparedTransaction {
            intent,
            meta: TransactionMeta {
                kind,
                domain_name: name.full_name(),
                years,
                price_fiat: fiat,
                price_native: self.pricing.format_native(value),
                exchange_rate: rate,
                expiry: new_expiry,
                expiry_date: expiry::to_rfc3339(new_expiry),
                enhanced_privacy,
            },
        }
    }
}

fn timed_out(timeout: Duration) -> String {
    format!("timed out after {:?}", timeout)
}
