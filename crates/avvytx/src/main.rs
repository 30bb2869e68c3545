// # avvytx - unsigned .avax transaction builder
//
// Thin integration layer: reads configuration from the environment,
// registers the oracle and chain-reader plugins, runs one service operation
// and prints its JSON result on stdout. All pricing, expiry and encoding
// logic lives in avvy-core.
//
// ## Configuration
//
// - `AVVY_RPC_URL`: C-Chain JSON-RPC endpoint
// - `AVVY_REGISTRAR_ADDRESS`: registrar contract
// - `AVVY_ORACLE_URL`: CoinGecko simple-price endpoint
// - `AVVY_ORACLE_COIN_ID`: CoinGecko id of the native token
// - `AVVY_ORACLE_TIMEOUT_SECS`: exchange-rate fetch timeout
// - `AVVY_CHAIN_TIMEOUT_SECS`: chain read timeout
// - `AVVY_LOG_LEVEL`: trace, debug, info, warn or error (logs go to stderr)
//
// ## Example
//
// ```bash
// avvytx price abc.avax --years 2
// avvytx register myname --years 1 --enhanced-privacy
// avvytx renew myname.avax --years 3 --chain-id 43114
// avvytx info myname
// ```

use anyhow::{Context, Result};
use avvy_core::config::{AvvyConfig, ChainReaderConfig, OracleConfig};
use avvy_core::{DomainTxService, ProviderRegistry, RegistrationRequest, RenewalRequest};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AvvyExitCode {
    /// Result printed
    Success = 0,
    /// Configuration or startup error
    ConfigError = 1,
    /// The request failed
    RuntimeError = 2,
}

impl From<AvvyExitCode> for ExitCode {
    fn from(code: AvvyExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "avvytx",
    version,
    about = "Build unsigned .avax domain registration and renewal transactions"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price a name at the current exchange rate.
    Price {
        /// Domain name, with or without the .avax suffix.
        name: String,
        /// Number of years.
        #[arg(long, default_value_t = 1)]
        years: u64,
    },

    /// Build an unsigned registerDomain transaction.
    Register {
        /// Domain name, with or without the .avax suffix.
        name: String,
        /// Registration period in years.
        #[arg(long, default_value_t = 1)]
        years: u64,
        /// Chain the transaction will be signed for.
        #[arg(long)]
        chain_id: Option<u64>,
        /// Request enhanced privacy for the registration.
        #[arg(long)]
        enhanced_privacy: bool,
    },

    /// Build an unsigned renewDomain transaction.
    Renew {
        /// Domain name, with or without the .avax suffix.
        name: String,
        /// Extension in years.
        #[arg(long, default_value_t = 1)]
        years: u64,
        /// Chain the transaction will be signed for.
        #[arg(long)]
        chain_id: Option<u64>,
    },

    /// Show on-chain status of a name.
    Info {
        /// Domain name, with or without the .avax suffix.
        name: String,
    },
}

/// Settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
struct EnvConfig {
    rpc_url: Option<String>,
    registrar_address: Option<String>,
    oracle_url: Option<String>,
    oracle_coin_id: Option<String>,
    oracle_timeout_secs: Option<u64>,
    chain_timeout_secs: Option<u64>,
    log_level: String,
}

impl EnvConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, treating empty values as unset
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secs = |key: &str| -> Result<Option<u64>> {
            var(key)
                .map(|v| {
                    v.parse::<u64>()
                        .with_context(|| format!("{} must be a whole number of seconds, got '{}'", key, v))
                })
                .transpose()
        };

        Ok(Self {
            rpc_url: var("AVVY_RPC_URL"),
            registrar_address: var("AVVY_REGISTRAR_ADDRESS"),
            oracle_url: var("AVVY_ORACLE_URL"),
            oracle_coin_id: var("AVVY_ORACLE_COIN_ID"),
            oracle_timeout_secs: secs("AVVY_ORACLE_TIMEOUT_SECS")?,
            chain_timeout_secs: secs("AVVY_CHAIN_TIMEOUT_SECS")?,
            log_level: var("AVVY_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Parsed log level
    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "AVVY_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Overlay the environment onto the defaults and validate the result
    fn into_avvy_config(self) -> Result<AvvyConfig> {
        let mut config = AvvyConfig::new();

        if let Some(url) = self.rpc_url {
            config.chain_reader = ChainReaderConfig::JsonRpc { url };
        }
        if let Some(address) = self.registrar_address {
            config.chain.registrar_address = address;
        }
        if let OracleConfig::Coingecko { url, coin_id, .. } = &mut config.oracle {
            if let Some(oracle_url) = self.oracle_url {
                *url = oracle_url;
            }
            if let Some(id) = self.oracle_coin_id {
                *coin_id = id;
            }
        }
        if let Some(secs) = self.oracle_timeout_secs {
            config.timeouts.oracle_timeout_secs = secs;
        }
        if let Some(secs) = self.chain_timeout_secs {
            config.timeouts.chain_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let env = match EnvConfig::from_env() {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return AvvyExitCode::ConfigError.into();
        }
    };

    let log_level = match env.level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return AvvyExitCode::ConfigError.into();
        }
    };

    let config = match env.into_avvy_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration validation error: {:#}", e);
            return AvvyExitCode::ConfigError.into();
        }
    };

    // stdout carries the JSON result only
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AvvyExitCode::ConfigError.into();
    }

    let service = match build_service(config) {
        Ok(service) => service,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return AvvyExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AvvyExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run(&service, args.command));

    match result.and_then(|value| Ok(serde_json::to_string_pretty(&value)?)) {
        Ok(json) => {
            println!("{}", json);
            AvvyExitCode::Success.into()
        }
        Err(e) => {
            error!("Request failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            AvvyExitCode::RuntimeError.into()
        }
    }
}

/// Register plugins and assemble the service
fn build_service(config: AvvyConfig) -> Result<DomainTxService> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "coingecko")]
    avvy_oracle_coingecko::register(&registry);

    #[cfg(feature = "json-rpc")]
    avvy_chain_rpc::register(&registry);

    info!(
        oracle = config.oracle.type_name(),
        chain_reader = config.chain_reader.type_name(),
        "Creating collaborators"
    );

    let oracle = registry.create_oracle(&config)?;
    let chain_reader = registry.create_chain_reader(&config)?;
    Ok(DomainTxService::new(oracle, chain_reader, config)?)
}

/// Run one subcommand
async fn run(service: &DomainTxService, command: Command) -> Result<Value> {
    let value = match command {
        Command::Price { name, years } => serde_json::to_value(service.quote(&name, years).await?)?,
        Command::Register {
            name,
            years,
            chain_id,
            enhanced_privacy,
        } => {
            let request = RegistrationRequest {
                name,
                years,
                chain_id,
                enhanced_privacy,
            };
            serde_json::to_value(service.prepare_registration(&request).await?)?
        }
        Command::Renew {
            name,
            years,
            chain_id,
        } => {
            let request = RenewalRequest {
                name,
                years,
                chain_id,
            };
            serde_json::to_value(service.prepare_renewal(&request).await?)?
        }
        Command::Info { name } => serde_json::to_value(service.domain_info(&name).await?)?,
    };
    Ok(value)
}
