use clap::{Parser, Subcommand};
use log::{error, info};
use orca_sdk_sample::{ConnectionCache, PoolConfig, SampleConfig, sample};
use rust_decimal::Decimal;
use std::{path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Orca pool demos: LP balance, LP supply, quote and swap")]
struct Cli {
    /// RPC endpoint, overrides ORCA_RPC_URL
    #[arg(long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// LP token balance of the key file's owner
    LpBalance {
        #[arg(long, default_value = "ETH_USDC", value_parser = parse_pool)]
        pool: PoolConfig,
        /// owner key file, overrides LP_OWNER_KEYPAIR
        #[arg(long)]
        key: Option<PathBuf>,
    },
    /// Total LP token supply
    LpSupply {
        #[arg(long, default_value = "ETH_USDC", value_parser = parse_pool)]
        pool: PoolConfig,
    },
    /// Quote selling token A for token B
    Quote {
        #[arg(long, default_value = "ORCA_USDC", value_parser = parse_pool)]
        pool: PoolConfig,
        #[arg(long, default_value = "1")]
        amount: Decimal,
        /// slippage tolerance in percent
        #[arg(long, default_value = "0.1")]
        slippage: Decimal,
    },
    /// Swap token B for token A
    Swap {
        #[arg(long, default_value = "ORCA_USDC", value_parser = parse_pool)]
        pool: PoolConfig,
        /// signer key file, overrides SWAP_OWNER_KEYPAIR
        #[arg(long)]
        key: Option<PathBuf>,
        #[arg(long, default_value = "0.1")]
        amount: Decimal,
        #[arg(long, default_value = "0.1")]
        slippage: Decimal,
    },
}

fn parse_pool(name: &str) -> Result<PoolConfig, String> {
    PoolConfig::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = PoolConfig::ALL.iter().map(|pool| pool.name).collect();
        format!("unknown pool {}, expected one of {}", name, known.join(", "))
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = SampleConfig::load_default();
    if let Some(url) = cli.url {
        config.network.rpc_url = url;
    }

    let connections = ConnectionCache::new(&config.network.rpc_url, config.commitment_config());

    info!("Using RPC endpoint {}", connections.url());

    let result = run(&connections, &config, cli.command).await;
    complete(result)
}

/// Log the outcome of a demo run, always ending with `Complete.`
fn complete(result: anyhow::Result<()>) -> ExitCode {
    if let Err(e) = &result {
        error!("{:#}", e);
    }

    info!("Complete.");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

async fn run(
    connections: &ConnectionCache,
    config: &SampleConfig,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::LpBalance { pool, key } => {
            let key = key.unwrap_or_else(|| config.keys.lp_owner_path.clone());
            let balance = sample::lp_balance(connections, pool, &key).await?;
            println!(
                "User {} has {} LP token balance of - {}",
                balance.owner, pool.name, balance.balance
            );
        }
        Command::LpSupply { pool } => {
            let supply = sample::lp_supply(connections, pool).await?;
            println!("{} LP token supply of - {}", pool.name, supply);
        }
        Command::Quote {
            pool,
            amount,
            slippage,
        } => {
            let report = sample::quote(connections, pool, amount, slippage).await?;
            println!(
                "Quote for {} {} to {}",
                amount, report.token_a.name, report.token_b.name
            );
            println!("{}", report.quote);
        }
        Command::Swap {
            pool,
            key,
            amount,
            slippage,
        } => {
            let key = key.unwrap_or_else(|| config.keys.swap_owner_path.clone());
            let signature = sample::swap(connections, pool, &key, amount, slippage).await?;
            println!("Swap signature: {}", signature);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use orca_sdk_sample::Error;

    #[test]
    fn test_complete_reports_failure() {
        let result = Err(Error::PoolNotFound(PoolConfig::ETH_USDC.address).into());
        assert_eq!(complete(result), ExitCode::FAILURE);
    }

    #[test]
    fn test_complete_reports_success() {
        assert_eq!(complete(Ok(())), ExitCode::SUCCESS);
    }
}
