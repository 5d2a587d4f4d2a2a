//! The sample operations: each acquires the shared connection, loads one pool
//! and makes a single pool call.

use rust_decimal::Decimal;
use solana_sdk::{pubkey::Pubkey, signature::Signature, signer::Signer};
use std::path::Path;

use crate::{
    connection::ConnectionCache,
    error::Result,
    keypair::read_keypair_file,
    sdk::{Orca, PoolConfig, PoolToken, SwapQuote},
};

#[derive(Debug, Clone, PartialEq)]
pub struct LpBalance {
    pub owner: Pubkey,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteReport {
    pub token_a: PoolToken,
    pub token_b: PoolToken,
    pub quote: SwapQuote,
}

/// LP token balance of the owner whose key is at `owner_key_path`
pub async fn lp_balance(
    connections: &ConnectionCache,
    pool: PoolConfig,
    owner_key_path: &Path,
) -> Result<LpBalance> {
    let orca = Orca::new(connections.get().await?);

    let owner = read_keypair_file(owner_key_path)?.pubkey();
    let pool = orca.get_pool(pool).await?;
    let balance = pool.lp_balance(&owner).await?;

    Ok(LpBalance { owner, balance })
}

/// Total LP token supply of the pool
pub async fn lp_supply(connections: &ConnectionCache, pool: PoolConfig) -> Result<Decimal> {
    let orca = Orca::new(connections.get().await?);

    let mut pool = orca.get_pool(pool).await?;
    pool.lp_supply().await
}

/// Quote selling `amount` of the pool's token A for token B
pub async fn quote(
    connections: &ConnectionCache,
    pool: PoolConfig,
    amount: Decimal,
    slippage: Decimal,
) -> Result<QuoteReport> {
    let orca = Orca::new(connections.get().await?);

    let mut pool = orca.get_pool(pool).await?;
    let token_a = pool.token_a();
    let token_b = pool.token_b();
    log::info!("Token A - {}", token_a.name);
    log::info!("Token B - {}", token_b.name);

    let quote = pool.quote(&token_a, amount, slippage).await?;

    Ok(QuoteReport {
        token_a,
        token_b,
        quote,
    })
}

/// Sell `amount` of the pool's token B, accepting the quoted minimum output
pub async fn swap(
    connections: &ConnectionCache,
    pool: PoolConfig,
    owner_key_path: &Path,
    amount: Decimal,
    slippage: Decimal,
) -> Result<Signature> {
    let orca = Orca::new(connections.get().await?);

    let mut pool = orca.get_pool(pool).await?;
    let owner = read_keypair_file(owner_key_path)?;

    let token = pool.token_b();
    let quote = pool.quote(&token, amount, slippage).await?;
    log::info!(
        "Swapping {} {} for at least {}",
        amount,
        token.name,
        quote.min_output
    );

    let payload = pool.swap(&owner, &token, amount, quote.min_output)?;
    payload.execute().await
}
