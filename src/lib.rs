//! # Orca SDK sample
//!
//! A small client for Orca token-swap pools on Solana: read LP balances and
//! supplies, quote swaps and submit them.
//!
//! ## Connections
//!
//! A [`ConnectionCache`] owns at most one RPC connection. The first call to
//! [`ConnectionCache::get`] opens the client and checks that the node answers
//! `getVersion`. Later calls return the same handle. When the check fails
//! nothing is cached and the next call tries again.
//!
//! ## Keys
//!
//! [`read_keypair_file`] loads a signer from a JSON array of the 64 secret-key
//! bytes, the format written by `solana-keygen`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use orca_sdk_sample::{ConnectionCache, Orca, PoolConfig};
//! use rust_decimal::Decimal;
//!
//! # async fn run() -> orca_sdk_sample::Result<()> {
//! let connections = ConnectionCache::default();
//! let orca = Orca::new(connections.get().await?);
//!
//! let mut pool = orca.get_pool(PoolConfig::ORCA_USDC).await?;
//! let token_a = pool.token_a();
//!
//! // 1 ORCA with 0.1% slippage tolerance
//! let quote = pool.quote(&token_a, Decimal::ONE, Decimal::new(1, 1)).await?;
//! println!("{}", quote);
//! # Ok(())
//! # }
//! ```
//!
//! Swaps are built by [`OrcaPool::swap`] and sent with [`SwapPayload::execute`].
//! Always try a swap on a small amount first: it moves real funds.

mod amm;
pub mod config;
pub mod connection;
pub mod constants;
mod error;
pub mod keypair;
mod orca_amm;
pub mod sample;
mod sdk;
mod utils;

pub use config::SampleConfig;
pub use connection::{Connection, ConnectionCache};
pub use error::{Error, Result};
pub use keypair::{decode_keypair, read_keypair_file, write_keypair_file};
pub use sdk::{Orca, OrcaPool, PoolConfig, PoolToken, SwapPayload, SwapQuote};
pub use utils::{from_raw_amount, to_raw_amount};
