use lazy_static::lazy_static;
use solana_sdk::{pubkey, pubkey::Pubkey};
use std::collections::HashMap;

pub const ORCA_TOKEN_SWAP_PROGRAM_ID: Pubkey =
    pubkey!("9W959DqEETiGZocYWCQPaJ6sBmUzgfxXfqGeTEdp3aQP");

// RPC endpoints
pub const ORCA_RPC_URL: &str = "https://orca.rpcpool.com/";
pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

// Pools
pub const ETH_USDC_POOL: Pubkey = pubkey!("EuK3xDa4rWuHeMQCBsHf1ETZNiEQb5C476oE9u9kp8Ji");
pub const ORCA_USDC_POOL: Pubkey = pubkey!("2p7nYbtPBgtmY69NsE8DAW6szpRJn7tQvDnqvoEWQvjY");

// Mints
pub const USDC_MINT: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
pub const ORCA_MINT: Pubkey = pubkey!("orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6QeMU1kektZE");
pub const ETH_MINT: Pubkey = pubkey!("2FPyTwcZLUg1MDrwsyoP4D6s1tM7hAkHYRjkNb5w6Pxk");

/// token-swap `Swap` instruction tag
pub const SWAP_INSTRUCTION_TAG: u8 = 1;

pub const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

lazy_static! {
    pub static ref TOKEN_NAMES: HashMap<Pubkey, &'static str> = HashMap::from([
        (USDC_MINT, "USDC"),
        (ORCA_MINT, "ORCA"),
        (ETH_MINT, "ETH"),
    ]);
}
