use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::error::{Error, Result};

/// Convert a token amount (e.g. `1.5` USDC) into raw base units
pub fn to_raw_amount(amount: Decimal, decimals: u8) -> Result<u64> {
    if amount.is_sign_negative() {
        return Err(Error::InvalidAmount(format!("{} is negative", amount)));
    }

    let scale = 10u64
        .checked_pow(decimals as u32)
        .ok_or(Error::Math("decimal scale"))?;

    amount
        .checked_mul(Decimal::from(scale))
        .and_then(|scaled| scaled.trunc().to_u64())
        .ok_or_else(|| {
            Error::InvalidAmount(format!(
                "{} does not fit a {}-decimal token amount",
                amount, decimals
            ))
        })
}

/// Convert raw base units into a token amount
///
/// # Errors
/// Returns `Error::InvalidAmount` if `decimals` is beyond what `Decimal` can represent
pub fn from_raw_amount(raw: u64, decimals: u8) -> Result<Decimal> {
    Decimal::try_from_i128_with_scale(raw as i128, decimals as u32)
        .map(|amount| amount.normalize())
        .map_err(|e| {
            Error::InvalidAmount(format!("{} with {} decimals: {}", raw, decimals, e))
        })
}

/// Short display name for a mint without a known symbol
pub fn short_mint_name(mint: &solana_sdk::pubkey::Pubkey) -> String {
    let mint = mint.to_string();
    format!("{}..{}", &mint[..4], &mint[mint.len() - 4..])
}
