use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey};

use crate::error::Result;

/// Core AMM trait for token-swap pool state
pub(crate) trait Amm: Send + Sync {
    /// Deserialize the AMM from a keyed account
    fn from_keyed_account(pool: &KeyedAccount) -> Result<Self>
    where
        Self: Sized;

    /// Get accounts that need to be updated
    fn get_accounts_to_update(&self) -> Vec<Pubkey>;

    /// Update the AMM state from account data
    fn update(&mut self, account_map: &AccountMap) -> Result<()>;

    /// Get a quote for a swap
    fn quote(&self, quote_params: &QuoteParams) -> Result<Quote>;

    /// Get swap instruction data and account metadata
    fn get_swap_and_account_metas(&self, swap_params: &SwapParams) -> Result<SwapAndAccountMetas>;
}

/// Account map for storing account data
pub type AccountMap = std::collections::HashMap<Pubkey, AccountData>;

/// Account data structure
#[derive(Clone, Debug)]
pub struct AccountData {
    pub data: Vec<u8>,
    pub owner: Pubkey,
}

#[derive(Clone, Debug)]
pub struct KeyedAccount {
    pub key: Pubkey,
    pub account: AccountData,
}

/// Quote parameters, amounts in raw token units
#[derive(Debug, Clone)]
pub struct QuoteParams {
    pub input_mint: Pubkey,
    pub amount: u64,
}

/// Quote result, amounts in raw token units
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub in_amount: u64,
    pub out_amount: u64,
    /// trade fee plus owner fee, charged in the input token
    pub fee_amount: u64,
    /// output at the current spot price, after fees
    pub no_slippage_out_amount: u128,
}

#[derive(Debug, Clone)]
pub struct SwapParams {
    pub source_mint: Pubkey,
    pub user_transfer_authority: Pubkey,
    pub user_source: Pubkey,
    pub user_destination: Pubkey,
    pub amount_in: u64,
    pub minimum_amount_out: u64,
}

#[derive(Debug, Clone)]
pub struct SwapAndAccountMetas {
    pub data: Vec<u8>,
    pub account_metas: Vec<AccountMeta>,
}
